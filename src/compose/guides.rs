//! Static back-side furniture: stamp box and divider

use tiny_skia::{Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::geometry::CardGeometry;

pub fn draw_guides(pixmap: &mut Pixmap, geometry: &CardGeometry, transform: Transform) {
    let [r, g, b] = geometry.guide_color;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, 255);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: geometry.guide_line_width,
        ..Default::default()
    };

    if let Some(rect) = geometry.stamp_rect().to_skia() {
        let path = PathBuilder::from_rect(rect);
        pixmap.stroke_path(&path, &paint, &stroke, transform, None);
    }

    let (top, bottom) = geometry.divider_line();
    let mut pb = PathBuilder::new();
    pb.move_to(top.x, top.y);
    pb.line_to(bottom.x, bottom.y);
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &paint, &stroke, transform, None);
    }
}
