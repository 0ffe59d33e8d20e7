//! Fitting a bitmap into a rectangle

use serde::{Deserialize, Serialize};
use tiny_skia::{FilterQuality, Paint, Pattern, Pixmap, SpreadMode, Transform};

use crate::geometry::RectF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    /// Uniform scale so the image covers the target, overflow cropped evenly
    #[default]
    Cover,
    /// Non-uniform scale to the target's exact size
    Stretch,
}

/// Transform from image pixel space into the target rectangle.
pub fn fit_transform(src_width: f32, src_height: f32, dst: RectF, fit: ImageFit) -> Transform {
    if src_width <= 0.0 || src_height <= 0.0 {
        return Transform::identity();
    }
    let (sx, sy) = match fit {
        ImageFit::Cover => {
            let s = (dst.width / src_width).max(dst.height / src_height);
            (s, s)
        }
        ImageFit::Stretch => (dst.width / src_width, dst.height / src_height),
    };
    let x = dst.x + (dst.width - src_width * sx) / 2.0;
    let y = dst.y + (dst.height - src_height * sy) / 2.0;
    Transform::from_row(sx, 0.0, 0.0, sy, x, y)
}

/// Fill `dst` with `image` fitted per `fit`; nothing outside `dst` is touched.
pub fn draw_fitted(
    target: &mut Pixmap,
    image: &Pixmap,
    dst: RectF,
    fit: ImageFit,
    transform: Transform,
) {
    let Some(rect) = dst.to_skia() else {
        return;
    };
    let shader_ts = fit_transform(image.width() as f32, image.height() as f32, dst, fit);
    let paint = Paint {
        shader: Pattern::new(
            image.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            1.0,
            shader_ts,
        ),
        anti_alias: true,
        ..Default::default()
    };
    target.fill_rect(rect, &paint, transform, None);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn map(ts: Transform, x: f32, y: f32) -> (f32, f32) {
        let mut p = [tiny_skia::Point::from_xy(x, y)];
        ts.map_points(&mut p);
        (p[0].x, p[0].y)
    }

    #[test]
    fn cover_fills_short_side_and_centres_overflow() {
        // 200x100 into a 100x100 square: scale 1, 50px cropped on each side
        let ts = fit_transform(200.0, 100.0, RectF::new(0.0, 0.0, 100.0, 100.0), ImageFit::Cover);
        assert_eq!(map(ts, 0.0, 0.0), (-50.0, 0.0));
        assert_eq!(map(ts, 200.0, 100.0), (150.0, 100.0));
    }

    #[test]
    fn cover_upscales_small_images() {
        let ts = fit_transform(10.0, 20.0, RectF::new(16.0, 16.0, 100.0, 100.0), ImageFit::Cover);
        assert_eq!(map(ts, 0.0, 0.0), (16.0, -34.0));
        assert_eq!(map(ts, 10.0, 20.0), (116.0, 166.0));
    }

    #[test]
    fn stretch_hits_corners_exactly() {
        let dst = RectF::new(16.0, 16.0, 847.0, 559.0);
        let ts = fit_transform(300.0, 300.0, dst, ImageFit::Stretch);
        assert_eq!(map(ts, 0.0, 0.0), (16.0, 16.0));
        let (x, y) = map(ts, 300.0, 300.0);
        assert!((x - dst.right()).abs() < 1e-3 && (y - dst.bottom()).abs() < 1e-3);
    }
}
