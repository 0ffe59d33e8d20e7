//! Stroke surface - the pixel buffer behind the front-side ink layer

use tiny_skia::{
    BlendMode, Color, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Rect, Stroke, Transform,
};

use super::InkError;
use crate::geometry::{CardGeometry, Point};
use crate::input::CoordinateMapper;

/// Transparent RGBA buffer with the card's aspect ratio.
#[derive(Debug, Clone)]
pub struct StrokeSurface {
    pixmap: Pixmap,
    geometry: CardGeometry,
}

fn height_for(geometry: &CardGeometry, width: u32) -> u32 {
    geometry.height_for_width(width as f32).round().max(1.0) as u32
}

impl StrokeSurface {
    /// Surface at the canonical logical resolution.
    pub fn for_card(geometry: &CardGeometry) -> Result<Self, InkError> {
        Self::with_width(geometry, geometry.width.round() as u32)
    }

    /// Surface `width` pixels wide; the height follows the card aspect ratio.
    pub fn with_width(geometry: &CardGeometry, width: u32) -> Result<Self, InkError> {
        let height = height_for(geometry, width);
        let pixmap = Pixmap::new(width, height).ok_or(InkError::InvalidSize { width, height })?;
        Ok(Self {
            pixmap,
            geometry: *geometry,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Stroke-width multiplier relative to the logical card width.
    pub fn scale(&self) -> f32 {
        self.geometry.stroke_scale(self.width() as f32)
    }

    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.width() as f32, self.height() as f32)
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Stroke a single segment with round caps and joins.
    pub fn stroke_segment(&mut self, from: Point, to: Point, width: f32, color: Color) {
        if from == to {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: width.max(0.1),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Clear a `side` x `side` square centred on `center` back to transparent.
    ///
    /// Parts of the square outside the buffer are ignored.
    pub fn clear_square(&mut self, center: Point, side: f32) {
        let half = side / 2.0;
        let Some(rect) = Rect::from_xywh(center.x - half, center.y - half, side, side) else {
            return;
        };
        let paint = Paint {
            blend_mode: BlendMode::Clear,
            anti_alias: false,
            ..Paint::default()
        };
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Wipe the whole surface.
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    pub fn is_blank(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == 0)
    }

    /// Alpha at a pixel, or `None` outside the buffer.
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.pixmap.pixel(x, y).map(|p| p.alpha())
    }

    /// Rescale to a new width, keeping the card aspect ratio and the drawing.
    pub fn resize_to_width(&mut self, width: u32) -> Result<(), InkError> {
        if width == self.width() {
            return Ok(());
        }
        let height = height_for(&self.geometry, width);
        let mut next = Pixmap::new(width, height).ok_or(InkError::InvalidSize { width, height })?;
        let sx = width as f32 / self.width() as f32;
        let sy = height as f32 / self.height() as f32;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        next.draw_pixmap(
            0,
            0,
            self.pixmap.as_ref(),
            &paint,
            Transform::from_scale(sx, sy),
            None,
        );
        tracing::debug!(
            "Ink surface resized {}x{} -> {}x{}",
            self.width(),
            self.height(),
            width,
            height
        );
        self.pixmap = next;
        Ok(())
    }
}
