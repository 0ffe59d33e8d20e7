//! Fixed-advance block font for tests: every char is `advance` wide and
//! non-space chars paint as solid blocks.

use std::sync::Arc;

use tiny_skia::{Paint, Pixmap, Rect, Transform};

use super::{FontError, FontProvider, TextPainter};
use crate::geometry::Point;

pub(crate) struct BlockFont {
    pub advance: f32,
}

impl TextPainter for BlockFont {
    fn measure(&self, text: &str, _size_px: f32) -> f32 {
        text.chars().count() as f32 * self.advance
    }

    fn ascent(&self, size_px: f32) -> f32 {
        size_px * 0.8
    }

    fn paint(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        size_px: f32,
        origin: Point,
        paint: &Paint,
        transform: Transform,
    ) {
        let ascent = self.ascent(size_px);
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x = origin.x + i as f32 * self.advance;
            if let Some(rect) = Rect::from_xywh(x, origin.y - ascent, self.advance * 0.8, ascent) {
                pixmap.fill_rect(rect, paint, transform, None);
            }
        }
    }
}

pub(crate) struct BlockFonts;

impl FontProvider for BlockFonts {
    fn painter(&self, _family: &str) -> Result<Arc<dyn TextPainter>, FontError> {
        Ok(Arc::new(BlockFont { advance: 10.0 }))
    }
}

/// Provider with nothing installed.
pub(crate) struct NoFonts;

impl FontProvider for NoFonts {
    fn painter(&self, family: &str) -> Result<Arc<dyn TextPainter>, FontError> {
        Err(FontError::NotFound(family.to_string()))
    }
}
