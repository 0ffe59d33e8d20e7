//! Font lookup, measurement and glyph painting
//!
//! Glyph outlines come from `ab_glyph` and are filled as `tiny-skia` paths so
//! text follows the same transforms (rotation, scale) as the rest of a card.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use ab_glyph::{Font, FontArc, FontVec, GlyphId, OutlineCurve, PxScale, ScaleFont};
use fontdb::{Database, Family, Query};
use parking_lot::RwLock;
use thiserror::Error;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

use crate::geometry::Point;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("No font available for family '{0}'")]
    NotFound(String),
    #[error("Invalid font data: {0}")]
    Invalid(String),
}

impl From<FontError> for String {
    fn from(err: FontError) -> String {
        err.to_string()
    }
}

/// Something that can measure and draw a run of text at a pixel size.
pub trait TextPainter: Send + Sync {
    /// Advance width of `text` in pixels.
    fn measure(&self, text: &str, size_px: f32) -> f32;

    /// Distance from the top of a line box to the baseline.
    fn ascent(&self, size_px: f32) -> f32;

    /// Fill `text` with its baseline starting at `origin` (pre-transform).
    fn paint(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        size_px: f32,
        origin: Point,
        paint: &Paint,
        transform: Transform,
    );
}

/// Resolves a family name to a painter.
pub trait FontProvider: Send + Sync {
    fn painter(&self, family: &str) -> Result<Arc<dyn TextPainter>, FontError>;
}

/// `TextPainter` backed by an `ab_glyph` face.
#[derive(Clone)]
pub struct GlyphPainter {
    font: FontArc,
}

impl GlyphPainter {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    pub fn from_bytes(data: Vec<u8>, index: u32) -> Result<Self, FontError> {
        let face = FontVec::try_from_vec_and_index(data, index)
            .map_err(|e| FontError::Invalid(e.to_string()))?;
        Ok(Self::new(FontArc::new(face)))
    }

    fn glyph_run(&self, text: &str, size_px: f32) -> Vec<(GlyphId, f32)> {
        let scaled = self.font.as_scaled(PxScale::from(size_px));
        let mut pen = 0.0f32;
        let mut previous: Option<GlyphId> = None;
        let mut run = Vec::with_capacity(text.len());
        for ch in text.chars().filter(|c| !c.is_control()) {
            let glyph = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                pen += scaled.kern(prev, glyph);
            }
            run.push((glyph, pen));
            pen += scaled.h_advance(glyph);
            previous = Some(glyph);
        }
        run
    }
}

impl TextPainter for GlyphPainter {
    fn measure(&self, text: &str, size_px: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size_px));
        let width = match self.glyph_run(text, size_px).last() {
            Some((glyph, pen)) => pen + scaled.h_advance(*glyph),
            None => 0.0,
        };
        width.max(0.0)
    }

    fn ascent(&self, size_px: f32) -> f32 {
        self.font.as_scaled(PxScale::from(size_px)).ascent()
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
        let scaled = self.font.as_scaled(PxScale::from(size_px));
        let (sx, sy) = (scaled.h_scale_factor(), scaled.v_scale_factor());
        let mut pb = PathBuilder::new();

        for (glyph, pen) in self.glyph_run(text, size_px) {
            let Some(outline) = self.font.outline(glyph) else {
                continue;
            };
            let ox = origin.x + pen;
            // Outline units are y-up
            let map = |p: ab_glyph::Point| (ox + p.x * sx, origin.y - p.y * sy);
            let mut last: Option<ab_glyph::Point> = None;

            for curve in &outline.curves {
                let start = match curve {
                    OutlineCurve::Line(p0, _)
                    | OutlineCurve::Quad(p0, _, _)
                    | OutlineCurve::Cubic(p0, _, _, _) => *p0,
                };
                if last != Some(start) {
                    if last.is_some() {
                        pb.close();
                    }
                    let (x, y) = map(start);
                    pb.move_to(x, y);
                }
                match curve {
                    OutlineCurve::Line(_, p1) => {
                        let (x, y) = map(*p1);
                        pb.line_to(x, y);
                        last = Some(*p1);
                    }
                    OutlineCurve::Quad(_, c, p2) => {
                        let (cx, cy) = map(*c);
                        let (x, y) = map(*p2);
                        pb.quad_to(cx, cy, x, y);
                        last = Some(*p2);
                    }
                    OutlineCurve::Cubic(_, c1, c2, p3) => {
                        let (c1x, c1y) = map(*c1);
                        let (c2x, c2y) = map(*c2);
                        let (x, y) = map(*p3);
                        pb.cubic_to(c1x, c1y, c2x, c2y, x, y);
                        last = Some(*p3);
                    }
                }
            }
            if last.is_some() {
                pb.close();
            }
        }

        if let Some(path) = pb.finish() {
            pixmap.fill_path(&path, paint, FillRule::Winding, transform, None);
        }
    }
}

/// Font database with a per-family painter cache.
pub struct FontBook {
    db: Database,
    loaded: RwLock<HashMap<String, Arc<dyn TextPainter>>>,
}

impl FontBook {
    /// System fonts plus any extra directories.
    pub fn new(extra_dirs: &[PathBuf]) -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        for dir in extra_dirs {
            db.load_fonts_dir(dir);
        }
        tracing::info!("[FontBook] {} faces available", db.len());
        Self::from_database(db)
    }

    pub fn from_database(db: Database) -> Self {
        Self {
            db,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    fn load(&self, family: Family<'_>) -> Option<Result<GlyphPainter, FontError>> {
        let id = self.db.query(&Query {
            families: &[family],
            ..Default::default()
        })?;
        self.db
            .with_face_data(id, |data, index| GlyphPainter::from_bytes(data.to_vec(), index))
    }
}

impl FontProvider for FontBook {
    fn painter(&self, family: &str) -> Result<Arc<dyn TextPainter>, FontError> {
        if let Some(painter) = self.loaded.read().get(family) {
            return Ok(painter.clone());
        }

        let painter = match self.load(Family::Name(family)) {
            Some(result) => result?,
            None => {
                tracing::warn!("[FontBook] '{}' not installed, using sans-serif", family);
                self.load(Family::SansSerif)
                    .ok_or_else(|| FontError::NotFound(family.to_string()))??
            }
        };

        let painter: Arc<dyn TextPainter> = Arc::new(painter);
        self.loaded
            .write()
            .insert(family.to_string(), painter.clone());
        Ok(painter)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_book_reports_missing_family() {
        let book = FontBook::from_database(Database::new());
        let err = book.painter("Inter").err();
        assert!(matches!(err, Some(FontError::NotFound(name)) if name == "Inter"));
    }

    #[test]
    fn garbage_bytes_are_invalid() {
        let err = GlyphPainter::from_bytes(vec![0, 1, 2, 3], 0).err();
        assert!(matches!(err, Some(FontError::Invalid(_))));
    }
}
