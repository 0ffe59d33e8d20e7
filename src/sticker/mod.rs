//! Sticker module - emoji glyphs placed over a card side
//!
//! The layer is a plain list of records plus a little interaction state
//! (paste mode, selection, drag). Rendering lives in the compositor.

mod drag;
mod layer;

pub use drag::DragSession;
pub use layer::{ClickOutcome, EscapeOutcome, StickerLayer};

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Maximum rotation jitter applied at placement, in degrees.
pub const ROTATION_JITTER_DEG: f32 = 16.0;

/// A placed sticker. `position` is its top-left corner in logical card space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sticker {
    pub id: u32,
    pub glyph: String,
    pub position: Point,
    /// Degrees, fixed at creation
    pub rotation: f32,
    #[serde(default)]
    pub is_dragging: bool,
}

impl Sticker {
    /// Centre of the sticker's box for a given render size.
    pub fn center(&self, size: f32) -> Point {
        self.position.offset(size / 2.0, size / 2.0)
    }

    /// Whether `p` falls inside the rotated box of edge `size`.
    pub fn contains(&self, p: Point, size: f32) -> bool {
        let c = self.center(size);
        let (sin, cos) = (-self.rotation.to_radians()).sin_cos();
        let dx = p.x - c.x;
        let dy = p.y - c.y;
        let local_x = dx * cos - dy * sin;
        let local_y = dx * sin + dy * cos;
        let half = size / 2.0;
        local_x.abs() <= half && local_y.abs() <= half
    }
}

/// Device class; changes how placement and dragging behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormFactor {
    #[default]
    Desktop,
    Mobile,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sticker(rotation: f32) -> Sticker {
        Sticker {
            id: 1,
            glyph: "🎈".into(),
            position: Point::new(100.0, 100.0),
            rotation,
            is_dragging: false,
        }
    }

    #[test]
    fn contains_respects_box() {
        let s = sticker(0.0);
        assert!(s.contains(Point::new(128.0, 128.0), 56.0));
        assert!(s.contains(Point::new(100.0, 100.0), 56.0));
        assert!(!s.contains(Point::new(99.0, 128.0), 56.0));
    }

    #[test]
    fn contains_follows_rotation() {
        // A 45 degree turn pulls the corners in and pushes the edge midpoints out.
        let s = sticker(45.0);
        assert!(!s.contains(Point::new(101.0, 101.0), 56.0));
        assert!(s.contains(Point::new(128.0, 128.0 - 38.0), 56.0));
    }

    #[test]
    fn deserializes_without_drag_flag() {
        let s: Sticker = serde_json::from_str(
            r#"{"id":3,"glyph":"x","position":{"x":1.0,"y":2.0},"rotation":4.5}"#,
        )
        .unwrap();
        assert_eq!(s.id, 3);
        assert!(!s.is_dragging);
    }
}
