//! Ink module - freehand drawing on the front of the card

mod engine;
mod surface;

pub use engine::{InkEngine, InkResponse};
pub use surface::StrokeSurface;

use serde::{Deserialize, Serialize};

/// Drawing tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkTool {
    Pencil,
    Marker,
    Eraser,
}

impl InkTool {
    /// Stroke width at the logical card width
    pub fn stroke_width(self) -> f32 {
        match self {
            InkTool::Pencil => 2.0,
            InkTool::Marker => 8.0,
            InkTool::Eraser => 16.0,
        }
    }

    pub fn alpha(self) -> f32 {
        match self {
            InkTool::Marker => 0.5,
            InkTool::Pencil | InkTool::Eraser => 1.0,
        }
    }

    /// Edge of the eraser square for a surface `surface_width` pixels wide.
    pub fn eraser_side(self, surface_width: f32) -> f32 {
        surface_width * (16.0 / 879.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InkError {
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

impl From<InkError> for String {
    fn from(e: InkError) -> Self {
        e.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn eraser_side_scales_linearly() {
        assert!((InkTool::Eraser.eraser_side(879.0) - 16.0).abs() < 1e-4);
        assert!((InkTool::Eraser.eraser_side(439.5) - 8.0).abs() < 1e-4);
    }

    #[test]
    fn marker_is_wider_than_pencil() {
        assert!(InkTool::Marker.stroke_width() > InkTool::Pencil.stroke_width());
        assert_eq!(InkTool::Pencil.alpha(), 1.0);
    }
}
