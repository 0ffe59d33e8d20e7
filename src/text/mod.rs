//! Text module - message styling, wrapping and font access

mod font;
mod wrap;

#[cfg(test)]
pub(crate) mod fake;

pub use font::{FontBook, FontError, FontProvider, GlyphPainter, TextPainter};
pub use wrap::{wrap, WrapLayout, WrapOutcome};

use serde::{Deserialize, Serialize};

use crate::color::HexColor;

/// Drawn in the last line slot when a message does not fit.
pub const TRUNCATION_MARK: &str = "…";

/// Style of the back-side message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font: String,
    pub color: HexColor,
    pub size_px: f32,
}

impl TextStyle {
    pub fn line_height(&self, ratio: f32) -> f32 {
        self.size_px * ratio
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: "Inter".to_string(),
            color: HexColor::BLACK,
            size_px: 20.0,
        }
    }
}

/// Character-count warning for the message box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCheck {
    pub chars: usize,
    pub limit: usize,
    pub over_limit: bool,
}

impl MessageCheck {
    pub fn new(message: &str, limit: usize) -> Self {
        let chars = message.chars().count();
        Self {
            chars,
            limit,
            over_limit: chars > limit,
        }
    }

    pub fn remaining(&self) -> isize {
        self.limit as isize - self.chars as isize
    }
}
