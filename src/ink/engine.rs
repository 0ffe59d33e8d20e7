//! Ink engine - turns the gesture stream into strokes on a surface

use super::surface::StrokeSurface;
use super::InkTool;
use crate::color::HexColor;
use crate::geometry::{DisplayRect, Point};
use crate::input::{GesturePhase, GestureSample, PointerKind};

#[derive(Debug, Clone, Copy, PartialEq)]
enum DrawState {
    Idle,
    Drawing { last: Point },
}

/// What happened to a gesture sample routed to the ink layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InkResponse {
    pub handled: bool,
    /// Native scrolling must be cancelled (touch stroke in progress).
    pub prevent_default: bool,
}

/// Freehand draw state machine: `Idle -> Drawing -> Idle`.
#[derive(Debug, Clone)]
pub struct InkEngine {
    tool: Option<InkTool>,
    color: HexColor,
    state: DrawState,
}

impl InkEngine {
    pub fn new() -> Self {
        Self {
            tool: None,
            color: HexColor::BLACK,
            state: DrawState::Idle,
        }
    }

    pub fn tool(&self) -> Option<InkTool> {
        self.tool
    }

    /// Select a tool, or `None` to leave drawing mode. Ends any active stroke.
    pub fn select_tool(&mut self, tool: Option<InkTool>) {
        self.tool = tool;
        self.state = DrawState::Idle;
    }

    pub fn color(&self) -> HexColor {
        self.color
    }

    pub fn set_color(&mut self, color: HexColor) {
        self.color = color;
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    /// Start a stroke at a buffer-space point. Returns whether drawing began.
    pub fn pointer_down(&mut self, surface: &StrokeSurface, p: Point) -> bool {
        if self.tool.is_none() || !surface.mapper().contains(p) {
            return false;
        }
        self.state = DrawState::Drawing { last: p };
        true
    }

    /// Extend the stroke. Out-of-bounds moves are dropped without ending it.
    pub fn pointer_move(&mut self, surface: &mut StrokeSurface, p: Point) -> bool {
        let (DrawState::Drawing { last }, Some(tool)) = (self.state, self.tool) else {
            return false;
        };
        if !surface.mapper().contains(p) {
            return false;
        }

        let scale = surface.scale();
        match tool {
            InkTool::Eraser => surface.clear_square(p, tool.eraser_side(surface.width() as f32)),
            InkTool::Pencil | InkTool::Marker => {
                let color = self.color.to_skia(tool.alpha());
                surface.stroke_segment(last, p, tool.stroke_width() * scale, color);
            }
        }
        self.state = DrawState::Drawing { last: p };
        true
    }

    /// Close the current stroke. No-op when idle.
    pub fn pointer_up(&mut self) -> bool {
        let was_drawing = self.is_drawing();
        self.state = DrawState::Idle;
        was_drawing
    }

    /// Wipe the surface; tool selection is kept.
    pub fn clear(&mut self, surface: &mut StrokeSurface) {
        surface.clear();
        tracing::debug!("Ink layer cleared");
    }

    /// Route one gesture sample, mapping its client point through `rect`.
    pub fn handle(
        &mut self,
        surface: &mut StrokeSurface,
        sample: &GestureSample,
        rect: &DisplayRect,
    ) -> InkResponse {
        let p = surface.mapper().map_client(sample.client, rect);
        let handled = match sample.phase {
            GesturePhase::Start => self.pointer_down(surface, p),
            GesturePhase::Move => {
                self.pointer_move(surface, p);
                self.is_drawing()
            }
            GesturePhase::End => self.pointer_up(),
            GesturePhase::Hover => false,
        };
        InkResponse {
            handled,
            prevent_default: handled && sample.kind == PointerKind::Touch,
        }
    }
}

impl Default for InkEngine {
    fn default() -> Self {
        Self::new()
    }
}
