use crate::geometry::{DisplayRect, Point};
use crate::input::{PointerKind, LONG_PRESS_MS};

/// An in-flight sticker drag.
///
/// Mouse and pen drags are live immediately. Touch drags stay pending until
/// the long-press threshold elapses so a quick tap still means "select".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub sticker_id: u32,
    pub kind: PointerKind,
    /// Client point the current delta is measured from
    pub anchor: Point,
    /// Sticker position when the delta anchor was taken
    pub origin: Point,
    /// Display rect captured at drag start
    pub rect: DisplayRect,
    pub started_ms: u64,
    pub active: bool,
}

impl DragSession {
    pub fn new(
        sticker_id: u32,
        kind: PointerKind,
        anchor: Point,
        origin: Point,
        rect: DisplayRect,
        started_ms: u64,
    ) -> Self {
        Self {
            sticker_id,
            kind,
            anchor,
            origin,
            rect,
            started_ms,
            active: kind != PointerKind::Touch,
        }
    }

    /// Whether a pending touch has been held long enough to become a drag.
    pub fn long_press_elapsed(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_ms) >= LONG_PRESS_MS
    }

    /// Re-anchor at the current point so activation never makes the sticker jump.
    pub fn activate(&mut self, anchor: Point, origin: Point) {
        self.anchor = anchor;
        self.origin = origin;
        self.active = true;
    }
}
