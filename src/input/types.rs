use serde::{Deserialize, Serialize};

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

/// Phase as reported by the host event (pointer or touch events alike).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawPhase {
    Down,
    Move,
    Up,
    Leave,
    Cancel,
}

/// Normalized gesture phase consumed by the ink and sticker layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Hover,
    Start,
    Move,
    End,
}

/// One host pointer/touch/mouse event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerInput {
    pub pointer_id: u32,
    pub kind: PointerKind,
    pub phase: RawPhase,
    pub client_x: f32,
    pub client_y: f32,
    pub timestamp_ms: u64,
}

impl PointerInput {
    pub fn new(kind: PointerKind, phase: RawPhase, client_x: f32, client_y: f32) -> Self {
        Self {
            pointer_id: 1,
            kind,
            phase,
            client_x,
            client_y,
            timestamp_ms: 0,
        }
    }

    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub fn client(&self) -> Point {
        Point::new(sanitize(self.client_x), sanitize(self.client_y))
    }
}

/// Output of the gesture tracker: a single `(point, phase)` stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub gesture_id: u64,
    pub pointer_id: u32,
    pub kind: PointerKind,
    pub phase: GesturePhase,
    pub client: Point,
    pub timestamp_ms: u64,
}

fn sanitize(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    value
}
