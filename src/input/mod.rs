//! Input module - pointer, touch and mouse normalization
//!
//! Hosts feed raw events; the tracker folds them into a single
//! `(point, phase)` stream and the coordinate mapper moves points from
//! client space into a surface's buffer space.

mod coordinate_mapper;
mod gesture;
mod types;

pub use coordinate_mapper::CoordinateMapper;
pub use gesture::GestureTracker;
pub use types::{GesturePhase, GestureSample, PointerInput, PointerKind, RawPhase};

/// Hold time before a touch on a sticker turns into a drag.
pub const LONG_PRESS_MS: u64 = 300;
