use std::collections::HashMap;

use super::types::{GesturePhase, GestureSample, PointerInput, RawPhase};

#[derive(Debug, Clone, Copy)]
struct ContactState {
    in_contact: bool,
    gesture_id: u64,
}

/// Folds mouse, pen and touch events into one gesture stream.
///
/// Each pointer id is tracked independently; a gesture id is allocated per
/// contact so consumers can tell consecutive strokes apart.
#[derive(Debug, Default)]
pub struct GestureTracker {
    next_gesture_id: u64,
    contacts: HashMap<u32, ContactState>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self {
            next_gesture_id: 1,
            contacts: HashMap::new(),
        }
    }

    fn alloc_gesture_id(&mut self) -> u64 {
        let id = self.next_gesture_id.max(1);
        self.next_gesture_id = id.saturating_add(1);
        id
    }

    pub fn reset(&mut self) {
        self.next_gesture_id = 1;
        self.contacts.clear();
    }

    pub fn is_active(&self, pointer_id: u32) -> bool {
        self.contacts
            .get(&pointer_id)
            .is_some_and(|state| state.in_contact)
    }

    /// Resolve a raw event. Returns `None` for events that carry no gesture
    /// meaning (release or cancel without a preceding press).
    pub fn resolve(&mut self, input: &PointerInput) -> Option<GestureSample> {
        let state = self.contacts.get(&input.pointer_id).copied();

        let (phase, gesture_id) = match input.phase {
            RawPhase::Down => {
                let gesture_id = match state {
                    Some(s) if s.in_contact => s.gesture_id,
                    _ => self.alloc_gesture_id(),
                };
                let phase = if state.is_some_and(|s| s.in_contact) {
                    GesturePhase::Move
                } else {
                    GesturePhase::Start
                };
                self.contacts.insert(
                    input.pointer_id,
                    ContactState {
                        in_contact: true,
                        gesture_id,
                    },
                );
                (phase, gesture_id)
            }
            RawPhase::Move => match state {
                Some(s) if s.in_contact => (GesturePhase::Move, s.gesture_id),
                _ => (GesturePhase::Hover, 0),
            },
            RawPhase::Up | RawPhase::Leave | RawPhase::Cancel => {
                let s = state?;
                if !s.in_contact {
                    return None;
                }
                self.contacts.remove(&input.pointer_id);
                (GesturePhase::End, s.gesture_id)
            }
        };

        Some(GestureSample {
            gesture_id,
            pointer_id: input.pointer_id,
            kind: input.kind,
            phase,
            client: input.client(),
            timestamp_ms: input.timestamp_ms,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::input::types::PointerKind;

    fn ev(pointer_id: u32, kind: PointerKind, phase: RawPhase) -> PointerInput {
        PointerInput {
            pointer_id,
            ..PointerInput::new(kind, phase, 10.0, 20.0)
        }
    }

    #[test]
    fn down_move_up_shares_one_gesture() {
        let mut tracker = GestureTracker::new();

        let start = tracker
            .resolve(&ev(1, PointerKind::Mouse, RawPhase::Down))
            .expect("down should emit");
        let mv = tracker
            .resolve(&ev(1, PointerKind::Mouse, RawPhase::Move))
            .expect("move should emit");
        let end = tracker
            .resolve(&ev(1, PointerKind::Mouse, RawPhase::Up))
            .expect("up should emit");

        assert_eq!(start.phase, GesturePhase::Start);
        assert_eq!(mv.phase, GesturePhase::Move);
        assert_eq!(end.phase, GesturePhase::End);
        assert_eq!(start.gesture_id, mv.gesture_id);
        assert_eq!(start.gesture_id, end.gesture_id);
    }

    #[test]
    fn mouse_move_without_contact_is_hover() {
        let mut tracker = GestureTracker::new();
        let hover = tracker
            .resolve(&ev(1, PointerKind::Mouse, RawPhase::Move))
            .expect("hover should emit");
        assert_eq!(hover.phase, GesturePhase::Hover);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut tracker = GestureTracker::new();
        assert!(tracker.resolve(&ev(1, PointerKind::Touch, RawPhase::Up)).is_none());
        assert!(tracker.resolve(&ev(1, PointerKind::Touch, RawPhase::Cancel)).is_none());
        assert!(tracker.resolve(&ev(1, PointerKind::Mouse, RawPhase::Leave)).is_none());
    }

    #[test]
    fn leave_and_cancel_end_the_gesture() {
        let mut tracker = GestureTracker::new();
        tracker.resolve(&ev(1, PointerKind::Mouse, RawPhase::Down));
        let end = tracker
            .resolve(&ev(1, PointerKind::Mouse, RawPhase::Leave))
            .expect("leave should end");
        assert_eq!(end.phase, GesturePhase::End);
        assert!(!tracker.is_active(1));

        tracker.resolve(&ev(2, PointerKind::Touch, RawPhase::Down));
        let end = tracker
            .resolve(&ev(2, PointerKind::Touch, RawPhase::Cancel))
            .expect("cancel should end");
        assert_eq!(end.phase, GesturePhase::End);
    }

    #[test]
    fn consecutive_strokes_get_new_ids() {
        let mut tracker = GestureTracker::new();
        let a = tracker
            .resolve(&ev(1, PointerKind::Pen, RawPhase::Down))
            .expect("first down");
        tracker.resolve(&ev(1, PointerKind::Pen, RawPhase::Up));
        let b = tracker
            .resolve(&ev(1, PointerKind::Pen, RawPhase::Down))
            .expect("second down");
        assert!(b.gesture_id > a.gesture_id);
    }

    #[test]
    fn touches_are_tracked_independently() {
        let mut tracker = GestureTracker::new();
        let t1 = tracker
            .resolve(&ev(1, PointerKind::Touch, RawPhase::Down))
            .expect("t1");
        let t2 = tracker
            .resolve(&ev(2, PointerKind::Touch, RawPhase::Down))
            .expect("t2");
        assert_ne!(t1.gesture_id, t2.gesture_id);
        let end2 = tracker
            .resolve(&ev(2, PointerKind::Touch, RawPhase::Up))
            .expect("t2 up");
        assert_eq!(end2.gesture_id, t2.gesture_id);
        assert!(tracker.is_active(1));
    }
}
