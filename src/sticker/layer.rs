//! Sticker layer state: the sticker list plus paste, selection and drag.

use indexmap::IndexMap;
use rand::Rng;

use super::drag::DragSession;
use super::{FormFactor, Sticker, ROTATION_JITTER_DEG};
use crate::geometry::{CardGeometry, DisplayRect, Point};
use crate::input::{CoordinateMapper, PointerKind};

/// Result of a click on the sticker surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A new sticker was placed (paste mode was armed)
    Placed(u32),
    /// An existing sticker was hit and is now selected
    Selected(u32),
    /// Background click with paste mode disarmed
    Deselected,
}

/// What an Escape key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeOutcome {
    PasteCancelled,
    Deselected,
    Nothing,
}

#[derive(Debug, Clone)]
pub struct StickerLayer {
    geometry: CardGeometry,
    form_factor: FormFactor,
    stickers: IndexMap<u32, Sticker>,
    paste_glyph: Option<String>,
    selected: Option<u32>,
    drag: Option<DragSession>,
    /// Lower bound for the next id, so deleted ids are never handed out again
    next_id: u32,
}

impl StickerLayer {
    pub fn new(geometry: CardGeometry, form_factor: FormFactor) -> Self {
        Self {
            geometry,
            form_factor,
            stickers: IndexMap::new(),
            paste_glyph: None,
            selected: None,
            drag: None,
            next_id: 1,
        }
    }

    /// Rebuild a layer from a saved list. Later duplicates of an id are dropped.
    pub fn from_stickers(
        geometry: CardGeometry,
        form_factor: FormFactor,
        stickers: impl IntoIterator<Item = Sticker>,
    ) -> Self {
        let mut layer = Self::new(geometry, form_factor);
        for mut sticker in stickers {
            if layer.stickers.contains_key(&sticker.id) {
                tracing::warn!("[Stickers] dropping duplicate sticker id {}", sticker.id);
                continue;
            }
            sticker.is_dragging = false;
            layer.next_id = layer.next_id.max(sticker.id.saturating_add(1));
            layer.stickers.insert(sticker.id, sticker);
        }
        layer
    }

    pub fn form_factor(&self) -> FormFactor {
        self.form_factor
    }

    pub fn set_form_factor(&mut self, form_factor: FormFactor) {
        self.form_factor = form_factor;
    }

    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Sticker> {
        self.stickers.get(&id)
    }

    /// Stickers in insertion order.
    pub fn stickers(&self) -> impl Iterator<Item = &Sticker> {
        self.stickers.values()
    }

    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    pub fn paste_glyph(&self) -> Option<&str> {
        self.paste_glyph.as_deref()
    }

    pub fn is_paste_armed(&self) -> bool {
        self.paste_glyph.is_some()
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::for_card(&self.geometry)
    }

    fn allocate_id(&mut self) -> u32 {
        let after_max = self
            .stickers
            .keys()
            .max()
            .map_or(1, |max| max.saturating_add(1));
        let id = after_max.max(self.next_id);
        self.next_id = id.saturating_add(1);
        id
    }

    fn insert_centered<R: Rng + ?Sized>(&mut self, glyph: String, center: Point, rng: &mut R) -> u32 {
        let half = self.geometry.sticker_size / 2.0;
        let id = self.allocate_id();
        let rotation = rng.gen_range(-ROTATION_JITTER_DEG..ROTATION_JITTER_DEG);
        self.stickers.insert(
            id,
            Sticker {
                id,
                glyph,
                position: center.offset(-half, -half),
                rotation,
                is_dragging: false,
            },
        );
        tracing::debug!(
            "[Stickers] placed #{} at ({:.1}, {:.1}) rot {:.1}",
            id,
            center.x - half,
            center.y - half,
            rotation
        );
        id
    }

    /// Arm paste mode with a glyph.
    ///
    /// On mobile there is no follow-up click: the sticker lands at the card
    /// centre right away and its id is returned.
    pub fn enter_paste_mode(&mut self, glyph: impl Into<String>) -> Option<u32> {
        self.enter_paste_mode_with_rng(glyph, &mut rand::thread_rng())
    }

    pub fn enter_paste_mode_with_rng<R: Rng + ?Sized>(
        &mut self,
        glyph: impl Into<String>,
        rng: &mut R,
    ) -> Option<u32> {
        let glyph = glyph.into();
        match self.form_factor {
            FormFactor::Desktop => {
                self.paste_glyph = Some(glyph);
                None
            }
            FormFactor::Mobile => {
                self.paste_glyph = None;
                let center = self.geometry.bounds().center();
                Some(self.insert_centered(glyph, center, rng))
            }
        }
    }

    pub fn cancel_paste_mode(&mut self) {
        self.paste_glyph = None;
    }

    /// Place the armed glyph centred on a client point. Disarms paste mode.
    pub fn place_at(&mut self, client: Point, rect: &DisplayRect) -> Option<u32> {
        self.place_at_with_rng(client, rect, &mut rand::thread_rng())
    }

    pub fn place_at_with_rng<R: Rng + ?Sized>(
        &mut self,
        client: Point,
        rect: &DisplayRect,
        rng: &mut R,
    ) -> Option<u32> {
        let glyph = self.paste_glyph.take()?;
        let center = self.mapper().map_client(client, rect);
        Some(self.insert_centered(glyph, center, rng))
    }

    /// Topmost sticker under a logical point. The selected sticker is drawn
    /// last, so it is tested first.
    pub fn hit_test(&self, p: Point) -> Option<u32> {
        let size = self.geometry.sticker_size;
        self.render_order()
            .into_iter()
            .rev()
            .find(|s| s.contains(p, size))
            .map(|s| s.id)
    }

    /// Route a click: place when armed, select a hit sticker, else deselect.
    pub fn click(&mut self, client: Point, rect: &DisplayRect) -> ClickOutcome {
        self.click_with_rng(client, rect, &mut rand::thread_rng())
    }

    pub fn click_with_rng<R: Rng + ?Sized>(
        &mut self,
        client: Point,
        rect: &DisplayRect,
        rng: &mut R,
    ) -> ClickOutcome {
        let logical = self.mapper().map_client(client, rect);
        if let Some(id) = self.hit_test(logical) {
            self.selected = Some(id);
            return ClickOutcome::Selected(id);
        }
        if let Some(id) = self.place_at_with_rng(client, rect, rng) {
            return ClickOutcome::Placed(id);
        }
        self.selected = None;
        ClickOutcome::Deselected
    }

    pub fn select(&mut self, id: u32) -> bool {
        if self.stickers.contains_key(&id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Remove a sticker, clearing selection and drag state that pointed at it.
    pub fn delete_sticker(&mut self, id: u32) -> Option<Sticker> {
        let removed = self.stickers.shift_remove(&id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.drag.map(|d| d.sticker_id) == Some(id) {
            self.drag = None;
        }
        tracing::debug!("[Stickers] deleted #{}", id);
        Some(removed)
    }

    /// Delete the current selection, if any.
    pub fn delete_selected(&mut self) -> Option<Sticker> {
        let id = self.selected?;
        self.delete_sticker(id)
    }

    /// Escape disarms paste mode first, then drops the selection. Any drag in
    /// flight is abandoned where it is.
    pub fn escape(&mut self) -> EscapeOutcome {
        self.abandon_drag();
        if self.paste_glyph.take().is_some() {
            EscapeOutcome::PasteCancelled
        } else if self.selected.take().is_some() {
            EscapeOutcome::Deselected
        } else {
            EscapeOutcome::Nothing
        }
    }

    /// Stickers in draw order: list order with the selected one moved last.
    pub fn render_order(&self) -> Vec<&Sticker> {
        let mut order: Vec<&Sticker> = self
            .stickers
            .values()
            .filter(|s| Some(s.id) != self.selected)
            .collect();
        if let Some(selected) = self.selected.and_then(|id| self.stickers.get(&id)) {
            order.push(selected);
        }
        order
    }

    /// Start dragging `id` from a client point.
    ///
    /// Mouse and pen select the sticker and drag at once; touch waits for a
    /// long press (see [`update_drag`](Self::update_drag)).
    pub fn begin_drag(
        &mut self,
        id: u32,
        client: Point,
        rect: &DisplayRect,
        kind: PointerKind,
        now_ms: u64,
    ) -> bool {
        self.abandon_drag();
        let Some(sticker) = self.stickers.get_mut(&id) else {
            return false;
        };
        let session = DragSession::new(id, kind, client, sticker.position, *rect, now_ms);
        if session.active {
            sticker.is_dragging = true;
            self.selected = Some(id);
        }
        self.drag = Some(session);
        true
    }

    /// Feed a pointer move to the drag in progress. Returns whether the
    /// sticker is now being dragged (moved or just activated).
    pub fn update_drag(&mut self, client: Point, now_ms: u64) -> bool {
        let mapper = self.mapper();
        let Some(session) = self.drag.as_mut() else {
            return false;
        };
        let Some(sticker) = self.stickers.get_mut(&session.sticker_id) else {
            self.drag = None;
            return false;
        };

        if !session.active {
            if !session.long_press_elapsed(now_ms) {
                return false;
            }
            session.activate(client, sticker.position);
            sticker.is_dragging = true;
            self.selected = Some(session.sticker_id);
            return true;
        }

        let (dx, dy) = mapper.map_delta(
            client.x - session.anchor.x,
            client.y - session.anchor.y,
            &session.rect,
        );
        sticker.position = session.origin.offset(dx, dy);
        true
    }

    /// Finish the drag. A touch that never reached the long-press threshold
    /// counts as a tap and selects the sticker. Returns the sticker id.
    pub fn end_drag(&mut self) -> Option<u32> {
        let session = self.drag.take()?;
        let sticker = self.stickers.get_mut(&session.sticker_id)?;
        sticker.is_dragging = false;
        self.selected = Some(session.sticker_id);
        Some(session.sticker_id)
    }

    /// Drop the drag in progress, leaving the sticker where it is.
    pub(crate) fn abandon_drag(&mut self) {
        if let Some(session) = self.drag.take() {
            if let Some(sticker) = self.stickers.get_mut(&session.sticker_id) {
                sticker.is_dragging = false;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layer() -> StickerLayer {
        StickerLayer::new(CardGeometry::POSTCARD, FormFactor::Desktop)
    }

    fn rect() -> DisplayRect {
        DisplayRect::new(10.0, 10.0, 879.0, 591.0)
    }

    #[test]
    fn placement_centres_glyph_on_click() {
        let mut layer = layer();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(layer.enter_paste_mode_with_rng("🎉", &mut rng), None);
        let id = layer
            .place_at_with_rng(Point::new(110.0, 60.0), &rect(), &mut rng)
            .unwrap();
        assert_eq!(id, 1);
        let s = layer.get(1).unwrap();
        assert_eq!(s.glyph, "🎉");
        assert_eq!(s.position, Point::new(72.0, 22.0));
        assert!(s.rotation >= -16.0 && s.rotation < 16.0);
        assert!(!layer.is_paste_armed());
    }

    #[test]
    fn place_without_paste_mode_is_noop() {
        let mut layer = layer();
        assert_eq!(layer.place_at(Point::new(100.0, 100.0), &rect()), None);
        assert!(layer.is_empty());
    }

    #[test]
    fn ids_increase_and_are_not_reused() {
        let mut layer = layer();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ids = Vec::new();
        for i in 0..3 {
            layer.enter_paste_mode_with_rng("⭐", &mut rng);
            let x = 100.0 + 100.0 * i as f32;
            ids.push(layer.place_at_with_rng(Point::new(x, 200.0), &rect(), &mut rng).unwrap());
        }
        assert_eq!(ids, vec![1, 2, 3]);

        layer.delete_sticker(3).unwrap();
        layer.enter_paste_mode_with_rng("⭐", &mut rng);
        let next = layer
            .place_at_with_rng(Point::new(600.0, 400.0), &rect(), &mut rng)
            .unwrap();
        assert_eq!(next, 4);
    }

    #[test]
    fn mobile_places_at_centre_immediately() {
        let mut layer = StickerLayer::new(CardGeometry::POSTCARD, FormFactor::Mobile);
        let mut rng = StdRng::seed_from_u64(3);
        let id = layer.enter_paste_mode_with_rng("🌸", &mut rng).unwrap();
        let s = layer.get(id).unwrap();
        assert_eq!(s.position, Point::new(879.0 / 2.0 - 28.0, 591.0 / 2.0 - 28.0));
        assert!(!layer.is_paste_armed());
    }

    #[test]
    fn mouse_drag_moves_by_logical_delta() {
        let mut layer = layer();
        let mut rng = StdRng::seed_from_u64(9);
        layer.enter_paste_mode_with_rng("🎈", &mut rng);
        let id = layer
            .place_at_with_rng(Point::new(110.0, 60.0), &rect(), &mut rng)
            .unwrap();
        let rotation = layer.get(id).unwrap().rotation;

        // Card displayed at half size: one client pixel is two logical pixels.
        let half = DisplayRect::new(0.0, 0.0, 439.5, 295.5);
        assert!(layer.begin_drag(id, Point::new(50.0, 20.0), &half, PointerKind::Mouse, 0));
        assert_eq!(layer.selected(), Some(id));
        assert!(layer.get(id).unwrap().is_dragging);

        assert!(layer.update_drag(Point::new(60.0, 25.0), 16));
        let s = layer.get(id).unwrap();
        assert!((s.position.x - 92.0).abs() < 1e-3);
        assert!((s.position.y - 32.0).abs() < 1e-3);
        assert_eq!(s.rotation, rotation);

        assert_eq!(layer.end_drag(), Some(id));
        assert!(!layer.get(id).unwrap().is_dragging);
    }

    #[test]
    fn touch_drag_waits_for_long_press() {
        let mut layer = layer();
        let mut rng = StdRng::seed_from_u64(2);
        layer.enter_paste_mode_with_rng("🎈", &mut rng);
        let id = layer
            .place_at_with_rng(Point::new(110.0, 60.0), &rect(), &mut rng)
            .unwrap();
        let start = layer.get(id).unwrap().position;

        layer.begin_drag(id, Point::new(110.0, 60.0), &rect(), PointerKind::Touch, 1_000);
        assert_eq!(layer.selected(), None);
        assert!(!layer.update_drag(Point::new(150.0, 60.0), 1_100));
        assert_eq!(layer.get(id).unwrap().position, start);

        // Activation rebases at the current point, so the sticker does not jump.
        assert!(layer.update_drag(Point::new(150.0, 60.0), 1_300));
        assert_eq!(layer.get(id).unwrap().position, start);
        assert_eq!(layer.selected(), Some(id));

        layer.update_drag(Point::new(160.0, 70.0), 1_320);
        assert_eq!(layer.get(id).unwrap().position, start.offset(10.0, 10.0));
    }

    #[test]
    fn quick_touch_is_a_tap_that_selects() {
        let mut layer = layer();
        let mut rng = StdRng::seed_from_u64(5);
        layer.enter_paste_mode_with_rng("🎈", &mut rng);
        let id = layer
            .place_at_with_rng(Point::new(110.0, 60.0), &rect(), &mut rng)
            .unwrap();
        layer.begin_drag(id, Point::new(110.0, 60.0), &rect(), PointerKind::Touch, 0);
        assert_eq!(layer.end_drag(), Some(id));
        assert_eq!(layer.selected(), Some(id));
    }

    #[test]
    fn selected_sticker_renders_last_and_hits_first() {
        let mut layer = layer();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..2 {
            layer.enter_paste_mode_with_rng("🎈", &mut rng);
            layer.place_at_with_rng(Point::new(300.0, 300.0), &rect(), &mut rng);
        }
        let logical = Point::new(290.0, 290.0);
        assert_eq!(layer.hit_test(logical), Some(2));

        layer.select(1);
        let order: Vec<u32> = layer.render_order().iter().map(|s| s.id).collect();
        assert_eq!(order, vec![2, 1]);
        assert_eq!(layer.hit_test(logical), Some(1));
    }

    #[test]
    fn escape_disarms_paste_before_deselecting() {
        let mut layer = layer();
        let mut rng = StdRng::seed_from_u64(4);
        layer.enter_paste_mode_with_rng("🎈", &mut rng);
        let id = layer
            .place_at_with_rng(Point::new(110.0, 60.0), &rect(), &mut rng)
            .unwrap();
        layer.select(id);
        layer.enter_paste_mode_with_rng("⭐", &mut rng);

        assert_eq!(layer.escape(), EscapeOutcome::PasteCancelled);
        assert_eq!(layer.selected(), Some(id));
        assert_eq!(layer.escape(), EscapeOutcome::Deselected);
        assert_eq!(layer.escape(), EscapeOutcome::Nothing);
    }

    #[test]
    fn click_routes_by_state() {
        let mut layer = layer();
        let mut rng = StdRng::seed_from_u64(8);
        layer.enter_paste_mode_with_rng("🎈", &mut rng);
        let placed = layer.click_with_rng(Point::new(410.0, 310.0), &rect(), &mut rng);
        assert_eq!(placed, ClickOutcome::Placed(1));

        // Clicking the sticker itself selects rather than placing again.
        layer.enter_paste_mode_with_rng("⭐", &mut rng);
        let hit = layer.click_with_rng(Point::new(410.0, 310.0), &rect(), &mut rng);
        assert_eq!(hit, ClickOutcome::Selected(1));
        assert!(layer.is_paste_armed());
        assert_eq!(layer.len(), 1);

        layer.cancel_paste_mode();
        let bg = layer.click_with_rng(Point::new(800.0, 500.0), &rect(), &mut rng);
        assert_eq!(bg, ClickOutcome::Deselected);
        assert_eq!(layer.selected(), None);
    }

    #[test]
    fn second_drag_releases_the_first_sticker() {
        let mut layer = layer();
        let mut rng = StdRng::seed_from_u64(8);
        layer.enter_paste_mode_with_rng("🎈", &mut rng);
        let first = layer
            .place_at_with_rng(Point::new(110.0, 60.0), &rect(), &mut rng)
            .unwrap();
        layer.enter_paste_mode_with_rng("⭐", &mut rng);
        let second = layer
            .place_at_with_rng(Point::new(500.0, 300.0), &rect(), &mut rng)
            .unwrap();

        assert!(layer.begin_drag(first, Point::new(110.0, 60.0), &rect(), PointerKind::Mouse, 0));
        assert!(layer.begin_drag(second, Point::new(500.0, 300.0), &rect(), PointerKind::Mouse, 10));
        assert!(!layer.get(first).unwrap().is_dragging);
        assert!(layer.get(second).unwrap().is_dragging);

        assert_eq!(layer.end_drag(), Some(second));
        assert!(layer.stickers().all(|s| !s.is_dragging));
    }

    #[test]
    fn abandoned_drag_keeps_position() {
        let mut layer = layer();
        let mut rng = StdRng::seed_from_u64(12);
        layer.enter_paste_mode_with_rng("🎈", &mut rng);
        let id = layer
            .place_at_with_rng(Point::new(110.0, 60.0), &rect(), &mut rng)
            .unwrap();
        layer.begin_drag(id, Point::new(110.0, 60.0), &rect(), PointerKind::Mouse, 0);
        layer.update_drag(Point::new(130.0, 70.0), 16);
        layer.abandon_drag();

        let s = layer.get(id).unwrap();
        assert!(!s.is_dragging);
        assert!((s.position.x - 92.0).abs() < 1e-3);
        assert!(layer.drag().is_none());
        assert_eq!(layer.end_drag(), None);
    }

    #[test]
    fn deleting_dragged_sticker_drops_drag() {
        let mut layer = layer();
        let mut rng = StdRng::seed_from_u64(6);
        layer.enter_paste_mode_with_rng("🎈", &mut rng);
        let id = layer
            .place_at_with_rng(Point::new(110.0, 60.0), &rect(), &mut rng)
            .unwrap();
        layer.begin_drag(id, Point::new(110.0, 60.0), &rect(), PointerKind::Mouse, 0);
        layer.delete_sticker(id).unwrap();
        assert!(layer.drag().is_none());
        assert_eq!(layer.selected(), None);
        assert!(!layer.update_drag(Point::new(200.0, 200.0), 10));
    }
}
