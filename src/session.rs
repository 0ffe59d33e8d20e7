//! Editing session - one postcard's state and its input routing
//!
//! A session owns its ink surface, sticker lists, message and uploads
//! exclusively. [`SharedSession`] puts it behind a mutex so a composite
//! always sees a consistent snapshot: edits wait until it finishes.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use crate::asset::{decode_data_url, prepare_upload, AssetError, AssetHandle, AssetRegistry, UploadSlot};
use crate::color::HexColor;
use crate::compose::{self, ComposeError, ComposeInputs, ImageFit, ImageSource, Layering, LayoutMode};
use crate::config::StudioConfig;
use crate::export::PreviewImage;
use crate::geometry::{CardGeometry, DisplayRect, Side};
use crate::ink::{InkEngine, InkError, InkTool, StrokeSurface};
use crate::input::{CoordinateMapper, GesturePhase, GestureSample, GestureTracker, PointerInput, PointerKind};
use crate::sticker::{ClickOutcome, EscapeOutcome, FormFactor, StickerLayer};
use crate::text::{FontProvider, MessageCheck, TextStyle};

/// How a pointer event was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerResponse {
    pub handled: bool,
    /// Host should cancel native scrolling for this event
    pub prevent_default: bool,
}

/// Keys the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
}

pub struct EditingSession {
    config: StudioConfig,
    geometry: CardGeometry,
    side: Side,
    background: UploadSlot,
    backdrop: UploadSlot,
    ink: StrokeSurface,
    engine: InkEngine,
    front_stickers: StickerLayer,
    back_stickers: StickerLayer,
    gestures: GestureTracker,
    message: String,
    style: TextStyle,
    fit: ImageFit,
    layout: LayoutMode,
    layering: Layering,
}

impl EditingSession {
    pub fn new(
        config: StudioConfig,
        registry: Arc<AssetRegistry>,
        form_factor: FormFactor,
    ) -> Result<Self, InkError> {
        let geometry = CardGeometry::POSTCARD;
        let style = TextStyle {
            font: config.text.default_font.clone(),
            ..TextStyle::default()
        };
        Ok(Self {
            geometry,
            side: Side::Front,
            background: UploadSlot::new(registry.clone()),
            backdrop: UploadSlot::new(registry),
            ink: StrokeSurface::for_card(&geometry)?,
            engine: InkEngine::new(),
            front_stickers: StickerLayer::new(geometry, form_factor),
            back_stickers: StickerLayer::new(geometry, form_factor),
            gestures: GestureTracker::new(),
            message: String::new(),
            style,
            fit: ImageFit::default(),
            layout: config.layout.mode,
            layering: config.layout.layering,
            config,
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Flip to the other face. Gestures in flight are dropped.
    pub fn set_side(&mut self, side: Side) {
        if side != self.side {
            self.engine.pointer_up();
            self.front_stickers.abandon_drag();
            self.back_stickers.abandon_drag();
            self.gestures.reset();
            self.side = side;
        }
    }

    pub fn ink(&self) -> &StrokeSurface {
        &self.ink
    }

    pub fn engine(&self) -> &InkEngine {
        &self.engine
    }

    pub fn stickers(&self, side: Side) -> &StickerLayer {
        match side {
            Side::Front => &self.front_stickers,
            Side::Back => &self.back_stickers,
        }
    }

    fn stickers_mut(&mut self, side: Side) -> &mut StickerLayer {
        match side {
            Side::Front => &mut self.front_stickers,
            Side::Back => &mut self.back_stickers,
        }
    }

    pub fn select_tool(&mut self, tool: Option<InkTool>) {
        self.engine.select_tool(tool);
    }

    pub fn set_drawing_color(&mut self, color: &str) {
        self.engine.set_color(HexColor::parse_or_black(color));
    }

    pub fn clear_ink(&mut self) {
        self.engine.clear(&mut self.ink);
    }

    /// Change the ink backing resolution, keeping the card aspect ratio.
    pub fn resize_ink(&mut self, width: u32) -> Result<(), InkError> {
        self.ink.resize_to_width(width)
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn check_message(&self) -> MessageCheck {
        MessageCheck::new(&self.message, self.config.text.message_char_limit)
    }

    pub fn set_style(&mut self, style: TextStyle) {
        self.style = style;
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    pub fn set_layout(&mut self, layout: LayoutMode, layering: Layering) {
        self.layout = layout;
        self.layering = layering;
    }

    pub fn set_fit(&mut self, fit: ImageFit) {
        self.fit = fit;
    }

    /// Accept a front photo as a data URL, downscaled per config.
    pub fn upload_background(&mut self, data_url: &str) -> Result<AssetHandle, AssetError> {
        let image = self.prepare(data_url)?;
        let handle = self.background.replace(image);
        tracing::info!("[Session] background uploaded as {}", handle);
        Ok(handle)
    }

    pub fn upload_backdrop(&mut self, data_url: &str) -> Result<AssetHandle, AssetError> {
        let image = self.prepare(data_url)?;
        Ok(self.backdrop.replace(image))
    }

    pub fn clear_backdrop(&mut self) {
        self.backdrop.release();
    }

    fn prepare(&self, data_url: &str) -> Result<image::RgbaImage, AssetError> {
        let (mime, bytes) = decode_data_url(data_url)?;
        if !mime.starts_with("image/") {
            return Err(AssetError::UnsupportedMime(mime));
        }
        Ok(prepare_upload(&bytes, &self.config.upload)?.image)
    }

    pub fn enter_paste_mode(&mut self, glyph: &str) -> Option<u32> {
        let side = self.side;
        self.stickers_mut(side).enter_paste_mode(glyph)
    }

    pub fn cancel_paste_mode(&mut self) {
        let side = self.side;
        self.stickers_mut(side).cancel_paste_mode();
    }

    pub fn delete_sticker(&mut self, id: u32) -> bool {
        let side = self.side;
        self.stickers_mut(side).delete_sticker(id).is_some()
    }

    /// Route a raw pointer event on the current side's surface.
    ///
    /// On the front with a tool selected the ink engine gets it; otherwise
    /// the sticker layer (drag, place, select).
    pub fn handle_pointer(&mut self, input: &PointerInput, rect: &DisplayRect) -> PointerResponse {
        let Some(sample) = self.gestures.resolve(input) else {
            return PointerResponse::default();
        };

        if self.side == Side::Front && self.engine.tool().is_some() {
            let r = self.engine.handle(&mut self.ink, &sample, rect);
            return PointerResponse {
                handled: r.handled,
                prevent_default: r.prevent_default,
            };
        }
        self.route_sticker(&sample, rect)
    }

    fn route_sticker(&mut self, sample: &GestureSample, rect: &DisplayRect) -> PointerResponse {
        let geometry = self.geometry;
        let side = self.side;
        let layer = self.stickers_mut(side);

        let handled = match sample.phase {
            GesturePhase::Hover => false,
            GesturePhase::Start => {
                let logical = CoordinateMapper::for_card(&geometry).map_client(sample.client, rect);
                match layer.hit_test(logical) {
                    Some(id) => {
                        layer.begin_drag(id, sample.client, rect, sample.kind, sample.timestamp_ms)
                    }
                    None => {
                        let had_selection = layer.selected().is_some();
                        match layer.click(sample.client, rect) {
                            ClickOutcome::Deselected => had_selection,
                            ClickOutcome::Placed(_) | ClickOutcome::Selected(_) => true,
                        }
                    }
                }
            }
            GesturePhase::Move => layer.update_drag(sample.client, sample.timestamp_ms),
            GesturePhase::End => layer.end_drag().is_some(),
        };

        let dragging = layer.drag().is_some_and(|d| d.active);
        PointerResponse {
            handled,
            prevent_default: handled && sample.kind == PointerKind::Touch && dragging,
        }
    }

    /// Escape cancels strokes, paste mode and selection; Delete/Backspace
    /// remove the selected sticker. Returns whether anything changed.
    pub fn key_event(&mut self, key: Key) -> bool {
        let side = self.side;
        match key {
            Key::Escape => {
                let stroke = self.engine.pointer_up();
                let outcome = self.stickers_mut(side).escape();
                stroke || outcome != EscapeOutcome::Nothing
            }
            Key::Delete | Key::Backspace => self.stickers_mut(side).delete_selected().is_some(),
        }
    }

    /// Snapshot of everything the compositor needs.
    pub fn compose_inputs(&self) -> Result<ComposeInputs, ComposeError> {
        let load = |asset: &'static str, slot: &UploadSlot| {
            slot.image()
                .map(|img| img.map(ImageSource::Decoded))
                .map_err(|source| ComposeError::AssetLoad { asset, source })
        };
        let mut inputs = ComposeInputs::new(&self.config);
        inputs.geometry = self.geometry;
        inputs.background = load("background", &self.background)?;
        inputs.backdrop = load("backdrop", &self.backdrop)?;
        inputs.ink = Some(self.ink.pixmap().clone());
        inputs.front_stickers = self.front_stickers.render_order().into_iter().cloned().collect();
        inputs.back_stickers = self.back_stickers.render_order().into_iter().cloned().collect();
        inputs.message = self.message.clone();
        inputs.style = self.style.clone();
        inputs.layout = self.layout;
        inputs.layering = self.layering;
        inputs.fit = self.fit;
        Ok(inputs)
    }

    pub fn compose(&self, fonts: &dyn FontProvider) -> Result<PreviewImage, ComposeError> {
        compose::compose(&self.compose_inputs()?, fonts)
    }

    pub fn compose_side(&self, side: Side, fonts: &dyn FontProvider) -> Result<PreviewImage, ComposeError> {
        compose::compose_side(&self.compose_inputs()?, side, fonts)
    }
}

/// A session shared between the host's event handlers.
#[derive(Clone)]
pub struct SharedSession(Arc<Mutex<EditingSession>>);

impl SharedSession {
    pub fn new(session: EditingSession) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub fn lock(&self) -> MutexGuard<'_, EditingSession> {
        self.0.lock()
    }

    /// Composite while holding the lock, so no edit lands half-way through.
    pub fn compose(&self, fonts: &dyn FontProvider) -> Result<PreviewImage, ComposeError> {
        self.0.lock().compose(fonts)
    }

    pub fn compose_side(&self, side: Side, fonts: &dyn FontProvider) -> Result<PreviewImage, ComposeError> {
        self.0.lock().compose_side(side, fonts)
    }
}
