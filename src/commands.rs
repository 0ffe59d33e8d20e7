//! Host commands - serializable interface between the UI shell and the core
//!
//! Every command returns `Result<T, String>` so any IPC bridge can forward
//! it unchanged.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::asset::AssetRegistry;
use crate::config::StudioConfig;
use crate::export::PreviewImage;
use crate::geometry::{DisplayRect, Side};
use crate::ink::InkTool;
use crate::input::PointerInput;
use crate::relay::{EmailRequest, Notification, RelayClient};
use crate::session::{EditingSession, Key, PointerResponse, SharedSession};
use crate::sticker::FormFactor;
use crate::text::{FontBook, FontProvider, MessageCheck, TextStyle};

/// Process-wide state the commands run against.
pub struct Studio {
    config: StudioConfig,
    registry: Arc<AssetRegistry>,
    fonts: Arc<dyn FontProvider>,
    sessions: RwLock<HashMap<String, SharedSession>>,
    next_session: AtomicU64,
}

impl Studio {
    /// Studio with system fonts plus the configured font directories.
    pub fn new(config: StudioConfig) -> Self {
        let fonts = Arc::new(FontBook::new(&config.text.font_dirs));
        Self::with_fonts(config, fonts)
    }

    pub fn with_fonts(config: StudioConfig, fonts: Arc<dyn FontProvider>) -> Self {
        Self {
            config,
            registry: AssetRegistry::new(),
            fonts,
            sessions: RwLock::new(HashMap::new()),
            next_session: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn session(&self, id: &str) -> Result<SharedSession, String> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| format!("Unknown session: {id}"))
    }

    /// Drop a session, releasing its uploads.
    pub fn close_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().remove(id).is_some();
        if removed {
            tracing::info!("Closed session {}", id);
        }
        removed
    }
}

/// Returned after session creation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub card_width: f32,
    pub card_height: f32,
    pub sticker_size: f32,
    pub form_factor: FormFactor,
}

/// An encoded preview ready for display or download
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewDto {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub data_url: String,
}

impl From<&PreviewImage> for PreviewDto {
    fn from(image: &PreviewImage) -> Self {
        Self {
            file_name: image.file_name(),
            width: image.width,
            height: image.height,
            data_url: image.data_url(),
        }
    }
}

/// Create a new editing session
pub fn create_session(studio: &Studio, form_factor: FormFactor) -> Result<SessionInfo, String> {
    let session = EditingSession::new(studio.config.clone(), studio.registry.clone(), form_factor)?;
    let id = format!(
        "session_{}",
        studio.next_session.fetch_add(1, Ordering::Relaxed)
    );
    let geometry = crate::geometry::CardGeometry::POSTCARD;
    studio
        .sessions
        .write()
        .insert(id.clone(), SharedSession::new(session));
    tracing::info!("Created session {} ({:?})", id, form_factor);

    Ok(SessionInfo {
        id,
        card_width: geometry.width,
        card_height: geometry.height,
        sticker_size: geometry.sticker_size,
        form_factor,
    })
}

/// Upload the front photo as a data URL; returns the asset handle
pub fn upload_background(studio: &Studio, session_id: &str, data_url: &str) -> Result<String, String> {
    let handle = studio.session(session_id)?.lock().upload_background(data_url)?;
    Ok(handle.to_string())
}

/// Select a drawing tool, or `None` to leave drawing mode
pub fn select_tool(studio: &Studio, session_id: &str, tool: Option<InkTool>) -> Result<(), String> {
    studio.session(session_id)?.lock().select_tool(tool);
    Ok(())
}

pub fn set_drawing_color(studio: &Studio, session_id: &str, color: &str) -> Result<(), String> {
    studio.session(session_id)?.lock().set_drawing_color(color);
    Ok(())
}

pub fn clear_ink(studio: &Studio, session_id: &str) -> Result<(), String> {
    studio.session(session_id)?.lock().clear_ink();
    Ok(())
}

pub fn set_side(studio: &Studio, session_id: &str, side: Side) -> Result<(), String> {
    studio.session(session_id)?.lock().set_side(side);
    Ok(())
}

/// Feed one pointer event with the surface's current on-screen rect
pub fn pointer_event(
    studio: &Studio,
    session_id: &str,
    input: PointerInput,
    rect: DisplayRect,
) -> Result<PointerResponse, String> {
    Ok(studio.session(session_id)?.lock().handle_pointer(&input, &rect))
}

pub fn key_event(studio: &Studio, session_id: &str, key: Key) -> Result<bool, String> {
    Ok(studio.session(session_id)?.lock().key_event(key))
}

/// Arm paste mode; on mobile the sticker is placed at once and its id returned
pub fn enter_paste_mode(studio: &Studio, session_id: &str, glyph: &str) -> Result<Option<u32>, String> {
    if glyph.is_empty() {
        return Err("Sticker glyph must not be empty".into());
    }
    Ok(studio.session(session_id)?.lock().enter_paste_mode(glyph))
}

pub fn delete_sticker(studio: &Studio, session_id: &str, id: u32) -> Result<bool, String> {
    Ok(studio.session(session_id)?.lock().delete_sticker(id))
}

pub fn set_message(
    studio: &Studio,
    session_id: &str,
    message: String,
    style: Option<TextStyle>,
) -> Result<MessageCheck, String> {
    let shared = studio.session(session_id)?;
    let mut session = shared.lock();
    session.set_message(message);
    if let Some(style) = style {
        session.set_style(style);
    }
    Ok(session.check_message())
}

pub fn check_message(studio: &Studio, session_id: &str) -> Result<MessageCheck, String> {
    Ok(studio.session(session_id)?.lock().check_message())
}

/// Full layout composite
pub fn compose_preview(studio: &Studio, session_id: &str) -> Result<PreviewDto, String> {
    let image = studio.session(session_id)?.compose(studio.fonts.as_ref())?;
    Ok(PreviewDto::from(&image))
}

/// One side on its own (two-file download)
pub fn compose_side(studio: &Studio, session_id: &str, side: Side) -> Result<PreviewDto, String> {
    let image = studio
        .session(session_id)?
        .compose_side(side, studio.fonts.as_ref())?;
    Ok(PreviewDto::from(&image))
}

/// Composite and email the postcard. Relay failures come back as an error
/// notification, not as `Err`; the session is untouched either way.
pub async fn send_postcard(
    studio: &Studio,
    session_id: &str,
    request: EmailRequest,
) -> Result<Notification, String> {
    let image = studio.session(session_id)?.compose(studio.fonts.as_ref())?;

    let client = match RelayClient::from_config(studio.config.relay.as_ref()) {
        Ok(client) => client,
        Err(e) => return Ok(Notification::from_error(&e)),
    };
    match client.send(&request, &image).await {
        Ok(()) => Ok(Notification::sent(&request.to_email)),
        Err(e) => {
            tracing::warn!("Postcard not sent: {}", e);
            Ok(Notification::from_error(&e))
        }
    }
}
