//! Postcards - digital postcard compositor
//!
//! Hosts feed pointer events, uploads and message text into an editing
//! session; the compositor flattens photo, ink, stickers, guides and the
//! wrapped message into a single PNG or JPEG.

pub mod asset;
pub mod color;
pub mod commands;
pub mod compose;
pub mod config;
pub mod export;
pub mod geometry;
pub mod ink;
pub mod input;
pub mod relay;
pub mod session;
pub mod sticker;
pub mod text;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::StudioConfig;

/// Initialize logging with the default filter
pub fn init() {
    init_with(&StudioConfig::default());
}

/// Initialize logging; `RUST_LOG` wins over the configured filter.
/// Calling it again is harmless.
pub fn init_with(config: &StudioConfig) {
    let filter = config.log_filter.clone();
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Postcards initializing...");
    }
}
