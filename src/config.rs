//! Studio configuration, loaded from JSON with defaults for every field

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compose::{Layering, LayoutMode};
use crate::export::ExportFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ConfigError> for String {
    fn from(e: ConfigError) -> Self {
        e.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
    pub upload: UploadConfig,
    pub export: ExportConfig,
    pub text: TextConfig,
    pub layout: LayoutConfig,
    /// Email relay; absent means sending is disabled
    pub relay: Option<RelayConfig>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            log_filter: "postcards=debug".to_string(),
            upload: UploadConfig::default(),
            export: ExportConfig::default(),
            text: TextConfig::default(),
            layout: LayoutConfig::default(),
            relay: None,
        }
    }
}

/// Downscale and recompress settings for uploaded photos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub enabled: bool,
    pub downscale_factor: f32,
    pub jpeg_quality: u8,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            downscale_factor: 0.5,
            jpeg_quality: 70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            jpeg_quality: 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub line_height_ratio: f32,
    pub message_char_limit: usize,
    pub default_font: String,
    /// Family used to draw sticker glyphs
    pub sticker_font: String,
    /// Extra directories scanned for fonts on top of the system ones
    pub font_dirs: Vec<PathBuf>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            line_height_ratio: 1.5,
            message_char_limit: 500,
            default_font: "Inter".to_string(),
            sticker_font: "Noto Emoji".to_string(),
            font_dirs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub mode: LayoutMode,
    pub layering: Layering,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    #[serde(default = "default_relay_timeout")]
    pub timeout_secs: u64,
}

fn default_relay_timeout() -> u64 {
    15
}

impl StudioConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Read the per-user config file, falling back to defaults.
    pub fn load_or_default() -> Self {
        let path = default_config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }
}

/// `<config dir>/postcards/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("postcards")
        .join("config.json")
}
