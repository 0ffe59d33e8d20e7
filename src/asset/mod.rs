//! Asset module - uploaded images and their lifetimes
//!
//! Uploads arrive as data URLs or raw bytes, get decoded (and optionally
//! downscaled and recompressed) once, and live in an [`AssetRegistry`] under
//! an [`AssetHandle`] until revoked.

mod decode;
mod raster;
mod registry;

pub use decode::{decode_data_url, decode_image, decode_image_data_url, prepare_upload, PreparedUpload};
pub use raster::{pixmap_from_rgba, rgba_from_pixmap};
pub use registry::{AssetRegistry, UploadSlot};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque reference to a registered image (object-URL analog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHandle(pub u64);

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset:{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMime(String),

    #[error("Image has no pixels")]
    EmptyImage,

    #[error("Asset {0} was revoked")]
    Revoked(AssetHandle),
}

impl From<AssetError> for String {
    fn from(e: AssetError) -> Self {
        e.to_string()
    }
}
