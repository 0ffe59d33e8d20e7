//! Export - encoding composites and handing them to the user

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tiny_skia::Pixmap;

use crate::asset::rgba_from_pixmap;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Image encode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Nothing to export: empty pixmap")]
    EmptyPixmap,
}

impl From<ExportError> for String {
    fn from(e: ExportError) -> Self {
        e.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

/// An encoded composite. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    /// File stem, e.g. `postcard-front`
    pub name: String,
}

impl PreviewImage {
    /// Encode a finished pixmap. `jpeg_quality` is ignored for PNG.
    pub fn encode(
        pixmap: &Pixmap,
        format: ExportFormat,
        jpeg_quality: u8,
        name: impl Into<String>,
    ) -> Result<Self, ExportError> {
        if pixmap.width() == 0 || pixmap.height() == 0 {
            return Err(ExportError::EmptyPixmap);
        }
        let rgba = rgba_from_pixmap(pixmap);
        let mut bytes = Vec::new();
        match format {
            ExportFormat::Png => {
                rgba.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
            }
            ExportFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
                JpegEncoder::new_with_quality(&mut bytes, jpeg_quality.clamp(1, 100))
                    .encode_image(&rgb)?;
            }
        }

        let image = Self {
            width: pixmap.width(),
            height: pixmap.height(),
            format,
            bytes,
            name: name.into(),
        };
        tracing::debug!(
            "[Export] {} {}x{} ({} bytes)",
            image.file_name(),
            image.width,
            image.height,
            image.bytes.len()
        );
        Ok(image)
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.format.extension())
    }

    pub fn base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.base64())
    }

    /// Write under the conventional file name inside `dir` (download analog).
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, &self.bytes)?;
        tracing::info!("[Export] saved {}", path.display());
        Ok(path)
    }
}
