use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use super::AssetError;
use crate::config::UploadConfig;

/// Split a `data:<mime>;base64,<payload>` URL into its media type and bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), AssetError> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| AssetError::InvalidDataUrl("missing data: scheme".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AssetError::InvalidDataUrl("missing payload separator".into()))?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().to_ascii_lowercase();
    if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(AssetError::InvalidDataUrl("payload is not base64".into()));
    }

    let bytes = BASE64.decode(payload.trim())?;
    Ok((mime, bytes))
}

/// Decode encoded image bytes (any format the `image` crate recognizes).
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, AssetError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(AssetError::EmptyImage);
    }
    Ok(image)
}

/// Decode an `image/*` data URL.
pub fn decode_image_data_url(url: &str) -> Result<RgbaImage, AssetError> {
    let (mime, bytes) = decode_data_url(url)?;
    if !mime.starts_with("image/") {
        return Err(AssetError::UnsupportedMime(mime));
    }
    decode_image(&bytes)
}

/// An upload after optional downscale and recompression.
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub image: RgbaImage,
    /// Re-encoded JPEG, or `None` when recompression is disabled
    pub jpeg: Option<Vec<u8>>,
}

/// Downscale by `downscale_factor` and recompress as JPEG to bound memory
/// and output size. With recompression disabled the image is only decoded.
pub fn prepare_upload(bytes: &[u8], config: &UploadConfig) -> Result<PreparedUpload, AssetError> {
    let decoded = decode_image(bytes)?;
    if !config.enabled {
        return Ok(PreparedUpload {
            image: decoded,
            jpeg: None,
        });
    }

    let factor = config.downscale_factor.clamp(0.01, 1.0);
    let width = ((decoded.width() as f32 * factor).round() as u32).max(1);
    let height = ((decoded.height() as f32 * factor).round() as u32).max(1);
    let scaled = if (width, height) == decoded.dimensions() {
        decoded
    } else {
        image::imageops::resize(&decoded, width, height, FilterType::Triangle)
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgba8(scaled).to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, config.jpeg_quality.clamp(1, 100))
        .encode_image(&rgb)?;

    tracing::debug!(
        "[Upload] {} bytes -> {}x{} JPEG q{} ({} bytes)",
        bytes.len(),
        width,
        height,
        config.jpeg_quality,
        jpeg.len()
    );

    let image = decode_image(&jpeg)?;
    Ok(PreparedUpload {
        image,
        jpeg: Some(jpeg),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn decodes_png_data_url() {
        let url = format!("data:image/png;base64,{}", BASE64.encode(png_bytes(4, 3)));
        let img = decode_image_data_url(&url).unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.get_pixel(0, 0), &Rgba([200, 40, 40, 255]));
    }

    #[test]
    fn rejects_non_image_and_malformed_urls() {
        let text = format!("data:text/plain;base64,{}", BASE64.encode("hi"));
        assert!(matches!(
            decode_image_data_url(&text),
            Err(AssetError::UnsupportedMime(m)) if m == "text/plain"
        ));
        assert!(matches!(
            decode_image_data_url("http://example.com/a.png"),
            Err(AssetError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            decode_image_data_url("data:image/png,rawbytes"),
            Err(AssetError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            decode_image_data_url("data:image/png;base64,@@@"),
            Err(AssetError::Base64(_))
        ));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(AssetError::Decode(_))
        ));
    }

    #[test]
    fn upload_is_halved_and_recompressed() {
        let config = UploadConfig::default();
        let prepared = prepare_upload(&png_bytes(40, 30), &config).unwrap();
        assert_eq!(prepared.image.dimensions(), (20, 15));
        let jpeg = prepared.jpeg.unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn disabled_recompression_keeps_size() {
        let config = UploadConfig {
            enabled: false,
            ..UploadConfig::default()
        };
        let prepared = prepare_upload(&png_bytes(40, 30), &config).unwrap();
        assert_eq!(prepared.image.dimensions(), (40, 30));
        assert!(prepared.jpeg.is_none());
    }
}
