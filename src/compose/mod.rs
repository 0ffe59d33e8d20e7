//! Compositor - flattens every layer into one output image
//!
//! Assets are resolved up front so a broken photo or backdrop fails the
//! whole operation before anything is drawn. Each card is then rendered to
//! its own bitmap and placed on the output canvas with its layout transform
//! (translate to centre, rotate, scale), above a blurred drop shadow.

mod card;
mod fit;
mod guides;
mod layout;
mod shadow;

#[cfg(test)]
mod tests;

pub use fit::{fit_transform, ImageFit};
pub use guides::draw_guides;
pub use layout::{CardPlacement, Layering, LayoutMode, LayoutPreset, ShadowStyle, TitleSpec};
pub use shadow::box_blur;

use std::sync::Arc;

use image::RgbaImage;
use thiserror::Error;
use tiny_skia::{Color, FilterQuality, Paint, Pattern, Pixmap, Rect, SpreadMode, Transform};

use crate::asset::{decode_image, decode_image_data_url, pixmap_from_rgba, AssetError};
use crate::config::StudioConfig;
use crate::export::{ExportError, ExportFormat, PreviewImage};
use crate::geometry::{CardGeometry, Side};
use crate::sticker::Sticker;
use crate::text::{FontError, FontProvider, TextStyle};
use card::{solid, CardRenderer};

#[derive(Debug, Error)]
pub enum ComposeError {
    /// An input image could not be decoded or was already released
    #[error("Failed to load {asset} image: {source}")]
    AssetLoad {
        asset: &'static str,
        #[source]
        source: AssetError,
    },

    #[error("Font error: {0}")]
    Font(#[from] FontError),

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Encode error: {0}")]
    Encode(#[from] ExportError),
}

impl From<ComposeError> for String {
    fn from(e: ComposeError) -> Self {
        e.to_string()
    }
}

/// Where an input image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Decoded(Arc<RgbaImage>),
    /// Encoded bytes in any supported format
    Encoded(Vec<u8>),
    DataUrl(String),
}

impl ImageSource {
    fn resolve(&self, asset: &'static str) -> Result<Pixmap, ComposeError> {
        let load = |source| ComposeError::AssetLoad { asset, source };
        let pixmap = match self {
            ImageSource::Decoded(image) => pixmap_from_rgba(image),
            ImageSource::Encoded(bytes) => decode_image(bytes).and_then(|i| pixmap_from_rgba(&i)),
            ImageSource::DataUrl(url) => {
                decode_image_data_url(url).and_then(|i| pixmap_from_rgba(&i))
            }
        };
        pixmap.map_err(load)
    }
}

/// Everything one composite needs, passed explicitly.
#[derive(Debug, Clone)]
pub struct ComposeInputs {
    pub geometry: CardGeometry,
    /// Front photo; `None` leaves the front white
    pub background: Option<ImageSource>,
    /// Front ink surface, any resolution with the card aspect ratio
    pub ink: Option<Pixmap>,
    /// Front stickers in draw order (selected last)
    pub front_stickers: Vec<Sticker>,
    pub back_stickers: Vec<Sticker>,
    pub message: String,
    pub style: TextStyle,
    pub line_height_ratio: f32,
    pub sticker_font: String,
    /// Family for layout titles
    pub title_font: String,
    pub backdrop: Option<ImageSource>,
    pub layout: LayoutMode,
    pub layering: Layering,
    pub fit: ImageFit,
    pub format: ExportFormat,
    pub jpeg_quality: u8,
}

impl ComposeInputs {
    pub fn new(config: &StudioConfig) -> Self {
        Self {
            geometry: CardGeometry::POSTCARD,
            background: None,
            ink: None,
            front_stickers: Vec::new(),
            back_stickers: Vec::new(),
            message: String::new(),
            style: TextStyle {
                font: config.text.default_font.clone(),
                ..TextStyle::default()
            },
            line_height_ratio: config.text.line_height_ratio,
            sticker_font: config.text.sticker_font.clone(),
            title_font: config.text.default_font.clone(),
            backdrop: None,
            layout: config.layout.mode,
            layering: config.layout.layering,
            fit: ImageFit::default(),
            format: config.export.format,
            jpeg_quality: config.export.jpeg_quality,
        }
    }
}

impl Default for ComposeInputs {
    fn default() -> Self {
        Self::new(&StudioConfig::default())
    }
}

pub(crate) struct ResolvedAssets {
    pub background: Option<Pixmap>,
    pub backdrop: Option<Pixmap>,
}

impl ResolvedAssets {
    fn resolve(inputs: &ComposeInputs) -> Result<Self, ComposeError> {
        Ok(Self {
            background: inputs
                .background
                .as_ref()
                .map(|s| s.resolve("background"))
                .transpose()?,
            backdrop: inputs
                .backdrop
                .as_ref()
                .map(|s| s.resolve("backdrop"))
                .transpose()?,
        })
    }
}

/// Render the full layout to a pixmap.
pub fn render_composite(
    inputs: &ComposeInputs,
    fonts: &dyn FontProvider,
) -> Result<Pixmap, ComposeError> {
    let assets = ResolvedAssets::resolve(inputs)?;
    let preset = inputs.layout.preset(&inputs.geometry);
    let mut canvas = Pixmap::new(preset.width, preset.height).ok_or_else(|| {
        ComposeError::Surface(format!(
            "cannot allocate {}x{} canvas",
            preset.width, preset.height
        ))
    })?;
    canvas.fill(Color::WHITE);

    if let Some(backdrop) = &assets.backdrop {
        draw_backdrop(&mut canvas, backdrop);
    }

    if let Some(title) = &preset.title {
        let painter = fonts.painter(&inputs.title_font)?;
        painter.paint(
            &mut canvas,
            title.text,
            title.size_px,
            title.origin,
            &solid(title.color, 1.0),
            Transform::identity(),
        );
    }

    let renderer = CardRenderer {
        inputs,
        assets: &assets,
        fonts,
    };
    for side in inputs.layering.draw_order() {
        let placement = preset.placement(side);
        // Render at placed size so the card is not resampled twice
        let render_scale = placement.scale.max(0.01);
        let card = renderer.render(side, render_scale)?;
        let (cw, ch) = (card.width() as f32, card.height() as f32);
        let ts = placement.transform(cw, ch, render_scale);

        tracing::debug!(
            "[Compose] {} card at ({:.0}, {:.0}) rot {:.1} scale {:.2}",
            side.slug(),
            placement.center.x,
            placement.center.y,
            placement.rotation_deg,
            placement.scale
        );

        let blur_in_card_px = preset.shadow.blur * render_scale / placement.scale.max(0.01);
        shadow::draw_shadow(
            &mut canvas,
            card.width(),
            card.height(),
            ts,
            &preset.shadow,
            blur_in_card_px,
        );
        draw_card(&mut canvas, &card, ts);
    }

    Ok(canvas)
}

/// Render one side at logical size, for the two-file export.
pub fn render_side(
    inputs: &ComposeInputs,
    side: Side,
    fonts: &dyn FontProvider,
) -> Result<Pixmap, ComposeError> {
    let assets = ResolvedAssets::resolve(inputs)?;
    CardRenderer {
        inputs,
        assets: &assets,
        fonts,
    }
    .render(side, 1.0)
}

/// Full composite, encoded as `postcard-<layout>`.
pub fn compose(inputs: &ComposeInputs, fonts: &dyn FontProvider) -> Result<PreviewImage, ComposeError> {
    let canvas = render_composite(inputs, fonts)?;
    let name = format!("postcard-{}", inputs.layout.slug());
    let image = PreviewImage::encode(&canvas, inputs.format, inputs.jpeg_quality, name)?;
    tracing::info!(
        "[Compose] produced {} ({}x{})",
        image.file_name(),
        image.width,
        image.height
    );
    Ok(image)
}

/// A single side, encoded as `postcard-front` / `postcard-back`.
pub fn compose_side(
    inputs: &ComposeInputs,
    side: Side,
    fonts: &dyn FontProvider,
) -> Result<PreviewImage, ComposeError> {
    let card = render_side(inputs, side, fonts)?;
    let name = format!("postcard-{}", side.slug());
    Ok(PreviewImage::encode(&card, inputs.format, inputs.jpeg_quality, name)?)
}

fn draw_backdrop(canvas: &mut Pixmap, backdrop: &Pixmap) {
    let bounds = crate::geometry::RectF::new(
        0.0,
        0.0,
        canvas.width() as f32,
        canvas.height() as f32,
    );
    fit::draw_fitted(canvas, backdrop, bounds, ImageFit::Cover, Transform::identity());
}

/// Draw a card bitmap with anti-aliased edges under its placement transform.
fn draw_card(canvas: &mut Pixmap, card: &Pixmap, ts: Transform) {
    let Some(rect) = Rect::from_xywh(0.0, 0.0, card.width() as f32, card.height() as f32) else {
        return;
    };
    let paint = Paint {
        shader: Pattern::new(
            card.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            1.0,
            Transform::identity(),
        ),
        anti_alias: true,
        ..Default::default()
    };
    canvas.fill_rect(rect, &paint, ts, None);
}
