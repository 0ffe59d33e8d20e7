//! Straight RGBA (`image`) <-> premultiplied RGBA (`tiny-skia`) conversion

use image::RgbaImage;
use tiny_skia::{ColorU8, IntSize, Pixmap};

use super::AssetError;

pub fn pixmap_from_rgba(image: &RgbaImage) -> Result<Pixmap, AssetError> {
    let size = IntSize::from_wh(image.width(), image.height()).ok_or(AssetError::EmptyImage)?;
    let mut data = Vec::with_capacity(image.as_raw().len());
    for px in image.pixels() {
        let [r, g, b, a] = px.0;
        let p = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[p.red(), p.green(), p.blue(), p.alpha()]);
    }
    Pixmap::from_vec(data, size).ok_or(AssetError::EmptyImage)
}

pub fn rgba_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .unwrap_or_else(|| RgbaImage::new(pixmap.width(), pixmap.height()))
}
