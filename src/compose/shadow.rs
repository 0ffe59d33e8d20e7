//! Soft drop shadows: a card-shaped mask, box blurred three times

use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};

use super::layout::ShadowStyle;

/// Shadow bitmap for a `width`x`height` card, with `pad` pixels of room on
/// each side for the blur to spread into. `blur` is in bitmap pixels.
pub fn card_shadow(width: u32, height: u32, alpha: f32, blur: f32) -> Option<(Pixmap, u32)> {
    let pad = (blur * 2.0).ceil().max(0.0) as u32;
    let mut mask = Pixmap::new(width + pad * 2, height + pad * 2)?;
    let rect = Rect::from_xywh(pad as f32, pad as f32, width as f32, height as f32)?;
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba(0.0, 0.0, 0.0, alpha.clamp(0.0, 1.0))?);
    mask.fill_rect(rect, &paint, Transform::identity(), None);

    // Three box passes approximate a gaussian with sigma ~ blur / 2
    let radius = (blur / 2.0).round() as usize;
    box_blur(&mut mask, radius, 3);
    Some((mask, pad))
}

/// Draw `card`'s shadow onto `canvas` under `card_transform`, shifted by the
/// style's (unrotated) canvas offset.
pub fn draw_shadow(
    canvas: &mut Pixmap,
    card_width: u32,
    card_height: u32,
    card_transform: Transform,
    style: &ShadowStyle,
    blur_in_card_px: f32,
) {
    if style.alpha <= 0.0 {
        return;
    }
    let Some((mask, pad)) = card_shadow(card_width, card_height, style.alpha, blur_in_card_px) else {
        return;
    };
    let ts = Transform::from_translate(style.offset_x, style.offset_y)
        .pre_concat(card_transform)
        .pre_concat(Transform::from_translate(-(pad as f32), -(pad as f32)));
    canvas.draw_pixmap(0, 0, mask.as_ref(), &tiny_skia::PixmapPaint::default(), ts, None);
}

/// In-place separable box blur of premultiplied RGBA; pixels beyond the edge
/// count as transparent.
pub fn box_blur(pixmap: &mut Pixmap, radius: usize, passes: usize) {
    if radius == 0 {
        return;
    }
    let (w, h) = (pixmap.width() as usize, pixmap.height() as usize);
    let data = pixmap.data_mut();
    for _ in 0..passes {
        blur_lines(data, w, h, radius, true);
        blur_lines(data, w, h, radius, false);
    }
}

fn blur_lines(data: &mut [u8], w: usize, h: usize, radius: usize, horizontal: bool) {
    let (lines, len) = if horizontal { (h, w) } else { (w, h) };
    let index = |line: usize, i: usize| {
        if horizontal {
            (line * w + i) * 4
        } else {
            (i * w + line) * 4
        }
    };
    let window = (radius * 2 + 1) as u32;
    let mut prefix = vec![[0u32; 4]; len + 1];
    let mut out = vec![[0u8; 4]; len];

    for line in 0..lines {
        for i in 0..len {
            let at = index(line, i);
            for c in 0..4 {
                prefix[i + 1][c] = prefix[i][c] + data[at + c] as u32;
            }
        }
        for (i, px) in out.iter_mut().enumerate() {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius + 1).min(len);
            for c in 0..4 {
                px[c] = ((prefix[hi][c] - prefix[lo][c] + window / 2) / window) as u8;
            }
        }
        for (i, px) in out.iter().enumerate() {
            let at = index(line, i);
            data[at..at + 4].copy_from_slice(px);
        }
    }
}
