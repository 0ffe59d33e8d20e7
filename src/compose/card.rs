//! Rendering one card side into its own bitmap

use tiny_skia::{Color, Paint, Pixmap, PixmapPaint, Transform};

use super::fit::draw_fitted;
use super::guides::draw_guides;
use super::{ComposeError, ComposeInputs, ResolvedAssets};
use crate::color::HexColor;
use crate::geometry::{Point, Side};
use crate::sticker::Sticker;
use crate::text::{wrap, FontProvider, TextPainter, WrapLayout, TRUNCATION_MARK};

/// Glyph size relative to the sticker box.
const STICKER_GLYPH_RATIO: f32 = 0.75;

pub(super) struct CardRenderer<'a> {
    pub inputs: &'a ComposeInputs,
    pub assets: &'a ResolvedAssets,
    pub fonts: &'a dyn FontProvider,
}

impl CardRenderer<'_> {
    /// Render `side` at `render_scale` device pixels per logical pixel.
    pub fn render(&self, side: Side, render_scale: f32) -> Result<Pixmap, ComposeError> {
        let g = &self.inputs.geometry;
        let width = (g.width * render_scale).round().max(1.0) as u32;
        let height = (g.height * render_scale).round().max(1.0) as u32;
        let mut card = Pixmap::new(width, height).ok_or_else(|| {
            ComposeError::Surface(format!("cannot allocate {width}x{height} card"))
        })?;
        card.fill(Color::WHITE);

        let ts = Transform::from_scale(
            width as f32 / g.width,
            height as f32 / g.height,
        );
        match side {
            Side::Front => {
                self.draw_front(&mut card, ts);
                self.draw_stickers(&mut card, &self.inputs.front_stickers, ts)?;
            }
            Side::Back => {
                draw_guides(&mut card, g, ts);
                self.draw_message(&mut card, ts)?;
                self.draw_stickers(&mut card, &self.inputs.back_stickers, ts)?;
            }
        }
        Ok(card)
    }

    fn draw_front(&self, card: &mut Pixmap, ts: Transform) {
        let g = &self.inputs.geometry;
        if let Some(photo) = &self.assets.background {
            draw_fitted(card, photo, g.image_rect(), self.inputs.fit, ts);
        }
        if let Some(ink) = &self.inputs.ink {
            // Ink shares the photo's inset rect, whatever its backing resolution
            let inset = g.image_rect();
            let ink_ts = ts
                .pre_concat(Transform::from_translate(inset.x, inset.y))
                .pre_concat(Transform::from_scale(
                    inset.width / ink.width() as f32,
                    inset.height / ink.height() as f32,
                ));
            let paint = PixmapPaint {
                quality: tiny_skia::FilterQuality::Bilinear,
                ..Default::default()
            };
            card.draw_pixmap(0, 0, ink.as_ref(), &paint, ink_ts, None);
        }
    }

    fn draw_message(&self, card: &mut Pixmap, ts: Transform) -> Result<(), ComposeError> {
        let inputs = self.inputs;
        if inputs.message.is_empty() {
            return Ok(());
        }
        let painter = self.fonts.painter(&inputs.style.font)?;
        let size = inputs.style.size_px;
        let column = inputs.geometry.message_rect();
        let layout = WrapLayout::for_column(
            column.width,
            column.height,
            inputs.style.line_height(inputs.line_height_ratio),
        );
        let outcome = wrap(&inputs.message, &layout, |s| painter.measure(s, size));
        tracing::debug!(
            "[Compose] message wrapped into {}/{} lines (overflowed: {})",
            outcome.lines.len(),
            layout.max_lines,
            outcome.overflowed
        );

        let mut lines = outcome.lines;
        if outcome.overflowed {
            tracing::warn!("[Compose] message truncated at {} lines", layout.max_lines);
            if let Some(last) = lines.last_mut() {
                *last = with_truncation_mark(last, column.width, painter.as_ref(), size);
            }
        }

        let paint = solid(inputs.style.color, 1.0);
        // Centre the glyph box vertically in its line slot
        let baseline_offset = (layout.line_height - size) / 2.0 + painter.ascent(size);
        for (i, line) in lines.iter().enumerate() {
            let origin = Point::new(column.x, column.y + layout.line_top(i) + baseline_offset);
            painter.paint(card, line, size, origin, &paint, ts);
        }
        Ok(())
    }

    fn draw_stickers(
        &self,
        card: &mut Pixmap,
        stickers: &[Sticker],
        ts: Transform,
    ) -> Result<(), ComposeError> {
        if stickers.is_empty() {
            return Ok(());
        }
        let painter = self.fonts.painter(&self.inputs.sticker_font)?;
        let box_size = self.inputs.geometry.sticker_size;
        let size = box_size * STICKER_GLYPH_RATIO;
        let ascent = painter.ascent(size);

        for sticker in stickers {
            let center = sticker.center(box_size);
            let width = painter.measure(&sticker.glyph, size);
            // Glyph box centred on the sticker centre before rotation
            let origin = Point::new(-width / 2.0, ascent - size / 2.0);
            let sticker_ts = ts
                .pre_concat(Transform::from_translate(center.x, center.y))
                .pre_concat(Transform::from_rotate(sticker.rotation));

            if sticker.is_dragging {
                let lifted = sticker_ts.pre_concat(Transform::from_translate(2.0, 4.0));
                let shadow = solid(HexColor::BLACK, 0.25);
                painter.paint(card, &sticker.glyph, size, origin, &shadow, lifted);
            }
            painter.paint(card, &sticker.glyph, size, origin, &solid(HexColor::BLACK, 1.0), sticker_ts);
        }
        Ok(())
    }
}

/// Shorten `line` until it plus the truncation mark fits in `max_width`.
pub(super) fn with_truncation_mark(
    line: &str,
    max_width: f32,
    painter: &dyn TextPainter,
    size: f32,
) -> String {
    let mut kept: Vec<char> = line.trim_end().chars().collect();
    loop {
        let candidate: String = kept.iter().collect::<String>() + TRUNCATION_MARK;
        if kept.is_empty() || painter.measure(&candidate, size) <= max_width {
            return candidate;
        }
        kept.pop();
        while kept.last().is_some_and(|c| c.is_whitespace()) {
            kept.pop();
        }
    }
}

pub(super) fn solid(color: HexColor, alpha: f32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia(alpha));
    paint.anti_alias = true;
    paint
}
