//! Output layouts: canvas size and where each card lands

use serde::{Deserialize, Serialize};
use tiny_skia::Transform;

use crate::color::HexColor;
use crate::geometry::{CardGeometry, Point, Side};

/// Arrangement of the two cards on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutMode {
    /// Both sides at actual size, one above the other, under a title
    Stacked,
    /// Square flat-lay: scaled cards, slight opposite tilts, soft shadows
    #[default]
    SquareSocial,
    /// A4 page at 300 dpi, cards stacked and centred
    A4Print,
}

impl LayoutMode {
    pub fn slug(self) -> &'static str {
        match self {
            LayoutMode::Stacked => "stacked",
            LayoutMode::SquareSocial => "square-social",
            LayoutMode::A4Print => "a4-print",
        }
    }

    pub fn preset(self, geometry: &CardGeometry) -> LayoutPreset {
        let (w, h) = (geometry.width, geometry.height);
        match self {
            LayoutMode::Stacked => LayoutPreset {
                width: (w + 32.0).round() as u32,
                height: (56.0 + h + 40.0 + h + 56.0).round() as u32,
                front: CardPlacement::at_top_left(Point::new(16.0, 56.0), geometry),
                back: CardPlacement::at_top_left(Point::new(16.0, 56.0 + h + 40.0), geometry),
                shadow: ShadowStyle::new(0.1, 10.0, 0.0, 2.0),
                title: Some(TitleSpec {
                    text: "Hey, you got mail!",
                    size_px: 24.0,
                    origin: Point::new(16.0, 40.0),
                    color: HexColor::BLACK,
                }),
            },
            LayoutMode::SquareSocial => LayoutPreset {
                width: 1500,
                height: 1500,
                front: CardPlacement::new(Point::new(700.0, 520.0), -4.0, 0.8),
                back: CardPlacement::new(Point::new(800.0, 980.0), 3.0, 0.8),
                shadow: ShadowStyle::new(0.25, 24.0, 0.0, 10.0),
                title: None,
            },
            LayoutMode::A4Print => {
                let (page_w, page_h, margin, gap) = (2480.0, 3508.0, 200.0, 200.0);
                let scale = (page_w - margin * 2.0) / w;
                let card_h = h * scale;
                let top = (page_h - (card_h * 2.0 + gap)) / 2.0;
                LayoutPreset {
                    width: page_w as u32,
                    height: page_h as u32,
                    front: CardPlacement::new(Point::new(page_w / 2.0, top + card_h / 2.0), 0.0, scale),
                    back: CardPlacement::new(
                        Point::new(page_w / 2.0, top + card_h * 1.5 + gap),
                        0.0,
                        scale,
                    ),
                    shadow: ShadowStyle::new(0.12, 12.0, 0.0, 4.0),
                    title: None,
                }
            }
        }
    }
}

/// Which card is drawn on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Layering {
    #[default]
    FrontOverBack,
    BackOverFront,
}

impl Layering {
    /// Sides in draw order, bottom first.
    pub fn draw_order(self) -> [Side; 2] {
        match self {
            Layering::FrontOverBack => [Side::Back, Side::Front],
            Layering::BackOverFront => [Side::Front, Side::Back],
        }
    }
}

/// Centre, tilt and scale of a card on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPlacement {
    pub center: Point,
    pub rotation_deg: f32,
    pub scale: f32,
}

impl CardPlacement {
    pub fn new(center: Point, rotation_deg: f32, scale: f32) -> Self {
        Self {
            center,
            rotation_deg,
            scale,
        }
    }

    fn at_top_left(top_left: Point, geometry: &CardGeometry) -> Self {
        Self::new(
            top_left.offset(geometry.width / 2.0, geometry.height / 2.0),
            0.0,
            1.0,
        )
    }

    /// Map a card bitmap of `width`x`height` pixels, rendered at
    /// `render_scale`, onto the canvas.
    pub fn transform(&self, width: f32, height: f32, render_scale: f32) -> Transform {
        let s = self.scale / render_scale;
        Transform::from_translate(self.center.x, self.center.y)
            .pre_concat(Transform::from_rotate(self.rotation_deg))
            .pre_concat(Transform::from_scale(s, s))
            .pre_concat(Transform::from_translate(-width / 2.0, -height / 2.0))
    }
}

/// Drop shadow beneath each card, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowStyle {
    pub alpha: f32,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ShadowStyle {
    pub const fn new(alpha: f32, blur: f32, offset_x: f32, offset_y: f32) -> Self {
        Self {
            alpha,
            blur,
            offset_x,
            offset_y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitleSpec {
    pub text: &'static str,
    pub size_px: f32,
    /// Left end of the baseline
    pub origin: Point,
    pub color: HexColor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPreset {
    pub width: u32,
    pub height: u32,
    pub front: CardPlacement,
    pub back: CardPlacement,
    pub shadow: ShadowStyle,
    pub title: Option<TitleSpec>,
}

impl LayoutPreset {
    pub fn placement(&self, side: Side) -> CardPlacement {
        match side {
            Side::Front => self.front,
            Side::Back => self.back,
        }
    }
}
