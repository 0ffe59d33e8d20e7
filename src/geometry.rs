//! Card geometry - the single source of truth for postcard dimensions
//!
//! Every layer (ink surface, guides, stickers, message column, compositor)
//! derives its coordinates from [`CardGeometry`]. Nothing else hardcodes
//! the stamp box or divider position.

use serde::{Deserialize, Serialize};

/// A point in some 2D pixel space (client, logical card or buffer space).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle in logical card pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn to_skia(self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(self.x, self.y, self.width, self.height)
    }
}

/// Bounding rectangle of a drawing surface as laid out on screen (CSS pixels).
///
/// Hosts pass a fresh value with every event; layout can change between events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Which face of the postcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub fn flipped(self) -> Self {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }
}

/// Fixed logical dimensions of a postcard and its static furniture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardGeometry {
    /// Card width in logical pixels
    pub width: f32,
    /// Card height in logical pixels
    pub height: f32,
    /// Inset of the front photo from the card edge
    pub image_inset: f32,
    /// Inset of the back "playground" (message column, sticker area)
    pub content_inset: f32,
    pub stamp_width: f32,
    pub stamp_height: f32,
    /// Margin between the stamp box and the top/right card edges
    pub stamp_margin: f32,
    /// Gap kept free at both ends of the divider line
    pub divider_margin: f32,
    /// Gap between the message column and the divider
    pub message_gutter: f32,
    /// Edge length of a placed sticker's box
    pub sticker_size: f32,
    /// Guide stroke colour (stamp box, divider)
    pub guide_color: [u8; 3],
    pub guide_line_width: f32,
}

impl CardGeometry {
    pub const POSTCARD: CardGeometry = CardGeometry {
        width: 879.0,
        height: 591.0,
        image_inset: 16.0,
        content_inset: 36.0,
        stamp_width: 120.0,
        stamp_height: 160.0,
        stamp_margin: 16.0,
        divider_margin: 16.0,
        message_gutter: 16.0,
        sticker_size: 56.0,
        guide_color: [0xcc, 0xcc, 0xcc],
        guide_line_width: 1.0,
    };

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }

    /// Height that keeps the card aspect ratio for a given width.
    pub fn height_for_width(&self, width: f32) -> f32 {
        width / self.aspect_ratio()
    }

    pub fn bounds(&self) -> RectF {
        RectF::new(0.0, 0.0, self.width, self.height)
    }

    /// Area of the front card covered by the photo and the ink layer.
    pub fn image_rect(&self) -> RectF {
        RectF::new(
            self.image_inset,
            self.image_inset,
            self.width - self.image_inset * 2.0,
            self.height - self.image_inset * 2.0,
        )
    }

    /// Stamp box, anchored top-right.
    pub fn stamp_rect(&self) -> RectF {
        RectF::new(
            self.width - self.stamp_width - self.stamp_margin,
            self.stamp_margin,
            self.stamp_width,
            self.stamp_height,
        )
    }

    pub fn divider_x(&self) -> f32 {
        self.width / 2.0
    }

    /// Divider endpoints (top, bottom).
    pub fn divider_line(&self) -> (Point, Point) {
        let x = self.divider_x();
        (
            Point::new(x, self.divider_margin),
            Point::new(x, self.height - self.divider_margin),
        )
    }

    /// Column on the left half of the back that holds the message.
    pub fn message_rect(&self) -> RectF {
        let left = self.content_inset;
        let right = self.divider_x() - self.message_gutter;
        RectF::new(
            left,
            self.content_inset,
            (right - left).max(0.0),
            (self.height - self.content_inset * 2.0).max(0.0),
        )
    }

    /// Linear factor applied to stroke widths for a surface of `surface_width` pixels.
    pub fn stroke_scale(&self, surface_width: f32) -> f32 {
        surface_width / self.width
    }
}

impl Default for CardGeometry {
    fn default() -> Self {
        Self::POSTCARD
    }
}
