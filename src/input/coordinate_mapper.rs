use crate::geometry::{CardGeometry, DisplayRect, Point};

/// Maps client (CSS pixel) coordinates into the backing buffer of a surface.
///
/// The display rectangle is passed per call and never cached; it changes
/// under window resize and layout shifts.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    buffer_width: f32,
    buffer_height: f32,
}

impl CoordinateMapper {
    pub fn new(buffer_width: f32, buffer_height: f32) -> Self {
        Self {
            buffer_width: buffer_width.max(1.0),
            buffer_height: buffer_height.max(1.0),
        }
    }

    /// Mapper into the canonical logical card space.
    pub fn for_card(geometry: &CardGeometry) -> Self {
        Self::new(geometry.width, geometry.height)
    }

    fn axis_scale(buffer_extent: f32, display_extent: f32) -> f32 {
        if !display_extent.is_finite() || display_extent.abs() < f32::EPSILON {
            return 0.0;
        }
        buffer_extent / display_extent
    }

    /// Independent (x, y) buffer-per-display scale factors.
    pub fn scale_factors(&self, rect: &DisplayRect) -> (f32, f32) {
        (
            Self::axis_scale(self.buffer_width, rect.width),
            Self::axis_scale(self.buffer_height, rect.height),
        )
    }

    /// Convert a client point into buffer space. Out-of-bounds results are
    /// returned as-is; callers decide whether to ignore them.
    pub fn map_client(&self, client: Point, rect: &DisplayRect) -> Point {
        let (sx, sy) = self.scale_factors(rect);
        Point::new((client.x - rect.left) * sx, (client.y - rect.top) * sy)
    }

    /// Convert a client-space movement into a buffer-space movement.
    pub fn map_delta(&self, dx: f32, dy: f32, rect: &DisplayRect) -> (f32, f32) {
        let (sx, sy) = self.scale_factors(rect);
        (dx * sx, dy * sy)
    }

    /// Inclusive bounds check: `[0, width] x [0, height]`.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0.0 && p.x <= self.buffer_width && p.y >= 0.0 && p.y <= self.buffer_height
    }

    pub fn size(&self) -> (f32, f32) {
        (self.buffer_width, self.buffer_height)
    }
}
