use glam::Vec2;

/// Pixel-space crop region of a source texture, min inclusive, max exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    #[inline]
    pub fn from_corners(p0: Vec2, p1: Vec2) -> Self {
        Self {
            min: p0.min(p1),
            max: p0.max(p1),
        }
    }
    #[inline]
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::from_corners(Vec2::new(x0, y0), Vec2::new(x1, y1))
    }

    #[inline]
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Translates by `offset`, then clamps so the rect stays inside
    /// `[0, bounds]` without changing its size.
    #[inline]
    pub fn translate_within(&self, offset: Vec2, bounds: Vec2) -> Self {
        let size = self.size();
        let min = (self.min + offset).clamp(Vec2::ZERO, bounds - size);
        Self {
            min,
            max: min + size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_orders_min_max() {
        let rect = Rect::from_corners(Vec2::new(10.0, 2.0), Vec2::new(4.0, 8.0));
        assert_eq!(rect.min, Vec2::new(4.0, 2.0));
        assert_eq!(rect.max, Vec2::new(10.0, 8.0));
    }

    #[test]
    fn translate_within_clamps_to_bounds() {
        let bounds = Vec2::new(256.0, 256.0);
        let rect = Rect::from_origin_size(Vec2::new(200.0, 0.0), Vec2::new(64.0, 64.0));
        let moved = rect.translate_within(Vec2::new(100.0, -50.0), bounds);
        assert_eq!(moved.min, Vec2::new(192.0, 0.0));
        assert_eq!(moved.size(), rect.size());
    }
}
