use serde::Serialize;

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size::new(0.0, 0.0);

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum.
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }
}

/// Rectangle in parent coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Shrink by `padding` on both sides of each axis. Extents never go negative.
    pub fn inset(&self, padding: Padding) -> Rect {
        let padding = padding.sanitized();
        Rect::new(
            self.x + padding.horizontal,
            self.y + padding.vertical,
            clamp_extent(self.width - 2.0 * padding.horizontal),
            clamp_extent(self.height - 2.0 * padding.vertical),
        )
    }

    /// Drop `height` pixels off the top, as a title bar does.
    pub fn below_top(&self, height: f32) -> Rect {
        Rect::new(
            self.x,
            self.y + height,
            self.width,
            clamp_extent(self.height - height),
        )
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Two-axis margin applied inside a node's rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Padding {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Padding {
    pub const NONE: Padding = Padding::new(0.0, 0.0);

    pub const fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value)
    }

    /// Negative or NaN sides collapse to zero.
    pub fn sanitized(self) -> Self {
        Self::new(clamp_extent(self.horizontal), clamp_extent(self.vertical))
    }

    /// Total inset along each axis (both sides).
    pub fn total(&self) -> Size {
        let padding = self.sanitized();
        Size::new(2.0 * padding.horizontal, 2.0 * padding.vertical)
    }
}

/// Negative or NaN extents collapse to zero.
pub fn clamp_extent(value: f32) -> f32 {
    if value > 0.0 { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_shrinks_both_sides() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0).inset(Padding::new(5.0, 2.0));
        assert_eq!(rect, Rect::new(15.0, 22.0, 90.0, 46.0));
    }

    #[test]
    fn negative_padding_is_ignored() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(rect.inset(Padding::new(-10.0, -10.0)), rect);
        assert_eq!(rect.inset(Padding::new(f32::NAN, 5.0)), Rect::new(0.0, 5.0, 100.0, 90.0));
        assert_eq!(Padding::uniform(-3.0).total(), Size::ZERO);
    }

    #[test]
    fn inset_never_goes_negative() {
        let rect = Rect::new(0.0, 0.0, 4.0, 4.0).inset(Padding::uniform(5.0));
        assert_eq!(rect.width, 0.0);
        assert_eq!(rect.height, 0.0);
    }

    #[test]
    fn below_top_removes_title_band() {
        let rect = Rect::new(0.0, 0.0, 800.0, 600.0).below_top(25.0);
        assert_eq!(rect, Rect::new(0.0, 25.0, 800.0, 575.0));
    }

    #[test]
    fn clamp_extent_handles_nan() {
        assert_eq!(clamp_extent(f32::NAN), 0.0);
        assert_eq!(clamp_extent(-3.0), 0.0);
        assert_eq!(clamp_extent(3.5), 3.5);
    }
}
