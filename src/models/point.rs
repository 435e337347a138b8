use serde::{Deserialize, Serialize};

/// 2D point with floating point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Nearest pixel coordinate
    pub fn round(&self) -> PointI {
        PointI::new(self.x.round() as i64, self.y.round() as i64)
    }
}

/// Integer point for pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PointI {
    /// X coordinate
    pub x: i64,
    /// Y coordinate
    pub y: i64,
}

impl PointI {
    /// Create a new integer point
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Distance to another pixel
    pub fn distance(&self, other: &PointI) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Inclusive pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    /// Top-left corner
    pub start: PointI,
    /// Bottom-right corner (inclusive)
    pub end: PointI,
}

impl PixelRect {
    /// Rectangle holding a single pixel
    pub fn at(p: PointI) -> Self {
        Self { start: p, end: p }
    }

    /// Grow to include `p`
    pub fn include(&mut self, p: PointI) {
        self.start.x = self.start.x.min(p.x);
        self.start.y = self.start.y.min(p.y);
        self.end.x = self.end.x.max(p.x);
        self.end.y = self.end.y.max(p.y);
    }

    /// Width in pixels
    pub fn width(&self) -> i64 {
        self.end.x - self.start.x + 1
    }

    /// Height in pixels
    pub fn height(&self) -> i64 {
        self.end.y - self.start.y + 1
    }

    /// Geometric centre
    pub fn center(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) as f64 / 2.0,
            (self.start.y + self.end.y) as f64 / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_include() {
        let mut rect = PixelRect::at(PointI::new(5, 5));
        rect.include(PointI::new(2, 9));
        rect.include(PointI::new(7, 4));
        assert_eq!(rect.start, PointI::new(2, 4));
        assert_eq!(rect.end, PointI::new(7, 9));
        assert_eq!(rect.width(), 6);
        assert_eq!(rect.height(), 6);
        assert_eq!(rect.center(), Point::new(4.5, 6.5));
    }
}
