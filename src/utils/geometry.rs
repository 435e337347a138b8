//! Geometry helpers for strip alignment
use crate::models::Point;

/// Right triangle spanned by two points.
///
/// The third vertex `c` shares `a`'s row and `b`'s column, so the "bottom"
/// side runs along the row of `a` and the "right" side along the column of `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RightTriangle {
    a: Point,
    b: Point,
    c: Point,
}

impl RightTriangle {
    /// Triangle with the right angle at (b.x, a.y)
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            a,
            b,
            c: Point::new(b.x, a.y),
        }
    }

    /// Length of the side from `a` to `b`
    pub fn hypotenuse(&self) -> f64 {
        self.a.distance(&self.b)
    }

    /// Side along `a`'s row; the full distance when `a` and `b` share a row
    pub fn bottom_side(&self) -> f64 {
        if self.a.y == self.b.y {
            return self.hypotenuse();
        }
        self.a.distance(&self.c)
    }

    /// Side along `b`'s column; the full distance when `a` and `b` share a column
    pub fn right_side(&self) -> f64 {
        if self.a.x == self.b.x {
            return self.hypotenuse();
        }
        self.b.distance(&self.c)
    }

    /// Angle at `a` between the hypotenuse and the bottom side
    pub fn bottom_left_angle(&self) -> f64 {
        Self::angle(self.bottom_side(), self.hypotenuse())
    }

    /// Angle at `b` between the hypotenuse and the right side
    pub fn top_right_angle(&self) -> f64 {
        Self::angle(self.right_side(), self.hypotenuse())
    }

    fn angle(adjacent: f64, hypotenuse: f64) -> f64 {
        if hypotenuse == 0.0 {
            return 0.0;
        }
        (adjacent / hypotenuse).clamp(-1.0, 1.0).acos()
    }
}

/// Rotate `p` about `pivot` by `radians`, clockwise on screen (y axis pointing down)
pub fn rotate_point(p: Point, pivot: Point, radians: f64) -> Point {
    let (sin, cos) = radians.sin_cos();
    let dx = p.x - pivot.x;
    let dy = p.y - pivot.y;
    Point::new(pivot.x + dx * cos - dy * sin, pivot.y + dx * sin + dy * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_triangle_sides() {
        let t = RightTriangle::new(Point::new(0.0, 10.0), Point::new(5.0, 0.0));
        assert!((t.hypotenuse() - 11.1803).abs() < 1e-4);
        assert!((t.bottom_side() - 5.0).abs() < 1e-9);
        assert!((t.right_side() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_triangle_angles() {
        let t = RightTriangle::new(Point::new(0.0, 10.0), Point::new(5.0, 0.0));
        assert!((t.bottom_left_angle() - 1.1071).abs() < 1e-4);
        assert!((t.bottom_left_angle() + t.top_right_angle() - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_flat_triangle() {
        let t = RightTriangle::new(Point::new(2.0, 3.0), Point::new(12.0, 3.0));
        assert_eq!(t.bottom_left_angle(), 0.0);
        let same = RightTriangle::new(Point::new(2.0, 3.0), Point::new(2.0, 3.0));
        assert_eq!(same.bottom_left_angle(), 0.0);
    }

    #[test]
    fn test_rotate_point_clockwise() {
        let p = rotate_point(Point::new(10.0, 0.0), Point::new(0.0, 0.0), FRAC_PI_2);
        assert!((p.x - 0.0).abs() < 1e-9);
        assert!((p.y - 10.0).abs() < 1e-9);
    }
}
