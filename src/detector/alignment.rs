/// Fiducial classification and rotation angle
use log::debug;
use serde::Serialize;

use crate::error::{Result, StripError};
use crate::models::{Field, Point};
use crate::utils::geometry::RightTriangle;

/// The three control fiducials sorted into their roles
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiducialTriple<T = Point> {
    pub left: T,
    pub right: T,
    pub bottom: T,
}

impl<T: Clone> FiducialTriple<T> {
    /// Bottom is the lowest item (largest y, first on ties); the other two
    /// are ordered by x, keeping discovery order on ties.
    pub fn classify_by<F>(items: [T; 3], position: F) -> Self
    where
        F: Fn(&T) -> Point,
    {
        let positions = [
            position(&items[0]),
            position(&items[1]),
            position(&items[2]),
        ];
        let mut bottom = 0;
        for i in 1..3 {
            if positions[i].y > positions[bottom].y {
                bottom = i;
            }
        }

        let (mut left, mut right) = match bottom {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        if positions[right].x < positions[left].x {
            std::mem::swap(&mut left, &mut right);
        }

        Self {
            left: items[left].clone(),
            right: items[right].clone(),
            bottom: items[bottom].clone(),
        }
    }
}

impl<T> FiducialTriple<T> {
    /// Map every role through `f`
    pub fn map<U, F: Fn(&T) -> U>(&self, f: F) -> FiducialTriple<U> {
        FiducialTriple {
            left: f(&self.left),
            right: f(&self.right),
            bottom: f(&self.bottom),
        }
    }
}

impl FiducialTriple<Point> {
    pub fn classify(points: [Point; 3]) -> Self {
        Self::classify_by(points, |p| *p)
    }
}

impl FiducialTriple<Field> {
    /// Classify located fields by the centre of their bounding boxes
    pub fn from_fields(fields: Vec<Field>) -> Result<Self> {
        let items: [Field; 3] = fields.try_into().map_err(|v: Vec<Field>| {
            StripError::MalformedFieldData(format!("expected 3 fiducials, got {}", v.len()))
        })?;
        if items.iter().any(|f| f.center().is_none()) {
            return Err(StripError::MalformedFieldData(
                "fiducial field has no pixel bounds".to_string(),
            ));
        }
        Ok(Self::classify_by(items, |f| f.center().unwrap_or_default()))
    }
}

/// Signed tilt of the strip, in radians, from the left and right fiducials.
///
/// Positive when the right fiducial sits lower than the left one, i.e. the
/// strip is turned clockwise on screen.
pub fn rotation_angle(left: Point, right: Point) -> f64 {
    let magnitude = RightTriangle::new(left, right).bottom_left_angle();
    if right.y > left.y { magnitude } else { -magnitude }
}

/// Rotation needed to bring the strip upright
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentResult {
    /// Tilt in radians, positive = clockwise
    pub angle: f64,
    /// Centre of the left fiducial
    pub pivot: Point,
    /// Fiducial centres by role
    pub fiducials: FiducialTriple,
}

impl AlignmentResult {
    pub fn from_points(points: [Point; 3]) -> Self {
        let fiducials = FiducialTriple::classify(points);
        let angle = rotation_angle(fiducials.left, fiducials.right);
        debug!(
            "alignment: left {:?}, right {:?}, bottom {:?}, angle {:.5} rad",
            fiducials.left, fiducials.right, fiducials.bottom, angle
        );
        Self {
            angle,
            pivot: fiducials.left,
            fiducials,
        }
    }

    pub fn from_triple(triple: &FiducialTriple<Field>) -> Self {
        let centers = triple.map(|f| f.center().unwrap_or_default());
        Self::from_points([centers.left, centers.right, centers.bottom])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Color, FieldType, PixelRect, PointI};
    use crate::utils::geometry::rotate_point;

    #[test]
    fn test_classify() {
        let triple = FiducialTriple::classify([
            Point::new(900.0, 40.0),
            Point::new(500.0, 700.0),
            Point::new(100.0, 50.0),
        ]);
        assert_eq!(triple.left, Point::new(100.0, 50.0));
        assert_eq!(triple.right, Point::new(900.0, 40.0));
        assert_eq!(triple.bottom, Point::new(500.0, 700.0));
    }

    #[test]
    fn test_classify_ties_keep_order() {
        let triple = FiducialTriple::classify_by([("a", 1.0), ("b", 1.0), ("c", 1.0)], |item| {
            Point::new(item.1, 0.0)
        });
        assert_eq!(triple.bottom.0, "a");
        assert_eq!(triple.left.0, "b");
        assert_eq!(triple.right.0, "c");
    }

    #[test]
    fn test_upright_layout_has_zero_angle() {
        let result = AlignmentResult::from_points([
            Point::new(0.0, 0.0),
            Point::new(1000.0, 0.0),
            Point::new(0.0, 500.0),
        ]);
        assert!(result.angle.abs() < 1e-12);
        assert_eq!(result.pivot, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_synthetic_tilt() {
        let pivot = Point::new(1000.0, 500.0);
        for theta in [-0.2, -0.05, 0.03, 0.1, 0.25] {
            let points = [
                Point::new(300.0, 200.0),
                Point::new(1700.0, 200.0),
                Point::new(1000.0, 800.0),
            ]
            .map(|p| rotate_point(p, pivot, theta));
            let result = AlignmentResult::from_points(points);
            assert!(
                (result.angle - theta).abs() < 0.01,
                "theta {} measured {}",
                theta,
                result.angle
            );
        }
    }

    #[test]
    fn test_degenerate_points() {
        let p = Point::new(5.0, 5.0);
        assert_eq!(rotation_angle(p, p), 0.0);
    }

    #[test]
    fn test_from_fields() {
        let field_at = |x: i64, y: i64| {
            Field::new(FieldType::Control, vec![Color::new(151, 255, 0)])
                .unwrap()
                .with_bounds(PixelRect {
                    start: PointI::new(x, y),
                    end: PointI::new(x + 19, y + 19),
                })
        };
        let triple =
            FiducialTriple::from_fields(vec![field_at(500, 400), field_at(800, 20), field_at(40, 30)])
                .unwrap();
        assert_eq!(triple.left.bounds().unwrap().start, PointI::new(40, 30));
        assert_eq!(triple.right.bounds().unwrap().start, PointI::new(800, 20));
        assert_eq!(triple.bottom.bounds().unwrap().start, PointI::new(500, 400));

        assert!(matches!(
            FiducialTriple::from_fields(vec![field_at(0, 0)]),
            Err(StripError::MalformedFieldData(_))
        ));
    }
}
