use crate::error::{Result, StripError};
use crate::models::{Color, FieldType, PixelRect, Point};

/// Located pad: the colours sampled inside it and their pixel extent
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    field_type: FieldType,
    samples: Vec<Color>,
    bounds: Option<PixelRect>,
}

impl Field {
    /// Build a field from its samples; an empty sample set is rejected
    pub fn new(field_type: FieldType, samples: Vec<Color>) -> Result<Self> {
        if samples.is_empty() {
            return Err(StripError::MalformedFieldData(format!(
                "{} field needs at least one sample",
                field_type
            )));
        }
        Ok(Self {
            field_type,
            samples,
            bounds: None,
        })
    }

    /// Attach the bounding box of the sampled pixels
    pub fn with_bounds(mut self, bounds: PixelRect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn samples(&self) -> &[Color] {
        &self.samples
    }

    /// Number of samples, always at least one
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Pixel bounding box, if the field was located in an image
    pub fn bounds(&self) -> Option<PixelRect> {
        self.bounds
    }

    /// Centre of the bounding box
    pub fn center(&self) -> Option<Point> {
        self.bounds.map(|b| b.center())
    }

    /// Per-channel integer mean of the samples
    pub fn average_color(&self) -> Color {
        let n = self.samples.len() as u64;
        let (r, g, b) = self.samples.iter().fold((0u64, 0u64, 0u64), |(r, g, b), c| {
            (r + c.red as u64, g + c.green as u64, b + c.blue as u64)
        });
        Color::new((r / n) as u8, (g / n) as u8, (b / n) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PointI;

    #[test]
    fn test_empty_field_is_rejected() {
        assert!(matches!(
            Field::new(FieldType::Glucose, Vec::new()),
            Err(StripError::MalformedFieldData(_))
        ));
    }

    #[test]
    fn test_average_color() {
        let field = Field::new(
            FieldType::Ph,
            vec![
                Color::new(10, 20, 30),
                Color::new(20, 30, 40),
                Color::new(31, 40, 50),
            ],
        )
        .unwrap();
        assert_eq!(field.len(), 3);
        assert_eq!(field.average_color(), Color::new(20, 30, 40));
    }

    #[test]
    fn test_center_from_bounds() {
        let field = Field::new(FieldType::Control, vec![Color::new(1, 1, 1)]).unwrap();
        assert_eq!(field.center(), None);
        let field = field.with_bounds(PixelRect {
            start: PointI::new(10, 20),
            end: PointI::new(29, 39),
        });
        assert_eq!(field.center(), Some(Point::new(19.5, 29.5)));
    }
}
