use serde::{Deserialize, Serialize};

use crate::error::{Result, StripError, WhiteBalanceIssue};
use crate::models::Color;

/// Acceptable range for the white-balance anchor colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteBalanceBounds {
    /// Lowest accepted value for every channel
    pub min_channel: u8,
    /// Highest accepted value for every channel
    pub max_channel: u8,
    /// Largest tolerated excess of red over green or blue
    pub max_cast: u8,
}

impl Default for WhiteBalanceBounds {
    fn default() -> Self {
        Self {
            min_channel: 110,
            max_channel: 240,
            max_cast: 25,
        }
    }
}

/// Reference gray measured on the strip and the channel offsets derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WhiteBalance {
    reference: Color,
}

impl WhiteBalance {
    /// Wrap the average colour of the anchor field
    pub fn new(reference: Color) -> Self {
        Self { reference }
    }

    /// Balance that leaves every colour untouched
    pub fn neutral() -> Self {
        Self::new(Color::new(128, 128, 128))
    }

    /// Measured anchor colour
    pub fn reference(&self) -> Color {
        self.reference
    }

    /// Offset added to red: green minus red of the anchor
    pub fn red_offset(&self) -> i32 {
        self.reference.green as i32 - self.reference.red as i32
    }

    /// Offset added to blue: green minus blue of the anchor
    pub fn blue_offset(&self) -> i32 {
        self.reference.green as i32 - self.reference.blue as i32
    }

    /// Check the anchor against brightness bounds and colour cast
    pub fn validate(&self, bounds: &WhiteBalanceBounds) -> Result<()> {
        let c = self.reference;
        for (channel, value) in [("red", c.red), ("green", c.green), ("blue", c.blue)] {
            if value < bounds.min_channel || value > bounds.max_channel {
                return Err(StripError::WhiteBalanceRejected(
                    WhiteBalanceIssue::ChannelOutOfBounds {
                        channel,
                        value,
                        min: bounds.min_channel,
                        max: bounds.max_channel,
                    },
                ));
            }
        }
        let cast = bounds.max_cast as i32;
        if c.red as i32 - c.blue as i32 > cast || c.red as i32 - c.green as i32 > cast {
            return Err(StripError::WhiteBalanceRejected(WhiteBalanceIssue::ColorCast {
                color: c,
                max_cast: bounds.max_cast,
            }));
        }
        Ok(())
    }

    /// Apply the offsets to one colour, saturating each channel
    pub fn compensate(&self, color: Color) -> Color {
        Color::saturating(
            color.red as i32 + self.red_offset(),
            color.green as i32,
            color.blue as i32 + self.blue_offset(),
        )
    }

    /// Apply the offsets to every colour
    pub fn compensate_all(&self, colors: &[Color]) -> Vec<Color> {
        colors.iter().map(|&c| self.compensate(c)).collect()
    }

    /// Undo [`compensate`](Self::compensate)
    pub fn reverse(&self, color: Color) -> Color {
        Color::saturating(
            color.red as i32 - self.red_offset(),
            color.green as i32,
            color.blue as i32 - self.blue_offset(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        let wb = WhiteBalance::new(Color::new(170, 180, 190));
        assert_eq!(wb.red_offset(), 10);
        assert_eq!(wb.blue_offset(), -10);
        assert_eq!(wb.compensate(Color::new(100, 50, 100)), Color::new(110, 50, 90));
        assert_eq!(
            wb.compensate_all(&[Color::new(0, 0, 0), Color::new(250, 1, 5)]),
            vec![Color::new(10, 0, 0), Color::new(255, 1, 0)]
        );
    }

    #[test]
    fn test_compensate_then_reverse() {
        let wb = WhiteBalance::new(Color::new(160, 175, 150));
        for color in [
            Color::new(100, 120, 140),
            Color::new(30, 200, 90),
            Color::new(200, 10, 200),
        ] {
            assert_eq!(wb.reverse(wb.compensate(color)), color);
        }
    }

    #[test]
    fn test_compensation_saturates() {
        let wb = WhiteBalance::new(Color::new(120, 200, 120));
        assert_eq!(wb.compensate(Color::new(250, 0, 240)), Color::new(255, 0, 255));
    }

    #[test]
    fn test_validate_bounds() {
        let bounds = WhiteBalanceBounds::default();
        assert!(WhiteBalance::new(Color::new(180, 180, 180)).validate(&bounds).is_ok());
        assert!(matches!(
            WhiteBalance::new(Color::new(100, 180, 180)).validate(&bounds),
            Err(StripError::WhiteBalanceRejected(
                WhiteBalanceIssue::ChannelOutOfBounds { channel: "red", .. }
            ))
        ));
        assert!(matches!(
            WhiteBalance::new(Color::new(180, 245, 180)).validate(&bounds),
            Err(StripError::WhiteBalanceRejected(
                WhiteBalanceIssue::ChannelOutOfBounds { channel: "green", .. }
            ))
        ));
    }

    #[test]
    fn test_validate_color_cast() {
        let bounds = WhiteBalanceBounds::default();
        assert!(matches!(
            WhiteBalance::new(Color::new(200, 190, 170)).validate(&bounds),
            Err(StripError::WhiteBalanceRejected(WhiteBalanceIssue::ColorCast { .. }))
        ));
        assert!(WhiteBalance::new(Color::new(200, 190, 176)).validate(&bounds).is_ok());
    }
}
