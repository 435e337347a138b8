use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, StripError};

/// 8-bit RGB colour sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub red: u8,
    /// Green channel
    pub green: u8,
    /// Blue channel
    pub blue: u8,
}

impl Color {
    /// Create a colour from its three channels
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Build a colour from wide integers, rejecting values outside 0..=255
    pub fn from_channels(red: i32, green: i32, blue: i32) -> Result<Self> {
        let channel = |name: &str, value: i32| {
            u8::try_from(value).map_err(|_| {
                StripError::MalformedFieldData(format!(
                    "{} channel {} is outside 0..=255",
                    name, value
                ))
            })
        };
        Ok(Self {
            red: channel("red", red)?,
            green: channel("green", green)?,
            blue: channel("blue", blue)?,
        })
    }

    /// Build a colour from wide integers, clamping each channel into 0..=255
    pub fn saturating(red: i32, green: i32, blue: i32) -> Self {
        Self {
            red: red.clamp(0, 255) as u8,
            green: green.clamp(0, 255) as u8,
            blue: blue.clamp(0, 255) as u8,
        }
    }

    /// Channels as an array in RGB order
    pub fn channels(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_channels_rejects_out_of_range() {
        assert_eq!(
            Color::from_channels(12, 0, 255).unwrap(),
            Color::new(12, 0, 255)
        );
        assert!(matches!(
            Color::from_channels(256, 0, 0),
            Err(StripError::MalformedFieldData(_))
        ));
        assert!(matches!(
            Color::from_channels(0, -1, 0),
            Err(StripError::MalformedFieldData(_))
        ));
    }

    #[test]
    fn test_saturating() {
        assert_eq!(Color::saturating(-20, 300, 128), Color::new(0, 255, 128));
    }
}
