use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, StripError};
use crate::models::Color;

/// Kind of pad printed on the strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    /// Neutral gray anchor used for white-balance correction
    WhiteBalance,
    /// Fiducial marker, three per strip
    Control,
    Glucose,
    Ketones,
    Ph,
    Protein,
    SpecificGravity,
}

impl FieldType {
    /// Every field type in strip order
    pub const ALL: [FieldType; 7] = [
        FieldType::WhiteBalance,
        FieldType::Control,
        FieldType::Glucose,
        FieldType::Ketones,
        FieldType::Ph,
        FieldType::Protein,
        FieldType::SpecificGravity,
    ];

    /// Pads whose colour encodes a measurement
    pub const ANALYTES: [FieldType; 5] = [
        FieldType::Glucose,
        FieldType::Ketones,
        FieldType::Ph,
        FieldType::Protein,
        FieldType::SpecificGravity,
    ];

    /// Stable identifier used in logs and config files
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::WhiteBalance => "WHITE_BALANCE",
            FieldType::Control => "CONTROL",
            FieldType::Glucose => "GLUCOSE",
            FieldType::Ketones => "KETONES",
            FieldType::Ph => "PH",
            FieldType::Protein => "PROTEIN",
            FieldType::SpecificGravity => "SPECIFIC_GRAVITY",
        }
    }

    /// Whether samples of this field get white-balance compensation
    pub fn is_compensated(&self) -> bool {
        *self != FieldType::WhiteBalance
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Expected position, permitted colours and match tolerance of one field type.
///
/// Construction enforces the table invariants: ratios inside `[0, 1]`, at least
/// one permitted colour, tolerance clamped into `0..=255`. The same checks run
/// when a spec is deserialised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldSpec")]
pub struct FieldSpec {
    x_ratio: f64,
    y_ratio: f64,
    colors: Vec<Color>,
    tolerance: u8,
}

#[derive(Deserialize)]
struct RawFieldSpec {
    x_ratio: f64,
    y_ratio: f64,
    colors: Vec<Color>,
    tolerance: i64,
}

impl TryFrom<RawFieldSpec> for FieldSpec {
    type Error = StripError;

    fn try_from(raw: RawFieldSpec) -> Result<Self> {
        FieldSpec::new(raw.x_ratio, raw.y_ratio, raw.colors, raw.tolerance)
    }
}

impl FieldSpec {
    /// Validate and build a field spec
    pub fn new(x_ratio: f64, y_ratio: f64, colors: Vec<Color>, tolerance: i64) -> Result<Self> {
        for (axis, ratio) in [("x", x_ratio), ("y", y_ratio)] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(StripError::MalformedFieldData(format!(
                    "{} ratio {} is outside [0, 1]",
                    axis, ratio
                )));
            }
        }
        if colors.is_empty() {
            return Err(StripError::MalformedFieldData(
                "permitted colour set is empty".to_string(),
            ));
        }
        Ok(Self {
            x_ratio,
            y_ratio,
            colors,
            tolerance: tolerance.clamp(0, 255) as u8,
        })
    }

    /// Horizontal position as a fraction of image width
    pub fn x_ratio(&self) -> f64 {
        self.x_ratio
    }

    /// Vertical position as a fraction of image height
    pub fn y_ratio(&self) -> f64 {
        self.y_ratio
    }

    /// Permitted reference colours, never empty
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// First permitted colour
    pub fn primary_color(&self) -> Color {
        self.colors[0]
    }

    /// Per-channel match tolerance
    pub fn tolerance(&self) -> u8 {
        self.tolerance
    }

    /// Expected pixel column in an image of the given width
    pub fn x_in(&self, width: usize) -> usize {
        ((width as f64 * self.x_ratio) as usize).min(width.saturating_sub(1))
    }

    /// Expected pixel row in an image of the given height
    pub fn y_in(&self, height: usize) -> usize {
        ((height as f64 * self.y_ratio) as usize).min(height.saturating_sub(1))
    }

    /// Whether `color` is within tolerance of any permitted colour
    pub fn accepts(&self, color: Color) -> bool {
        crate::utils::color::matches_any(color, &self.colors, self.tolerance)
    }
}

fn gray(level: u8) -> Color {
    Color::new(level, level, level)
}

fn spec(x_ratio: f64, y_ratio: f64, colors: Vec<Color>, tolerance: u8) -> FieldSpec {
    // Built-in table only; the values are valid by construction.
    FieldSpec {
        x_ratio,
        y_ratio,
        colors,
        tolerance,
    }
}

/// Table of field specs for one physical strip design.
///
/// The white-balance position is relative to the captured photograph. Analyte
/// positions are relative to the normalized strip (after rotation and crop to
/// the fiducials). The control spec carries no meaningful position; fiducials
/// are found by scanning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripLayout {
    pub white_balance: FieldSpec,
    pub control: FieldSpec,
    pub glucose: FieldSpec,
    pub ketones: FieldSpec,
    pub ph: FieldSpec,
    pub protein: FieldSpec,
    pub specific_gravity: FieldSpec,
}

impl StripLayout {
    /// Spec for one field type
    pub fn spec(&self, field_type: FieldType) -> &FieldSpec {
        match field_type {
            FieldType::WhiteBalance => &self.white_balance,
            FieldType::Control => &self.control,
            FieldType::Glucose => &self.glucose,
            FieldType::Ketones => &self.ketones,
            FieldType::Ph => &self.ph,
            FieldType::Protein => &self.protein,
            FieldType::SpecificGravity => &self.specific_gravity,
        }
    }

    /// Replace the spec of one field type
    pub fn set_spec(&mut self, field_type: FieldType, spec: FieldSpec) {
        match field_type {
            FieldType::WhiteBalance => self.white_balance = spec,
            FieldType::Control => self.control = spec,
            FieldType::Glucose => self.glucose = spec,
            FieldType::Ketones => self.ketones = spec,
            FieldType::Ph => self.ph = spec,
            FieldType::Protein => self.protein = spec,
            FieldType::SpecificGravity => self.specific_gravity = spec,
        }
    }
}

impl Default for StripLayout {
    fn default() -> Self {
        Self {
            white_balance: spec(
                0.1948,
                0.6611,
                vec![gray(155), gray(175), gray(195), gray(205), gray(225)],
                50,
            ),
            control: spec(0.5, 0.5, vec![Color::new(151, 255, 0)], 25),
            glucose: spec(
                0.2,
                0.5,
                vec![
                    Color::new(150, 137, 56),
                    Color::new(149, 135, 62),
                    Color::new(158, 144, 55),
                ],
                20,
            ),
            ketones: spec(
                0.35,
                0.5,
                vec![
                    Color::new(254, 250, 202),
                    Color::new(254, 221, 188),
                    Color::new(223, 179, 196),
                    Color::new(177, 87, 141),
                    Color::new(110, 95, 114),
                    Color::new(81, 0, 77),
                ],
                35,
            ),
            ph: spec(0.5, 0.5, vec![Color::new(169, 91, 43)], 25),
            protein: spec(
                0.65,
                0.5,
                vec![Color::new(114, 98, 36), Color::new(95, 87, 30)],
                35,
            ),
            specific_gravity: spec(
                0.8,
                0.5,
                vec![
                    Color::new(8, 9, 55),
                    Color::new(5, 19, 19),
                    Color::new(19, 72, 4),
                    Color::new(83, 97, 9),
                    Color::new(137, 104, 1),
                    Color::new(202, 157, 30),
                    Color::new(224, 148, 52),
                ],
                20,
            ),
        }
    }
}
