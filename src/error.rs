//! Error taxonomy for the strip reading pipeline.
//!
//! Every variant is fatal for the image being analysed. Nothing is retried
//! internally; the caller decides whether to ask for a new photograph.

use std::fmt;

use crate::models::{Color, FieldType};

/// Which quality gate rejected an image
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QualityIssue {
    /// Local colour variation is above the noise gate
    Noise {
        /// Measured noise level in [0, 1]
        level: f64,
        /// Configured gate
        limit: f64,
    },
    /// Too many sampled pixels are blown out
    Overexposed {
        /// Fraction of over-exposed samples
        ratio: f64,
        /// Configured gate
        limit: f64,
    },
    /// Too many sampled pixels are crushed to black
    Underexposed {
        /// Fraction of under-exposed samples
        ratio: f64,
        /// Configured gate
        limit: f64,
    },
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityIssue::Noise { level, limit } => {
                write!(f, "noise level {:.4} exceeds {:.4}", level, limit)
            }
            QualityIssue::Overexposed { ratio, limit } => {
                write!(f, "overexposure ratio {:.4} exceeds {:.4}", ratio, limit)
            }
            QualityIssue::Underexposed { ratio, limit } => {
                write!(f, "underexposure ratio {:.4} exceeds {:.4}", ratio, limit)
            }
        }
    }
}

/// Why the white-balance anchor was refused
#[derive(Debug, Clone, PartialEq)]
pub enum WhiteBalanceIssue {
    /// The anchor patch could not be located
    NotLocated(String),
    /// One channel of the anchor colour is outside the brightness bounds
    ChannelOutOfBounds {
        /// Channel name
        channel: &'static str,
        /// Measured value
        value: u8,
        /// Lower bound
        min: u8,
        /// Upper bound
        max: u8,
    },
    /// Red dominates another channel by more than the allowed cast
    ColorCast {
        /// Anchor colour
        color: Color,
        /// Allowed difference
        max_cast: u8,
    },
}

impl fmt::Display for WhiteBalanceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhiteBalanceIssue::NotLocated(reason) => {
                write!(f, "anchor field not located ({})", reason)
            }
            WhiteBalanceIssue::ChannelOutOfBounds {
                channel,
                value,
                min,
                max,
            } => write!(
                f,
                "{} channel is unbalanced: {} not in {}..={}",
                channel, value, min, max
            ),
            WhiteBalanceIssue::ColorCast { color, max_cast } => {
                write!(f, "anchor {} has a colour cast above {}", color, max_cast)
            }
        }
    }
}

/// Errors returned by the strip reader.
#[derive(thiserror::Error, Debug)]
pub enum StripError {
    #[error("image rejected: {0}")]
    QualityRejected(QualityIssue),
    #[error("white balance rejected: {0}")]
    WhiteBalanceRejected(WhiteBalanceIssue),
    #[error("{field_type} field not found: {reason}")]
    FieldNotFound {
        field_type: FieldType,
        reason: String,
    },
    #[error("malformed field data: {0}")]
    MalformedFieldData(String),
    #[error("invalid image dimensions: width={width}, height={height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("refusing lossy output encoding `{0}`, normalized images are written as png")]
    LossyEncoding(String),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StripError {
    pub(crate) fn not_found(field_type: FieldType, reason: impl Into<String>) -> Self {
        StripError::FieldNotFound {
            field_type,
            reason: reason.into(),
        }
    }

    /// Short, user-facing hint on how to retake the photograph
    pub fn retake_hint(&self) -> &'static str {
        match self {
            StripError::QualityRejected(QualityIssue::Noise { .. }) => "too noisy",
            StripError::QualityRejected(QualityIssue::Overexposed { .. }) => "too bright",
            StripError::QualityRejected(QualityIssue::Underexposed { .. }) => "too dark",
            StripError::WhiteBalanceRejected(_) => "uneven lighting",
            StripError::FieldNotFound {
                field_type: FieldType::Control,
                ..
            } => "misaligned",
            StripError::FieldNotFound { .. } => "pad not found",
            _ => "cannot be analysed",
        }
    }
}

pub type Result<T> = std::result::Result<T, StripError>;
