//! strip_reader - diagnostic test-strip image pipeline
//!
//! Takes a photograph of a urine test strip, rejects unusable shots,
//! measures the white-balance anchor, finds the three fiducials, rotates the
//! strip upright, crops it and reads the averaged colour of every analyte pad.
//!
//! Pixel loops run row-parallel on rayon.

/// Thresholds, field table and environment overrides
pub mod config;
/// Edge maps, field search, alignment and transform stages
pub mod detector;
/// Error taxonomy
pub mod error;
/// Core data structures (PixelImage, Color, Field, FieldType, EdgeMap, etc.)
pub mod models;
/// End-to-end analyzer
pub mod pipeline;
/// Noise and exposure gate
pub mod quality;
/// File-boundary helpers for the CLI and tests
pub mod tools;
/// Utility functions (brightness, colour comparison, geometry)
pub mod utils;

pub use config::{PipelineConfig, process_config};
pub use error::{Result, StripError};
pub use models::{Color, Field, FieldType, PixelImage, StripLayout, WhiteBalance};
pub use pipeline::{NormalizedStrip, PadReading, StripAnalyzer, StripReading};
pub use quality::{ImageValidator, QualityReport};

/// Analyze a strip photograph given as raw RGB bytes
///
/// # Arguments
/// * `rgb` - Raw RGB bytes (3 bytes per pixel)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// Uses the defaults plus `STRIP_*` environment overrides.
pub fn analyze(rgb: &[u8], width: usize, height: usize) -> Result<StripReading> {
    let image = PixelImage::from_rgb(rgb.to_vec(), width, height)?;
    StripAnalyzer::with_config(process_config().clone()).analyze(&image)
}

/// Rotate and crop a strip photograph given as raw RGB bytes
pub fn normalize(rgb: &[u8], width: usize, height: usize) -> Result<NormalizedStrip> {
    let image = PixelImage::from_rgb(rgb.to_vec(), width, height)?;
    StripAnalyzer::with_config(process_config().clone()).normalize(&image)
}
