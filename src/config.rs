//! Tunable thresholds for the strip pipeline.
//!
//! Defaults are calibrated for one physical strip and camera setup. They can be
//! replaced wholesale from JSON or nudged through `STRIP_*` environment
//! variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{Result, StripError};
use crate::models::{StripLayout, WhiteBalanceBounds};

fn parse_env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_u8(name: &str, default: u8) -> u8 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .unwrap_or(default)
}

fn parse_env_strategy(name: &str, default: EdgeStrategy) -> EdgeStrategy {
    match std::env::var(name).ok().as_deref().map(str::trim) {
        Some("sobel") => EdgeStrategy::Sobel,
        Some("adaptive") | Some("threshold") => EdgeStrategy::AdaptiveThreshold,
        _ => default,
    }
}

/// Quality gates applied before any geometric work
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityGates {
    /// Reject when the noise level is above this
    pub max_noise: f64,
    /// Reject when the over-exposed fraction is above this
    pub max_overexposure: f64,
    /// Reject when the under-exposed fraction is above this
    pub max_underexposure: f64,
}

impl Default for QualityGates {
    fn default() -> Self {
        Self {
            max_noise: 0.013,
            max_overexposure: 0.02,
            max_underexposure: 0.02,
        }
    }
}

/// Which edge detector feeds the boundary search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStrategy {
    #[default]
    Sobel,
    AdaptiveThreshold,
}

/// Edge detector parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    pub strategy: EdgeStrategy,
    /// Normalized gradient magnitude a Sobel edge must exceed
    pub magnitude_threshold: f64,
    /// Largest distance (radians) from an axis-aligned orientation
    pub sharp_angle_tolerance: f64,
    /// Minimum edge neighbours per pruning pass
    pub prune_limits: Vec<usize>,
    /// Threshold at full contrast for the adaptive detector
    pub adaptive_scale: f64,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            strategy: EdgeStrategy::Sobel,
            magnitude_threshold: 0.18,
            sharp_angle_tolerance: std::f64::consts::FRAC_PI_4,
            prune_limits: vec![4, 3, 2, 2],
            adaptive_scale: 135.0,
        }
    }
}

/// Coarse seed scan and boundary walk parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedScanParams {
    /// Initial stride is resolution / this
    pub stride_divisor: usize,
    /// Expected field size is resolution / this
    pub separation_divisor: usize,
    /// Lower bound on seed separation in pixels
    pub min_field_separation: usize,
    /// Misses tolerated beyond twice the discovered width
    pub search_slack: usize,
}

impl Default for SeedScanParams {
    fn default() -> Self {
        Self {
            stride_divisor: 500,
            separation_divisor: 50_000,
            min_field_separation: 10,
            search_slack: 25,
        }
    }
}

impl SeedScanParams {
    /// First stride of the shrinking raster scan
    pub fn initial_stride(&self, resolution: usize) -> usize {
        (resolution / self.stride_divisor.max(1)).max(1)
    }

    /// Minimum distance between two accepted seeds
    pub fn separation(&self, resolution: usize) -> f64 {
        (resolution / self.separation_divisor.max(1)).max(self.min_field_separation) as f64
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub quality: QualityGates,
    pub edges: EdgeParams,
    pub seeds: SeedScanParams,
    pub white_balance: WhiteBalanceBounds,
    pub layout: StripLayout,
}

impl PipelineConfig {
    /// Parse a JSON document; missing sections keep their defaults.
    ///
    /// A layout section that does not describe valid fields is reported as
    /// `MalformedFieldData` rather than a generic parse error.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        let layout = match value.as_object_mut().and_then(|o| o.remove("layout")) {
            Some(section) => Some(
                serde_json::from_value::<StripLayout>(section)
                    .map_err(|e| StripError::MalformedFieldData(e.to_string()))?,
            ),
            None => None,
        };
        let mut config: PipelineConfig = serde_json::from_value(value)?;
        if let Some(layout) = layout {
            config.layout = layout;
        }
        Ok(config)
    }

    /// Read and parse a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Apply `STRIP_*` environment overrides on top of this config
    pub fn with_env_overrides(mut self) -> Self {
        let q = &mut self.quality;
        q.max_noise = parse_env_f64("STRIP_NOISE_GATE", q.max_noise);
        q.max_overexposure = parse_env_f64("STRIP_OVEREXPOSURE_GATE", q.max_overexposure);
        q.max_underexposure = parse_env_f64("STRIP_UNDEREXPOSURE_GATE", q.max_underexposure);

        let e = &mut self.edges;
        e.strategy = parse_env_strategy("STRIP_EDGE_STRATEGY", e.strategy);
        e.magnitude_threshold = parse_env_f64("STRIP_SOBEL_THRESHOLD", e.magnitude_threshold);
        e.adaptive_scale = parse_env_f64("STRIP_ADAPTIVE_SCALE", e.adaptive_scale);

        let s = &mut self.seeds;
        s.min_field_separation =
            parse_env_usize("STRIP_MIN_FIELD_SEPARATION", s.min_field_separation);
        s.search_slack = parse_env_usize("STRIP_SEARCH_SLACK", s.search_slack);

        let wb = &mut self.white_balance;
        wb.min_channel = parse_env_u8("STRIP_WB_MIN_CHANNEL", wb.min_channel);
        wb.max_channel = parse_env_u8("STRIP_WB_MAX_CHANNEL", wb.max_channel);
        wb.max_cast = parse_env_u8("STRIP_WB_MAX_CAST", wb.max_cast);
        self
    }
}

static PROCESS_CONFIG: OnceLock<PipelineConfig> = OnceLock::new();

/// Defaults plus environment overrides, read once per process
pub fn process_config() -> &'static PipelineConfig {
    PROCESS_CONFIG.get_or_init(|| PipelineConfig::default().with_env_overrides())
}
