//! End-to-end strip pipeline: quality gate, white balance, fiducials,
//! re-orientation, crop and pad reading.

use log::{debug, info};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::detector::alignment::{AlignmentResult, FiducialTriple};
use crate::detector::edges::detect_edges;
use crate::detector::finder::FieldFinder;
use crate::detector::transform::ImageTransformer;
use crate::error::Result;
use crate::models::{Color, Field, FieldType, PixelImage, PixelRect, WhiteBalance};
use crate::quality::{ImageValidator, QualityReport};

/// Upright strip cropped to its fiducials
#[derive(Debug, Clone)]
pub struct NormalizedStrip {
    pub image: PixelImage,
    pub white_balance: WhiteBalance,
    /// Tilt measured on the input image
    pub alignment: AlignmentResult,
    /// Fiducials found again on the rotated image
    pub fiducials: FiducialTriple<Field>,
    pub quality: QualityReport,
}

/// Averaged colour of one analyte pad
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PadReading {
    pub field_type: FieldType,
    pub color: Color,
    pub samples: usize,
    pub bounds: Option<PixelRect>,
}

impl From<&Field> for PadReading {
    fn from(field: &Field) -> Self {
        Self {
            field_type: field.field_type(),
            color: field.average_color(),
            samples: field.len(),
            bounds: field.bounds(),
        }
    }
}

/// Everything measured on one photograph
#[derive(Debug, Clone, Serialize)]
pub struct StripReading {
    pub quality: QualityReport,
    pub white_balance: WhiteBalance,
    pub alignment: AlignmentResult,
    pub width: usize,
    pub height: usize,
    pub pads: Vec<PadReading>,
}

/// Reusable analyzer holding one configuration
#[derive(Debug, Clone, Default)]
pub struct StripAnalyzer {
    config: PipelineConfig,
}

impl StripAnalyzer {
    /// Analyzer with built-in defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run only the quality gate
    pub fn validate(&self, image: &PixelImage) -> Result<QualityReport> {
        ImageValidator::new(image).validate(&self.config.quality)
    }

    /// Gate the photograph, then rotate it upright and crop it to the fiducials
    pub fn normalize(&self, image: &PixelImage) -> Result<NormalizedStrip> {
        let quality = self.validate(image)?;
        debug!(
            "quality ok: noise {:.4}, over {:.4}, under {:.4}",
            quality.noise_level, quality.overexposure_ratio, quality.underexposure_ratio
        );

        let edges = detect_edges(image, &self.config.edges);
        debug!("{} edge pixels on input", edges.len());

        let finder = FieldFinder::new(image, &edges, &self.config.layout, self.config.seeds);
        let white_balance = finder.locate_white_balance(&self.config.white_balance)?;
        let finder = finder.with_white_balance(white_balance);

        let fiducials = FiducialTriple::from_fields(finder.locate_fields(FieldType::Control, 3)?)?;
        let alignment = AlignmentResult::from_triple(&fiducials);
        info!(
            "strip tilt {:.4} rad about ({:.1}, {:.1})",
            alignment.angle, alignment.pivot.x, alignment.pivot.y
        );

        let upright = ImageTransformer::new(image).rotate(alignment.pivot, -alignment.angle);
        let (cropped, fiducials) =
            ImageTransformer::new(&upright).crop_to_fiducials(&self.config, white_balance)?;

        Ok(NormalizedStrip {
            image: cropped,
            white_balance,
            alignment,
            fiducials,
            quality,
        })
    }

    /// Locate every analyte pad on a normalized strip
    pub fn read_pads(&self, image: &PixelImage, white_balance: &WhiteBalance) -> Result<Vec<Field>> {
        let edges = detect_edges(image, &self.config.edges);
        let finder = FieldFinder::new(image, &edges, &self.config.layout, self.config.seeds)
            .with_white_balance(*white_balance);
        FieldType::ANALYTES
            .iter()
            .map(|&field_type| finder.locate_field(field_type))
            .collect()
    }

    /// Normalize the photograph and read its pads
    pub fn analyze(&self, image: &PixelImage) -> Result<StripReading> {
        let strip = self.normalize(image)?;
        let pads = self.read_pads(&strip.image, &strip.white_balance)?;
        for pad in &pads {
            info!("{}: {} from {} px", pad.field_type(), pad.average_color(), pad.len());
        }
        Ok(StripReading {
            quality: strip.quality,
            white_balance: strip.white_balance,
            alignment: strip.alignment,
            width: strip.image.width(),
            height: strip.image.height(),
            pads: pads.iter().map(PadReading::from).collect(),
        })
    }
}
