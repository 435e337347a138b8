//! Image quality gate: noise and exposure metrics over a sparse pixel grid.

use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::QualityGates;
use crate::error::{QualityIssue, Result, StripError};
use crate::models::PixelImage;
use crate::utils::color::{channel_difference, mean_brightness};

/// Mean-channel value at or above which a sample counts as over-exposed
pub const OVEREXPOSED_LEVEL: u8 = 253;
/// Mean-channel value at or below which a sample counts as under-exposed
pub const UNDEREXPOSED_LEVEL: u8 = 6;

const NOISE_STRIDE: usize = 5;
const EXPOSURE_STRIDE: usize = 4;

/// Ring order for a 3x3 cluster: top row left to right, middle row right to
/// left, bottom row left to right.
const CLUSTER_RING: [(i64, i64); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (0, 0),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Metrics measured by [`ImageValidator::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityReport {
    pub noise_level: f64,
    pub overexposure_ratio: f64,
    pub underexposure_ratio: f64,
    pub average_exposure: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct ExposureTally {
    over: usize,
    under: usize,
    total: u64,
    count: usize,
}

impl ExposureTally {
    fn merge(self, other: Self) -> Self {
        Self {
            over: self.over + other.over,
            under: self.under + other.under,
            total: self.total + other.total,
            count: self.count + other.count,
        }
    }
}

/// Computes quality metrics for one image
pub struct ImageValidator<'a> {
    image: &'a PixelImage,
}

impl<'a> ImageValidator<'a> {
    pub fn new(image: &'a PixelImage) -> Self {
        Self { image }
    }

    /// Average local colour variation in `[0, 1]`.
    ///
    /// 3x3 clusters are sampled every 5 pixels with a per-row stagger. Each
    /// cluster contributes the mean normalized channel difference over the 8
    /// transitions of its ring. An image too small for any cluster scores 0.
    pub fn noise_level(&self) -> f64 {
        let (width, height) = (self.image.width(), self.image.height());
        let rows: Vec<usize> = (1..height).step_by(NOISE_STRIDE).collect();

        // Per-row partial sums, merged in row order
        let partials: Vec<(f64, usize)> = rows
            .par_iter()
            .map(|&y| {
                let mut sum = 0.0;
                let mut clusters = 0;
                if y + 1 < height {
                    let mut x = y % 4 + 1;
                    while x + 1 < width {
                        sum += self.cluster_noise(x as i64, y as i64);
                        clusters += 1;
                        x += NOISE_STRIDE;
                    }
                }
                (sum, clusters)
            })
            .collect();

        let (sum, clusters) = partials
            .into_iter()
            .fold((0.0, 0), |(s, c), (ps, pc)| (s + ps, c + pc));
        if clusters == 0 {
            return 0.0;
        }
        sum / clusters as f64
    }

    fn cluster_noise(&self, x: i64, y: i64) -> f64 {
        let ring = CLUSTER_RING.map(|(dx, dy)| self.image.get(x + dx, y + dy).unwrap_or_default());
        let diff: f64 = ring
            .windows(2)
            .map(|pair| channel_difference(pair[1], pair[0]) as f64 / 765.0)
            .sum();
        diff / 8.0
    }

    fn exposure_tally(&self) -> ExposureTally {
        let (width, height) = (self.image.width(), self.image.height());
        let partials: Vec<ExposureTally> = (0..height)
            .into_par_iter()
            .map(|y| {
                let mut tally = ExposureTally::default();
                let mut x = y % EXPOSURE_STRIDE;
                loop {
                    let exposure = mean_brightness(self.image.pixel(x.min(width - 1), y));
                    if exposure >= OVEREXPOSED_LEVEL {
                        tally.over += 1;
                    }
                    if exposure <= UNDEREXPOSED_LEVEL {
                        tally.under += 1;
                    }
                    tally.total += exposure as u64;
                    tally.count += 1;
                    x += EXPOSURE_STRIDE;
                    if x >= width {
                        break;
                    }
                }
                tally
            })
            .collect();
        partials
            .into_iter()
            .fold(ExposureTally::default(), ExposureTally::merge)
    }

    /// Fraction of grid samples whose channel mean is at least 253
    pub fn overexposure_ratio(&self) -> f64 {
        let tally = self.exposure_tally();
        tally.over as f64 / tally.count as f64
    }

    /// Fraction of grid samples whose channel mean is at most 6
    pub fn underexposure_ratio(&self) -> f64 {
        let tally = self.exposure_tally();
        tally.under as f64 / tally.count as f64
    }

    /// Mean of the per-sample channel mean, 0..=255
    pub fn average_exposure(&self) -> f64 {
        let tally = self.exposure_tally();
        tally.total as f64 / tally.count as f64
    }

    /// Measure everything and compare against `gates`
    pub fn validate(&self, gates: &QualityGates) -> Result<QualityReport> {
        let tally = self.exposure_tally();
        let count = tally.count as f64;
        let report = QualityReport {
            noise_level: self.noise_level(),
            overexposure_ratio: tally.over as f64 / count,
            underexposure_ratio: tally.under as f64 / count,
            average_exposure: tally.total as f64 / count,
        };
        debug!("quality report: {:?}", report);

        let issue = if report.noise_level > gates.max_noise {
            Some(QualityIssue::Noise {
                level: report.noise_level,
                limit: gates.max_noise,
            })
        } else if report.overexposure_ratio > gates.max_overexposure {
            Some(QualityIssue::Overexposed {
                ratio: report.overexposure_ratio,
                limit: gates.max_overexposure,
            })
        } else if report.underexposure_ratio > gates.max_underexposure {
            Some(QualityIssue::Underexposed {
                ratio: report.underexposure_ratio,
                limit: gates.max_underexposure,
            })
        } else {
            None
        };

        match issue {
            Some(issue) => {
                warn!("image rejected: {}", issue);
                Err(StripError::QualityRejected(issue))
            }
            None => Ok(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Color;

    const BLACK: Color = Color::new(0, 0, 0);
    const WHITE: Color = Color::new(255, 255, 255);

    fn checkerboard(width: usize, height: usize, a: Color, b: Color) -> PixelImage {
        PixelImage::from_fn(width, height, |x, y| if (x + y) % 2 == 0 { a } else { b })
    }

    #[test]
    fn test_uniform_image_has_no_noise() {
        let img = PixelImage::filled(64, 48, Color::new(90, 140, 30));
        assert_eq!(ImageValidator::new(&img).noise_level(), 0.0);
    }

    #[test]
    fn test_checkerboard_is_maximal_noise() {
        let img = checkerboard(64, 48, BLACK, WHITE);
        let noise = ImageValidator::new(&img).noise_level();
        assert!((noise - 1.0).abs() < 1e-9, "noise = {}", noise);
    }

    #[test]
    fn test_tiny_image_noise_is_zero() {
        let img = checkerboard(2, 2, BLACK, WHITE);
        assert_eq!(ImageValidator::new(&img).noise_level(), 0.0);
    }

    #[test]
    fn test_exposure_ratios() {
        let white = PixelImage::filled(40, 40, WHITE);
        let v = ImageValidator::new(&white);
        assert_eq!(v.overexposure_ratio(), 1.0);
        assert_eq!(v.underexposure_ratio(), 0.0);

        let black = PixelImage::filled(40, 40, BLACK);
        let v = ImageValidator::new(&black);
        assert_eq!(v.overexposure_ratio(), 0.0);
        assert_eq!(v.underexposure_ratio(), 1.0);
    }

    #[test]
    fn test_average_exposure_half_split() {
        let img = PixelImage::from_fn(40, 40, |_, y| if y < 20 { BLACK } else { WHITE });
        let avg = ImageValidator::new(&img).average_exposure();
        assert!((avg - 127.5).abs() < 1e-4, "average = {}", avg);
    }

    #[test]
    fn test_narrow_image_clamps_samples() {
        let img = PixelImage::filled(2, 8, WHITE);
        assert_eq!(ImageValidator::new(&img).overexposure_ratio(), 1.0);
    }

    #[test]
    fn test_validate_gates() {
        let gates = QualityGates::default();
        let gray = PixelImage::filled(64, 64, Color::new(128, 128, 128));
        let report = ImageValidator::new(&gray).validate(&gates).unwrap();
        assert_eq!(report.average_exposure, 128.0);

        let noisy = checkerboard(64, 64, BLACK, WHITE);
        assert!(matches!(
            ImageValidator::new(&noisy).validate(&gates),
            Err(StripError::QualityRejected(QualityIssue::Noise { .. }))
        ));

        let bright = PixelImage::filled(64, 64, WHITE);
        assert!(matches!(
            ImageValidator::new(&bright).validate(&gates),
            Err(StripError::QualityRejected(QualityIssue::Overexposed { .. }))
        ));

        let dark = PixelImage::filled(64, 64, BLACK);
        assert!(matches!(
            ImageValidator::new(&dark).validate(&gates),
            Err(StripError::QualityRejected(QualityIssue::Underexposed { .. }))
        ));
    }
}
