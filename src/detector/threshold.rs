/// Adaptive brightness-difference edge detector
use rayon::prelude::*;

use crate::config::EdgeParams;
use crate::detector::edges::{EdgeDetector, fill_gaps, offset_distance};
use crate::models::{Color, EdgeMap, PixelImage, PointI};
use crate::utils::brightness::max_brightness_parallel;
use crate::utils::color::channel_differences;

/// Flags pixels whose colour differs from a neighbour `d` pixels away
/// (same row or same column) by more than a contrast-scaled threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveThresholdDetector {
    scale: f64,
    fixed_threshold: Option<i32>,
}

impl Default for AdaptiveThresholdDetector {
    fn default() -> Self {
        Self {
            scale: 135.0,
            fixed_threshold: None,
        }
    }
}

impl AdaptiveThresholdDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: &EdgeParams) -> Self {
        Self {
            scale: params.adaptive_scale,
            fixed_threshold: None,
        }
    }

    /// Skip contrast estimation and use `threshold` for every image
    pub fn with_threshold(threshold: i32) -> Self {
        Self {
            scale: 0.0,
            fixed_threshold: Some(threshold),
        }
    }

    /// Global contrast in roughly `[0, 2]`: mean absolute deviation of the
    /// per-pixel brightest channel from the image average, over 127.
    pub fn contrast(image: &PixelImage) -> f64 {
        let width = image.width();
        let plane = max_brightness_parallel(image);
        let average = (plane.iter().map(|&v| v as u64).sum::<u64>() / plane.len() as u64) as i64;

        let rows: Vec<usize> = (0..image.height()).step_by(2).collect();
        let (deviation, samples) = rows
            .par_iter()
            .map(|&y| {
                let row = &plane[y * width..(y + 1) * width];
                row.iter().step_by(2).fold((0i64, 0usize), |(d, n), &v| {
                    (d + (average - v as i64).abs(), n + 1)
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .fold((0i64, 0usize), |(d, n), (rd, rn)| (d + rd, n + rn));

        (deviation as f64 / samples as f64) / 127.0
    }

    /// Threshold applied to `image`
    pub fn threshold_for(&self, image: &PixelImage) -> i32 {
        match self.fixed_threshold {
            Some(t) => t,
            None => (self.scale * Self::contrast(image)) as i32,
        }
    }

    /// Edge test between two colours
    pub fn is_edge(a: Color, b: Color, threshold: i32) -> bool {
        let diffs = channel_differences(a, b);
        diffs.iter().any(|&d| d > threshold) || diffs.iter().sum::<i32>() > threshold * 2
    }
}

impl EdgeDetector for AdaptiveThresholdDetector {
    fn detect(&self, image: &PixelImage) -> EdgeMap {
        let (width, height) = (image.width(), image.height());
        let distance = offset_distance(width, height);
        let half = (distance / 2) as i64;
        let threshold = self.threshold_for(image);

        let rows: Vec<usize> = (distance..height).step_by(2).collect();
        let found: Vec<Vec<PointI>> = rows
            .par_iter()
            .map(|&y| {
                let mut points = Vec::new();
                for x in (distance..width).step_by(2) {
                    let current = image.pixel(x, y);
                    if Self::is_edge(current, image.pixel(x - distance, y), threshold) {
                        points.push(PointI::new(x as i64 - half, y as i64));
                    }
                    if Self::is_edge(current, image.pixel(x, y - distance), threshold) {
                        points.push(PointI::new(x as i64, y as i64 - half));
                    }
                }
                points
            })
            .collect();

        let mut mask = vec![false; width * height];
        for p in found.iter().flatten() {
            mask[p.y as usize * width + p.x as usize] = true;
        }
        let mask = fill_gaps(&mask, width, height);
        EdgeMap::from_mask(width, height, &mask)
    }
}
