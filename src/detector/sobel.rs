//! Sobel gradient edge detector.
//!
//! Gradients are taken over a square of eight neighbours at a
//! resolution-dependent distance instead of the immediate 3x3 ring, so JPEG
//! blocking and sensor noise at pixel scale do not register as edges.

use log::debug;
use rayon::prelude::*;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::config::EdgeParams;
use crate::detector::edges::{EdgeDetector, fill_gaps, offset_distance, prune};
use crate::models::{EdgeMap, PixelImage, PointI};
use crate::utils::brightness::mean_brightness_parallel;

/// Eight neighbours of a centre pixel at distance `d`, clockwise from the top-left.
///
/// Neighbours that fall outside the image are replaced by the centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SobelSquare {
    center: PointI,
    points: [PointI; 8],
}

impl SobelSquare {
    pub fn new(x: i64, y: i64, distance: i64, width: usize, height: usize) -> Self {
        let d = distance;
        let center = PointI::new(x, y);
        let offsets = [
            (-d, -d),
            (0, -d),
            (d, -d),
            (d, 0),
            (d, d),
            (0, d),
            (-d, d),
            (-d, 0),
        ];
        let points = offsets.map(|(dx, dy)| {
            let p = PointI::new(x + dx, y + dy);
            if p.x < 0 || p.y < 0 || p.x as usize >= width || p.y as usize >= height {
                center
            } else {
                p
            }
        });
        Self { center, points }
    }

    pub fn center(&self) -> PointI {
        self.center
    }

    /// Neighbour positions in square order
    pub fn adjacent_points(&self) -> &[PointI; 8] {
        &self.points
    }

    fn values(&self, plane: &[u8], width: usize) -> [i32; 8] {
        self.points
            .map(|p| plane[p.y as usize * width + p.x as usize] as i32)
    }

    /// Response of the kernel that reacts to brightness changing from top to bottom
    pub fn horizontal(&self, plane: &[u8], width: usize) -> i32 {
        let p = self.values(plane, width);
        -p[0] - 2 * p[1] - p[2] + p[6] + 2 * p[5] + p[4]
    }

    /// Response of the kernel that reacts to brightness changing from left to right
    pub fn vertical(&self, plane: &[u8], width: usize) -> i32 {
        let p = self.values(plane, width);
        -p[0] - 2 * p[7] - p[6] + p[4] + 2 * p[3] + p[2]
    }

    /// Gradient magnitude and orientation in `(0, 2π]`
    pub fn gradient(&self, plane: &[u8], width: usize) -> (f64, f64) {
        let h = self.horizontal(plane, width) as f64;
        let v = self.vertical(plane, width) as f64;
        let magnitude = (h * h + v * v).sqrt();
        let angle = (v + 1e-4).atan2(h + 1e-4) + PI;
        (magnitude, angle)
    }
}

/// True when `angle` lies within `tolerance` of a multiple of π/2
pub fn is_sharp_edge(angle: f64, tolerance: f64) -> bool {
    let orientation = angle.rem_euclid(FRAC_PI_2);
    orientation.min(FRAC_PI_2 - orientation) < tolerance
}

/// Sobel detector with orientation filter and neighbour pruning
#[derive(Debug, Clone, PartialEq)]
pub struct SobelDetector {
    magnitude_threshold: f64,
    sharp_angle_tolerance: f64,
    prune_limits: Vec<usize>,
}

impl Default for SobelDetector {
    fn default() -> Self {
        Self {
            magnitude_threshold: 0.18,
            sharp_angle_tolerance: FRAC_PI_4,
            prune_limits: vec![4, 3, 2, 2],
        }
    }
}

impl SobelDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: &EdgeParams) -> Self {
        Self {
            magnitude_threshold: params.magnitude_threshold,
            sharp_angle_tolerance: params.sharp_angle_tolerance,
            prune_limits: params.prune_limits.clone(),
        }
    }

    /// Gradient magnitude normalized to `[0, 1]` by the image maximum, plus orientation
    pub fn gradients(&self, image: &PixelImage) -> (Vec<f64>, Vec<f64>) {
        let (width, height) = (image.width(), image.height());
        let distance = offset_distance(width, height) as i64;
        let plane = mean_brightness_parallel(image);

        let mut field = vec![(0.0f64, 0.0f64); width * height];
        field.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let square = SobelSquare::new(x as i64, y as i64, distance, width, height);
                *cell = square.gradient(&plane, width);
            }
        });

        let max = field.iter().fold(0.0f64, |m, &(mag, _)| m.max(mag));
        let (mut magnitudes, angles): (Vec<f64>, Vec<f64>) = field.into_iter().unzip();
        if max > 0.0 {
            magnitudes.par_iter_mut().for_each(|m| *m /= max);
        }
        (magnitudes, angles)
    }
}

impl EdgeDetector for SobelDetector {
    fn detect(&self, image: &PixelImage) -> EdgeMap {
        let (width, height) = (image.width(), image.height());
        let distance = offset_distance(width, height);
        let (magnitudes, angles) = self.gradients(image);

        let x_limit = width.saturating_sub(distance + 1);
        let y_limit = height.saturating_sub(distance + 1);
        let mut mask = vec![false; width * height];
        mask.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            if y >= y_limit {
                return;
            }
            for (x, cell) in row.iter_mut().enumerate().take(x_limit) {
                let i = y * width + x;
                *cell = magnitudes[i] > self.magnitude_threshold
                    && is_sharp_edge(angles[i], self.sharp_angle_tolerance);
            }
        });

        let mut mask = fill_gaps(&mask, width, height);
        for &limit in &self.prune_limits {
            mask = prune(&mask, width, height, limit);
        }

        let edges = EdgeMap::from_mask(width, height, &mask);
        debug!(
            "sobel: {} edge pixels (distance {}) in {}x{}",
            edges.len(),
            distance,
            width,
            height
        );
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Color;

    fn split_image(width: usize, height: usize) -> PixelImage {
        PixelImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Color::new(0, 0, 0)
            } else {
                Color::new(255, 255, 255)
            }
        })
    }

    #[test]
    fn test_square_clamps_to_center() {
        let square = SobelSquare::new(0, 0, 3, 10, 10);
        let points = square.adjacent_points();
        assert_eq!(points[0], PointI::new(0, 0));
        assert_eq!(points[1], PointI::new(0, 0));
        assert_eq!(points[3], PointI::new(3, 0));
        assert_eq!(points[4], PointI::new(3, 3));
        assert_eq!(points[7], PointI::new(0, 0));
    }

    #[test]
    fn test_kernels_on_vertical_split() {
        let img = split_image(20, 20);
        let plane = mean_brightness_parallel(&img);
        let square = SobelSquare::new(10, 10, 2, 20, 20);
        assert_eq!(square.horizontal(&plane, 20), 0);
        assert_eq!(square.vertical(&plane, 20), 4 * 255);
    }

    #[test]
    fn test_sharp_edge_filter() {
        assert!(is_sharp_edge(0.1, FRAC_PI_4));
        assert!(is_sharp_edge(3.0 * FRAC_PI_2 + 0.05, FRAC_PI_4));
        assert!(!is_sharp_edge(FRAC_PI_4, 0.5));
        assert!(is_sharp_edge(FRAC_PI_2 - 0.1, 0.5));
    }

    #[test]
    fn test_uniform_image_has_no_edges() {
        let img = PixelImage::filled(50, 40, Color::new(120, 80, 200));
        assert!(SobelDetector::new().detect(&img).is_empty());
    }

    #[test]
    fn test_split_edges() {
        let img = split_image(400, 300);
        let edges = SobelDetector::new().detect(&img);
        assert!(edges.contains(200, 150));
        assert!(edges.contains(197, 150));
        assert!(!edges.contains(100, 150));
        assert!(!edges.contains(300, 150));
    }

    #[test]
    fn test_gradients_are_normalized() {
        let img = split_image(64, 64);
        let (magnitudes, angles) = SobelDetector::new().gradients(&img);
        let max = magnitudes.iter().cloned().fold(0.0, f64::max);
        assert!((max - 1.0).abs() < 1e-12);
        assert!(angles.iter().all(|a| *a > 0.0 && *a <= 2.0 * PI + 1e-9));
    }
}
