/// Edge detection shared by the Sobel and adaptive-threshold detectors
use rayon::prelude::*;

use crate::config::{EdgeParams, EdgeStrategy};
use crate::detector::sobel::SobelDetector;
use crate::detector::threshold::AdaptiveThresholdDetector;
use crate::models::{EdgeMap, PixelImage};

/// Produces the edge set consumed by the field boundary search
pub trait EdgeDetector {
    fn detect(&self, image: &PixelImage) -> EdgeMap;
}

/// Build the detector selected by `params`
pub fn detector_for(params: &EdgeParams) -> Box<dyn EdgeDetector + Send + Sync> {
    match params.strategy {
        EdgeStrategy::Sobel => Box::new(SobelDetector::from_params(params)),
        EdgeStrategy::AdaptiveThreshold => {
            Box::new(AdaptiveThresholdDetector::from_params(params))
        }
    }
}

/// Run the configured detector on `image`
pub fn detect_edges(image: &PixelImage, params: &EdgeParams) -> EdgeMap {
    detector_for(params).detect(image)
}

/// Neighbour offset used by both detectors: round(log10(resolution)), at least 1
pub fn offset_distance(width: usize, height: usize) -> usize {
    let resolution = (width * height).max(1) as f64;
    (resolution.log10().round() as usize).max(1)
}

#[inline]
fn flag(mask: &[bool], width: usize, height: usize, x: i64, y: i64) -> bool {
    if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
        return false;
    }
    mask[y as usize * width + x as usize]
}

/// Close one-pixel gaps between flagged pixels.
///
/// A pixel is added when the pixels two steps apart on either side of it,
/// vertically, horizontally or along the main diagonal, are both flagged.
pub fn fill_gaps(mask: &[bool], width: usize, height: usize) -> Vec<bool> {
    let mut out = vec![false; mask.len()];

    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let y = y as i64;
        for (x, cell) in row.iter_mut().enumerate() {
            let x = x as i64;
            let at = |dx: i64, dy: i64| flag(mask, width, height, x + dx, y + dy);
            *cell = at(0, 0)
                || (at(0, -1) && at(0, 1))
                || (at(-1, 0) && at(1, 0))
                || (at(-1, -1) && at(1, 1));
        }
    });

    out
}

const NEIGHBOURS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

/// Number of flagged 8-neighbours of (x, y)
pub fn adjacent_count(mask: &[bool], width: usize, height: usize, x: i64, y: i64) -> usize {
    NEIGHBOURS
        .iter()
        .filter(|(dx, dy)| flag(mask, width, height, x + dx, y + dy))
        .count()
}

/// Drop flagged pixels with fewer than `limit` flagged neighbours.
///
/// Every pixel is judged against the input mask, so the result does not
/// depend on visiting order.
pub fn prune(mask: &[bool], width: usize, height: usize, limit: usize) -> Vec<bool> {
    let mut out = vec![false; mask.len()];

    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, cell) in row.iter_mut().enumerate() {
            *cell = mask[y * width + x]
                && adjacent_count(mask, width, height, x as i64, y as i64) >= limit;
        }
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(width: usize, height: usize, points: &[(usize, usize)]) -> Vec<bool> {
        let mut mask = vec![false; width * height];
        for &(x, y) in points {
            mask[y * width + x] = true;
        }
        mask
    }

    #[test]
    fn test_offset_distance() {
        assert_eq!(offset_distance(400, 300), 5);
        assert_eq!(offset_distance(2000, 1000), 6);
        assert_eq!(offset_distance(3, 3), 1);
        assert_eq!(offset_distance(1, 1), 1);
    }

    #[test]
    fn test_fill_gaps() {
        let mask = mask_from(8, 8, &[(2, 2), (2, 4), (4, 4), (6, 6)]);
        let filled = fill_gaps(&mask, 8, 8);
        assert!(filled[3 * 8 + 2], "vertical gap");
        assert!(filled[4 * 8 + 3], "horizontal gap");
        assert!(filled[5 * 8 + 5], "diagonal gap");
        assert!(filled[3 * 8 + 3], "diagonal gap from (2,2) to (4,4)");
        assert!(!filled[5 * 8 + 2]);
    }

    #[test]
    fn test_prune_removes_isolated_pixels() {
        let mut points = vec![(0, 0)];
        for y in 3..6 {
            for x in 3..6 {
                points.push((x, y));
            }
        }
        let mask = mask_from(8, 8, &points);
        let pruned = prune(&mask, 8, 8, 3);
        assert!(!pruned[0]);
        assert!(pruned[4 * 8 + 4]);
        assert!(pruned[3 * 8 + 3]);
        assert_eq!(adjacent_count(&mask, 8, 8, 4, 4), 8);
    }

    #[test]
    fn test_detector_for_strategy() {
        let img = PixelImage::from_fn(60, 40, |x, _| {
            if x < 30 {
                crate::models::Color::new(0, 0, 0)
            } else {
                crate::models::Color::new(255, 255, 255)
            }
        });
        let mut params = EdgeParams::default();
        assert!(detect_edges(&img, &params).contains(30, 20));
        params.strategy = EdgeStrategy::AdaptiveThreshold;
        assert!(detect_edges(&img, &params).contains(30, 21));
    }
}
