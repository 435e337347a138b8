//! Per-pixel brightness planes
//!
//! Rows are processed in parallel; every pixel is computed independently so
//! the result does not depend on scheduling.
use rayon::prelude::*;

use crate::models::PixelImage;

/// Integer channel mean (r + g + b) / 3 for every pixel
pub fn mean_brightness_parallel(img: &PixelImage) -> Vec<u8> {
    brightness_plane(img, |r, g, b| ((r as u16 + g as u16 + b as u16) / 3) as u8)
}

/// Brightest channel for every pixel
pub fn max_brightness_parallel(img: &PixelImage) -> Vec<u8> {
    brightness_plane(img, |r, g, b| r.max(g).max(b))
}

fn brightness_plane<F>(img: &PixelImage, f: F) -> Vec<u8>
where
    F: Fn(u8, u8, u8) -> u8 + Sync,
{
    let width = img.width();
    let mut plane = vec![0u8; img.resolution()];

    // Process rows in parallel
    plane.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let src = img.row(y);
        for (x, out) in row.iter_mut().enumerate() {
            let idx = x * 3;
            *out = f(src[idx], src[idx + 1], src[idx + 2]);
        }
    });

    plane
}
