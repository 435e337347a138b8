use image::GenericImageView;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::detector::transform::ImageTransformer;
use crate::error::Result;
use crate::models::{Color, EdgeMap, PixelImage};

fn max_dim_from_env() -> Option<u32> {
    match env::var("STRIP_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Decode an image file into an RGB pixel grid.
///
/// When `STRIP_MAX_DIM` is set, larger photographs are downscaled so their
/// longest side fits.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<PixelImage> {
    let img = image::open(path)?;
    let rgb = match max_dim_from_env() {
        Some(max_dim) if img.dimensions().0.max(img.dimensions().1) > max_dim => img
            .resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
            .to_rgb8(),
        _ => img.to_rgb8(),
    };
    Ok(PixelImage::from_rgb_image(rgb))
}

/// Write a PNG; other extensions are refused.
pub fn save_image<P: AsRef<Path>>(image: &PixelImage, path: P) -> Result<()> {
    ImageTransformer::new(image).save_png(path)
}

/// Copy of `image` with every edge pixel painted `color`.
pub fn paint_edges(image: &PixelImage, edges: &EdgeMap, color: Color) -> PixelImage {
    PixelImage::from_fn(image.width(), image.height(), |x, y| {
        if edges.contains(x as i64, y as i64) {
            color
        } else {
            image.pixel(x, y)
        }
    })
}

/// Expand directories into the image files below them; plain files pass through.
pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = collect_images(input);
            found.sort();
            out.extend(found);
        } else {
            out.push(input.clone());
        }
    }
    out
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if ext == "png" || ext == "jpg" || ext == "jpeg" || ext == "bmp" {
                    images.push(path);
                }
            }
        }
    }

    images
}
