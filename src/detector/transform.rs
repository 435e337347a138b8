/// Re-orientation and cropping of the strip image
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use log::{debug, info};
use rayon::prelude::*;
use std::path::Path;

use crate::config::PipelineConfig;
use crate::detector::alignment::FiducialTriple;
use crate::detector::edges::detect_edges;
use crate::detector::finder::FieldFinder;
use crate::error::{Result, StripError};
use crate::models::{Field, FieldType, PixelImage, PixelRect, Point, PointI, WhiteBalance};
use crate::utils::geometry::rotate_point;

/// Rotates, crops and encodes one image
pub struct ImageTransformer<'a> {
    image: &'a PixelImage,
}

impl<'a> ImageTransformer<'a> {
    pub fn new(image: &'a PixelImage) -> Self {
        Self { image }
    }

    /// Rotate clockwise by `radians` about `pivot`, keeping the image size.
    ///
    /// Each output pixel takes the nearest source pixel; pixels that map
    /// outside the source are black.
    pub fn rotate(&self, pivot: Point, radians: f64) -> PixelImage {
        let (width, height) = (self.image.width(), self.image.height());
        let src = self.image.as_bytes();
        let mut data = vec![0u8; width * height * 3];

        data.par_chunks_mut(width * 3)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    let source =
                        rotate_point(Point::new(x as f64, y as f64), pivot, -radians).round();
                    if source.x < 0
                        || source.y < 0
                        || source.x as usize >= width
                        || source.y as usize >= height
                    {
                        continue;
                    }
                    let si = (source.y as usize * width + source.x as usize) * 3;
                    row[x * 3..x * 3 + 3].copy_from_slice(&src[si..si + 3]);
                }
            });

        PixelImage::from_raw_parts(width, height, data)
    }

    /// Copy out an inclusive pixel rectangle
    pub fn crop(&self, rect: PixelRect) -> Result<PixelImage> {
        if rect.start.x < 0 || rect.start.y < 0 || rect.width() <= 0 || rect.height() <= 0 {
            return Err(StripError::InvalidDimensions {
                width: rect.width().max(0) as usize,
                height: rect.height().max(0) as usize,
            });
        }
        self.image.sub_image(
            rect.start.x as usize,
            rect.start.y as usize,
            rect.width() as usize,
            rect.height() as usize,
        )
    }

    /// Locate the fiducials in this (already upright) image and crop to
    /// the rectangle from the left fiducial's top-left corner to the right
    /// fiducial's right edge and the bottom fiducial's lower edge.
    pub fn crop_to_fiducials(
        &self,
        config: &PipelineConfig,
        white_balance: WhiteBalance,
    ) -> Result<(PixelImage, FiducialTriple<Field>)> {
        let edges = detect_edges(self.image, &config.edges);
        let finder = FieldFinder::new(self.image, &edges, &config.layout, config.seeds)
            .with_white_balance(white_balance);
        let fields = finder.locate_fields(FieldType::Control, 3)?;
        let triple = FiducialTriple::from_fields(fields)?;
        let rect = Self::fiducial_rect(&triple)?;
        debug!("crop rectangle {:?}", rect);
        let cropped = self.crop(rect)?;
        info!("normalized strip: {}x{}", cropped.width(), cropped.height());
        Ok((cropped, triple))
    }

    /// Crop rectangle spanned by a classified fiducial triple
    pub fn fiducial_rect(triple: &FiducialTriple<Field>) -> Result<PixelRect> {
        let bounds = |f: &Field| {
            f.bounds().ok_or_else(|| {
                StripError::MalformedFieldData("fiducial field has no pixel bounds".to_string())
            })
        };
        let left = bounds(&triple.left)?;
        let right = bounds(&triple.right)?;
        let bottom = bounds(&triple.bottom)?;
        Ok(PixelRect {
            start: left.start,
            end: PointI::new(right.end.x, bottom.end.y),
        })
    }

    /// Encode as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf).write_image(
            self.image.as_bytes(),
            self.image.width() as u32,
            self.image.height() as u32,
            image::ColorType::Rgb8,
        )?;
        Ok(buf)
    }

    /// Write a PNG file; any other extension is refused
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if extension != "png" {
            return Err(StripError::LossyEncoding(extension));
        }
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Color;
    use std::f64::consts::FRAC_PI_2;

    fn gradient(width: usize, height: usize) -> PixelImage {
        PixelImage::from_fn(width, height, |x, y| Color::new(x as u8, y as u8, 77))
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let img = gradient(40, 30);
        let rotated = ImageTransformer::new(&img).rotate(Point::new(12.0, 7.0), 0.0);
        assert_eq!(rotated, img);
    }

    #[test]
    fn test_rotate_quarter_turn_clockwise() {
        let img = PixelImage::from_fn(21, 21, |x, y| {
            if x == 15 && y == 10 {
                Color::new(255, 0, 0)
            } else {
                Color::new(0, 0, 255)
            }
        });
        let rotated = ImageTransformer::new(&img).rotate(Point::new(10.0, 10.0), FRAC_PI_2);
        // Right of the pivot moves below it
        assert_eq!(rotated.pixel(10, 15), Color::new(255, 0, 0));
        assert_eq!(rotated.pixel(15, 10), Color::new(0, 0, 255));
        assert_eq!(rotated.pixel(10, 10), Color::new(0, 0, 255));
    }

    #[test]
    fn test_rotate_fills_black() {
        let img = PixelImage::filled(40, 20, Color::new(200, 200, 200));
        let rotated = ImageTransformer::new(&img).rotate(Point::new(0.0, 0.0), 0.5);
        assert_eq!(rotated.pixel(39, 0), Color::new(0, 0, 0));
        assert_eq!(rotated.pixel(2, 2), Color::new(200, 200, 200));
    }

    #[test]
    fn test_crop() {
        let img = gradient(50, 40);
        let rect = PixelRect {
            start: PointI::new(10, 5),
            end: PointI::new(19, 24),
        };
        let cropped = ImageTransformer::new(&img).crop(rect).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (10, 20));
        assert_eq!(cropped.pixel(0, 0), Color::new(10, 5, 77));

        let inverted = PixelRect {
            start: PointI::new(19, 24),
            end: PointI::new(10, 5),
        };
        assert!(ImageTransformer::new(&img).crop(inverted).is_err());
    }

    #[test]
    fn test_png_round_trip() {
        let img = gradient(16, 9);
        let bytes = ImageTransformer::new(&img).encode_png().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(PixelImage::from_rgb_image(decoded), img);
    }

    #[test]
    fn test_save_refuses_lossy_extension() {
        let img = gradient(8, 8);
        let dir = tempfile::tempdir().unwrap();
        let transformer = ImageTransformer::new(&img);
        assert!(matches!(
            transformer.save_png(dir.path().join("strip.jpg")),
            Err(StripError::LossyEncoding(ext)) if ext == "jpg"
        ));
        let path = dir.path().join("strip.PNG");
        transformer.save_png(&path).unwrap();
        assert!(path.exists());
    }
}
