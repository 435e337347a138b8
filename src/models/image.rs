use crate::error::{Result, StripError};
use crate::models::Color;

/// Immutable RGB pixel grid (3 bytes per pixel, row-major)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelImage {
    /// Wrap a packed RGB buffer
    pub fn from_rgb(data: Vec<u8>, width: usize, height: usize) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(3))
            .filter(|_| width > 0 && height > 0)
            .ok_or(StripError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(StripError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap a buffer whose length is already known to be `width * height * 3`
    pub(crate) fn from_raw_parts(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height * 3);
        Self {
            width,
            height,
            data,
        }
    }

    /// Build an image by evaluating `f(x, y)` for every pixel
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Color,
    {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                let c = f(x, y);
                data.extend_from_slice(&[c.red, c.green, c.blue]);
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Uniformly coloured image
    pub fn filled(width: usize, height: usize, color: Color) -> Self {
        Self::from_fn(width, height, |_, _| color)
    }

    /// Convert from a decoded `image` buffer
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width: width as usize,
            height: height as usize,
            data: img.into_raw(),
        }
    }

    /// Convert into an `image` buffer for encoding
    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let c = self.pixel(x as usize, y as usize);
            image::Rgb([c.red, c.green, c.blue])
        })
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of pixels
    pub fn resolution(&self) -> usize {
        self.width * self.height
    }

    /// Raw packed RGB bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Colour at (x, y). Panics when the coordinate lies outside the image.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        let idx = (y * self.width + x) * 3;
        Color::new(self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    /// Colour at signed (x, y), `None` outside the image
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<Color> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.pixel(x as usize, y as usize))
    }

    /// Row `y` as packed RGB bytes
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.width * 3;
        &self.data[start..start + self.width * 3]
    }

    /// Copy out the rectangle starting at (x, y), clipped to the image
    pub fn sub_image(&self, x: usize, y: usize, width: usize, height: usize) -> Result<Self> {
        if x >= self.width || y >= self.height {
            return Err(StripError::InvalidDimensions { width, height });
        }
        let width = width.min(self.width - x);
        let height = height.min(self.height - y);
        if width == 0 || height == 0 {
            return Err(StripError::InvalidDimensions { width, height });
        }
        let mut data = Vec::with_capacity(width * height * 3);
        for row in y..y + height {
            let start = (row * self.width + x) * 3;
            data.extend_from_slice(&self.data[start..start + width * 3]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_lookup() {
        let img = PixelImage::from_fn(4, 3, |x, y| Color::new(x as u8, y as u8, 7));
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 3);
        assert_eq!(img.pixel(3, 2), Color::new(3, 2, 7));
        assert_eq!(img.get(-1, 0), None);
        assert_eq!(img.get(4, 0), None);
        assert_eq!(img.get(1, 1), Some(Color::new(1, 1, 7)));
    }

    #[test]
    fn test_from_rgb_checks_length() {
        assert!(PixelImage::from_rgb(vec![0; 12], 2, 2).is_ok());
        assert!(matches!(
            PixelImage::from_rgb(vec![0; 11], 2, 2),
            Err(StripError::BufferSize { .. })
        ));
        assert!(PixelImage::from_rgb(Vec::new(), 0, 0).is_err());
    }

    #[test]
    fn test_from_rgb_rejects_overflowing_dimensions() {
        let huge = usize::MAX / 2;
        assert!(matches!(
            PixelImage::from_rgb(vec![0; 12], huge, 2),
            Err(StripError::InvalidDimensions { width, height: 2 }) if width == huge
        ));
        assert!(matches!(
            PixelImage::from_rgb(vec![0; 12], usize::MAX, usize::MAX),
            Err(StripError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_sub_image_clips() {
        let img = PixelImage::from_fn(10, 10, |x, y| Color::new(x as u8, y as u8, 0));
        let sub = img.sub_image(8, 7, 5, 5).unwrap();
        assert_eq!((sub.width(), sub.height()), (2, 3));
        assert_eq!(sub.pixel(0, 0), Color::new(8, 7, 0));
        assert_eq!(sub.pixel(1, 2), Color::new(9, 9, 0));
    }

    #[test]
    fn test_rgb_image_conversion() {
        let img = PixelImage::from_fn(3, 2, |x, y| Color::new(x as u8 * 10, y as u8 * 20, 5));
        let back = PixelImage::from_rgb_image(img.to_rgb_image());
        assert_eq!(img, back);
    }
}
