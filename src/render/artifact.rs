//! Rendered output and its encodings

use std::fs;
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use thiserror::Error;

use super::raster::Raster;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("RGBA buffer of {actual} bytes does not fit {width}x{height}")]
    BufferSize {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Final image of a render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub width: usize,
    pub height: usize,
    /// Row-major RGBA, `width * height * 4` bytes
    pub rgba: Vec<u8>,
    /// Meant for a double-density display
    pub double_density: bool,
}

impl RenderedImage {
    pub fn from_raster(raster: &Raster, double_density: bool) -> Self {
        Self {
            width: raster.width(),
            height: raster.height(),
            rgba: raster.data().to_vec(),
            double_density,
        }
    }

    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        to_rgba_image(self.width, self.height, self.rgba.clone())
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_rgba_image()?.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    /// Write the bare RGBA buffer
    pub fn save_raw(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.rgba)?;
        Ok(())
    }
}

pub(crate) fn to_rgba_image(width: usize, height: usize, rgba: Vec<u8>) -> Result<RgbaImage> {
    let size_error = |actual| RenderError::BufferSize {
        width,
        height,
        actual,
    };
    let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(size_error(rgba.len()));
    };
    let actual = rgba.len();
    RgbaImage::from_raw(w, h, rgba).ok_or_else(|| size_error(actual))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RenderedImage {
        let mut raster = Raster::new(4, 2);
        raster.fill_rect(0, 0, 2, 2, [255, 0, 0, 255]);
        RenderedImage::from_raster(&raster, false)
    }

    #[test]
    fn test_to_rgba_image() {
        let image = sample().to_rgba_image().unwrap();
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(3, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let mut image = sample();
        image.rgba.pop();
        assert!(matches!(
            image.to_rgba_image(),
            Err(RenderError::BufferSize { width: 4, height: 2, actual: 31 })
        ));
    }

    #[test]
    fn test_save_png_and_raw() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("out.png");
        let raw = dir.path().join("out.rgba");

        let image = sample();
        image.save_png(&png).unwrap();
        image.save_raw(&raw).unwrap();

        let decoded = image::open(&png).unwrap().to_rgba8();
        assert_eq!(decoded.into_raw(), image.rgba);
        assert_eq!(fs::read(&raw).unwrap(), image.rgba);
    }
}
