//! Raster side of a render.
//!
//! # Architecture
//!
//! ```text
//! render_bytes / Playback
//! ├── Font (glyph bitmaps, per preset)
//! ├── Palette (ANSI, CED, Workbench)
//! ├── Compositor
//! │   ├── visible surface
//! │   └── blink masks (on / off)
//! ├── downsample (thumbnail box filter)
//! └── RenderedImage / GifRecorder (output)
//! ```

pub mod artifact;
pub mod compositor;
pub mod downsample;
pub mod font;
mod font_data;
pub mod gif;
pub mod palette;
pub mod raster;

pub use artifact::{RenderError, RenderedImage, Result};
pub use gif::GifRecorder;

use crate::config::{RenderConfig, RenderOptions};
use crate::core::session::Playback;
use downsample::{block_factor, downsample};

/// Render a whole art file to a still image
///
/// The stream is interpreted in one pass with no pacing. Columns follow
/// the override, then the SAUCE width, then the mode default.
pub fn render_bytes(bytes: &[u8], options: &RenderOptions) -> RenderedImage {
    let config = RenderConfig::validate(options);
    let mut playback = Playback::new(bytes.to_vec(), config);
    playback.render_all();

    let config = playback.config();
    let visible = playback.compositor().visible();
    let factor = block_factor(config.thumbnail);
    if factor > 1 {
        RenderedImage::from_raster(&downsample(visible, factor), config.double_density)
    } else {
        RenderedImage::from_raster(visible, config.double_density)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::palette::Palette;

    #[test]
    fn test_render_dimensions() {
        let image = render_bytes(b"hi", &RenderOptions::default());
        assert_eq!((image.width, image.height), (80 * 8, 26 * 16));
        assert_eq!(image.rgba.len(), image.width * image.height * 4);
        assert!(!image.double_density);
    }

    #[test]
    fn test_render_options_applied() {
        let options = RenderOptions {
            columns: Some(40),
            rows: Some(10),
            font: Some("80x50".to_string()),
            double: Some(1),
            ..Default::default()
        };
        let image = render_bytes(b"", &options);
        assert_eq!((image.width, image.height), (320, 80));
        assert!(image.double_density);
    }

    #[test]
    fn test_render_huge_columns_clamped() {
        use crate::config::MAX_COLUMNS;

        let options = RenderOptions {
            columns: Some(i64::MAX),
            rows: Some(1),
            ..Default::default()
        };
        let image = render_bytes(b"x", &options);
        assert_eq!((image.width, image.height), (MAX_COLUMNS * 8, 16));
        assert_eq!(image.rgba.len(), image.width * image.height * 4);
    }

    #[test]
    fn test_render_thumbnail() {
        let options = RenderOptions {
            columns: Some(2),
            rows: Some(1),
            thumbnail: Some(1),
            ..Default::default()
        };
        let image = render_bytes(b"\x1b[34m\xdb", &options);
        // 16x16 pixels at factor 8
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(&image.rgba[..4], &Palette::Ansi.color(4));
        assert_eq!(&image.rgba[4..8], &Palette::Ansi.color(0));
    }

    #[test]
    fn test_render_nine_bit_palette() {
        let options = RenderOptions {
            bits: Some("9".to_string()),
            columns: Some(1),
            rows: Some(1),
            ..Default::default()
        };
        let image = render_bytes(b"\xdb", &options);
        assert_eq!(image.width, 9);
    }
}
