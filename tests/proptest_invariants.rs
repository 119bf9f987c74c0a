//! Property-based invariants for the interpreter and downsampler.
//!
//! 1. The cursor stays on the surface for any byte stream.
//! 2. Chunk size never changes the final visible surface.
//! 3. A uniform raster downsamples to the same color.

use ansiplay::core::term::Interpreter;
use ansiplay::render::compositor::Compositor;
use ansiplay::render::downsample::downsample;
use ansiplay::render::font::{BitmapFont, Font};
use ansiplay::render::raster::Raster;
use ansiplay::{Bits, ByteSource, RenderConfig};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Bytes weighted toward escape syntax
fn art_byte() -> impl Strategy<Value = u8> {
    prop_oneof![
        4 => any::<u8>(),
        2 => Just(0x1b),
        2 => Just(b'['),
        2 => Just(b';'),
        1 => Just(b'\n'),
        1 => Just(b'\r'),
        3 => (b'0'..=b'9'),
        3 => prop::sample::select(b"ABCDHJKmstu".to_vec()),
    ]
}

fn art() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(art_byte(), 0..600)
}

fn setup(cols: usize, rows: usize) -> (Interpreter, Compositor, BitmapFont) {
    let config = RenderConfig::default();
    let font = BitmapFont::preset("80x50", Bits::Eight);
    let compositor = Compositor::new(cols, rows, font.width(), font.height(), [0, 0, 0, 255]);
    (Interpreter::new(cols, rows, &config), compositor, font)
}

proptest! {
    #[test]
    fn cursor_always_in_bounds(
        cols in 1usize..=20,
        rows in 1usize..=10,
        bytes in art(),
    ) {
        let (mut interpreter, mut compositor, font) = setup(cols, rows);
        let mut source = ByteSource::new(bytes);
        while interpreter.read(&mut source, 1, &font, &mut compositor).consumed > 0 {
            let cursor = interpreter.state().cursor;
            prop_assert!((1..=cols).contains(&cursor.x), "x = {} of {}", cursor.x, cols);
            prop_assert!((1..=rows).contains(&cursor.y), "y = {} of {}", cursor.y, rows);
        }
        prop_assert!(source.eof());
    }

    #[test]
    fn chunking_does_not_change_surface(bytes in art(), chunk in 1usize..64) {
        let (mut bulk, mut bulk_surface, font) = setup(12, 6);
        let mut source = ByteSource::new(bytes.clone());
        bulk.read_to_end(&mut source, &font, &mut bulk_surface);

        let (mut paced, mut paced_surface, _) = setup(12, 6);
        let mut source = ByteSource::new(bytes);
        while paced.read(&mut source, chunk, &font, &mut paced_surface).consumed > 0 {}

        prop_assert_eq!(bulk_surface.visible(), paced_surface.visible());
        prop_assert_eq!(bulk.scroll_count(), paced.scroll_count());
    }

    #[test]
    fn uniform_block_keeps_color(
        color in any::<[u8; 4]>(),
        shift in 1u32..=3,
        blocks_x in 1usize..6,
        blocks_y in 1usize..6,
    ) {
        let factor = 1usize << shift;
        let mut raster = Raster::new(blocks_x * factor, blocks_y * factor);
        raster.fill_rect(0, 0, raster.width(), raster.height(), color);

        let out = downsample(&raster, factor);
        prop_assert_eq!((out.width(), out.height()), (blocks_x, blocks_y));
        for px in out.data().chunks_exact(4) {
            prop_assert_eq!(px, &color[..]);
        }
    }

    #[test]
    fn factor_one_is_identity(
        width in 1usize..20,
        height in 1usize..20,
        color in any::<[u8; 4]>(),
    ) {
        let mut raster = Raster::new(width, height);
        raster.fill_rect(0, 0, width / 2 + 1, height, color);
        prop_assert_eq!(downsample(&raster, 1), raster);
    }
}
