//! Glyph bitmaps
//!
//! A [`Font`] maps a character code to a fixed-size monochrome cell and
//! colors it on request. [`BitmapFont`] provides the built-in presets:
//!
//! | Preset  | Cell  | Source                                   |
//! |---------|-------|------------------------------------------|
//! | `80x25` | 8x16  | VGA-style ASCII table + generated CP437  |
//! | `80x50` | 8x8   | 8x8 ASCII table + generated CP437        |
//!
//! CP437 shades, block elements and box drawing are generated rather than
//! stored. In 9-bit mode cells gain a ninth column which repeats the eighth
//! for the line-drawing range 0xC0..=0xDF.

use super::font_data::{ASCII_8X16, ASCII_8X8};
use super::palette::{Palette, Rgba};
use crate::config::Bits;

/// Default preset name
pub const DEFAULT_PRESET: &str = "80x25";

/// Glyph source used by the interpreter
pub trait Font {
    /// Cell width in pixels
    fn width(&self) -> usize;
    /// Cell height in pixels
    fn height(&self) -> usize;
    /// Whether the glyph for `code` sets the pixel at (x, y)
    fn pixel(&self, code: u8, x: usize, y: usize) -> bool;

    /// Render `code` into `out` as RGBA, replacing its contents
    fn render_into(&self, code: u8, fg: Rgba, bg: Rgba, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.width() * self.height() * 4);
        for y in 0..self.height() {
            for x in 0..self.width() {
                out.extend_from_slice(if self.pixel(code, x, y) { &fg } else { &bg });
            }
        }
    }

    /// RGBA bitmap using palette indices
    fn get_data(&self, code: u8, palette: Palette, fg: u8, bg: u8) -> Vec<u8> {
        self.get_24bit_data(code, palette.color(fg), palette.color(bg))
    }

    /// RGBA bitmap using explicit colors
    fn get_24bit_data(&self, code: u8, fg: Rgba, bg: Rgba) -> Vec<u8> {
        let mut out = Vec::new();
        self.render_into(code, fg, bg, &mut out);
        out
    }
}

/// Line weight of a box-drawing arm
#[derive(Clone, Copy, PartialEq)]
enum Line {
    None,
    Single,
    Double,
}

use Line::{Double as D, None as N, Single as S};

/// Arms (up, down, left, right) for CP437 0xB3..=0xDA
const BOX_ARMS: [(Line, Line, Line, Line); 40] = [
    (S, S, N, N), // B3
    (S, S, S, N), // B4
    (S, S, D, N), // B5
    (D, D, S, N), // B6
    (N, D, S, N), // B7
    (N, S, D, N), // B8
    (D, D, D, N), // B9
    (D, D, N, N), // BA
    (N, D, D, N), // BB
    (D, N, D, N), // BC
    (D, N, S, N), // BD
    (S, N, D, N), // BE
    (N, S, S, N), // BF
    (S, N, N, S), // C0
    (S, N, S, S), // C1
    (N, S, S, S), // C2
    (S, S, N, S), // C3
    (N, N, S, S), // C4
    (S, S, S, S), // C5
    (S, S, N, D), // C6
    (D, D, N, S), // C7
    (D, N, N, D), // C8
    (N, D, N, D), // C9
    (D, N, D, D), // CA
    (N, D, D, D), // CB
    (D, D, N, D), // CC
    (N, N, D, D), // CD
    (D, D, D, D), // CE
    (S, N, D, D), // CF
    (D, N, S, S), // D0
    (N, S, D, D), // D1
    (N, D, S, S), // D2
    (D, N, N, S), // D3
    (S, N, N, D), // D4
    (N, S, N, D), // D5
    (N, D, N, S), // D6
    (D, D, S, S), // D7
    (S, S, D, D), // D8
    (S, N, S, N), // D9
    (N, S, N, S), // DA
];

/// Built-in bitmap font
#[derive(Clone)]
pub struct BitmapFont {
    name: &'static str,
    width: usize,
    height: usize,
    /// One row mask per (code, y); bit 8 is the leftmost pixel
    rows: Vec<u16>,
}

impl std::fmt::Debug for BitmapFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitmapFont")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl BitmapFont {
    /// Whether `name` is a known preset
    pub fn has(name: &str) -> bool {
        Self::lookup(name).is_some()
    }

    pub fn presets() -> &'static [&'static str] {
        &["80x25", "80x50"]
    }

    fn lookup(name: &str) -> Option<(&'static str, usize, &'static [u8])> {
        match name {
            "80x25" => Some(("80x25", 16, &ASCII_8X16[..])),
            "80x50" => Some(("80x50", 8, &ASCII_8X8[..])),
            _ => None,
        }
    }

    /// Load a preset, falling back to `80x25` for unknown names
    pub fn preset(name: &str, bits: Bits) -> Self {
        let (name, height, table) = Self::lookup(name).unwrap_or_else(|| {
            tracing::debug!("Unknown font preset {:?}, using {}", name, DEFAULT_PRESET);
            ("80x25", 16, &ASCII_8X16[..])
        });
        let nine_bit = bits == Bits::Nine;
        let mut rows = Vec::with_capacity(256 * height);
        for code in 0..=255u8 {
            for y in 0..height {
                let base = base_row(code, y, height, table) as u16;
                let ninth = nine_bit && (0xC0..=0xDF).contains(&code) && base & 1 != 0;
                rows.push((base << 1) | ninth as u16);
            }
        }
        Self {
            name,
            width: if nine_bit { 9 } else { 8 },
            height,
            rows,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Font for BitmapFont {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn pixel(&self, code: u8, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let row = self.rows[code as usize * self.height + y];
        row & (0x100 >> x) != 0
    }
}

/// Eight-pixel row for `code`, MSB leftmost
fn base_row(code: u8, y: usize, height: usize, table: &[u8]) -> u8 {
    match code {
        0x20..=0x7E => table[(code - 0x20) as usize * height + y],
        0xB0..=0xB2 | 0xDB..=0xDF | 0xFE => block_row(code, y, height),
        0xB3..=0xDA => box_row(BOX_ARMS[(code - 0xB3) as usize], y, height),
        _ => 0,
    }
}

fn mask_from(test: impl Fn(usize) -> bool) -> u8 {
    (0..8).fold(0u8, |acc, x| if test(x) { acc | (0x80 >> x) } else { acc })
}

fn block_row(code: u8, y: usize, height: usize) -> u8 {
    let half = height / 2;
    let odd = y % 2;
    match code {
        // Light shade: one pixel in four
        0xB0 => mask_from(|x| x % 4 == odd * 2),
        0xB1 => mask_from(|x| (x + y) % 2 == 0),
        // Dark shade: inverse of a shifted light shade
        0xB2 => mask_from(|x| x % 4 != 1 + odd * 2),
        0xDB => 0xFF,
        0xDC => if y >= half { 0xFF } else { 0x00 },
        0xDD => 0xF0,
        0xDE => 0x0F,
        0xDF => if y < half { 0xFF } else { 0x00 },
        0xFE => {
            let margin = height / 4;
            if y >= margin && y < height - margin {
                0x3C
            } else {
                0x00
            }
        }
        _ => 0,
    }
}

fn box_row((up, down, left, right): (Line, Line, Line, Line), y: usize, height: usize) -> u8 {
    let mid = height / 2 - 1;

    let vertical_cols = |line: Line| -> u8 {
        match line {
            Line::None => 0,
            Line::Single => 0x18,
            Line::Double => 0x24,
        }
    };
    let horizontal_rows = |line: Line| -> bool {
        match line {
            Line::None => false,
            Line::Single => y == mid,
            Line::Double => y + 1 == mid || y == mid + 1,
        }
    };

    let mut row = 0u8;
    // Vertical arms run to the far edge of the junction
    let up_end = if up == Line::Double { mid + 1 } else { mid };
    if up != Line::None && y <= up_end {
        row |= vertical_cols(up);
    }
    let down_start = if down == Line::Double { mid - 1 } else { mid };
    if down != Line::None && y >= down_start {
        row |= vertical_cols(down);
    }
    if horizontal_rows(left) {
        let end = if left == Line::Double { 5 } else { 4 };
        row |= mask_from(|x| x <= end);
    }
    if horizontal_rows(right) {
        let start = if right == Line::Double { 2 } else { 3 };
        row |= mask_from(|x| x >= start);
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    const FG: Rgba = [255, 255, 255, 255];
    const BG: Rgba = [0, 0, 0, 255];

    #[test]
    fn test_preset_dimensions() {
        let font = BitmapFont::preset("80x25", Bits::Eight);
        assert_eq!((font.width(), font.height()), (8, 16));

        let font = BitmapFont::preset("80x50", Bits::Eight);
        assert_eq!((font.width(), font.height()), (8, 8));

        let font = BitmapFont::preset("80x25", Bits::Nine);
        assert_eq!((font.width(), font.height()), (9, 16));
    }

    #[test]
    fn test_unknown_preset_falls_back() {
        assert!(BitmapFont::presets().iter().all(|name| BitmapFont::has(name)));
        assert!(!BitmapFont::has("topaz"));
        let font = BitmapFont::preset("topaz", Bits::Eight);
        assert_eq!(font.name(), "80x25");
    }

    #[test]
    fn test_space_and_full_block() {
        let font = BitmapFont::preset("80x25", Bits::Eight);
        let space = font.get_24bit_data(b' ', FG, BG);
        assert_eq!(space.len(), 8 * 16 * 4);
        assert!(space.chunks_exact(4).all(|px| px == BG));

        let block = font.get_24bit_data(0xDB, FG, BG);
        assert!(block.chunks_exact(4).all(|px| px == FG));
    }

    #[test]
    fn test_half_blocks() {
        let font = BitmapFont::preset("80x25", Bits::Eight);
        assert!(font.pixel(0xDF, 0, 0));
        assert!(!font.pixel(0xDF, 0, 15));
        assert!(font.pixel(0xDC, 7, 15));
        assert!(!font.pixel(0xDC, 7, 0));
        assert!(font.pixel(0xDD, 0, 5) && !font.pixel(0xDD, 7, 5));
        assert!(font.pixel(0xDE, 7, 5) && !font.pixel(0xDE, 0, 5));
    }

    #[test]
    fn test_shade_density() {
        let font = BitmapFont::preset("80x25", Bits::Eight);
        let count = |code| {
            (0..16)
                .flat_map(|y| (0..8).map(move |x| (x, y)))
                .filter(|&(x, y)| font.pixel(code, x, y))
                .count()
        };
        assert_eq!(count(0xB0), 32);
        assert_eq!(count(0xB1), 64);
        assert_eq!(count(0xB2), 96);
    }

    #[test]
    fn test_nine_bit_column() {
        let font = BitmapFont::preset("80x25", Bits::Nine);
        // Horizontal line extends into the ninth column
        assert!(font.pixel(0xC4, 7, 7));
        assert!(font.pixel(0xC4, 8, 7));
        assert!(font.pixel(0xDB, 8, 0));
        // Outside the line-drawing range the ninth column stays blank
        assert!(font.pixel(0xB2, 7, 0));
        assert!(!font.pixel(0xB2, 8, 0));
    }

    #[test]
    fn test_box_drawing_corner() {
        let font = BitmapFont::preset("80x25", Bits::Eight);
        // 0xDA: down + right
        assert!(font.pixel(0xDA, 3, 15));
        assert!(!font.pixel(0xDA, 3, 0));
        assert!(font.pixel(0xDA, 7, 7));
        assert!(!font.pixel(0xDA, 0, 7));
    }

    #[test]
    fn test_get_data_uses_palette() {
        let font = BitmapFont::preset("80x25", Bits::Eight);
        let data = font.get_data(0xDB, Palette::Ansi, 1, 0);
        assert_eq!(&data[..4], &Palette::Ansi.color(1));
    }

    #[test]
    fn test_non_printable_is_background() {
        let font = BitmapFont::preset("80x25", Bits::Eight);
        let esc = font.get_24bit_data(0x1B, FG, BG);
        assert!(esc.chunks_exact(4).all(|px| px == BG));
    }
}
