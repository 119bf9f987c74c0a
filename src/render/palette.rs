//! Palette tables
//!
//! Sixteen-entry color tables selected by the `bits` render option.

use crate::config::Bits;

/// RGBA color, alpha last
pub type Rgba = [u8; 4];

/// Fully transparent pixel (cleared blink mask)
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
    [r, g, b, 255]
}

/// IBM VGA text-mode colors in ANSI order (red is index 1)
const ANSI: [Rgba; 16] = [
    rgb(0, 0, 0),
    rgb(170, 0, 0),
    rgb(0, 170, 0),
    rgb(170, 85, 0),
    rgb(0, 0, 170),
    rgb(170, 0, 170),
    rgb(0, 170, 170),
    rgb(170, 170, 170),
    rgb(85, 85, 85),
    rgb(255, 85, 85),
    rgb(85, 255, 85),
    rgb(255, 255, 85),
    rgb(85, 85, 255),
    rgb(255, 85, 255),
    rgb(85, 255, 255),
    rgb(255, 255, 255),
];

/// CED editor palette: gray paper, black ink
const CED: [Rgba; 16] = [
    rgb(170, 170, 170),
    rgb(0, 0, 0),
    rgb(0, 170, 0),
    rgb(170, 85, 0),
    rgb(0, 0, 170),
    rgb(170, 0, 170),
    rgb(0, 170, 170),
    rgb(170, 170, 170),
    rgb(85, 85, 85),
    rgb(255, 85, 85),
    rgb(85, 255, 85),
    rgb(255, 255, 85),
    rgb(85, 85, 255),
    rgb(255, 85, 255),
    rgb(85, 255, 255),
    rgb(255, 255, 255),
];

/// Amiga Workbench 1.x colors, repeated for the bright half
const WORKBENCH: [Rgba; 16] = [
    rgb(170, 170, 170),
    rgb(0, 0, 0),
    rgb(255, 255, 255),
    rgb(102, 136, 187),
    rgb(0, 0, 255),
    rgb(255, 0, 255),
    rgb(0, 255, 255),
    rgb(255, 255, 255),
    rgb(170, 170, 170),
    rgb(0, 0, 0),
    rgb(255, 255, 255),
    rgb(102, 136, 187),
    rgb(0, 0, 255),
    rgb(255, 0, 255),
    rgb(0, 255, 255),
    rgb(255, 255, 255),
];

/// Palette variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    #[default]
    Ansi,
    Ced,
    Workbench,
}

impl Palette {
    /// Select palette for a `bits` mode
    pub fn for_bits(bits: Bits) -> Self {
        match bits {
            Bits::Ced => Palette::Ced,
            Bits::Workbench => Palette::Workbench,
            Bits::Eight | Bits::Nine => Palette::Ansi,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Palette::Ansi => "ANSI",
            Palette::Ced => "CED",
            Palette::Workbench => "Workbench",
        }
    }

    pub fn colors(&self) -> &'static [Rgba; 16] {
        match self {
            Palette::Ansi => &ANSI,
            Palette::Ced => &CED,
            Palette::Workbench => &WORKBENCH,
        }
    }

    /// Color at `index`, wrapping modulo 16
    pub fn color(&self, index: u8) -> Rgba {
        self.colors()[(index & 0x0F) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_selection() {
        assert_eq!(Palette::for_bits(Bits::Eight), Palette::Ansi);
        assert_eq!(Palette::for_bits(Bits::Nine), Palette::Ansi);
        assert_eq!(Palette::for_bits(Bits::Ced), Palette::Ced);
        assert_eq!(Palette::for_bits(Bits::Workbench), Palette::Workbench);
    }

    #[test]
    fn test_ansi_order() {
        // ANSI 31 maps to index 1, which is red
        assert_eq!(Palette::Ansi.color(1), [170, 0, 0, 255]);
        assert_eq!(Palette::Ansi.color(9), [255, 85, 85, 255]);
        assert_eq!(Palette::Ansi.color(17), Palette::Ansi.color(1));
    }

    #[test]
    fn test_all_entries_opaque() {
        for palette in [Palette::Ansi, Palette::Ced, Palette::Workbench] {
            assert!(palette.colors().iter().all(|c| c[3] == 255));
        }
    }
}
