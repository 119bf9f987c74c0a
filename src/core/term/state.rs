//! Session state
//!
//! Cursor, attributes and saved position for one playback run. Cursor
//! coordinates are 1-based: x in [1, cols], y in [1, rows].

use bitflags::bitflags;

use crate::render::palette::{Palette, Rgba};

/// Foreground index after `ESC[0m`
pub const DEFAULT_FOREGROUND: u8 = 7;
/// Background index after `ESC[0m`
pub const DEFAULT_BACKGROUND: u8 = 0;

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct AttrFlags: u8 {
        const BOLD    = 0b0000_0001;
        const BLINK   = 0b0000_0010;
        const INVERSE = 0b0000_0100;
    }
}

/// Current drawing attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    /// Palette index 0..=7
    pub foreground: u8,
    /// Palette index 0..=7
    pub background: u8,
    pub foreground_24bit: Option<Rgba>,
    pub background_24bit: Option<Rgba>,
    pub flags: AttrFlags,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            foreground: DEFAULT_FOREGROUND,
            background: DEFAULT_BACKGROUND,
            foreground_24bit: None,
            background_24bit: None,
            flags: AttrFlags::empty(),
        }
    }
}

/// What a glyph draw does to the blink masks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskWrite {
    /// Masks untouched (icecolors, or a 24-bit background)
    Skip,
    /// Drop any stale blink state at the cell
    Clear,
    /// Record both phases: the glyph over `on_bg`, and a blank `off` cell
    Blink { on_bg: Rgba, off: Rgba },
}

/// Resolved colors for one glyph draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphColors {
    pub fg: Rgba,
    pub bg: Rgba,
    pub mask: MaskWrite,
}

impl Attributes {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn bold(&self) -> bool {
        self.flags.contains(AttrFlags::BOLD)
    }

    pub fn blink(&self) -> bool {
        self.flags.contains(AttrFlags::BLINK)
    }

    pub fn inverse(&self) -> bool {
        self.flags.contains(AttrFlags::INVERSE)
    }

    /// Effective palette indices after inverse and bold
    pub fn draw_indices(&self) -> (u8, u8) {
        let (mut fg, bg) = if self.inverse() {
            (self.background, self.foreground)
        } else {
            (self.foreground, self.background)
        };
        if self.bold() {
            fg += 8;
        }
        (fg, bg)
    }

    /// Colors for the visible surface and the blink masks
    pub fn glyph_colors(&self, palette: Palette, icecolors: bool) -> GlyphColors {
        let (fg_index, mut bg_index) = self.draw_indices();
        let blink = self.blink();
        let truecolor_bg = self.background_24bit.is_some();

        if blink && icecolors && !truecolor_bg {
            bg_index += 8;
        }

        let fg = self.foreground_24bit.unwrap_or_else(|| palette.color(fg_index));
        let bg = self.background_24bit.unwrap_or_else(|| palette.color(bg_index));

        let mask = if icecolors || truecolor_bg {
            MaskWrite::Skip
        } else if blink {
            MaskWrite::Blink {
                on_bg: palette.color(bg_index + 8),
                off: palette.color(bg_index),
            }
        } else {
            MaskWrite::Clear
        };

        GlyphColors { fg, bg, mask }
    }
}

/// 1-based cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self { x: 1, y: 1 }
    }
}

fn clamp(value: i64, low: usize, high: usize) -> usize {
    let high = high.max(low);
    value.clamp(low as i64, high as i64) as usize
}

/// Cursor and attribute state of one session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub cols: usize,
    pub rows: usize,
    pub cursor: Cursor,
    pub saved: Option<Cursor>,
    pub attrs: Attributes,
}

impl SessionState {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
            cursor: Cursor::default(),
            saved: None,
            attrs: Attributes::default(),
        }
    }

    /// Set the cursor, clamping both axes
    pub fn set_pos(&mut self, x: i64, y: i64) {
        self.cursor.x = clamp(x, 1, self.cols);
        self.cursor.y = clamp(y, 1, self.rows);
    }

    /// Cursor up, stopping at row 1
    pub fn cursor_up(&mut self, n: i64) {
        let y = (self.cursor.y as i64).saturating_sub(n);
        self.cursor.y = clamp(y, 1, self.rows);
    }

    /// Cursor down, stopping one row short of the bottom
    pub fn cursor_down(&mut self, n: i64) {
        let y = (self.cursor.y as i64).saturating_add(n);
        self.cursor.y = clamp(y, 1, self.rows - 1);
    }

    /// Cursor right, stopping at the last column
    pub fn cursor_forward(&mut self, n: i64) {
        let x = (self.cursor.x as i64).saturating_add(n);
        self.cursor.x = clamp(x, 1, self.cols);
    }

    /// Cursor left, stopping at column 1
    pub fn cursor_backward(&mut self, n: i64) {
        let x = (self.cursor.x as i64).saturating_sub(n);
        self.cursor.x = clamp(x, 1, self.cols);
    }

    pub fn save_cursor(&mut self) {
        self.saved = Some(self.cursor);
    }

    pub fn restore_cursor(&mut self) {
        if let Some(saved) = self.saved {
            self.cursor = saved;
        }
    }

    /// Whether the cursor sits on the last row
    pub fn at_last_row(&self) -> bool {
        self.cursor.y >= self.rows
    }

    /// Whether the cursor sits on the last column
    pub fn at_last_col(&self) -> bool {
        self.cursor.x >= self.cols
    }

    /// Reset attributes and cursor; the saved position survives
    pub fn reset(&mut self) {
        self.attrs.reset();
        self.cursor = Cursor::default();
    }
}
