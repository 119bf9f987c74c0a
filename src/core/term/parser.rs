//! Control stream interpreter
//!
//! Consumes art bytes, updates the session state and draws glyphs through
//! the compositor. Two states: normal bytes, and an escape sequence being
//! accumulated from `ESC [` up to a terminating ASCII letter.

use super::state::{AttrFlags, MaskWrite, SessionState};
use crate::config::RenderConfig;
use crate::core::source::ByteSource;
use crate::render::compositor::Compositor;
use crate::render::font::Font;
use crate::render::palette::{Palette, Rgba};

const LF: u8 = 0x0A;
const CR: u8 = 0x0D;
const SUB: u8 = 0x1A;
const ESC: u8 = 0x1B;
const CSI_OPEN: u8 = b'[';

/// A dispatched escape sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscapeCommand {
    /// `A`
    CursorUp(i64),
    /// `B`
    CursorDown(i64),
    /// `C`
    CursorForward(i64),
    /// `D`
    CursorBackward(i64),
    /// `H`; a lone parameter is a row, the column resets to 1
    CursorPosition { row: i64, col: Option<i64> },
    /// `J`
    EraseDisplay(i64),
    /// `K`
    EraseLine,
    /// `m`
    SelectGraphicRendition(Vec<i64>),
    /// `s`
    SaveCursor,
    /// `u`
    RestoreCursor,
    /// `t` with exactly four parameters and a 0/1 selector
    TrueColor { background: bool, color: Rgba },
}

impl EscapeCommand {
    /// Decode an accumulated sequence (`[` params final-letter)
    pub fn parse(sequence: &[u8]) -> Option<Self> {
        let (&first, rest) = sequence.split_first()?;
        let (&letter, params) = rest.split_last()?;
        if first != CSI_OPEN {
            return None;
        }
        let values = parse_params(params);
        let first_value = values[0];

        let command = match letter {
            b'A' => EscapeCommand::CursorUp(first_value),
            b'B' => EscapeCommand::CursorDown(first_value),
            b'C' => EscapeCommand::CursorForward(first_value),
            b'D' => EscapeCommand::CursorBackward(first_value),
            b'H' => EscapeCommand::CursorPosition {
                row: first_value,
                col: values.get(1).copied(),
            },
            b'J' => EscapeCommand::EraseDisplay(first_value),
            b'K' => EscapeCommand::EraseLine,
            b'm' => EscapeCommand::SelectGraphicRendition(values),
            b's' => EscapeCommand::SaveCursor,
            b'u' => EscapeCommand::RestoreCursor,
            b't' if values.len() == 4 && (first_value == 0 || first_value == 1) => {
                EscapeCommand::TrueColor {
                    background: first_value == 0,
                    color: [channel(values[1]), channel(values[2]), channel(values[3]), 255],
                }
            }
            _ => return None,
        };
        Some(command)
    }
}

/// Color component, wrapped into a byte
fn channel(value: i64) -> u8 {
    value.rem_euclid(256) as u8
}

/// Split on `;`; every field that is not an integer counts as 1
pub fn parse_params(params: &[u8]) -> Vec<i64> {
    params.split(|&b| b == b';').map(|field| parse_int(field).unwrap_or(1)).collect()
}

/// Leading-integer parse: optional whitespace and sign, then digits
fn parse_int(field: &[u8]) -> Option<i64> {
    let mut rest = field;
    while let Some((&b, tail)) = rest.split_first() {
        if !b.is_ascii_whitespace() {
            break;
        }
        rest = tail;
    }
    let negative = match rest.first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };
    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let magnitude = rest[..digits]
        .iter()
        .fold(0i64, |acc, &d| acc.saturating_mul(10).saturating_add((d - b'0') as i64));
    Some(if negative { -magnitude } else { magnitude })
}

#[derive(Clone, Copy, Default, PartialEq, Debug)]
enum ParserState {
    #[default]
    Normal,
    Escaped,
}

/// Result of one bounded read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Chunk {
    /// Bytes taken from the source (a consumed CR+LF pair counts once)
    pub consumed: usize,
    /// The read stopped early because the surface scrolled
    pub scrolled: bool,
}

/// Escape-code state machine bound to one session
pub struct Interpreter {
    state: SessionState,
    parser_state: ParserState,
    escape: Vec<u8>,
    palette: Palette,
    icecolors: bool,
    honor_clear_screen: bool,
    scrolls: u64,
    glyph: Vec<u8>,
    blink_glyph: Vec<u8>,
}

impl Interpreter {
    pub fn new(cols: usize, rows: usize, config: &RenderConfig) -> Self {
        Self {
            state: SessionState::new(cols, rows),
            parser_state: ParserState::Normal,
            escape: Vec::with_capacity(16),
            palette: Palette::for_bits(config.bits),
            icecolors: config.icecolors,
            honor_clear_screen: config.honor_clear_screen,
            scrolls: 0,
            glyph: Vec::new(),
            blink_glyph: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Total scrolls since the last full reset
    pub fn scroll_count(&self) -> u64 {
        self.scrolls
    }

    pub fn is_escaped(&self) -> bool {
        self.parser_state == ParserState::Escaped
    }

    /// Forget any partial escape sequence
    pub fn reset_escape(&mut self) {
        self.parser_state = ParserState::Normal;
        self.escape.clear();
    }

    /// Reset attributes and escape state, keeping the cursor
    pub fn reset_attributes(&mut self) {
        self.state.attrs.reset();
        self.reset_escape();
    }

    /// Reset everything, including the rasters
    pub fn reset_all(&mut self, compositor: &mut Compositor) {
        compositor.reset();
        self.state.reset();
        self.reset_escape();
        self.scrolls = 0;
    }

    /// Consume up to `max` bytes, stopping early after a scroll
    pub fn read<F: Font + ?Sized>(
        &mut self,
        source: &mut ByteSource,
        max: usize,
        font: &F,
        compositor: &mut Compositor,
    ) -> Chunk {
        let mut chunk = Chunk::default();
        while chunk.consumed < max {
            let Some(code) = source.get() else {
                break;
            };
            chunk.consumed += 1;
            if self.feed(code, source, font, compositor) {
                chunk.scrolled = true;
                break;
            }
        }
        chunk
    }

    /// Consume the rest of the source
    pub fn read_to_end<F: Font + ?Sized>(
        &mut self,
        source: &mut ByteSource,
        font: &F,
        compositor: &mut Compositor,
    ) -> usize {
        let mut total = 0;
        loop {
            let chunk = self.read(source, usize::MAX, font, compositor);
            if chunk.consumed == 0 {
                return total;
            }
            total += chunk.consumed;
        }
    }

    /// Process one byte; returns whether the surface scrolled
    fn feed<F: Font + ?Sized>(
        &mut self,
        code: u8,
        source: &mut ByteSource,
        font: &F,
        compositor: &mut Compositor,
    ) -> bool {
        if self.parser_state == ParserState::Escaped {
            self.escape.push(code);
            if code.is_ascii_alphabetic() {
                self.parser_state = ParserState::Normal;
                let command = EscapeCommand::parse(&self.escape);
                if command.is_none() {
                    tracing::debug!(
                        "Unsupported escape: {:?}",
                        String::from_utf8_lossy(&self.escape)
                    );
                }
                self.escape.clear();
                return command.map_or(false, |command| self.execute(command, compositor));
            }
            return false;
        }

        match code {
            LF => self.new_line(compositor),
            CR => {
                if source.peek() == Some(LF) {
                    source.read(1);
                    self.new_line(compositor)
                } else {
                    false
                }
            }
            SUB => false,
            ESC if source.peek() == Some(CSI_OPEN) => {
                self.parser_state = ParserState::Escaped;
                self.escape.clear();
                false
            }
            _ => self.draw(code, font, compositor),
        }
    }

    /// Apply a decoded escape; returns whether the surface scrolled
    pub fn execute(&mut self, command: EscapeCommand, compositor: &mut Compositor) -> bool {
        match command {
            EscapeCommand::CursorUp(n) => self.state.cursor_up(n),
            EscapeCommand::CursorDown(n) => self.state.cursor_down(n),
            EscapeCommand::CursorForward(n) => {
                let scrolled = self.state.at_last_col() && self.new_line(compositor);
                self.state.cursor_forward(n);
                return scrolled;
            }
            EscapeCommand::CursorBackward(n) => self.state.cursor_backward(n),
            EscapeCommand::CursorPosition { row, col } => {
                self.state.set_pos(col.unwrap_or(1), row);
            }
            EscapeCommand::EraseDisplay(mode) => {
                if self.honor_clear_screen && mode == 2 {
                    self.state.set_pos(1, 1);
                    compositor.clear_screen();
                }
            }
            EscapeCommand::EraseLine => {
                let cursor = self.state.cursor;
                compositor.clear_to_end_of_row(cursor.x - 1, cursor.y - 1);
            }
            EscapeCommand::SelectGraphicRendition(values) => self.execute_sgr(&values),
            EscapeCommand::SaveCursor => self.state.save_cursor(),
            EscapeCommand::RestoreCursor => self.state.restore_cursor(),
            EscapeCommand::TrueColor { background, color } => {
                if background {
                    self.state.attrs.background_24bit = Some(color);
                } else {
                    self.state.attrs.foreground_24bit = Some(color);
                }
            }
        }
        false
    }

    fn execute_sgr(&mut self, values: &[i64]) {
        let attrs = &mut self.state.attrs;
        for &value in values {
            match value {
                30..=37 => {
                    attrs.foreground = (value - 30) as u8;
                    attrs.foreground_24bit = None;
                }
                40..=47 => {
                    attrs.background = (value - 40) as u8;
                    attrs.background_24bit = None;
                }
                0 => attrs.reset(),
                1 => {
                    attrs.flags |= AttrFlags::BOLD;
                    attrs.foreground_24bit = None;
                }
                5 => attrs.flags |= AttrFlags::BLINK,
                7 => attrs.flags |= AttrFlags::INVERSE,
                22 => attrs.flags &= !AttrFlags::BOLD,
                25 => attrs.flags &= !AttrFlags::BLINK,
                27 => attrs.flags &= !AttrFlags::INVERSE,
                _ => {}
            }
        }
    }

    /// Draw `code` at the cursor and advance, wrapping at the last column
    fn draw<F: Font + ?Sized>(&mut self, code: u8, font: &F, compositor: &mut Compositor) -> bool {
        let colors = self.state.attrs.glyph_colors(self.palette, self.icecolors);
        let col = self.state.cursor.x - 1;
        let row = self.state.cursor.y - 1;

        font.render_into(code, colors.fg, colors.bg, &mut self.glyph);
        compositor.draw_glyph(col, row, &self.glyph);

        match colors.mask {
            MaskWrite::Skip => {}
            MaskWrite::Clear => compositor.clear_cell(col, row),
            MaskWrite::Blink { on_bg, off } => {
                font.render_into(code, colors.fg, on_bg, &mut self.blink_glyph);
                font.render_into(code, off, off, &mut self.glyph);
                compositor.draw_blink(col, row, &self.blink_glyph, &self.glyph);
            }
        }

        if self.state.at_last_col() {
            self.new_line(compositor)
        } else {
            self.state.cursor.x += 1;
            false
        }
    }

    /// Column 1 of the next row, scrolling at the bottom
    fn new_line(&mut self, compositor: &mut Compositor) -> bool {
        self.state.cursor.x = 1;
        if self.state.at_last_row() {
            compositor.scroll();
            self.scrolls += 1;
            true
        } else {
            self.state.cursor.y += 1;
            false
        }
    }
}
