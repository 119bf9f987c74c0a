//! Scroll & blink compositor
//!
//! Owns the three rasters of a playback run:
//!
//! ```text
//! Compositor
//! ├── visible   baseline surface, every glyph lands here
//! ├── masks[0]  "on" phase of each blinking cell
//! ├── masks[1]  "off" phase (background on background)
//! └── frame     visible with the last merged mask drawn over it
//! ```
//!
//! Masks are transparent wherever no blinking cell lives, so merging a
//! mask only touches blink cells. All coordinates are 0-based cells.

use super::palette::Rgba;
use super::raster::Raster;

/// Blink phase shown by the most recent merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPhase {
    On,
    Off,
}

impl BlinkPhase {
    fn index(self) -> usize {
        match self {
            BlinkPhase::On => 0,
            BlinkPhase::Off => 1,
        }
    }

    fn toggled(self) -> Self {
        match self {
            BlinkPhase::On => BlinkPhase::Off,
            BlinkPhase::Off => BlinkPhase::On,
        }
    }
}

pub struct Compositor {
    cols: usize,
    rows: usize,
    cell_width: usize,
    cell_height: usize,
    background: Rgba,
    visible: Raster,
    masks: [Raster; 2],
    frame: Raster,
    /// Phase drawn by the next merge
    next_phase: BlinkPhase,
    /// Phase currently overlaid on the frame
    shown_phase: Option<BlinkPhase>,
    frame_dirty: bool,
}

impl Compositor {
    pub fn new(cols: usize, rows: usize, cell_width: usize, cell_height: usize, background: Rgba) -> Self {
        let width = cols.saturating_mul(cell_width);
        let height = rows.saturating_mul(cell_height);
        let mut compositor = Self {
            cols,
            rows,
            cell_width,
            cell_height,
            background,
            visible: Raster::new(width, height),
            masks: [Raster::new(width, height), Raster::new(width, height)],
            frame: Raster::new(width, height),
            next_phase: BlinkPhase::On,
            shown_phase: None,
            frame_dirty: true,
        };
        compositor.reset();
        compositor
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Pixel dimensions of every raster
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.visible.width(), self.visible.height())
    }

    pub fn visible(&self) -> &Raster {
        &self.visible
    }

    pub fn mask(&self, phase: BlinkPhase) -> &Raster {
        &self.masks[phase.index()]
    }

    pub fn shown_phase(&self) -> Option<BlinkPhase> {
        self.shown_phase
    }

    /// Clear every raster and restart the blink cycle
    pub fn reset(&mut self) {
        let (width, height) = self.pixel_size();
        self.clear_area(0, 0, width, height);
        self.restart_blink();
    }

    /// Next merge shows the "on" phase; no phase is overlaid until then
    pub fn restart_blink(&mut self) {
        self.next_phase = BlinkPhase::On;
        self.shown_phase = None;
        self.frame_dirty = true;
    }

    /// Fill a pixel rectangle with the background and drop its blink state
    pub fn clear_area(&mut self, x: usize, y: usize, width: usize, height: usize) {
        self.visible.fill_rect(x, y, width, height, self.background);
        for mask in &mut self.masks {
            mask.clear_rect(x, y, width, height);
        }
        self.frame_dirty = true;
    }

    pub fn clear_screen(&mut self) {
        let (width, height) = self.pixel_size();
        self.clear_area(0, 0, width, height);
    }

    /// Clear from `col` to the right edge of `row`
    pub fn clear_to_end_of_row(&mut self, col: usize, row: usize) {
        let x = col * self.cell_width;
        let width = self.visible.width().saturating_sub(x);
        self.clear_area(x, row * self.cell_height, width, self.cell_height);
    }

    /// Write a glyph bitmap to the visible surface
    pub fn draw_glyph(&mut self, col: usize, row: usize, bitmap: &[u8]) {
        let (x, y) = self.cell_origin(col, row);
        self.visible.put_bitmap(x, y, self.cell_width, self.cell_height, bitmap);
        self.frame_dirty = true;
    }

    /// Record both blink phases for a cell
    pub fn draw_blink(&mut self, col: usize, row: usize, on: &[u8], off: &[u8]) {
        let (x, y) = self.cell_origin(col, row);
        let (w, h) = (self.cell_width, self.cell_height);
        self.masks[BlinkPhase::On.index()].put_bitmap(x, y, w, h, on);
        self.masks[BlinkPhase::Off.index()].put_bitmap(x, y, w, h, off);
        self.frame_dirty = true;
    }

    /// Remove a cell from both blink masks
    pub fn clear_cell(&mut self, col: usize, row: usize) {
        let (x, y) = self.cell_origin(col, row);
        let (w, h) = (self.cell_width, self.cell_height);
        for mask in &mut self.masks {
            mask.clear_rect(x, y, w, h);
        }
        self.frame_dirty = true;
    }

    /// Move every raster up one cell row and blank the exposed bottom row
    pub fn scroll(&mut self) {
        self.visible.shift_up(self.cell_height);
        for mask in &mut self.masks {
            mask.shift_up(self.cell_height);
        }
        let width = self.visible.width();
        let y = self.rows.saturating_sub(1) * self.cell_height;
        self.clear_area(0, y, width, self.cell_height);
    }

    /// Overlay the next blink phase and flip the cycle
    pub fn merge_phase(&mut self) -> BlinkPhase {
        let phase = self.next_phase;
        self.shown_phase = Some(phase);
        self.next_phase = phase.toggled();
        self.frame_dirty = true;
        phase
    }

    /// Presentation frame: visible surface plus the shown blink phase
    pub fn frame(&mut self) -> &Raster {
        if self.frame_dirty {
            self.frame.copy_from(&self.visible);
            if let Some(phase) = self.shown_phase {
                self.frame.composite_over(&self.masks[phase.index()]);
            }
            self.frame_dirty = false;
        }
        &self.frame
    }

    fn cell_origin(&self, col: usize, row: usize) -> (usize, usize) {
        (col * self.cell_width, row * self.cell_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgba = [0, 0, 0, 255];
    const RED: Rgba = [255, 0, 0, 255];
    const GREEN: Rgba = [0, 255, 0, 255];

    fn cell(color: Rgba) -> Vec<u8> {
        color.repeat(2 * 2)
    }

    fn compositor() -> Compositor {
        Compositor::new(3, 2, 2, 2, BG)
    }

    #[test]
    fn test_new_is_background() {
        let c = compositor();
        assert_eq!(c.pixel_size(), (6, 4));
        assert!(c.visible().data().chunks_exact(4).all(|px| px == BG));
        assert!(c.mask(BlinkPhase::On).data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_scroll_shifts_all_rasters() {
        let mut c = compositor();
        c.draw_glyph(1, 1, &cell(RED));
        c.draw_blink(2, 1, &cell(RED), &cell(BG));
        c.scroll();

        assert_eq!(c.visible().pixel(2, 0), Some(RED));
        assert_eq!(c.visible().pixel(2, 2), Some(BG));
        assert_eq!(c.mask(BlinkPhase::On).pixel(4, 0), Some(RED));
        assert_eq!(c.mask(BlinkPhase::On).pixel(4, 2), Some([0, 0, 0, 0]));
        assert_eq!(c.pixel_size(), (6, 4));
    }

    #[test]
    fn test_merge_alternates_phases() {
        let mut c = compositor();
        c.draw_glyph(0, 0, &cell(RED));
        c.draw_blink(0, 0, &cell(RED), &cell(GREEN));

        assert_eq!(c.merge_phase(), BlinkPhase::On);
        assert_eq!(c.frame().pixel(0, 0), Some(RED));
        assert_eq!(c.merge_phase(), BlinkPhase::Off);
        assert_eq!(c.frame().pixel(0, 0), Some(GREEN));
        // Baseline untouched by merges
        assert_eq!(c.visible().pixel(0, 0), Some(RED));
    }

    #[test]
    fn test_restart_blink_keeps_pixels() {
        let mut c = compositor();
        c.draw_glyph(0, 0, &cell(RED));
        c.draw_blink(0, 0, &cell(RED), &cell(GREEN));
        c.merge_phase();
        c.restart_blink();
        assert_eq!(c.shown_phase(), None);
        assert_eq!(c.frame().pixel(0, 0), Some(RED));
        assert_eq!(c.mask(BlinkPhase::Off).pixel(0, 0), Some(GREEN));
        assert_eq!(c.merge_phase(), BlinkPhase::On);
    }

    #[test]
    fn test_clear_cell_removes_blink() {
        let mut c = compositor();
        c.draw_glyph(0, 0, &cell(RED));
        c.draw_blink(0, 0, &cell(RED), &cell(GREEN));
        c.clear_cell(0, 0);
        c.merge_phase();
        c.merge_phase();
        assert_eq!(c.frame().pixel(0, 0), Some(RED));
    }

    #[test]
    fn test_clear_to_end_of_row() {
        let mut c = compositor();
        for col in 0..3 {
            c.draw_glyph(col, 0, &cell(RED));
        }
        c.clear_to_end_of_row(1, 0);
        assert_eq!(c.visible().pixel(1, 0), Some(RED));
        assert_eq!(c.visible().pixel(2, 0), Some(BG));
        assert_eq!(c.visible().pixel(5, 1), Some(BG));
    }
}
