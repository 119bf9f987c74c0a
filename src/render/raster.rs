//! RGBA pixel buffer
//!
//! Row-major, four bytes per pixel. All rectangle operations clip to the
//! buffer bounds.

use super::palette::{Rgba, TRANSPARENT};

#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Raster {
    /// Create a fully transparent raster; an unrepresentable size is empty
    pub fn new(width: usize, height: usize) -> Self {
        let Some(len) = width.checked_mul(height).and_then(|n| n.checked_mul(4)) else {
            tracing::warn!("Raster {}x{} is too large, using 0x0", width, height);
            return Self {
                width: 0,
                height: 0,
                data: Vec::new(),
            };
        };
        Self {
            width,
            height,
            data: vec![0; len],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Clip a rectangle to the buffer, returning (x0, y0, x1, y1) exclusive
    fn clip(&self, x: usize, y: usize, w: usize, h: usize) -> Option<(usize, usize, usize, usize)> {
        let x1 = x.saturating_add(w).min(self.width);
        let y1 = y.saturating_add(h).min(self.height);
        if x >= x1 || y >= y1 {
            None
        } else {
            Some((x, y, x1, y1))
        }
    }

    /// Fill a rectangle with one color
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Rgba) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else {
            return;
        };
        for row in y0..y1 {
            let start = (row * self.width + x0) * 4;
            let end = (row * self.width + x1) * 4;
            for px in self.data[start..end].chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
        }
    }

    /// Reset a rectangle to transparent
    pub fn clear_rect(&mut self, x: usize, y: usize, w: usize, h: usize) {
        self.fill_rect(x, y, w, h, TRANSPARENT);
    }

    /// Copy a `w`×`h` RGBA bitmap to (x, y)
    pub fn put_bitmap(&mut self, x: usize, y: usize, w: usize, h: usize, bitmap: &[u8]) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else {
            return;
        };
        let span = (x1 - x0) * 4;
        for row in y0..y1 {
            let src = (row - y) * w * 4;
            if src + span > bitmap.len() {
                break;
            }
            let dst = (row * self.width + x0) * 4;
            self.data[dst..dst + span].copy_from_slice(&bitmap[src..src + span]);
        }
    }

    /// Shift the whole buffer up by `rows` pixel rows; the vacated bottom
    /// band keeps its old contents until the caller clears it.
    pub fn shift_up(&mut self, rows: usize) {
        if rows == 0 || rows >= self.height {
            return;
        }
        let stride = self.width * 4;
        self.data.copy_within(rows * stride.., 0);
    }

    /// Draw `src` over this raster with source-over alpha blending
    pub fn composite_over(&mut self, src: &Raster) {
        debug_assert_eq!((self.width, self.height), (src.width, src.height));
        for (dst, src) in self.data.chunks_exact_mut(4).zip(src.data.chunks_exact(4)) {
            match src[3] {
                0 => {}
                255 => dst.copy_from_slice(src),
                a => {
                    let a = a as u32;
                    let inv = 255 - a;
                    for c in 0..3 {
                        dst[c] = ((src[c] as u32 * a + dst[c] as u32 * inv + 127) / 255) as u8;
                    }
                    dst[3] = (a + (dst[3] as u32 * inv + 127) / 255) as u8;
                }
            }
        }
    }

    /// Overwrite this raster with the contents of another of equal size
    pub fn copy_from(&mut self, src: &Raster) {
        debug_assert_eq!((self.width, self.height), (src.width, src.height));
        self.data.copy_from_slice(&src.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [255, 0, 0, 255];
    const BLUE: Rgba = [0, 0, 255, 255];

    #[test]
    fn test_oversized_raster_is_empty() {
        let r = Raster::new(usize::MAX, 2);
        assert_eq!((r.width(), r.height()), (0, 0));
        assert!(r.data().is_empty());
        assert_eq!(r.pixel(0, 0), None);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut r = Raster::new(4, 4);
        r.fill_rect(2, 2, 10, 10, RED);
        assert_eq!(r.pixel(1, 1), Some(TRANSPARENT));
        assert_eq!(r.pixel(3, 3), Some(RED));
        assert_eq!(r.pixel(4, 4), None);
    }

    #[test]
    fn test_put_bitmap() {
        let mut r = Raster::new(4, 2);
        let bitmap: Vec<u8> = [RED, BLUE].concat();
        r.put_bitmap(1, 1, 2, 1, &bitmap);
        assert_eq!(r.pixel(1, 1), Some(RED));
        assert_eq!(r.pixel(2, 1), Some(BLUE));
        assert_eq!(r.pixel(0, 1), Some(TRANSPARENT));
    }

    #[test]
    fn test_shift_up() {
        let mut r = Raster::new(2, 3);
        r.fill_rect(0, 2, 2, 1, RED);
        r.shift_up(1);
        assert_eq!(r.pixel(0, 1), Some(RED));
        // Bottom band untouched
        assert_eq!(r.pixel(0, 2), Some(RED));
        assert_eq!(r.height(), 3);
    }

    #[test]
    fn test_composite_skips_transparent() {
        let mut base = Raster::new(2, 1);
        base.fill_rect(0, 0, 2, 1, BLUE);
        let mut mask = Raster::new(2, 1);
        mask.fill_rect(1, 0, 1, 1, RED);
        base.composite_over(&mask);
        assert_eq!(base.pixel(0, 0), Some(BLUE));
        assert_eq!(base.pixel(1, 0), Some(RED));
    }
}
