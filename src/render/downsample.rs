//! Box-filter thumbnail scaling

use super::raster::Raster;

/// Block factor for a thumbnail detail level (0 = none, 1..=3 = 8x/4x/2x)
pub fn block_factor(level: u8) -> usize {
    match level {
        1..=3 => 1 << (4 - level as usize),
        _ => 1,
    }
}

/// Average each `factor`×`factor` block of `src` into one pixel.
///
/// Output dimensions round up; a partial block on the right or bottom edge
/// averages only the source pixels it covers.
pub fn downsample(src: &Raster, factor: usize) -> Raster {
    if factor <= 1 {
        return src.clone();
    }
    let (width, height) = (src.width(), src.height());
    let out_w = width.div_ceil(factor);
    let out_h = height.div_ceil(factor);
    let data = src.data();
    let mut out = Vec::with_capacity(out_w * out_h * 4);

    for by in 0..out_h {
        let y0 = by * factor;
        let y1 = (y0 + factor).min(height);
        for bx in 0..out_w {
            let x0 = bx * factor;
            let x1 = (x0 + factor).min(width);
            let mut sum = [0u32; 4];
            for y in y0..y1 {
                let row = &data[(y * width + x0) * 4..(y * width + x1) * 4];
                for px in row.chunks_exact(4) {
                    for c in 0..4 {
                        sum[c] += px[c] as u32;
                    }
                }
            }
            let count = ((x1 - x0) * (y1 - y0)) as u32;
            for total in sum {
                // Round half up
                out.push(((total + count / 2) / count) as u8);
            }
        }
    }

    let mut raster = Raster::new(out_w, out_h);
    raster.put_bitmap(0, 0, out_w, out_h, &out);
    raster
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_factor() {
        assert_eq!(block_factor(0), 1);
        assert_eq!(block_factor(1), 8);
        assert_eq!(block_factor(2), 4);
        assert_eq!(block_factor(3), 2);
        assert_eq!(block_factor(9), 1);
    }

    #[test]
    fn test_uniform_block() {
        let mut src = Raster::new(8, 8);
        src.fill_rect(0, 0, 8, 8, [12, 34, 56, 255]);
        let out = downsample(&src, 4);
        assert_eq!((out.width(), out.height()), (2, 2));
        assert!(out.data().chunks_exact(4).all(|px| px == [12, 34, 56, 255]));
    }

    #[test]
    fn test_factor_one_is_identity() {
        let mut src = Raster::new(3, 2);
        src.fill_rect(1, 0, 1, 2, [1, 2, 3, 4]);
        assert_eq!(downsample(&src, 1), src);
    }

    #[test]
    fn test_rounds_to_nearest() {
        // One pixel of 255 and three of 0: mean 63.75 -> 64
        let mut src = Raster::new(2, 2);
        src.fill_rect(0, 0, 1, 1, [255, 255, 255, 255]);
        let out = downsample(&src, 2);
        assert_eq!(out.pixel(0, 0), Some([64, 64, 64, 64]));

        // Mean 127.5 rounds up
        let mut src = Raster::new(2, 1);
        src.fill_rect(0, 0, 1, 1, [255, 0, 0, 255]);
        let out = downsample(&src, 2);
        assert_eq!(out.pixel(0, 0), Some([128, 0, 0, 128]));
    }

    #[test]
    fn test_unaligned_edges_pad() {
        let mut src = Raster::new(5, 3);
        src.fill_rect(0, 0, 5, 3, [10, 10, 10, 255]);
        src.fill_rect(4, 0, 1, 3, [200, 200, 200, 255]);
        let out = downsample(&src, 2);
        assert_eq!((out.width(), out.height()), (3, 2));
        // Right edge block covers only column 4
        assert_eq!(out.pixel(2, 0), Some([200, 200, 200, 255]));
        assert_eq!(out.pixel(0, 1), Some([10, 10, 10, 255]));
    }
}
