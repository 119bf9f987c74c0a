//! Animated capture of a playback run

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};

use super::artifact::{to_rgba_image, Result};
use super::raster::Raster;
use crate::core::session::{Playback, BLINK_INTERVAL};

/// Quantizer speed, 1 (best) to 30 (fastest)
const ENCODE_SPEED: i32 = 10;

/// Collects presentation frames and encodes them as a looping GIF
pub struct GifRecorder {
    frames: Vec<Frame>,
    delay: Duration,
}

impl GifRecorder {
    pub fn new(delay: Duration) -> Self {
        Self {
            frames: Vec::new(),
            delay,
        }
    }

    /// Drive `playback` one blink period per frame until the stream ends
    ///
    /// One frame follows the end of the stream so both blink phases appear.
    /// `playback` must already be playing.
    pub fn record(playback: &mut Playback, max_frames: usize) -> Result<Self> {
        let mut recorder = Self::new(BLINK_INTERVAL);
        let mut finished = false;
        while recorder.len() < max_frames {
            playback.advance(BLINK_INTERVAL);
            recorder.push(playback.frame())?;
            if finished {
                break;
            }
            finished = !playback.is_playing();
        }
        if recorder.len() >= max_frames {
            tracing::info!("Recording truncated at {} frames", max_frames);
        }
        Ok(recorder)
    }

    pub fn push(&mut self, raster: &Raster) -> Result<()> {
        let image = to_rgba_image(raster.width(), raster.height(), raster.data().to_vec())?;
        let delay = Delay::from_saturating_duration(self.delay);
        self.frames.push(Frame::from_parts(image, 0, 0, delay));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn encode<W: Write>(self, writer: W) -> Result<()> {
        let mut encoder = GifEncoder::new_with_speed(writer, ENCODE_SPEED);
        encoder.set_repeat(Repeat::Infinite)?;
        encoder.encode_frames(self.frames)?;
        Ok(())
    }

    pub fn save(self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.encode(BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;

    #[test]
    fn test_record_until_complete() {
        let mut playback = Playback::new(b"\x1b[5mblink".to_vec(), RenderConfig::default());
        playback.play(None, None, true);
        let recorder = GifRecorder::record(&mut playback, 100).unwrap();
        // Stream ends on the first tick, then one trailing frame
        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_record_frame_limit() {
        let bytes = vec![b'\n'; 2000];
        let mut playback = Playback::new(bytes, RenderConfig::default());
        playback.play(Some(300), None, true);
        let recorder = GifRecorder::record(&mut playback, 3).unwrap();
        assert_eq!(recorder.len(), 3);
        assert!(playback.is_playing());
    }

    #[test]
    fn test_encode_gif() {
        let mut recorder = GifRecorder::new(BLINK_INTERVAL);
        assert!(recorder.is_empty());
        let mut raster = Raster::new(8, 8);
        raster.fill_rect(0, 0, 8, 8, [0, 0, 170, 255]);
        recorder.push(&raster).unwrap();
        raster.fill_rect(0, 0, 4, 4, [170, 0, 0, 255]);
        recorder.push(&raster).unwrap();

        let mut out = Vec::new();
        recorder.encode(&mut out).unwrap();
        assert_eq!(&out[..6], b"GIF89a");
    }
}
