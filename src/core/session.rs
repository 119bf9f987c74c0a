//! Playback scheduling
//!
//! Paces the interpreter over a byte source at a simulated baud rate. Two
//! tickers drive a run: a 10ms chunk ticker feeding the interpreter, and a
//! 250ms blink ticker merging the alternating blink masks. The host owns the
//! clock and calls [`Playback::advance`] with the elapsed time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::sauce::Sauce;
use super::source::ByteSource;
use super::term::Interpreter;
use crate::config::RenderConfig;
use crate::render::compositor::{BlinkPhase, Compositor};
use crate::render::font::{BitmapFont, Font};
use crate::render::raster::Raster;
use crate::render::RenderedImage;

/// Chunk ticker period
pub const CHUNK_INTERVAL: Duration = Duration::from_millis(10);
/// Blink ticker period
pub const BLINK_INTERVAL: Duration = Duration::from_millis(250);
/// Rate used when `play` is given none
pub const DEFAULT_BAUD: u32 = 115_200;

/// Bytes drawn per chunk tick at `baud`, never below 1
pub fn chunk_size(baud: u32) -> usize {
    ((baud / 8 / 100) as usize).max(1)
}

/// Cancellation handle for one playback run
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Invoked once when the source is exhausted
pub type CompletionCallback = Box<dyn FnOnce()>;

/// One playback instance: owns the source, session and rasters
pub struct Playback {
    config: RenderConfig,
    font: BitmapFont,
    source: ByteSource,
    interpreter: Interpreter,
    compositor: Compositor,
    /// Current run; replaced on every `play`
    token: CancelToken,
    baud: u32,
    chunk_size: usize,
    chunk_active: bool,
    blink_active: bool,
    /// Virtual time until each ticker fires next
    until_chunk: Duration,
    until_blink: Duration,
    on_complete: Option<CompletionCallback>,
}

impl Playback {
    /// Create a stopped playback over `bytes`
    pub fn new(bytes: Vec<u8>, config: RenderConfig) -> Self {
        let source = ByteSource::new(bytes);
        let font = BitmapFont::preset(&config.font, config.bits);
        let cols = config.stream_columns(source.sauce().and_then(Sauce::columns));
        let rows = config.rows;
        let interpreter = Interpreter::new(cols, rows, &config);
        let background = interpreter.palette().color(0);
        let compositor = Compositor::new(cols, rows, font.width(), font.height(), background);

        let token = CancelToken::new();
        token.cancel();

        Self {
            config,
            font,
            source,
            interpreter,
            compositor,
            token,
            baud: DEFAULT_BAUD,
            chunk_size: chunk_size(DEFAULT_BAUD),
            chunk_active: false,
            blink_active: false,
            until_chunk: CHUNK_INTERVAL,
            until_blink: BLINK_INTERVAL,
            on_complete: None,
        }
    }

    /// Start (or restart) playback from the beginning of the source
    pub fn play(&mut self, baud: Option<u32>, on_complete: Option<CompletionCallback>, reset_first: bool) {
        self.token.cancel();
        self.token = CancelToken::new();

        if reset_first {
            self.interpreter.reset_all(&mut self.compositor);
        } else {
            self.interpreter.reset_attributes();
        }
        self.compositor.restart_blink();
        self.source.seek(0);

        self.baud = baud.unwrap_or(DEFAULT_BAUD);
        self.chunk_size = chunk_size(self.baud);
        self.on_complete = on_complete;
        self.chunk_active = true;
        self.blink_active = true;
        self.until_chunk = CHUNK_INTERVAL;
        self.until_blink = BLINK_INTERVAL;

        tracing::info!(
            "Playback started: baud={}, chunk={} bytes, reset={}",
            self.baud,
            self.chunk_size,
            reset_first
        );

        self.step_chunk();
    }

    /// Cancel both tickers. Does nothing when already stopped
    pub fn stop(&mut self) {
        if !self.chunk_active && !self.blink_active && self.token.is_cancelled() {
            return;
        }
        self.token.cancel();
        self.chunk_active = false;
        self.blink_active = false;
        tracing::info!("Playback stopped at byte {}", self.source.position());
    }

    /// Swap in a new source; the chunk ticker stops and is not restarted
    pub fn load<F>(&mut self, bytes: Vec<u8>, on_metadata: F)
    where
        F: FnOnce(Option<&Sauce>),
    {
        self.chunk_active = false;
        self.on_complete = None;
        self.source = ByteSource::new(bytes);
        tracing::info!(
            "Loaded {} bytes, metadata: {}",
            self.source.len(),
            self.source.sauce().is_some()
        );
        on_metadata(self.source.sauce());
    }

    /// Run the tickers over `elapsed` of virtual time, in firing order
    pub fn advance(&mut self, elapsed: Duration) {
        let mut remaining = elapsed;
        loop {
            if self.token.is_cancelled() {
                self.chunk_active = false;
                self.blink_active = false;
                return;
            }

            let next = match (self.chunk_active, self.blink_active) {
                (true, true) => self.until_chunk.min(self.until_blink),
                (true, false) => self.until_chunk,
                (false, true) => self.until_blink,
                (false, false) => return,
            };
            if next > remaining {
                self.until_chunk -= remaining.min(self.until_chunk);
                self.until_blink -= remaining.min(self.until_blink);
                return;
            }

            remaining -= next;
            self.until_chunk -= next.min(self.until_chunk);
            self.until_blink -= next.min(self.until_blink);

            if self.chunk_active && self.until_chunk.is_zero() {
                self.until_chunk = CHUNK_INTERVAL;
                self.step_chunk();
            }
            if self.blink_active && self.until_blink.is_zero() && !self.token.is_cancelled() {
                self.until_blink = BLINK_INTERVAL;
                self.merge_blink();
            }
        }
    }

    /// Interpret the whole source at once, without pacing
    pub fn render_all(&mut self) -> usize {
        self.token.cancel();
        self.chunk_active = false;
        self.blink_active = false;
        self.interpreter.reset_all(&mut self.compositor);
        self.source.seek(0);
        let consumed = self
            .interpreter
            .read_to_end(&mut self.source, &self.font, &mut self.compositor);
        tracing::debug!(
            "Rendered {} bytes, {} scrolls",
            consumed,
            self.interpreter.scroll_count()
        );
        consumed
    }

    /// One chunk tick; returns the bytes consumed
    pub fn step_chunk(&mut self) -> usize {
        let chunk = self.interpreter.read(
            &mut self.source,
            self.chunk_size,
            &self.font,
            &mut self.compositor,
        );
        tracing::trace!(
            "Chunk: {} bytes, scrolled={}, at {}",
            chunk.consumed,
            chunk.scrolled,
            self.source.position()
        );
        if chunk.consumed == 0 {
            self.finish();
        }
        chunk.consumed
    }

    /// One blink tick; returns the phase now shown
    pub fn merge_blink(&mut self) -> BlinkPhase {
        let phase = self.compositor.merge_phase();
        tracing::trace!("Blink merge: {:?}", phase);
        phase
    }

    fn finish(&mut self) {
        if self.chunk_active {
            tracing::info!("Playback complete: {} bytes", self.source.len());
        }
        self.chunk_active = false;
        if let Some(callback) = self.on_complete.take() {
            callback();
        }
    }

    /// Still consuming the source
    pub fn is_playing(&self) -> bool {
        self.chunk_active && !self.token.is_cancelled()
    }

    /// Blink ticker running
    pub fn is_blinking(&self) -> bool {
        self.blink_active && !self.token.is_cancelled()
    }

    /// Handle to the current run
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn baud(&self) -> u32 {
        self.baud
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn source(&self) -> &ByteSource {
        &self.source
    }

    /// Presentation raster: visible surface plus the last merged blink mask
    pub fn frame(&mut self) -> &Raster {
        self.compositor.frame()
    }

    /// Baseline visible surface as an artifact
    pub fn snapshot(&self) -> RenderedImage {
        RenderedImage::from_raster(self.compositor.visible(), self.config.double_density)
    }
}
