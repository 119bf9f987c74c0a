//! ansiplay - ANSI art interpreter and baud-paced player
//!
//! Interprets text-art byte streams (CP437 glyphs, SGR colors, cursor
//! escapes, SAUCE metadata) onto an RGBA surface, either all at once or
//! paced at a simulated modem rate with blinking text.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use ansiplay::{render_bytes, RenderOptions};
//!
//! let bytes = std::fs::read("art.ans").unwrap();
//! let image = render_bytes(&bytes, &RenderOptions::default());
//! image.save_png(Path::new("art.png")).unwrap();
//! ```

pub mod config;
pub mod core;
pub mod render;

pub use crate::config::{AppConfig, Bits, ConfigError, RenderConfig, RenderOptions};
pub use crate::core::sauce::Sauce;
pub use crate::core::session::{CancelToken, Playback};
pub use crate::core::source::ByteSource;
pub use crate::render::{render_bytes, GifRecorder, RenderError, RenderedImage};
