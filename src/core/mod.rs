//! Byte-stream side of a render.
//!
//! - **source**: sequential reader over the art bytes, SAUCE trailer hidden
//! - **sauce**: metadata record parser
//! - **term**: session state and the escape-code interpreter
//! - **session**: baud-paced playback over the interpreter
//!
//! # Architecture
//!
//! ```text
//! Playback
//! ├── ByteSource (art bytes + Sauce)
//! ├── Interpreter
//! │   └── SessionState (cursor + attributes + saved cursor)
//! └── Compositor (visible surface + blink masks)
//! ```

pub mod sauce;
pub mod session;
pub mod source;
pub mod term;
