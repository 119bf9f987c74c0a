//! Session state and the control stream interpreter

pub mod parser;
pub mod state;

pub use parser::{Chunk, EscapeCommand, Interpreter};
pub use state::{AttrFlags, Attributes, Cursor, SessionState};
