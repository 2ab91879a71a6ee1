//! Terminal canvas for gridpaint.
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::doc_markdown)] // "item in documentation missing backticks"
//!
//! Keeps a virtual frame of styled cells and emits only the escape sequences
//! needed to bring the real terminal in line with it.
//!
//! # Example
//!
//! ```no_run
//! use gridpaint_terminal::Canvas;
//!
//! let mut canvas = Canvas::create();
//! canvas.hide_cursor()?;
//! canvas
//!     .move_to(0, 0)
//!     .background("navy")?
//!     .foreground("#ffd700")?
//!     .bold(true)
//!     .write("Hello, terminal");
//! canvas.flush()?;
//! canvas.show_cursor()?;
//! # Ok::<(), gridpaint_terminal::CanvasError>(())
//! ```

pub mod direct;
mod error;

pub use direct::{
    Attributes, Canvas, CanvasConfig, Cell, Paint, Sink, TerminalSink, WriterSink,
    DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
pub use error::CanvasError;

// Re-export core types for convenience
pub use gridpaint_core::{Color, ColorParseError, ColorSpec, Rgb};
