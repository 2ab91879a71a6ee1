//! Buffered terminal canvas.
//!
//! # Architecture
//!
//! ```text
//! paint + cursor → write() → Cell grid → flush() → frame cache diff → Sink
//!                                 ↑                       ↑
//!                            dirty flags          last emitted sequences
//! ```
//!
//! # Key Features
//!
//! - **Deterministic cells**: a cell serializes to the same bytes for the same
//!   visible state, so diffing is a string comparison
//! - **Smart diffing**: dirty cells whose sequence matches the last frame cost
//!   nothing on flush
//! - **Batched I/O**: a single sink `write()` per flush, none when idle
//! - **Viewport clipping**: writes and erases outside the grid are dropped

mod canvas;
mod cell;
pub mod sequences;
mod sink;

pub use canvas::{Canvas, CanvasConfig, Paint, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use cell::{Attributes, Cell};
pub use sink::{Sink, TerminalSink, WriterSink};
