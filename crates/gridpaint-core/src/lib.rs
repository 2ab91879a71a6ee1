//! Core types for gridpaint.
//!
//! This crate holds the color model shared by the terminal canvas:
//! - [`Color`]: an RGB color whose channels are always clamped to `[0, 255]`
//! - [`Rgb`]: the canonical 8-bit triple stored in grid cells
//! - [`ColorSpec`]: caller-facing color input (expression, triple or `false`)

mod color;
mod named;

pub use color::{Color, ColorParseError, ColorSpec, Rgb, NONE_KEYWORD};
