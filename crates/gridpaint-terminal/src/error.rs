//! Error types for gridpaint-terminal.

use gridpaint_core::ColorParseError;
use thiserror::Error;

/// Errors returned by fallible canvas operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// IO error from the sink.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A paint color could not be parsed.
    #[error("invalid color: {0}")]
    Color(#[from] ColorParseError),
}
