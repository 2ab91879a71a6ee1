//! ANSI escape sequences emitted by the canvas.
//!
//! Only the VT100/ANSI subset the canvas needs: absolute positioning,
//! 24-bit colors, the six display attributes and a handful of screen-level
//! controls.

use std::fmt::{self, Write};

use gridpaint_core::Rgb;

/// Escape character.
pub const ESC: &str = "\x1b";

/// Reset all display attributes and colors.
pub const ATTRIBUTE_RESET: &str = "\x1b[0m";

/// Switch to the alternate screen, saving the current one.
pub const SAVE_SCREEN: &str = "\x1b[?47h";

/// Switch back from the alternate screen.
pub const RESTORE_SCREEN: &str = "\x1b[?47l";

/// Hide the terminal cursor.
pub const HIDE_CURSOR: &str = "\x1b[?25l";

/// Show the terminal cursor.
pub const SHOW_CURSOR: &str = "\x1b[?25h";

/// Full terminal reset (RIS).
pub const TERMINAL_RESET: &str = "\x1bc";

/// Move the cursor to zero-based `(x, y)`; the sequence itself is 1-indexed.
#[inline]
pub fn cursor_to<W: Write>(w: &mut W, x: u16, y: u16) -> fmt::Result {
    write!(w, "\x1b[{};{}f", u32::from(y) + 1, u32::from(x) + 1)
}

/// Set a 24-bit background color.
#[inline]
pub fn background<W: Write>(w: &mut W, rgb: Rgb) -> fmt::Result {
    write!(w, "\x1b[48;2;{};{};{}m", rgb.r, rgb.g, rgb.b)
}

/// Set a 24-bit foreground color.
#[inline]
pub fn foreground<W: Write>(w: &mut W, rgb: Rgb) -> fmt::Result {
    write!(w, "\x1b[38;2;{};{};{}m", rgb.r, rgb.g, rgb.b)
}

/// Turn on a display attribute by its SGR code.
#[inline]
pub fn attribute<W: Write>(w: &mut W, code: u8) -> fmt::Result {
    write!(w, "\x1b[{code}m")
}
