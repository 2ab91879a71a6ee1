//! A single grid position and its escape-sequence serialization.

use std::fmt;

use gridpaint_core::Rgb;

use super::sequences;

/// Display attributes for a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Attributes(u8);

impl Attributes {
    /// No attributes.
    pub const NONE: Self = Self(0);
    /// Bold text.
    pub const BOLD: Self = Self(1 << 0);
    /// Dim/faint text.
    pub const DIM: Self = Self(1 << 1);
    /// Underlined text.
    pub const UNDERLINED: Self = Self(1 << 2);
    /// Blinking text.
    pub const BLINK: Self = Self(1 << 3);
    /// Reversed colors.
    pub const REVERSE: Self = Self(1 << 4);
    /// Hidden text.
    pub const HIDDEN: Self = Self(1 << 5);

    /// Every attribute paired with its SGR code, in serialization order.
    const SGR_CODES: [(Self, u8); 6] = [
        (Self::BOLD, 1),
        (Self::DIM, 2),
        (Self::UNDERLINED, 4),
        (Self::BLINK, 5),
        (Self::REVERSE, 7),
        (Self::HIDDEN, 8),
    ];

    /// Create empty attributes.
    #[must_use]
    pub const fn empty() -> Self {
        Self::NONE
    }

    /// Check if no attribute is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if a specific attribute is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Add an attribute.
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Remove an attribute.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Add or remove an attribute.
    #[must_use]
    pub const fn set(self, other: Self, on: bool) -> Self {
        if on {
            self.with(other)
        } else {
            self.without(other)
        }
    }

    /// Get raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// SGR codes of the active attributes, bold first and hidden last.
    pub fn sgr_codes(self) -> impl Iterator<Item = u8> {
        Self::SGR_CODES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, code)| code)
    }
}

impl std::ops::BitOr for Attributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Attributes {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for Attributes {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

/// Convert one raw channel triple to a color; any negative channel unsets it.
fn channels_to_rgb(r: i32, g: i32, b: i32) -> Option<Rgb> {
    if r < 0 || g < 0 || b < 0 {
        return None;
    }
    let clamp = |v: i32| v.min(255) as u8;
    Some(Rgb::new(clamp(r), clamp(g), clamp(b)))
}

/// One addressable grid position.
///
/// A cell knows its own coordinates so that its serialized form carries an
/// absolute cursor move. Serialization is a pure function of the visible
/// fields: two cells with the same position, glyph, colors and attributes
/// always produce byte-identical output, which is what lets the canvas diff
/// frames with a plain string comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    symbol: char,
    x: u16,
    y: u16,
    background: Option<Rgb>,
    foreground: Option<Rgb>,
    attributes: Attributes,
    modified: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: ' ',
            x: 0,
            y: 0,
            background: None,
            foreground: None,
            attributes: Attributes::NONE,
            modified: false,
        }
    }
}

impl Cell {
    /// Create a blank, clean cell at `(x, y)`.
    #[must_use]
    pub fn new(x: u16, y: u16) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// The displayed symbol.
    #[must_use]
    pub const fn symbol(&self) -> char {
        self.symbol
    }

    /// Store the first character of `s`; the rest is dropped.
    ///
    /// An empty string stores a space.
    pub fn set_char(&mut self, s: &str) -> &mut Self {
        self.symbol = s.chars().next().unwrap_or(' ');
        self
    }

    /// Store a single character.
    pub fn set_symbol(&mut self, ch: char) -> &mut Self {
        self.symbol = ch;
        self
    }

    /// Column of this cell.
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.x
    }

    /// Row of this cell.
    #[must_use]
    pub const fn y(&self) -> u16 {
        self.y
    }

    pub fn set_x(&mut self, x: u16) -> &mut Self {
        self.x = x;
        self
    }

    pub fn set_y(&mut self, y: u16) -> &mut Self {
        self.y = y;
        self
    }

    /// Background color, `None` for the terminal default.
    #[must_use]
    pub const fn background(&self) -> Option<Rgb> {
        self.background
    }

    /// Foreground color, `None` for the terminal default.
    #[must_use]
    pub const fn foreground(&self) -> Option<Rgb> {
        self.foreground
    }

    /// Set the background from raw channels; a negative channel unsets it.
    pub fn set_background(&mut self, r: i32, g: i32, b: i32) -> &mut Self {
        self.background = channels_to_rgb(r, g, b);
        self
    }

    /// Set the foreground from raw channels; a negative channel unsets it.
    pub fn set_foreground(&mut self, r: i32, g: i32, b: i32) -> &mut Self {
        self.foreground = channels_to_rgb(r, g, b);
        self
    }

    pub fn set_background_rgb(&mut self, rgb: Option<Rgb>) -> &mut Self {
        self.background = rgb;
        self
    }

    pub fn set_foreground_rgb(&mut self, rgb: Option<Rgb>) -> &mut Self {
        self.foreground = rgb;
        self
    }

    /// Active display attributes.
    #[must_use]
    pub const fn attributes(&self) -> Attributes {
        self.attributes
    }

    /// Replace all display attributes; anything not in `attributes` is off.
    pub fn set_attributes(&mut self, attributes: Attributes) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Whether the cell changed since the last flush.
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) -> &mut Self {
        self.modified = modified;
        self
    }

    /// Whether the cell shows nothing but a default space.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.symbol == ' '
            && self.background.is_none()
            && self.foreground.is_none()
            && self.attributes.is_empty()
    }

    /// Restore the default look and mark the cell dirty.
    ///
    /// The cell is marked dirty even if it already looked blank, so the next
    /// flush re-checks it against what was last emitted.
    pub fn reset(&mut self) -> &mut Self {
        self.symbol = ' ';
        self.background = None;
        self.foreground = None;
        self.attributes = Attributes::NONE;
        self.modified = true;
        self
    }

    /// Write the serialized form of this cell.
    ///
    /// Order: position, background, foreground, attributes, symbol, reset.
    ///
    /// # Errors
    ///
    /// Only fails if the underlying writer does.
    pub fn write_sequence<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        sequences::cursor_to(w, self.x, self.y)?;
        if let Some(bg) = self.background {
            sequences::background(w, bg)?;
        }
        if let Some(fg) = self.foreground {
            sequences::foreground(w, fg)?;
        }
        for code in self.attributes.sgr_codes() {
            sequences::attribute(w, code)?;
        }
        w.write_char(self.symbol)?;
        w.write_str(sequences::ATTRIBUTE_RESET)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_sequence(f)
    }
}
