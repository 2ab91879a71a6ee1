//! Color parsing and normalization.
//!
//! Every color that reaches the grid goes through [`Color`], which keeps its
//! channels clamped to `[0, 255]` no matter how it was constructed. Parsed
//! input is accepted in four shapes, tried in this order:
//!
//! 1. a case-insensitive name from the CSS/X11 table (`"coral"`)
//! 2. `rgb(r, g, b)` with 1-3 digit decimal channels
//! 3. `#RRGGBB` hex
//! 4. a raw numeric triple (see [`ColorSpec::Triple`])

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::named;

static RGB_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^rgb\(([0-9]{1,3}),\s*([0-9]{1,3}),\s*([0-9]{1,3})\)$")
        .expect("rgb pattern is valid")
});

static HEX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$")
        .expect("hex pattern is valid")
});

/// Keyword that disables a color channel instead of naming a color.
pub const NONE_KEYWORD: &str = "none";

/// Error type for color parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// Input started an `rgb(...)` expression but did not complete it.
    #[error("invalid rgb() expression: {0:?}")]
    InvalidRgb(String),
    /// Input started a `#` hex color but was not exactly six hex digits.
    #[error("invalid hex color: {0:?} (expected #RRGGBB)")]
    InvalidHex(String),
    /// Input matched no known grammar.
    #[error("color {0:?} can't be parsed")]
    Unrecognized(String),
    /// A boolean other than `false` was used as a color.
    #[error("{0} is not a color (only false disables a channel)")]
    NotAColor(bool),
}

/// Canonical 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a triple from channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// RGB color with channels clamped to `[0, 255]`.
///
/// Channels are stored unrounded so that arithmetic on them stays exact until
/// read; the getters round to the nearest integer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    r: f32,
    g: f32,
    b: f32,
}

fn clamp_channel(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 255.0)
    }
}

fn round_channel(value: f32) -> u8 {
    value.round() as u8
}

impl Color {
    /// Black color
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    /// White color
    pub const WHITE: Self = Self {
        r: 255.0,
        g: 255.0,
        b: 255.0,
    };

    /// Create a color from 8-bit channels.
    #[must_use]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r),
            g: f32::from(g),
            b: f32::from(b),
        }
    }

    /// Create a color from an arbitrary numeric triple, clamping each channel.
    #[must_use]
    pub fn from_triple(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
        }
    }

    /// Parse a color expression (name, `rgb(...)` or `#RRGGBB`).
    ///
    /// # Errors
    ///
    /// Returns an error if the input matches none of the grammars. Input that
    /// begins an `rgb(` or `#` expression is held to that grammar only.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        if let Some(color) = Self::from_name(input) {
            return Ok(color);
        }
        if starts_with_ignore_case(input, "rgb(") {
            return Self::from_rgb_str(input);
        }
        if input.starts_with('#') {
            return Self::from_hex(input);
        }
        Err(ColorParseError::Unrecognized(input.to_string()))
    }

    /// Look up a color by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        named::lookup(name).map(|[r, g, b]| Self::new(r, g, b))
    }

    /// Parse an `rgb(r, g, b)` expression. Channels above 255 clamp.
    ///
    /// # Errors
    ///
    /// Returns [`ColorParseError::InvalidRgb`] if the input is not a complete
    /// `rgb()` expression with 1-3 digit channels.
    pub fn from_rgb_str(input: &str) -> Result<Self, ColorParseError> {
        let caps = RGB_PATTERN
            .captures(input)
            .ok_or_else(|| ColorParseError::InvalidRgb(input.to_string()))?;
        let channel = |i: usize| -> Result<f32, ColorParseError> {
            caps[i]
                .parse::<u16>()
                .map(f32::from)
                .map_err(|_| ColorParseError::InvalidRgb(input.to_string()))
        };
        Ok(Self::from_triple(channel(1)?, channel(2)?, channel(3)?))
    }

    /// Parse a `#RRGGBB` hex string (hex digits in either case).
    ///
    /// # Errors
    ///
    /// Returns [`ColorParseError::InvalidHex`] if the input is not `#`
    /// followed by exactly six hex digits.
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let caps = HEX_PATTERN
            .captures(input)
            .ok_or_else(|| ColorParseError::InvalidHex(input.to_string()))?;
        let channel = |i: usize| -> Result<u8, ColorParseError> {
            u8::from_str_radix(&caps[i], 16).map_err(|_| ColorParseError::InvalidHex(input.to_string()))
        };
        Ok(Self::new(channel(1)?, channel(2)?, channel(3)?))
    }

    /// Whether `input` is a known color name.
    #[must_use]
    pub fn is_named(input: &str) -> bool {
        named::lookup(input).is_some()
    }

    /// Whether `input` is a complete `rgb(r, g, b)` expression.
    #[must_use]
    pub fn is_rgb(input: &str) -> bool {
        RGB_PATTERN.is_match(input)
    }

    /// Whether `input` is a `#RRGGBB` hex color.
    #[must_use]
    pub fn is_hex(input: &str) -> bool {
        HEX_PATTERN.is_match(input)
    }

    /// Red channel, rounded.
    #[must_use]
    pub fn r(&self) -> u8 {
        round_channel(self.r)
    }

    /// Green channel, rounded.
    #[must_use]
    pub fn g(&self) -> u8 {
        round_channel(self.g)
    }

    /// Blue channel, rounded.
    #[must_use]
    pub fn b(&self) -> u8 {
        round_channel(self.b)
    }

    /// Set the red channel, clamping to `[0, 255]`.
    pub fn set_r(&mut self, value: f32) -> &mut Self {
        self.r = clamp_channel(value);
        self
    }

    /// Set the green channel, clamping to `[0, 255]`.
    pub fn set_g(&mut self, value: f32) -> &mut Self {
        self.g = clamp_channel(value);
        self
    }

    /// Set the blue channel, clamping to `[0, 255]`.
    pub fn set_b(&mut self, value: f32) -> &mut Self {
        self.b = clamp_channel(value);
        self
    }

    /// Rounded 8-bit triple.
    #[must_use]
    pub fn to_rgb(&self) -> Rgb {
        Rgb::new(self.r(), self.g(), self.b())
    }

    /// Convert to a lowercase `#rrggbb` string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r(), self.g(), self.b())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::new(rgb.r, rgb.g, rgb.b)
    }
}

impl From<Color> for Rgb {
    fn from(color: Color) -> Self {
        color.to_rgb()
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r(), self.g(), self.b())
    }
}

fn starts_with_ignore_case(input: &str, prefix: &str) -> bool {
    input
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Caller-facing color input.
///
/// This is what paint setters accept. It deserializes from a string, a
/// `{ "r": .., "g": .., "b": .. }` object or `false`, so colors can be read
/// straight out of JSON or TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// A color expression, or the `"none"` keyword.
    Text(String),
    /// A raw numeric triple; each channel is clamped.
    Triple {
        /// Red channel
        r: f32,
        /// Green channel
        g: f32,
        /// Blue channel
        b: f32,
    },
    /// `false` disables the channel; `true` is rejected.
    Flag(bool),
}

impl ColorSpec {
    /// The value that disables a color channel.
    pub const NONE: Self = Self::Flag(false);

    /// Resolve to a color, or `None` when the value disables the channel.
    ///
    /// # Errors
    ///
    /// Returns an error if text input matches no color grammar or the value
    /// is `true`.
    pub fn resolve(&self) -> Result<Option<Color>, ColorParseError> {
        match self {
            Self::Text(text) if text.eq_ignore_ascii_case(NONE_KEYWORD) => Ok(None),
            Self::Text(text) => Color::parse(text).map(Some),
            Self::Triple { r, g, b } => Ok(Some(Color::from_triple(*r, *g, *b))),
            Self::Flag(false) => Ok(None),
            Self::Flag(true) => Err(ColorParseError::NotAColor(true)),
        }
    }

    /// Resolve straight to the canonical triple.
    ///
    /// # Errors
    ///
    /// Same as [`ColorSpec::resolve`].
    pub fn resolve_rgb(&self) -> Result<Option<Rgb>, ColorParseError> {
        Ok(self.resolve()?.map(|color| color.to_rgb()))
    }
}

impl From<&str> for ColorSpec {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ColorSpec {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for ColorSpec {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<Color> for ColorSpec {
    fn from(color: Color) -> Self {
        Self::Triple {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

impl From<Rgb> for ColorSpec {
    fn from(rgb: Rgb) -> Self {
        Self::from(Color::from(rgb))
    }
}

impl From<Option<Color>> for ColorSpec {
    fn from(color: Option<Color>) -> Self {
        color.map_or(Self::NONE, Self::from)
    }
}

impl From<(f32, f32, f32)> for ColorSpec {
    fn from((r, g, b): (f32, f32, f32)) -> Self {
        Self::Triple { r, g, b }
    }
}
