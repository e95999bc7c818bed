//! Color token resolution and terminal rendering
//!
//! A color token typed by a user resolves through a fixed chain of
//! interpretations: the named catalog first, then CSS-style `#RGB` and
//! `#RRGGBB`, then a bare six-digit hex form. The first interpretation
//! that accepts the token wins and later ones are never consulted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Escape sequence that returns terminal output to its default color.
pub const ANSI_RESET: &str = "\u{1b}[0m";

/// The color names every client understands, with their canonical values.
pub const NAMED_COLORS: &[(&str, ColorSpec)] = &[
    ("black", ColorSpec::rgb(0x00, 0x00, 0x00)),
    ("dark_blue", ColorSpec::rgb(0x00, 0x00, 0xaa)),
    ("dark_green", ColorSpec::rgb(0x00, 0xaa, 0x00)),
    ("dark_aqua", ColorSpec::rgb(0x00, 0xaa, 0xaa)),
    ("dark_red", ColorSpec::rgb(0xaa, 0x00, 0x00)),
    ("dark_purple", ColorSpec::rgb(0xaa, 0x00, 0xaa)),
    ("gold", ColorSpec::rgb(0xff, 0xaa, 0x00)),
    ("gray", ColorSpec::rgb(0xaa, 0xaa, 0xaa)),
    ("dark_gray", ColorSpec::rgb(0x55, 0x55, 0x55)),
    ("blue", ColorSpec::rgb(0x55, 0x55, 0xff)),
    ("green", ColorSpec::rgb(0x55, 0xff, 0x55)),
    ("aqua", ColorSpec::rgb(0x55, 0xff, 0xff)),
    ("red", ColorSpec::rgb(0xff, 0x55, 0x55)),
    ("light_purple", ColorSpec::rgb(0xff, 0x55, 0xff)),
    ("yellow", ColorSpec::rgb(0xff, 0xff, 0x55)),
    ("white", ColorSpec::rgb(0xff, 0xff, 0xff)),
];

/// A validated RGB color. Values only exist for tokens that passed
/// [`ColorSpec::parse`] or came from the named catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSpec {
    r: u8,
    g: u8,
    b: u8,
}

impl ColorSpec {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Resolves a user-supplied token.
    ///
    /// Catalog names match case-insensitively. `#RGB` shorthand expands
    /// each digit by repetition, so `#1af` means `#11aaff`. The bare form
    /// accepts exactly six hex digits and nothing else.
    pub fn parse(token: &str) -> Option<ColorSpec> {
        from_name(token)
            .or_else(|| from_css_hex(token))
            .or_else(|| from_bare_hex(token))
    }

    /// The escape sequence that switches terminal output to this color.
    pub fn ansi(&self) -> String {
        format!("\u{1b}[38;2;{};{};{}m", self.r, self.g, self.b)
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn from_name(token: &str) -> Option<ColorSpec> {
    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|(_, color)| *color)
}

fn from_css_hex(token: &str) -> Option<ColorSpec> {
    let digits = token.strip_prefix('#')?;
    match digits.len() {
        3 => {
            let mut channels = digits.chars().map(|c| c.to_digit(16));
            let r = channels.next()?? as u8;
            let g = channels.next()?? as u8;
            let b = channels.next()?? as u8;
            Some(ColorSpec::rgb(r * 17, g * 17, b * 17))
        }
        6 => from_digits(digits),
        _ => None,
    }
}

fn from_bare_hex(token: &str) -> Option<ColorSpec> {
    from_digits(token)
}

fn from_digits(digits: &str) -> Option<ColorSpec> {
    // from_str_radix tolerates a leading '+', so check characters first.
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    Some(ColorSpec::rgb(
        (value >> 16) as u8,
        (value >> 8) as u8,
        value as u8,
    ))
}
