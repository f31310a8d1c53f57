//! Color parsing
//!
//! Accepted color forms:
//!
//! ```text
//! red        → (255, 0, 0)     (16 named colors, case-insensitive)
//! #ff0000    → (255, 0, 0)
//! ff0000     → (255, 0, 0)
//! #f00       → (255, 0, 0)     (each nibble doubled)
//! ```
//!
//! Gradients are written as comma-separated stops:
//!
//! ```text
//! 0%: red, 33%: #00ff00, 66%: blue
//! ```

use std::fmt;

use crate::error::EncodeError;
use crate::value::SettingValue;

/// RGB color value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Color as `[r, g, b]`
    pub fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

/// Named colors (the HTML 4 basic palette)
pub const NAMED_COLORS: [(&str, Rgb); 16] = [
    ("white", Rgb::new(0xFF, 0xFF, 0xFF)),
    ("silver", Rgb::new(0xC0, 0xC0, 0xC0)),
    ("gray", Rgb::new(0x80, 0x80, 0x80)),
    ("black", Rgb::new(0x00, 0x00, 0x00)),
    ("red", Rgb::new(0xFF, 0x00, 0x00)),
    ("maroon", Rgb::new(0x80, 0x00, 0x00)),
    ("yellow", Rgb::new(0xFF, 0xFF, 0x00)),
    ("olive", Rgb::new(0x80, 0x80, 0x00)),
    ("lime", Rgb::new(0x00, 0xFF, 0x00)),
    ("green", Rgb::new(0x00, 0x80, 0x00)),
    ("aqua", Rgb::new(0x00, 0xFF, 0xFF)),
    ("teal", Rgb::new(0x00, 0x80, 0x80)),
    ("blue", Rgb::new(0x00, 0x00, 0xFF)),
    ("navy", Rgb::new(0x00, 0x00, 0x80)),
    ("fuchsia", Rgb::new(0xFF, 0x00, 0xFF)),
    ("purple", Rgb::new(0x80, 0x00, 0x80)),
];

fn named_color(name: &str) -> Option<Rgb> {
    NAMED_COLORS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, rgb)| *rgb)
}

/// Strip an optional `#` and return the hex digits if they form a 3 or 6
/// digit color
fn hex_digits(s: &str) -> Option<&str> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    let valid = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
    valid.then_some(digits)
}

/// Check whether a string is a color this module can parse
pub fn is_color(s: &str) -> bool {
    let s = s.trim();
    named_color(s).is_some() || hex_digits(s).is_some()
}

/// Parse a named or hexadecimal color
pub fn parse_color(s: &str) -> Result<Rgb, EncodeError> {
    let s = s.trim();
    if let Some(rgb) = named_color(s) {
        return Ok(rgb);
    }

    let digits = hex_digits(s).ok_or_else(|| EncodeError::InvalidColor(s.to_string()))?;
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };

    let channel = |i: usize| {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .map_err(|_| EncodeError::InvalidColor(s.to_string()))
    };
    Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Parse a color given either as text or as an `[r, g, b]` list
pub fn parse_color_value(value: &SettingValue) -> Result<Rgb, EncodeError> {
    match value {
        SettingValue::Text(s) => parse_color(s),
        SettingValue::List(items) if items.len() == 3 => {
            let mut channels = [0u8; 3];
            for (channel, item) in channels.iter_mut().zip(items) {
                *channel = item
                    .as_i64()
                    .and_then(|v| u8::try_from(v).ok())
                    .ok_or_else(|| EncodeError::InvalidColor(value.to_string()))?;
            }
            Ok(Rgb::new(channels[0], channels[1], channels[2]))
        }
        other => Err(EncodeError::InvalidColor(other.to_string())),
    }
}

/// One color stop of a gradient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientStop {
    /// Position in percent (0-100)
    pub position: u8,
    pub color: Rgb,
}

/// Parse a gradient string such as `0%: red, 50%: #00f`
///
/// Whitespace is ignored. Stops are returned in the order written; ordering
/// rules are enforced by the gradient handlers.
pub fn parse_gradient(s: &str) -> Result<Vec<GradientStop>, EncodeError> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let mut stops = Vec::new();

    for raw_stop in compact.split(',').filter(|stop| !stop.is_empty()) {
        let malformed = || EncodeError::InvalidGradientSyntax(format!("bad color stop \"{raw_stop}\""));

        let (position, color) = raw_stop.split_once(':').ok_or_else(malformed)?;
        let position = position.strip_suffix('%').ok_or_else(malformed)?;
        let position: u8 = position.parse().map_err(|_| malformed())?;
        if position > 100 {
            return Err(EncodeError::InvalidGradientSyntax(format!(
                "position {position}% is above 100%"
            )));
        }
        let color = parse_color(color).map_err(|_| malformed())?;

        stops.push(GradientStop { position, color });
    }

    if stops.is_empty() {
        return Err(EncodeError::EmptyGradient);
    }
    Ok(stops)
}
