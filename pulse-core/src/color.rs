use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// Straight (non-premultiplied) RGBA8 color.
///
/// Parses the CSS-like notations used in config files: `#rrggbb`,
/// `#rrggbbaa`, `rgb(r, g, b)` and `rgba(r, g, b, a)` with `a` in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same hue with alpha replaced by `alpha` in `[0, 1]` (clamped).
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: unit_to_byte(alpha),
            ..self
        }
    }
}

fn unit_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn parse_hex(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_functional(s: &str) -> Option<Color> {
    let (name, rest) = s.split_once('(')?;
    let args = rest.strip_suffix(')')?;
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();

    let channel = |p: &str| p.parse::<u8>().ok();
    match (name.trim(), parts.as_slice()) {
        ("rgb", [r, g, b]) => Some(Color::rgb(channel(r)?, channel(g)?, channel(b)?)),
        ("rgba", [r, g, b, a]) => {
            let a = a.parse::<f32>().ok()?;
            Some(Color::rgba(channel(r)?, channel(g)?, channel(b)?, unit_to_byte(a)))
        }
        _ => None,
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        parse_hex(s)
            .or_else(|| parse_functional(s))
            .ok_or_else(|| ColorError(s.to_owned()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_notations() {
        assert_eq!("#38bdf8".parse::<Color>(), Ok(Color::rgb(56, 189, 248)));
        assert_eq!(
            "#38bdf880".parse::<Color>(),
            Ok(Color::rgba(56, 189, 248, 128))
        );
    }

    #[test]
    fn parses_functional_notations() {
        assert_eq!(
            "rgba(56, 189, 248, 0.3)".parse::<Color>(),
            Ok(Color::rgba(56, 189, 248, 77))
        );
        assert_eq!("rgb(1,2,3)".parse::<Color>(), Ok(Color::rgb(1, 2, 3)));
    }

    #[test]
    fn rejects_garbage() {
        assert!("#38bd".parse::<Color>().is_err());
        assert!("hsl(1, 2, 3)".parse::<Color>().is_err());
        assert!("rgba(300, 0, 0, 1)".parse::<Color>().is_err());
        assert!("#ééé".parse::<Color>().is_err());
    }

    #[test]
    fn with_alpha_clamps_to_unit_range() {
        let c = Color::rgb(10, 20, 30);
        assert_eq!(c.with_alpha(2.0).a, 255);
        assert_eq!(c.with_alpha(-1.0).a, 0);
        assert_eq!(c.with_alpha(0.5).a, 128);
    }

    #[test]
    fn display_reparses_to_same_color() {
        let c = Color::rgba(56, 189, 248, 77);
        assert_eq!(c.to_string().parse::<Color>(), Ok(c));
    }
}
