//! Colour values as written in the config file
//!
//! `rgba(r, g, b, a)` takes four 0-255 integers, alpha included, so
//! `rgba(0, 0, 0, 128)` is half transparent. Anything else is handed to
//! `csscolorparser` (`#rrggbb`, named colours, CSS `rgb()`/`hsl()`, ...).

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid colour '{input}': {reason}")]
pub struct ParseColorError {
    input: String,
    reason: String,
}

/// Straight-alpha 8-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const TRANSLUCENT_BLACK: Rgba = Rgba::new(0, 0, 0, 128);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

fn parse_rgba_function(s: &str) -> Option<Rgba> {
    let lower = s.to_ascii_lowercase();
    let inner = lower.strip_prefix("rgba(")?.strip_suffix(')')?;
    let channels = inner
        .split(',')
        .map(|part| part.trim().parse::<u8>().ok())
        .collect::<Option<Vec<u8>>>()?;

    let [r, g, b, a] = channels[..] else {
        return None;
    };
    Some(Rgba::new(r, g, b, a))
}

impl FromStr for Rgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(color) = parse_rgba_function(s) {
            return Ok(color);
        }

        csscolorparser::parse(s)
            .map(|color| {
                let [r, g, b, a] = color.to_rgba8();
                Rgba::new(r, g, b, a)
            })
            .map_err(|e| ParseColorError {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_alpha_uses_byte_range() {
        let color: Rgba = "rgba(0, 0, 0, 128)".parse().unwrap();
        assert_eq!(color, Rgba::TRANSLUCENT_BLACK);

        let color: Rgba = "RGBA(10,20,30,40)".parse().unwrap();
        assert_eq!(color, Rgba::new(10, 20, 30, 40));
    }

    #[test]
    fn test_css_forms_fall_through() {
        assert_eq!("#ff0000".parse::<Rgba>().unwrap(), Rgba::new(255, 0, 0, 255));
        assert_eq!("white".parse::<Rgba>().unwrap(), Rgba::WHITE);
        // Fractional alpha is CSS, not the byte form
        let alpha = "rgba(0, 0, 0, 0.5)".parse::<Rgba>().unwrap().a;
        assert!((127..=128).contains(&alpha));
    }

    #[test]
    fn test_invalid_colors() {
        assert!("rgba(0, 0)".parse::<Rgba>().is_err());
        assert!("not a colour".parse::<Rgba>().is_err());
        assert!("".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_display_matches_config_syntax() {
        assert_eq!(Rgba::WHITE.to_string(), "rgba(255, 255, 255, 255)");
    }
}
