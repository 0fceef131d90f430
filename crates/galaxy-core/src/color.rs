//! Colour types and conversions.

use std::fmt;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// 8-bit RGB colour, written as `#rrggbb` in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// White.
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (alpha is ignored).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let mut it = digits.chars().map(|c| c.to_digit(16).map(|v| (v * 17) as u8));
                Some(Rgb(it.next()??, it.next()??, it.next()??))
            }
            6 | 8 => Some(Rgb(
                channel(digits.get(0..2)?)?,
                channel(digits.get(2..4)?)?,
                channel(digits.get(4..6)?)?,
            )),
            _ => None,
        }
    }

    /// Multiply every channel by `factor`, saturating at 255.
    pub fn scale(self, factor: f32) -> Self {
        let f = |c: u8| (c as f32 * factor.max(0.0)).round().min(255.0) as u8;
        Rgb(f(self.0), f(self.1), f(self.2))
    }

    /// Mix towards `other` by `t` in `[0, 1]`.
    pub fn mix(self, other: Rgb, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let m = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb(m(self.0, other.0), m(self.1, other.1), m(self.2, other.2))
    }

    /// Component-wise sum, saturating.
    pub fn add(self, other: Rgb) -> Self {
        Rgb(
            self.0.saturating_add(other.0),
            self.1.saturating_add(other.1),
            self.2.saturating_add(other.2),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value).ok_or_else(|| format!("invalid colour: {value}"))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl From<Rgb> for Color {
    fn from(value: Rgb) -> Self {
        Color::Rgb(value.0, value.1, value.2)
    }
}

/// Convert HSL to RGB. Hue is in degrees, saturation and lightness in `[0, 1]`.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgb {
    if s == 0.0 {
        let v = (l * 255.0) as u8;
        return Rgb(v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let h = h.rem_euclid(360.0) / 360.0;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    Rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Rgb::from_hex("#ff66cc"), Some(Rgb(255, 102, 204)));
        assert_eq!(Rgb::from_hex("#f791c4ff"), Some(Rgb(247, 145, 196)));
        assert_eq!(Rgb::from_hex("#fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_hex("#12"), None);
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_display_round_trips_through_string() {
        let c = Rgb(42, 10, 64);
        assert_eq!(c.to_string(), "#2a0a40");
        assert_eq!(Rgb::try_from(c.to_string()), Ok(c));
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), Rgb(255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), Rgb(0, 255, 0));
        assert_eq!(hsl_to_rgb(0.0, 0.0, 1.0), Rgb(255, 255, 255));
    }

    #[test]
    fn test_scale_saturates() {
        assert_eq!(Rgb(200, 10, 0).scale(2.0), Rgb(255, 20, 0));
        assert_eq!(Rgb(200, 10, 0).scale(-1.0), Rgb(0, 0, 0));
    }
}
