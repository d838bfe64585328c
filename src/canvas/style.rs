//! Fill colors and font descriptions understood by drawing contexts.

use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS-style color: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`,
    /// `rgb(r, g, b)`, `rgba(r, g, b, a)` or a basic named color.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }

        let lower = value.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_function(args);
        }

        named_color(&lower)
    }

    /// Parse a color, using black when the value cannot be parsed.
    pub fn parse_or_black(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            tracing::warn!(color = value, "Unparseable fill color, using black");
            Self::BLACK
        })
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digits: Vec<u8> = hex.bytes().map(hex_digit).collect::<Option<_>>()?;

    match digits.len() {
        // Short forms double each digit: 0xF -> 0xFF
        3 | 4 => {
            let a = digits.get(3).map_or(255, |d| d * 17);
            Some(Color::rgba(digits[0] * 17, digits[1] * 17, digits[2] * 17, a))
        }
        6 | 8 => {
            let byte = |i: usize| digits[i] * 16 + digits[i + 1];
            let a = if digits.len() == 8 { byte(6) } else { 255 };
            Some(Color::rgba(byte(0), byte(2), byte(4), a))
        }
        _ => None,
    }
}

fn parse_rgb_function(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        let v: f32 = s.parse().ok()?;
        Some(v.clamp(0.0, 255.0).round() as u8)
    };
    let alpha = match parts.get(3) {
        Some(s) => {
            let v: f32 = s.parse().ok()?;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };

    Some(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name {
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "silver" => Color::rgb(192, 192, 192),
        "transparent" => Color::rgba(0, 0, 0, 0),
        _ => return None,
    };
    Some(color)
}

/// CSS font weight: a keyword (`normal`, `bold`, ...) or a number (100-900).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontWeight {
    Numeric(u16),
    Keyword(String),
}

impl FontWeight {
    pub fn normal() -> Self {
        Self::Keyword("normal".to_string())
    }

    pub fn bold() -> Self {
        Self::Keyword("bold".to_string())
    }

    /// Whether a bold face should be used.
    pub fn is_bold(&self) -> bool {
        match self {
            Self::Numeric(weight) => *weight >= 600,
            Self::Keyword(keyword) => {
                let keyword = keyword.trim().to_ascii_lowercase();
                match keyword.as_str() {
                    "bold" | "bolder" => true,
                    other => other.parse::<u16>().map(|w| w >= 600).unwrap_or(false),
                }
            }
        }
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::normal()
    }
}

impl std::fmt::Display for FontWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(weight) => write!(f, "{weight}"),
            Self::Keyword(keyword) => f.write_str(keyword),
        }
    }
}

/// Font selection for text drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Family name, or a comma-separated list of candidates.
    pub family: String,
    pub weight: FontWeight,
    /// Em size in pixels.
    pub size: f32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, weight: FontWeight, size: f32) -> Self {
        Self {
            family: family.into(),
            weight,
            size,
        }
    }
}

impl std::fmt::Display for FontSpec {
    /// CSS shorthand, e.g. `bold 16px Arial`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}px {}", self.weight, self.size, self.family)
    }
}
