//! RGBA colors with CSS parsing and formatting.

use std::fmt;

/// 8-bit RGBA color. Ordered so it can key deterministic batches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color: {:?}", self.0)
    }
}

impl std::error::Error for ColorParseError {}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `alpha` in `[0, 1]`.
    pub const fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self {
            r,
            g,
            b,
            a: alpha_to_u8(alpha),
        }
    }

    /// Opaque color from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha_to_u8(alpha),
            ..self
        }
    }

    pub fn alpha(self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Parses `#rgb`, `#rrggbb` and `#rrggbbaa`.
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(s.to_string());
        let digits = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| err());
        match digits.len() {
            3 => {
                let nib = |i: usize| {
                    u8::from_str_radix(&digits[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| err())
                };
                Ok(Color::rgb(nib(0)?, nib(1)?, nib(2)?))
            }
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => Err(err()),
        }
    }

    /// CSS form: `#rrggbb` when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn to_css(self) -> String {
        self.to_string()
    }
}

const fn alpha_to_u8(alpha: f32) -> u8 {
    let a = if alpha < 0.0 {
        0.0
    } else if alpha > 1.0 {
        1.0
    } else {
        alpha
    };
    (a * 255.0 + 0.5) as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let a = (self.alpha() * 1000.0).round() / 1000.0;
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, a)
        }
    }
}

impl std::str::FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_css_hex_forms() {
        assert_eq!(Color::parse("#3b82f6").unwrap(), Color::hex(0x3b82f6));
        assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("#FDB81340").unwrap().a, 0x40);
        assert!(Color::parse("3b82f6").is_err());
        assert!(Color::parse("#3b82f").is_err());
        assert!(Color::parse("#zzzzzz").is_err());
    }

    #[test]
    fn formats_opaque_and_translucent() {
        assert_eq!(Color::hex(0x050810).to_css(), "#050810");
        assert_eq!(Color::rgba(59, 130, 246, 0.25).to_css(), "rgba(59, 130, 246, 0.251)");
        assert_eq!(Color::TRANSPARENT.to_css(), "rgba(0, 0, 0, 0)");
    }

    #[test]
    fn orders_deterministically() {
        let mut v = vec![Color::hex(0xff0000), Color::hex(0x00ff00), Color::hex(0x0000ff)];
        v.sort();
        assert_eq!(v[0], Color::hex(0x0000ff));
    }
}
