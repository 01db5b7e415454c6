// SPDX-License-Identifier: GPL-3.0-or-later
use std::convert::{From, TryFrom};
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// An 8-bit RGB color.
///
/// This type can be formatted as a hex code using the standard formatting syntax. The formatted
/// output will have a leading '#'. The same format is accepted when parsing from a string or
/// deserializing.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub(crate) struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl From<colorous::Color> for Color {
    fn from(other_color: colorous::Color) -> Self {
        Color {
            red: other_color.r,
            green: other_color.g,
            blue: other_color.b,
        }
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(color: Color) -> Self {
        image::Rgb(color.as_array())
    }
}

impl fmt::LowerHex for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            self.red(),
            self.green(),
            self.blue()
        )
    }
}

impl FromStr for Color {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err("colors must be given as six hex digits, like #ff8800");
        }
        let component = |start: usize| {
            u8::from_str_radix(&hex[start..start + 2], 16).map_err(|_| "invalid hex digit in color")
        };
        Ok(Self::new(component(0)?, component(2)?, component(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Color {
    pub(crate) const BLACK: Self = Self {
        red: u8::MIN,
        green: u8::MIN,
        blue: u8::MIN,
    };

    pub(crate) const WHITE: Self = Self {
        red: u8::MAX,
        green: u8::MAX,
        blue: u8::MAX,
    };

    /// Marker color for the hottest point.
    pub(crate) const HOT: Self = Self {
        red: u8::MAX,
        green: 0x30,
        blue: 0x30,
    };

    /// Marker color for the coldest point.
    pub(crate) const COLD: Self = Self {
        red: 0x30,
        green: 0x90,
        blue: u8::MAX,
    };

    /// Create a new [Color] with the given 8-bit color values.
    pub(crate) const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// The 8-bit color value of the red component.
    pub(crate) fn red(&self) -> u8 {
        self.red
    }

    /// The 8-bit color value of the green component.
    pub(crate) fn green(&self) -> u8 {
        self.green
    }

    /// The 8-bit color value of the blue component.
    pub(crate) fn blue(&self) -> u8 {
        self.blue
    }

    /// The red, green, and blue components as a 3 element array.
    pub(crate) fn as_array(&self) -> [u8; 3] {
        [self.red(), self.green(), self.blue()]
    }

    /// Mix `self` over `background`, with `coverage` in the range 0 (none) to 255 (opaque).
    pub(crate) fn blend_over(&self, background: [u8; 3], coverage: u8) -> [u8; 3] {
        let alpha = u16::from(coverage);
        let mix = |fg: u8, bg: u8| -> u8 {
            ((u16::from(fg) * alpha + u16::from(bg) * (255 - alpha) + 127) / 255) as u8
        };
        [
            mix(self.red, background[0]),
            mix(self.green, background[1]),
            mix(self.blue, background[2]),
        ]
    }
}

#[cfg(test)]
mod color_test {
    use super::Color;

    #[test]
    fn black() {
        let black = Color::BLACK;
        assert_eq!(black.red(), 0);
        assert_eq!(black.green(), 0);
        assert_eq!(black.blue(), 0);
    }

    #[test]
    fn white() {
        let white = Color::WHITE;
        assert_eq!(white.red(), u8::MAX);
        assert_eq!(white.green(), u8::MAX);
        assert_eq!(white.blue(), u8::MAX);
    }

    #[test]
    fn new_order() {
        let c = Color::new(25, 125, 225);
        assert_eq!(c.red(), 25);
        assert_eq!(c.green(), 125);
        assert_eq!(c.blue(), 225);
    }

    #[test]
    fn hex_round_trip() {
        let c: Color = "#1a2B3c".parse().unwrap();
        assert_eq!(c, Color::new(0x1a, 0x2b, 0x3c));
        assert_eq!(format!("{:x}", c), "#1a2b3c");
        assert_eq!("00ff00".parse::<Color>(), Ok(Color::new(0, 255, 0)));
    }

    #[test]
    fn bad_hex() {
        assert!("#12345".parse::<Color>().is_err());
        assert!("#12345g".parse::<Color>().is_err());
        assert!("white".parse::<Color>().is_err());
    }

    #[test]
    fn deserialize() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            color: Color,
        }
        let parsed: Wrapper = toml::from_str("color = \"#ffff00\"").unwrap();
        assert_eq!(parsed.color, Color::new(255, 255, 0));
        assert!(toml::from_str::<Wrapper>("color = \"yellow\"").is_err());
    }

    #[test]
    fn blending() {
        let background = [0, 100, 200];
        assert_eq!(Color::WHITE.blend_over(background, 0), background);
        assert_eq!(Color::WHITE.blend_over(background, 255), [255, 255, 255]);
        assert_eq!(Color::BLACK.blend_over([200, 200, 200], 128), [100, 100, 100]);
    }
}
