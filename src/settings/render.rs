// SPDX-License-Identifier: GPL-3.0-or-later
use serde::Deserialize;

use crate::render::font::default_faces;
use crate::render::gradient::default_colormaps;
use crate::render::{Color, FontFace, Method, NamedGradient};
use crate::temperature::TemperatureUnit;

fn default_scale() -> u32 {
    2
}

fn default_padding() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_crosshair_size() -> u32 {
    10
}

fn default_font_scale() -> f64 {
    1.0
}

fn default_highlight_colors() -> Vec<Color> {
    vec![
        Color::WHITE,
        Color::new(0xff, 0xff, 0x00),
        Color::new(0x00, 0xff, 0x00),
        Color::new(0x00, 0xff, 0xff),
        Color::new(0xff, 0x00, 0xff),
    ]
}

/// How frames are displayed when the viewer starts.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct RenderSettings {
    /// The colormaps to cycle through, starting with the first.
    #[serde(default = "default_colormaps")]
    pub(crate) colormaps: Vec<NamedGradient>,

    #[serde(default)]
    pub(crate) units: TemperatureUnit,

    #[serde(default = "default_scale")]
    pub(crate) scale: u32,

    /// Margin excluded from the high/low search, in pixels.
    #[serde(default = "default_padding")]
    pub(crate) padding: usize,

    #[serde(default = "default_true")]
    pub(crate) crosshair: bool,

    #[serde(default = "default_true")]
    pub(crate) high_low: bool,

    #[serde(default)]
    pub(crate) info: bool,

    #[serde(default = "default_crosshair_size")]
    pub(crate) crosshair_size: u32,

    #[serde(default = "default_font_scale")]
    pub(crate) font_scale: f64,

    #[serde(default = "default_faces")]
    pub(crate) fonts: Vec<FontFace>,

    /// Label colors to cycle through.
    #[serde(default = "default_highlight_colors")]
    pub(crate) highlight_colors: Vec<Color>,

    #[serde(default)]
    pub(crate) scaling_method: Method,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            colormaps: default_colormaps(),
            units: TemperatureUnit::default(),
            scale: default_scale(),
            padding: default_padding(),
            crosshair: true,
            high_low: true,
            info: false,
            crosshair_size: default_crosshair_size(),
            font_scale: default_font_scale(),
            fonts: default_faces(),
            highlight_colors: default_highlight_colors(),
            scaling_method: Method::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::convert::TryFrom;

    use super::RenderSettings;
    use crate::render::{Color, FontFace, Method, NamedGradient};
    use crate::temperature::TemperatureUnit;

    #[test]
    fn empty_is_default() {
        let parsed: RenderSettings = toml::from_str("").unwrap();
        assert_eq!(parsed, RenderSettings::default());
    }

    #[test]
    fn full() {
        let source = r##"
            colormaps = ["Turbo", "red yellow blue"]
            units = "fahrenheit"
            scale = 3
            padding = 12
            crosshair = false
            high_low = false
            info = true
            crosshair_size = 6
            font_scale = 1.5
            fonts = [{ name = "mono", path = "/fonts/mono.ttf" }]
            highlight_colors = ["#ff8800", "000000"]
            scaling_method = "bicubic"
        "##;
        let parsed: RenderSettings = toml::from_str(source).unwrap();
        let expected = RenderSettings {
            colormaps: vec![
                NamedGradient::try_from("turbo").unwrap(),
                NamedGradient::try_from("red_yellow_blue").unwrap(),
            ],
            units: TemperatureUnit::Fahrenheit,
            scale: 3,
            padding: 12,
            crosshair: false,
            high_low: false,
            info: true,
            crosshair_size: 6,
            font_scale: 1.5,
            fonts: vec![FontFace::new("mono", "/fonts/mono.ttf")],
            highlight_colors: vec![Color::new(0xff, 0x88, 0x00), Color::BLACK],
            scaling_method: Method::CatmullRom,
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn bad_values() {
        assert!(toml::from_str::<RenderSettings>("colormaps = [\"plaid\"]").is_err());
        assert!(toml::from_str::<RenderSettings>("units = \"kelvin\"").is_err());
        assert!(toml::from_str::<RenderSettings>("highlight_colors = [\"red\"]").is_err());
        assert!(toml::from_str::<RenderSettings>("scaling_method = \"sharpie\"").is_err());
        assert!(toml::from_str::<RenderSettings>("scale = -1").is_err());
    }

    #[test]
    fn empty_lists_parse() {
        // Rejected later, when the presentation state is built.
        let parsed: RenderSettings = toml::from_str("colormaps = []\nfonts = []").unwrap();
        assert!(parsed.colormaps.is_empty());
        assert!(parsed.fonts.is_empty());
    }
}
