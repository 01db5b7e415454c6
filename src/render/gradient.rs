// SPDX-License-Identifier: GPL-3.0-or-later
use std::convert::TryFrom;
use std::fmt;

use colorous::Gradient;
use serde::de::{self, Deserialize, Deserializer};

/// Every colorous gradient, by its canonical (snake case) name.
const GRADIENTS: &[(&str, Gradient)] = &[
    ("blues", colorous::BLUES),
    ("blue_green", colorous::BLUE_GREEN),
    ("blue_purple", colorous::BLUE_PURPLE),
    ("brown_green", colorous::BROWN_GREEN),
    ("cividis", colorous::CIVIDIS),
    ("cool", colorous::COOL),
    ("cubehelix", colorous::CUBEHELIX),
    ("greens", colorous::GREENS),
    ("green_blue", colorous::GREEN_BLUE),
    ("greys", colorous::GREYS),
    ("inferno", colorous::INFERNO),
    ("magma", colorous::MAGMA),
    ("oranges", colorous::ORANGES),
    ("orange_red", colorous::ORANGE_RED),
    ("pink_green", colorous::PINK_GREEN),
    ("plasma", colorous::PLASMA),
    ("purples", colorous::PURPLES),
    ("purple_blue", colorous::PURPLE_BLUE),
    ("purple_blue_green", colorous::PURPLE_BLUE_GREEN),
    ("purple_green", colorous::PURPLE_GREEN),
    ("purple_orange", colorous::PURPLE_ORANGE),
    ("purple_red", colorous::PURPLE_RED),
    ("rainbow", colorous::RAINBOW),
    ("reds", colorous::REDS),
    ("red_blue", colorous::RED_BLUE),
    ("red_grey", colorous::RED_GREY),
    ("red_purple", colorous::RED_PURPLE),
    ("red_yellow_blue", colorous::RED_YELLOW_BLUE),
    ("red_yellow_green", colorous::RED_YELLOW_GREEN),
    ("sinebow", colorous::SINEBOW),
    ("spectral", colorous::SPECTRAL),
    ("turbo", colorous::TURBO),
    ("viridis", colorous::VIRIDIS),
    ("warm", colorous::WARM),
    ("yellow_green", colorous::YELLOW_GREEN),
    ("yellow_green_blue", colorous::YELLOW_GREEN_BLUE),
    ("yellow_orange_brown", colorous::YELLOW_ORANGE_BROWN),
    ("yellow_orange_red", colorous::YELLOW_ORANGE_RED),
];

/// A colorous gradient along with its canonical name, for display.
///
/// Names are matched ignoring case, and spaces may stand in for underscores.
#[derive(Clone, Copy)]
pub(crate) struct NamedGradient {
    name: &'static str,
    gradient: Gradient,
}

impl NamedGradient {
    pub(crate) fn gradient(&self) -> Gradient {
        self.gradient
    }
}

impl TryFrom<&str> for NamedGradient {
    type Error = &'static str;

    fn try_from(gradient_name: &str) -> Result<Self, Self::Error> {
        let normalized = gradient_name.replace(" ", "_");
        GRADIENTS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&normalized))
            .map(|&(name, gradient)| Self { name, gradient })
            .ok_or("Invalid gradient name")
    }
}

impl TryFrom<String> for NamedGradient {
    type Error = String;

    fn try_from(gradient_name: String) -> Result<Self, Self::Error> {
        NamedGradient::try_from(gradient_name.as_str())
            .map_err(|_| format!("\"{}\" is not the name of a colorous gradient", gradient_name))
    }
}

impl<'de> Deserialize<'de> for NamedGradient {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        NamedGradient::try_from(name).map_err(de::Error::custom)
    }
}

impl PartialEq for NamedGradient {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for NamedGradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamedGradient").field(&self.name).finish()
    }
}

impl fmt::Display for NamedGradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The default colormap rotation.
pub(crate) fn default_colormaps() -> Vec<NamedGradient> {
    [
        "greys",
        "turbo",
        "blue_green",
        "rainbow",
        "blues",
        "yellow_green",
        "purple_red",
        "cool",
        "red_purple",
        "inferno",
        "viridis",
        "yellow_orange_red",
    ]
    .iter()
    .filter_map(|name| NamedGradient::try_from(*name).ok())
    .collect()
}

#[cfg(test)]
mod test {
    use std::convert::TryFrom;

    use serde::Deserialize;

    use super::{default_colormaps, NamedGradient, GRADIENTS};

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        colormap: NamedGradient,
    }

    fn parse_str(gradient_str: &str) -> Result<NamedGradient, toml::de::Error> {
        toml::from_str(&format!("colormap = \"{}\"", gradient_str)).map(|w: Wrapper| w.colormap)
    }

    fn check_parse(gradient_str: &str, expected: colorous::Gradient) {
        let parsed = parse_str(gradient_str);
        assert!(
            parsed.is_ok(),
            "Failed to parse Gradient: {}",
            parsed.unwrap_err()
        );
        let parsed = parsed.unwrap();
        assert_eq!(
            format!("{:?}", parsed.gradient()),
            format!("{:?}", expected),
        );
    }

    #[test]
    fn all_uppercase() {
        check_parse("SINEBOW", colorous::SINEBOW);
    }

    #[test]
    fn all_lowercase() {
        check_parse("sinebow", colorous::SINEBOW);
    }

    #[test]
    fn spongebob_case() {
        check_parse("sInEbOw", colorous::SINEBOW);
    }

    #[test]
    fn spaces() {
        check_parse("RED YELLOW BLUE", colorous::RED_YELLOW_BLUE);
    }

    #[test]
    fn mixed_separators() {
        check_parse("RED YELLOW_BLUE", colorous::RED_YELLOW_BLUE);
    }

    #[test]
    fn bad_gradient() {
        let parsed = parse_str("Not A Gradient");
        assert!(
            parsed.is_err(),
            "Deserialized nonexistent gradient: {:?}",
            parsed.unwrap()
        );
    }

    #[test]
    fn canonical_name() {
        let gradient = NamedGradient::try_from("Red Yellow_BLUE").unwrap();
        assert_eq!(gradient.to_string(), "red_yellow_blue");
        assert_eq!(gradient, NamedGradient::try_from("red_yellow_blue").unwrap());
    }

    #[test]
    fn every_name_parses() {
        for (name, gradient) in GRADIENTS {
            let parsed = NamedGradient::try_from(name.to_uppercase().as_str()).unwrap();
            assert_eq!(parsed.to_string(), *name);
            assert_eq!(format!("{:?}", parsed.gradient()), format!("{:?}", gradient));
        }
    }

    #[test]
    fn list_from_borrowed_source() {
        #[derive(Debug, Deserialize)]
        struct Colormaps {
            colormaps: Vec<NamedGradient>,
        }
        let source = String::from("colormaps = [\"Turbo\", \"purple blue green\"]");
        let parsed: Colormaps = toml::from_str(&source).unwrap();
        let names: Vec<String> = parsed.colormaps.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["turbo", "purple_blue_green"]);
    }

    #[test]
    fn defaults() {
        assert_eq!(default_colormaps().len(), 12);
    }
}
