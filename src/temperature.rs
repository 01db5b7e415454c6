// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// A raw radiometric sample, as reported by the sensor.
///
/// The sensor reports Kelvin in a fixed point format with 6 fractional bits.
pub(crate) type RawCount = i16;

const COUNTS_PER_KELVIN: f64 = 64.0;

const KELVIN_OFFSET: f64 = 273.15;

#[derive(Clone, Copy, Debug, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// The other unit.
    pub(crate) fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }
}

impl Default for TemperatureUnit {
    fn default() -> Self {
        Self::Celsius
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        })
    }
}

impl FromStr for TemperatureUnit {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &s.to_ascii_lowercase() as &str {
            "celsius" | "c" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" | "f" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err("unknown temperature unit"),
        }
    }
}

fn celsius(count: RawCount) -> f64 {
    f64::from(count) / COUNTS_PER_KELVIN - KELVIN_OFFSET
}

fn fahrenheit(celsius: f64) -> f64 {
    // Exactly `c * 9 / 5 + 32`, not `c * 1.8 + 32`.
    celsius * 9.0 / 5.0 + 32.0
}

/// Convert a raw sensor count into a temperature in the given unit.
///
/// Every value of [`RawCount`] is a valid input, including the ones a saturated sensor reports.
pub(crate) fn decode(count: RawCount, unit: TemperatureUnit) -> f64 {
    let celsius = celsius(count);
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => fahrenheit(celsius),
    }
}
