use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

const KELVIN_OFFSET: f64 = 273.15;

/// Display unit chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Fahrenheit,
    Celsius,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Fahrenheit => "fahrenheit",
            TemperatureUnit::Celsius => "celsius",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            TemperatureUnit::Fahrenheit => "\u{00B0}F",
            TemperatureUnit::Celsius => "\u{00B0}C",
        }
    }

    /// Value of OpenWeather's `units` parameter.
    pub fn openweather_param(&self) -> &'static str {
        match self {
            TemperatureUnit::Fahrenheit => "imperial",
            TemperatureUnit::Celsius => "metric",
        }
    }

    /// Value of Yahoo's `u` parameter.
    pub fn yahoo_param(&self) -> &'static str {
        match self {
            TemperatureUnit::Fahrenheit => "f",
            TemperatureUnit::Celsius => "c",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "fahrenheit" | "f" | "imperial" => Ok(TemperatureUnit::Fahrenheit),
            "celsius" | "c" | "metric" => Ok(TemperatureUnit::Celsius),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{value}'. Supported units: fahrenheit, celsius."
            )),
        }
    }
}

// Accepts the aliases the configuration page and hand-edited TOML use.
impl<'de> Deserialize<'de> for TemperatureUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TemperatureUnit::try_from(raw.as_str()).map_err(serde::de::Error::custom)
    }
}

/// Half-up rounding: `-0.5` rounds to `0`, `0.5` rounds to `1`.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub fn kelvin_to_fahrenheit(kelvin: f64) -> i64 {
    round_half_up((kelvin - KELVIN_OFFSET) * 1.8 + 32.0)
}

pub fn kelvin_to_celsius(kelvin: f64) -> i64 {
    round_half_up(kelvin - KELVIN_OFFSET)
}

pub fn from_kelvin(kelvin: f64, unit: TemperatureUnit) -> i64 {
    match unit {
        TemperatureUnit::Fahrenheit => kelvin_to_fahrenheit(kelvin),
        TemperatureUnit::Celsius => kelvin_to_celsius(kelvin),
    }
}

/// Device-facing temperature string, e.g. `72°F`.
pub fn format_temperature(value: i64, unit: TemperatureUnit) -> String {
    format!("{value}{}", unit.glyph())
}
