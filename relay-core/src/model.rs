use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    classify::{ProviderConditionCode, classify},
    icon::{IconSet, IconValue},
    temperature::{TemperatureUnit, format_temperature},
};

/// Temperature shown when the location could not be determined.
pub const LOCATION_UNAVAILABLE_TEMPERATURE: &str = "N/A";
/// City shown when the location could not be determined.
pub const LOCATION_UNAVAILABLE_CITY: &str = "Loc Unavailable";

/// Where to ask the provider for weather.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates { latitude: f64, longitude: f64 },
    Place(String),
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::Coordinates { latitude, longitude } => {
                write!(f, "{latitude},{longitude}")
            }
            LocationQuery::Place(place) => f.write_str(place),
        }
    }
}

/// One provider observation, already in the requested unit.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub temperature: i64,
    pub unit: TemperatureUnit,
    pub condition: ProviderConditionCode,
    pub location_name: Option<String>,
}

/// Why a degraded message was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Location,
    Fetch,
}

/// Flat key/value record delivered to the watch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppMessage {
    pub icon: IconValue,
    pub temperature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert_color: Option<u8>,
}

impl AppMessage {
    pub fn from_reading(reading: &WeatherReading, icon_set: IconSet, invert_color: bool) -> Self {
        let icon = classify(&reading.condition);

        Self {
            icon: icon_set.wire_value(icon),
            temperature: format_temperature(reading.temperature, reading.unit),
            city: reading.location_name.clone(),
            invert_color: Some(u8::from(invert_color)),
        }
    }

    /// Placeholder message carrying the set's "unavailable" icon.
    pub fn degraded(kind: FailureKind, icon_set: IconSet, invert_color: bool) -> Self {
        let (temperature, city) = match kind {
            FailureKind::Location => (
                LOCATION_UNAVAILABLE_TEMPERATURE.to_string(),
                Some(LOCATION_UNAVAILABLE_CITY.to_string()),
            ),
            FailureKind::Fetch => (String::new(), None),
        };

        Self {
            icon: icon_set.wire_value(icon_set.unavailable()),
            temperature,
            city,
            invert_color: Some(u8::from(invert_color)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_from_reading() {
        let reading = WeatherReading {
            temperature: 54,
            unit: TemperatureUnit::Fahrenheit,
            condition: ProviderConditionCode::IconCode("10n".into()),
            location_name: Some("Portland".into()),
        };

        let msg = AppMessage::from_reading(&reading, IconSet::IconCode, true);
        assert_eq!(msg.icon, IconValue::Index(6));
        assert_eq!(msg.temperature, "54°F");
        assert_eq!(msg.city.as_deref(), Some("Portland"));
        assert_eq!(msg.invert_color, Some(1));
    }

    #[test]
    fn degraded_location_message() {
        let msg = AppMessage::degraded(FailureKind::Location, IconSet::IconCode, false);
        assert_eq!(msg.icon, IconValue::Index(11));
        assert_eq!(msg.temperature, "N/A");
        assert_eq!(msg.city.as_deref(), Some("Loc Unavailable"));
    }

    #[test]
    fn degraded_fetch_message() {
        let msg = AppMessage::degraded(FailureKind::Fetch, IconSet::ConditionCode, false);
        assert_eq!(msg.icon, IconValue::Index(13));
        assert!(msg.temperature.is_empty());
        assert_eq!(msg.city, None);
    }

    #[test]
    fn serializes_flat_keys() {
        let msg = AppMessage {
            icon: IconValue::Glyph('B'),
            temperature: "21°C".into(),
            city: None,
            invert_color: Some(0),
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"icon": "B", "temperature": "21°C", "invert_color": 0}));
    }
}
