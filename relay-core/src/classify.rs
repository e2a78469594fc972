//! Provider condition codes and their classification into canonical icons.
//!
//! All three encodings are table driven: an exact lookup for OpenWeather icon
//! codes, a descending threshold list for OpenWeather weather ids, and an
//! indexed table for Yahoo condition codes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::icon::{CanonicalIcon, IconSet};

/// Raw condition value returned by a weather provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderConditionCode {
    /// OpenWeather icon token such as `"01d"`.
    IconCode(String),
    /// OpenWeather weather-type id such as `800`.
    WeatherId(i64),
    /// Yahoo condition code, `0..=47` or the `3200` sentinel.
    ConditionCode(i64),
}

impl ProviderConditionCode {
    pub fn encoding(&self) -> Encoding {
        match self {
            ProviderConditionCode::IconCode(_) => Encoding::IconCode,
            ProviderConditionCode::WeatherId(_) => Encoding::WeatherId,
            ProviderConditionCode::ConditionCode(_) => Encoding::ConditionCode,
        }
    }
}

impl fmt::Display for ProviderConditionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConditionCode::IconCode(code) => write!(f, "icon code {code:?}"),
            ProviderConditionCode::WeatherId(id) => write!(f, "weather id {id}"),
            ProviderConditionCode::ConditionCode(code) => write!(f, "condition code {code}"),
        }
    }
}

/// Which condition encoding a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    #[default]
    IconCode,
    WeatherId,
    ConditionCode,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::IconCode => "icon_code",
            Encoding::WeatherId => "weather_id",
            Encoding::ConditionCode => "condition_code",
        }
    }

    /// The firmware enumeration paired with this encoding.
    pub fn icon_set(&self) -> IconSet {
        match self {
            Encoding::IconCode => IconSet::IconCode,
            Encoding::WeatherId => IconSet::WeatherId,
            Encoding::ConditionCode => IconSet::ConditionCode,
        }
    }
}

impl TryFrom<&str> for Encoding {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().replace('-', "_").as_str() {
            "icon_code" | "icon" => Ok(Encoding::IconCode),
            "weather_id" | "id" => Ok(Encoding::WeatherId),
            "condition_code" | "condition" => Ok(Encoding::ConditionCode),
            _ => Err(anyhow::anyhow!(
                "Unknown condition encoding '{value}'. Supported: icon_code, weather_id, condition_code."
            )),
        }
    }
}

const ICON_CODE_TABLE: &[(&str, CanonicalIcon)] = &[
    ("01d", CanonicalIcon::ClearDay),
    ("01n", CanonicalIcon::ClearNight),
    ("02d", CanonicalIcon::PartlyCloudyDay),
    ("02n", CanonicalIcon::PartlyCloudyNight),
    ("03d", CanonicalIcon::Cloud),
    ("03n", CanonicalIcon::Cloud),
    ("04d", CanonicalIcon::Overcast),
    ("04n", CanonicalIcon::Overcast),
    ("09d", CanonicalIcon::Rain),
    ("09n", CanonicalIcon::Rain),
    ("10d", CanonicalIcon::Rain),
    ("10n", CanonicalIcon::Rain),
    ("11d", CanonicalIcon::Storm),
    ("11n", CanonicalIcon::Storm),
    ("13d", CanonicalIcon::Snow),
    ("13n", CanonicalIcon::Snow),
    ("50d", CanonicalIcon::Mist),
    ("50n", CanonicalIcon::Fog),
];

// Highest threshold first; the first band with `id >= threshold` wins.
const WEATHER_ID_BANDS: &[(i64, CanonicalIcon)] = &[
    (802, CanonicalIcon::Cloud),
    (801, CanonicalIcon::PartlyCloudy),
    (800, CanonicalIcon::Clear),
    (700, CanonicalIcon::Haze),
    (600, CanonicalIcon::Snow),
    (300, CanonicalIcon::Rain),
];

const WEATHER_ID_FLOOR: CanonicalIcon = CanonicalIcon::Storm;

/// Yahoo's "not available" condition code.
pub const CONDITION_NOT_AVAILABLE: i64 = 3200;

// Indexed by Yahoo condition code.
const CONDITION_CODE_TABLE: [CanonicalIcon; 48] = [
    CanonicalIcon::Windy,             // 0 tornado
    CanonicalIcon::Storm,             // 1 tropical storm
    CanonicalIcon::Windy,             // 2 hurricane
    CanonicalIcon::Storm,             // 3 severe thunderstorms
    CanonicalIcon::Storm,             // 4 thunderstorms
    CanonicalIcon::Snow,              // 5 mixed rain and snow
    CanonicalIcon::Hail,              // 6 mixed rain and sleet
    CanonicalIcon::Snow,              // 7 mixed snow and sleet
    CanonicalIcon::Rain,              // 8 freezing drizzle
    CanonicalIcon::Rain,              // 9 drizzle
    CanonicalIcon::Rain,              // 10 freezing rain
    CanonicalIcon::Rain,              // 11 showers
    CanonicalIcon::Rain,              // 12 showers
    CanonicalIcon::Snow,              // 13 snow flurries
    CanonicalIcon::Snow,              // 14 light snow showers
    CanonicalIcon::Snow,              // 15 blowing snow
    CanonicalIcon::Snow,              // 16 snow
    CanonicalIcon::Hail,              // 17 hail
    CanonicalIcon::Hail,              // 18 sleet
    CanonicalIcon::Haze,              // 19 dust
    CanonicalIcon::Haze,              // 20 foggy
    CanonicalIcon::Haze,              // 21 haze
    CanonicalIcon::Haze,              // 22 smoky
    CanonicalIcon::Windy,             // 23 blustery
    CanonicalIcon::Windy,             // 24 windy
    CanonicalIcon::Cold,              // 25 cold
    CanonicalIcon::Cloudy,            // 26 cloudy
    CanonicalIcon::Cloud,             // 27 mostly cloudy (night)
    CanonicalIcon::Cloud,             // 28 mostly cloudy (day)
    CanonicalIcon::PartlyCloudyNight, // 29 partly cloudy (night)
    CanonicalIcon::PartlyCloudyDay,   // 30 partly cloudy (day)
    CanonicalIcon::ClearNight,        // 31 clear (night)
    CanonicalIcon::ClearDay,          // 32 sunny
    CanonicalIcon::ClearNight,        // 33 fair (night)
    CanonicalIcon::ClearDay,          // 34 fair (day)
    CanonicalIcon::Hail,              // 35 mixed rain and hail
    CanonicalIcon::ClearDay,          // 36 hot
    CanonicalIcon::Storm,             // 37 isolated thunderstorms
    CanonicalIcon::Storm,             // 38 scattered thunderstorms
    CanonicalIcon::Storm,             // 39 scattered thunderstorms
    CanonicalIcon::Rain,              // 40 scattered showers
    CanonicalIcon::Snow,              // 41 heavy snow
    CanonicalIcon::Snow,              // 42 scattered snow showers
    CanonicalIcon::Snow,              // 43 heavy snow
    CanonicalIcon::PartlyCloudyDay,   // 44 partly cloudy
    CanonicalIcon::Storm,             // 45 thundershowers
    CanonicalIcon::Snow,              // 46 snow showers
    CanonicalIcon::Storm,             // 47 isolated thundershowers
];

/// Classify a provider condition code. Total: every input yields an icon.
pub fn classify(code: &ProviderConditionCode) -> CanonicalIcon {
    match code {
        ProviderConditionCode::IconCode(token) => classify_icon_code(token),
        ProviderConditionCode::WeatherId(id) => classify_weather_id(*id),
        ProviderConditionCode::ConditionCode(code) => classify_condition_code(*code),
    }
}

pub fn classify_icon_code(token: &str) -> CanonicalIcon {
    ICON_CODE_TABLE
        .iter()
        .find(|(code, _)| *code == token)
        .map(|(_, icon)| *icon)
        .unwrap_or(CanonicalIcon::Unknown)
}

pub fn classify_weather_id(id: i64) -> CanonicalIcon {
    WEATHER_ID_BANDS
        .iter()
        .find(|(threshold, _)| id >= *threshold)
        .map(|(_, icon)| *icon)
        .unwrap_or(WEATHER_ID_FLOOR)
}

/// Codes outside `0..=47` (other than the sentinel) have no firmware icon and
/// fall back to [`CanonicalIcon::NotAvailable`].
pub fn classify_condition_code(code: i64) -> CanonicalIcon {
    if code == CONDITION_NOT_AVAILABLE {
        return CanonicalIcon::NotAvailable;
    }

    usize::try_from(code)
        .ok()
        .and_then(|idx| CONDITION_CODE_TABLE.get(idx))
        .copied()
        .unwrap_or(CanonicalIcon::NotAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon(token: &str) -> CanonicalIcon {
        classify(&ProviderConditionCode::IconCode(token.to_string()))
    }

    #[test]
    fn icon_codes_match_table() {
        assert_eq!(icon("01d"), CanonicalIcon::ClearDay);
        assert_eq!(icon("01n"), CanonicalIcon::ClearNight);
        assert_eq!(icon("02d"), CanonicalIcon::PartlyCloudyDay);
        assert_eq!(icon("02n"), CanonicalIcon::PartlyCloudyNight);
        assert_eq!(icon("03n"), CanonicalIcon::Cloud);
        assert_eq!(icon("04d"), CanonicalIcon::Overcast);
        assert_eq!(icon("11n"), CanonicalIcon::Storm);
        assert_eq!(icon("13d"), CanonicalIcon::Snow);
        assert_eq!(icon("50d"), CanonicalIcon::Mist);
        assert_eq!(icon("50n"), CanonicalIcon::Fog);
    }

    #[test]
    fn rain_codes_collapse() {
        for token in ["09d", "09n", "10d", "10n"] {
            assert_eq!(icon(token), CanonicalIcon::Rain, "{token}");
        }
    }

    #[test]
    fn unknown_icon_codes() {
        assert_eq!(icon("99z"), CanonicalIcon::Unknown);
        assert_eq!(icon(""), CanonicalIcon::Unknown);
        assert_eq!(icon("01D"), CanonicalIcon::Unknown);
        assert_eq!(icon(" 01d"), CanonicalIcon::Unknown);
    }

    #[test]
    fn weather_id_boundaries() {
        assert_eq!(classify_weather_id(804), CanonicalIcon::Cloud);
        assert_eq!(classify_weather_id(802), CanonicalIcon::Cloud);
        assert_eq!(classify_weather_id(801), CanonicalIcon::PartlyCloudy);
        assert_eq!(classify_weather_id(800), CanonicalIcon::Clear);
        assert_eq!(classify_weather_id(799), CanonicalIcon::Haze);
        assert_eq!(classify_weather_id(700), CanonicalIcon::Haze);
        assert_eq!(classify_weather_id(699), CanonicalIcon::Snow);
        assert_eq!(classify_weather_id(600), CanonicalIcon::Snow);
        assert_eq!(classify_weather_id(599), CanonicalIcon::Rain);
        assert_eq!(classify_weather_id(300), CanonicalIcon::Rain);
        assert_eq!(classify_weather_id(299), CanonicalIcon::Storm);
        assert_eq!(classify_weather_id(-1), CanonicalIcon::Storm);
    }

    #[test]
    fn weather_id_bands_are_descending() {
        assert!(WEATHER_ID_BANDS.windows(2).all(|w| w[0].0 > w[1].0));
    }

    #[test]
    fn condition_codes() {
        let c = |code| classify(&ProviderConditionCode::ConditionCode(code));
        assert_eq!(c(32), CanonicalIcon::ClearDay);
        assert_eq!(c(31), CanonicalIcon::ClearNight);
        assert_eq!(c(25), CanonicalIcon::Cold);
        assert_eq!(c(26), CanonicalIcon::Cloudy);
        assert_eq!(c(3200), CanonicalIcon::NotAvailable);
    }

    #[test]
    fn thunderstorm_variants_share_storm() {
        for code in [3, 4, 37, 38, 39, 45, 47] {
            assert_eq!(classify_condition_code(code), CanonicalIcon::Storm, "{code}");
        }
    }

    #[test]
    fn condition_codes_outside_table_fall_back() {
        for code in [-1, 48, 100, 3199, 3201, i64::MAX, i64::MIN] {
            assert_eq!(classify_condition_code(code), CanonicalIcon::NotAvailable, "{code}");
        }
    }

    #[test]
    fn every_classification_fits_its_icon_set() {
        for (token, _) in ICON_CODE_TABLE {
            assert!(IconSet::IconCode.contains(classify_icon_code(token)));
        }
        for id in 0..1000 {
            assert!(IconSet::WeatherId.contains(classify_weather_id(id)));
        }
        for code in (0..48).chain([CONDITION_NOT_AVAILABLE]) {
            assert!(IconSet::ConditionCode.contains(classify_condition_code(code)));
        }
    }

    #[test]
    fn encoding_parses_aliases() {
        assert_eq!(Encoding::try_from("icon").unwrap(), Encoding::IconCode);
        assert_eq!(Encoding::try_from("weather-id").unwrap(), Encoding::WeatherId);
        assert_eq!(Encoding::try_from("CONDITION_CODE").unwrap(), Encoding::ConditionCode);
        assert!(Encoding::try_from("wmo").is_err());
    }
}
