//! Canonical weather icons and the firmware enumerations they are rendered into.
//!
//! Each watchface build ships its own icon enumeration. The relay classifies
//! provider codes into [`CanonicalIcon`] and then asks the active [`IconSet`]
//! for the value the firmware expects on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every icon category seen across the supported firmware builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalIcon {
    ClearDay,
    ClearNight,
    Clear,
    PartlyCloudyDay,
    PartlyCloudyNight,
    PartlyCloudy,
    Cloud,
    Overcast,
    Cloudy,
    Haze,
    Mist,
    Fog,
    Windy,
    Cold,
    Rain,
    Snow,
    Hail,
    Storm,
    NotAvailable,
    Unknown,
}

impl CanonicalIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalIcon::ClearDay => "clear_day",
            CanonicalIcon::ClearNight => "clear_night",
            CanonicalIcon::Clear => "clear",
            CanonicalIcon::PartlyCloudyDay => "partly_cloudy_day",
            CanonicalIcon::PartlyCloudyNight => "partly_cloudy_night",
            CanonicalIcon::PartlyCloudy => "partly_cloudy",
            CanonicalIcon::Cloud => "cloud",
            CanonicalIcon::Overcast => "overcast",
            CanonicalIcon::Cloudy => "cloudy",
            CanonicalIcon::Haze => "haze",
            CanonicalIcon::Mist => "mist",
            CanonicalIcon::Fog => "fog",
            CanonicalIcon::Windy => "windy",
            CanonicalIcon::Cold => "cold",
            CanonicalIcon::Rain => "rain",
            CanonicalIcon::Snow => "snow",
            CanonicalIcon::Hail => "hail",
            CanonicalIcon::Storm => "storm",
            CanonicalIcon::NotAvailable => "not_available",
            CanonicalIcon::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CanonicalIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value placed in the `icon` key of a device message.
///
/// Bitmap-based firmware wants an ordinal, font-based firmware wants the glyph
/// character of its weather font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IconValue {
    Index(u8),
    Glyph(char),
}

impl fmt::Display for IconValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IconValue::Index(i) => write!(f, "{i}"),
            IconValue::Glyph(c) => write!(f, "{c}"),
        }
    }
}

/// Firmware icon enumerations, one per provider condition encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconSet {
    /// Twelve bitmaps keyed by OpenWeather icon codes.
    IconCode,
    /// Weather-font glyphs keyed by OpenWeather weather ids.
    WeatherId,
    /// Fourteen bitmaps keyed by Yahoo condition codes.
    ConditionCode,
}

const ICON_CODE_MEMBERS: &[CanonicalIcon] = &[
    CanonicalIcon::ClearDay,
    CanonicalIcon::ClearNight,
    CanonicalIcon::PartlyCloudyDay,
    CanonicalIcon::PartlyCloudyNight,
    CanonicalIcon::Cloud,
    CanonicalIcon::Overcast,
    CanonicalIcon::Rain,
    CanonicalIcon::Storm,
    CanonicalIcon::Snow,
    CanonicalIcon::Mist,
    CanonicalIcon::Fog,
    CanonicalIcon::Unknown,
];

const WEATHER_ID_GLYPHS: &[(CanonicalIcon, char)] = &[
    (CanonicalIcon::Clear, 'B'),
    (CanonicalIcon::PartlyCloudy, 'H'),
    (CanonicalIcon::Cloud, 'N'),
    (CanonicalIcon::Haze, 'M'),
    (CanonicalIcon::Snow, 'W'),
    (CanonicalIcon::Rain, 'R'),
    (CanonicalIcon::Storm, '0'),
    (CanonicalIcon::NotAvailable, ')'),
];

const CONDITION_CODE_MEMBERS: &[CanonicalIcon] = &[
    CanonicalIcon::Storm,
    CanonicalIcon::Hail,
    CanonicalIcon::Rain,
    CanonicalIcon::Snow,
    CanonicalIcon::Haze,
    CanonicalIcon::Windy,
    CanonicalIcon::Cold,
    CanonicalIcon::Cloudy,
    CanonicalIcon::PartlyCloudyNight,
    CanonicalIcon::PartlyCloudyDay,
    CanonicalIcon::ClearNight,
    CanonicalIcon::ClearDay,
    CanonicalIcon::Cloud,
    CanonicalIcon::NotAvailable,
];

impl IconSet {
    /// Members in firmware order; a member's ordinal is its position.
    pub fn members(&self) -> Vec<CanonicalIcon> {
        match self {
            IconSet::IconCode => ICON_CODE_MEMBERS.to_vec(),
            IconSet::WeatherId => WEATHER_ID_GLYPHS.iter().map(|(icon, _)| *icon).collect(),
            IconSet::ConditionCode => CONDITION_CODE_MEMBERS.to_vec(),
        }
    }

    pub fn contains(&self, icon: CanonicalIcon) -> bool {
        self.members().contains(&icon)
    }

    /// Icon shown when no reading could be obtained.
    pub fn unavailable(&self) -> CanonicalIcon {
        match self {
            IconSet::IconCode => CanonicalIcon::Unknown,
            IconSet::WeatherId | IconSet::ConditionCode => CanonicalIcon::NotAvailable,
        }
    }

    /// Wire value for `icon`. Icons outside this set render as [`IconSet::unavailable`].
    pub fn wire_value(&self, icon: CanonicalIcon) -> IconValue {
        let icon = if self.contains(icon) { icon } else { self.unavailable() };

        match self {
            IconSet::IconCode => IconValue::Index(ordinal(ICON_CODE_MEMBERS, icon)),
            IconSet::ConditionCode => IconValue::Index(ordinal(CONDITION_CODE_MEMBERS, icon)),
            IconSet::WeatherId => WEATHER_ID_GLYPHS
                .iter()
                .find(|(member, _)| *member == icon)
                .map(|(_, glyph)| IconValue::Glyph(*glyph))
                .unwrap_or(IconValue::Glyph(')')),
        }
    }
}

fn ordinal(members: &[CanonicalIcon], icon: CanonicalIcon) -> u8 {
    members
        .iter()
        .position(|m| *m == icon)
        .and_then(|p| u8::try_from(p).ok())
        .unwrap_or_default()
}
