//! User options and the configuration page round trip.
//!
//! The configuration page receives the current options as query parameters
//! and, when closed, hands back a percent-encoded JSON object. Values from the
//! page are loosely typed (`"false"`, `"on"`, `1`), so deserialization here is
//! lenient.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::sync::Mutex;
use url::Url;

use crate::temperature::TemperatureUnit;

/// Response sent by the configuration page when the user backs out.
const CANCELLED: &str = "CANCELLED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserOptions {
    #[serde(deserialize_with = "lenient_bool")]
    pub use_gps: bool,
    /// Place name used when `use_gps` is off.
    pub location: String,
    pub units: TemperatureUnit,
    #[serde(deserialize_with = "lenient_bool")]
    pub invert_color: bool,
}

impl Default for UserOptions {
    fn default() -> Self {
        Self {
            use_gps: true,
            location: String::new(),
            units: TemperatureUnit::Fahrenheit,
            invert_color: false,
        }
    }
}

impl UserOptions {
    /// Parse the configuration page's close response.
    ///
    /// Returns `Ok(None)` when the page was dismissed without saving.
    pub fn from_webview_response(response: &str) -> Result<Option<Self>> {
        let trimmed = response.trim();
        if trimmed.is_empty() || trimmed == CANCELLED {
            return Ok(None);
        }

        let decoded = urlencoding::decode(trimmed)
            .context("Configuration response is not valid percent-encoded UTF-8")?;

        let options = serde_json::from_str(&decoded)
            .with_context(|| format!("Failed to parse configuration response: {decoded}"))?;

        Ok(Some(options))
    }

    /// URL of the configuration page with the current options attached.
    pub fn config_page_url(&self, base: &str) -> Result<Url> {
        let mut url =
            Url::parse(base).with_context(|| format!("Invalid configuration page URL: {base}"))?;

        url.query_pairs_mut()
            .append_pair("use_gps", bool_str(self.use_gps))
            .append_pair("location", &self.location)
            .append_pair("units", self.units.as_str())
            .append_pair("invert_color", bool_str(self.invert_color));

        Ok(url)
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(n) => Err(de::Error::custom(format!("expected 0 or 1, got {n}"))),
        Flag::Text(s) => match s.trim().to_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(true),
            "false" | "off" | "no" | "0" | "" => Ok(false),
            other => Err(de::Error::custom(format!("expected a boolean, got '{other}'"))),
        },
    }
}

/// Device-local persistence for [`UserOptions`].
pub trait OptionsStore: Send + Sync {
    fn load(&self) -> Result<UserOptions>;
    fn save(&self, options: &UserOptions) -> Result<()>;
}

/// In-process store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryOptionsStore {
    options: Mutex<UserOptions>,
}

impl MemoryOptionsStore {
    pub fn new(options: UserOptions) -> Self {
        Self { options: Mutex::new(options) }
    }
}

impl OptionsStore for MemoryOptionsStore {
    fn load(&self) -> Result<UserOptions> {
        self.options
            .lock()
            .map(|o| o.clone())
            .map_err(|_| anyhow!("options store lock poisoned"))
    }

    fn save(&self, options: &UserOptions) -> Result<()> {
        let mut guard = self.options.lock().map_err(|_| anyhow!("options store lock poisoned"))?;
        *guard = options.clone();
        Ok(())
    }
}
