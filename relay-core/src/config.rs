use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};

use crate::{
    classify::Encoding,
    location::PositionOptions,
    options::{OptionsStore, UserOptions},
    provider::{ProviderId, openweather::UnitMode},
};

pub const DEFAULT_CONFIG_PAGE: &str = "https://weather-relay.github.io/config/index.html";

/// Weather provider selection and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider id, e.g. "openweather" or "yahoo".
    pub id: String,
    /// Condition encoding; selects the firmware icon set.
    pub encoding: Encoding,
    pub api_key: Option<String>,
    /// Override the provider's API host (useful for proxies and tests).
    pub base_url: Option<String>,
    pub unit_mode: UnitMode,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            id: ProviderId::OpenWeather.as_str().to_string(),
            encoding: Encoding::IconCode,
            api_key: None,
            base_url: None,
            unit_mode: UnitMode::Requested,
        }
    }
}

/// Position source settings used when GPS is enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
    /// Fixed coordinates; when both are set they replace the IP lookup.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_lookup_url: Option<String>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            maximum_age_ms: 60_000,
            latitude: None,
            longitude: None,
            ip_lookup_url: None,
        }
    }
}

impl LocationConfig {
    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            timeout: Duration::from_millis(self.timeout_ms),
            maximum_age: Duration::from_millis(self.maximum_age_ms),
        }
    }

    pub fn fixed_position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Periodic refresh interval; `0` disables the timer.
    pub refresh_interval_mins: u64,
    pub config_page: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            refresh_interval_mins: 30,
            config_page: DEFAULT_CONFIG_PAGE.to_string(),
        }
    }
}

impl RelayConfig {
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_mins > 0).then(|| Duration::from_secs(self.refresh_interval_mins * 60))
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [options]
/// use_gps = false
/// location = "Paris"
/// units = "celsius"
///
/// [provider]
/// id = "openweather"
/// encoding = "icon_code"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub options: UserOptions,
    pub provider: ProviderConfig,
    pub location: LocationConfig,
    pub relay: RelayConfig,
}

impl Config {
    /// Return the configured provider as a strongly-typed ProviderId.
    pub fn provider_id(&self) -> Result<ProviderId> {
        ProviderId::try_from(self.provider.id.as_str()).map_err(|e| {
            anyhow!("{e}\nHint: run `weather-relay configure` to pick a provider.")
        })
    }

    /// Select a provider. Yahoo only reports condition codes, so the encoding follows.
    pub fn set_provider(&mut self, id: ProviderId) {
        self.provider.id = id.as_str().to_string();

        match id {
            ProviderId::Yahoo => self.provider.encoding = Encoding::ConditionCode,
            ProviderId::OpenWeather if self.provider.encoding == Encoding::ConditionCode => {
                self.provider.encoding = Encoding::IconCode;
            }
            ProviderId::OpenWeather => {}
        }
    }

    /// Load config from the platform location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-relay", "weather-relay")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Persists user options into the `[options]` table of a config file,
/// leaving the other tables untouched.
#[derive(Debug, Clone)]
pub struct FileOptionsStore {
    path: PathBuf,
}

impl FileOptionsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OptionsStore for FileOptionsStore {
    fn load(&self) -> Result<UserOptions> {
        Ok(Config::load_from(&self.path)?.options)
    }

    fn save(&self, options: &UserOptions) -> Result<()> {
        let mut cfg = Config::load_from(&self.path)?;
        cfg.options = options.clone();
        cfg.save_to(&self.path)
    }
}
