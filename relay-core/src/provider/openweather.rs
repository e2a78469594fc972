use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    classify::{Encoding, ProviderConditionCode},
    error::FetchError,
    model::{LocationQuery, WeatherReading},
    temperature::{TemperatureUnit, from_kelvin, round_half_up},
};

use super::{WeatherProvider, get_body};

const OPENWEATHER_URL: &str = "https://api.openweathermap.org";
const PROVIDER: &str = "openweather";

/// Which field of `weather[0]` is reported as the condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwCondition {
    #[default]
    IconCode,
    WeatherId,
}

/// How the temperature unit is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    /// Send `units=imperial|metric` and use the value as returned.
    #[default]
    Requested,
    /// Send no unit and convert the Kelvin reading locally.
    Kelvin,
}

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    condition: OwCondition,
    unit_mode: UnitMode,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: OPENWEATHER_URL.to_string(),
            condition: OwCondition::default(),
            unit_mode: UnitMode::default(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_condition(mut self, condition: OwCondition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_unit_mode(mut self, unit_mode: UnitMode) -> Self {
        self.unit_mode = unit_mode;
        self
    }

    fn query_params(&self, query: &LocationQuery, unit: TemperatureUnit) -> Vec<(&'static str, String)> {
        let mut params = match query {
            LocationQuery::Coordinates { latitude, longitude } => {
                vec![("lat", latitude.to_string()), ("lon", longitude.to_string())]
            }
            LocationQuery::Place(place) => vec![("q", place.clone())],
        };

        params.push(("cnt", "1".to_string()));

        if self.unit_mode == UnitMode::Requested {
            params.push(("units", unit.openweather_param().to_string()));
        }
        if let Some(key) = &self.api_key {
            params.push(("appid", key.clone()));
        }

        params
    }

    async fn fetch_current(
        &self,
        query: &LocationQuery,
        unit: TemperatureUnit,
    ) -> Result<WeatherReading, FetchError> {
        let url = format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'));
        let params = self.query_params(query, unit);

        let body = get_body(&self.http, PROVIDER, &url, &params).await?;

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::parse(PROVIDER, e.to_string()))?;

        let weather = parsed
            .weather
            .first()
            .ok_or_else(|| FetchError::parse(PROVIDER, "response contained no weather entries"))?;

        let condition = match self.condition {
            OwCondition::IconCode => ProviderConditionCode::IconCode(weather.icon.clone()),
            OwCondition::WeatherId => ProviderConditionCode::WeatherId(weather.id),
        };

        let temperature = match self.unit_mode {
            UnitMode::Requested => round_half_up(parsed.main.temp),
            UnitMode::Kelvin => from_kelvin(parsed.main.temp, unit),
        };

        Ok(WeatherReading {
            temperature,
            unit,
            condition,
            location_name: parsed.name.filter(|n| !n.is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i64,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn encoding(&self) -> Encoding {
        match self.condition {
            OwCondition::IconCode => Encoding::IconCode,
            OwCondition::WeatherId => Encoding::WeatherId,
        }
    }

    async fn get_weather(
        &self,
        query: &LocationQuery,
        unit: TemperatureUnit,
    ) -> Result<WeatherReading, FetchError> {
        self.fetch_current(query, unit).await
    }
}
