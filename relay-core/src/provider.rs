use crate::{
    Config, Encoding, LocationQuery, TemperatureUnit, WeatherReading,
    error::FetchError,
    provider::{
        openweather::{OpenWeatherProvider, OwCondition},
        yahoo::YahooProvider,
    },
};
use async_trait::async_trait;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug};

pub mod openweather;
pub mod yahoo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    Yahoo,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::Yahoo => "yahoo",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::Yahoo]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" | "openweathermap" => Ok(ProviderId::OpenWeather),
            "yahoo" => Ok(ProviderId::Yahoo),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, yahoo."
            )),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Condition encoding of the readings this provider returns.
    fn encoding(&self) -> Encoding;

    async fn get_weather(
        &self,
        query: &LocationQuery,
        unit: TemperatureUnit,
    ) -> Result<WeatherReading, FetchError>;
}

/// Construct the configured provider.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.provider_id()?;
    let settings = &config.provider;

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenWeather => {
            let condition = match settings.encoding {
                Encoding::IconCode => OwCondition::IconCode,
                Encoding::WeatherId => OwCondition::WeatherId,
                Encoding::ConditionCode => {
                    return Err(anyhow::anyhow!(
                        "Provider 'openweather' does not report condition codes.\n\
                         Hint: set `encoding` to `icon_code` or `weather_id`, or use provider 'yahoo'."
                    ));
                }
            };

            let mut provider = OpenWeatherProvider::new(settings.api_key.clone())
                .with_condition(condition)
                .with_unit_mode(settings.unit_mode);
            if let Some(base_url) = &settings.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Box::new(provider)
        }
        ProviderId::Yahoo => {
            if settings.encoding != Encoding::ConditionCode {
                tracing::debug!(
                    configured = settings.encoding.as_str(),
                    "yahoo always reports condition codes; ignoring configured encoding"
                );
            }
            match &settings.base_url {
                Some(base_url) => Box::new(YahooProvider::with_base_url(base_url.clone())),
                None => Box::new(YahooProvider::new()),
            }
        }
    };

    Ok(boxed)
}

/// Issue a GET and return the body of a successful response.
pub(crate) async fn get_body(
    http: &Client,
    provider: &'static str,
    url: &str,
    params: &[(&str, String)],
) -> Result<String, FetchError> {
    tracing::debug!(provider, url, ?params, "sending weather request");

    let res = http
        .get(url)
        .query(params)
        .send()
        .await
        .map_err(|source| FetchError::network(provider, source))?;

    let status = res.status();
    let body = res.text().await.map_err(|source| FetchError::network(provider, source))?;

    if !status.is_success() {
        return Err(FetchError::Status {
            provider,
            status,
            body: truncate_body(&body),
        });
    }

    Ok(body)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
