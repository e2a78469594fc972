//! Yahoo weather over YQL: a place lookup resolves a WOEID, then a forecast
//! query for that WOEID returns the current condition in the requested unit.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    classify::{Encoding, ProviderConditionCode},
    error::FetchError,
    model::{LocationQuery, WeatherReading},
    temperature::{TemperatureUnit, round_half_up},
};

use super::{WeatherProvider, get_body};

const YAHOO_URL: &str = "https://query.yahooapis.com";
const PROVIDER: &str = "yahoo";

#[derive(Debug, Clone)]
pub struct YahooProvider {
    base_url: String,
    http: Client,
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooProvider {
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: Client::new() }
    }

    fn yql_url(&self) -> String {
        format!("{}/v1/public/yql", self.base_url.trim_end_matches('/'))
    }

    async fn run_yql(&self, statement: String) -> Result<YqlResponse, FetchError> {
        let params = [("q", statement), ("format", "json".to_string())];
        let body = get_body(&self.http, PROVIDER, &self.yql_url(), &params).await?;

        serde_json::from_str(&body).map_err(|e| FetchError::parse(PROVIDER, e.to_string()))
    }

    async fn lookup_woeid(&self, query: &LocationQuery) -> Result<String, FetchError> {
        let response = self.run_yql(place_lookup_statement(query)).await?;

        let results = response
            .query
            .results
            .ok_or_else(|| FetchError::parse(PROVIDER, format!("no place matched '{query}'")))?;

        let place: PlaceResult = serde_json::from_value(results)
            .map_err(|e| FetchError::parse(PROVIDER, e.to_string()))?;

        scalar_to_string(&place.place.woeid)
            .ok_or_else(|| FetchError::parse(PROVIDER, "place lookup returned no woeid"))
    }

    async fn fetch_condition(
        &self,
        woeid: &str,
        unit: TemperatureUnit,
    ) -> Result<WeatherReading, FetchError> {
        let response = self.run_yql(forecast_statement(woeid, unit)).await?;

        let results = response
            .query
            .results
            .ok_or_else(|| FetchError::parse(PROVIDER, format!("no forecast for woeid {woeid}")))?;

        let forecast: ForecastResult = serde_json::from_value(results)
            .map_err(|e| FetchError::parse(PROVIDER, e.to_string()))?;

        let channel = forecast.channel;
        let condition = channel.item.condition;

        let code = scalar_to_string(&condition.code)
            .and_then(|s| s.trim().parse::<i64>().ok())
            .ok_or_else(|| FetchError::parse(PROVIDER, "condition code is not a number"))?;

        let temp = scalar_to_string(&condition.temp)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .ok_or_else(|| FetchError::parse(PROVIDER, "temperature is not a number"))?;

        Ok(WeatherReading {
            temperature: round_half_up(temp),
            unit,
            condition: ProviderConditionCode::ConditionCode(code),
            location_name: channel.location.and_then(|l| l.city).filter(|c| !c.is_empty()),
        })
    }
}

pub(crate) fn place_lookup_statement(query: &LocationQuery) -> String {
    let text = query.to_string().replace('"', "");
    format!("select woeid from geo.places(1) where text=\"{text}\"")
}

pub(crate) fn forecast_statement(woeid: &str, unit: TemperatureUnit) -> String {
    format!(
        "select item.condition, location from weather.forecast where woeid={woeid} and u='{}'",
        unit.yahoo_param()
    )
}

// YQL renders most scalars as strings but is not consistent about it.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct YqlResponse {
    query: YqlQuery,
}

#[derive(Debug, Deserialize)]
struct YqlQuery {
    results: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place: Place,
}

#[derive(Debug, Deserialize)]
struct Place {
    woeid: Value,
}

#[derive(Debug, Deserialize)]
struct ForecastResult {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    location: Option<ChannelLocation>,
    item: Item,
}

#[derive(Debug, Deserialize)]
struct ChannelLocation {
    city: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Item {
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    code: Value,
    temp: Value,
}

#[async_trait]
impl WeatherProvider for YahooProvider {
    fn encoding(&self) -> Encoding {
        Encoding::ConditionCode
    }

    async fn get_weather(
        &self,
        query: &LocationQuery,
        unit: TemperatureUnit,
    ) -> Result<WeatherReading, FetchError> {
        let woeid = self.lookup_woeid(query).await?;
        tracing::debug!(%query, woeid = %woeid, "resolved yahoo place");
        self.fetch_condition(&woeid, unit).await
    }
}
