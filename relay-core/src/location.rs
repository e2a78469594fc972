//! Position sources for the "use GPS" option.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};
use tokio::{sync::Mutex, time::Instant};

use crate::{error::LocationError, model::LocationQuery, options::UserOptions};

const IP_LOOKUP_URL: &str = "https://ipapi.co/json/";

/// Limits applied to a single position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub timeout: Duration,
    /// A previous fix younger than this is returned without a new lookup.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(15_000),
            maximum_age: Duration::from_millis(60_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
}

impl From<Position> for LocationQuery {
    fn from(position: Position) -> Self {
        LocationQuery::Coordinates {
            latitude: position.latitude,
            longitude: position.longitude,
        }
    }
}

#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_position(&self, options: &PositionOptions) -> Result<Position, LocationError>;
}

/// A configured coordinate pair.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    position: Position,
}

impl FixedLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            position: Position { latitude, longitude, accuracy_meters: None },
        }
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Position, LocationError> {
        Ok(self.position)
    }
}

/// Used when no position source is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationSource for NoLocation {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Position, LocationError> {
        Err(LocationError::Unavailable("no position source configured".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// Approximate position from the public IP address.
#[derive(Debug)]
pub struct IpLocator {
    http: Client,
    url: String,
    last_fix: Mutex<Option<(Instant, Position)>>,
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IpLocator {
    pub fn new() -> Self {
        Self::with_url(IP_LOOKUP_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            last_fix: Mutex::new(None),
        }
    }

    async fn lookup(&self) -> Result<Position, LocationError> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(LocationError::PermissionDenied);
            }
            status if !status.is_success() => {
                return Err(LocationError::Unavailable(format!("lookup returned status {status}")));
            }
            _ => {}
        }

        let body: IpApiResponse =
            res.json().await.map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if body.error {
            let reason = body.reason.unwrap_or_else(|| "lookup reported an error".to_string());
            return Err(LocationError::Unavailable(reason));
        }

        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => {
                Ok(Position { latitude, longitude, accuracy_meters: None })
            }
            _ => Err(LocationError::Unavailable("lookup returned no coordinates".to_string())),
        }
    }
}

#[async_trait]
impl LocationSource for IpLocator {
    async fn current_position(&self, options: &PositionOptions) -> Result<Position, LocationError> {
        let mut last_fix = self.last_fix.lock().await;

        if let Some((taken_at, position)) = *last_fix
            && taken_at.elapsed() <= options.maximum_age
        {
            tracing::debug!("reusing cached position");
            return Ok(position);
        }

        let position = tokio::time::timeout(options.timeout, self.lookup())
            .await
            .map_err(|_| timeout_error(options.timeout))??;

        *last_fix = Some((Instant::now(), position));
        Ok(position)
    }
}

fn timeout_error(timeout: Duration) -> LocationError {
    LocationError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
}

/// Pick the query for the next fetch: the manual place when GPS is off,
/// otherwise a fresh position.
pub async fn resolve_query(
    options: &UserOptions,
    source: &dyn LocationSource,
    position_options: &PositionOptions,
) -> Result<LocationQuery, LocationError> {
    let place = options.location.trim();

    if !options.use_gps {
        if !place.is_empty() {
            return Ok(LocationQuery::Place(place.to_string()));
        }
        tracing::debug!("manual location is empty; falling back to position source");
    }

    let position = source.current_position(position_options).await?;
    Ok(position.into())
}
