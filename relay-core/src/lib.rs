//! Core library for the `weather-relay` watchface companion.
//!
//! This crate defines:
//! - The condition classifier and firmware icon sets
//! - Weather providers and position sources
//! - User options, configuration and persistence
//! - The fetch/dispatch relay that sends compact messages to the watch
//!
//! It is used by `weather-relay-cli`, but can also be embedded by any host
//! that can deliver [`RelayEvent`]s and carry [`AppMessage`]s to a device.

pub mod bridge;
pub mod classify;
pub mod config;
pub mod error;
pub mod icon;
pub mod location;
pub mod model;
pub mod options;
pub mod provider;
pub mod relay;
pub mod temperature;

pub use bridge::{ChannelBridge, DeviceBridge, JsonLinesBridge};
pub use classify::{Encoding, ProviderConditionCode, classify};
pub use config::{Config, FileOptionsStore, LocationConfig, ProviderConfig, RelayConfig};
pub use error::{FetchError, LocationError, RelayError};
pub use icon::{CanonicalIcon, IconSet, IconValue};
pub use location::{FixedLocation, IpLocator, LocationSource, NoLocation, Position, PositionOptions};
pub use model::{AppMessage, FailureKind, LocationQuery, WeatherReading};
pub use options::{MemoryOptionsStore, OptionsStore, UserOptions};
pub use provider::{ProviderId, WeatherProvider, provider_from_config};
pub use relay::{Relay, RelayEvent, spawn_timer};
pub use temperature::TemperatureUnit;

/// Position source described by `config`: fixed coordinates when set,
/// otherwise an IP-based lookup.
pub fn location_from_config(config: &LocationConfig) -> Box<dyn LocationSource> {
    match (config.fixed_position(), &config.ip_lookup_url) {
        (Some((latitude, longitude)), _) => Box::new(FixedLocation::new(latitude, longitude)),
        (None, Some(url)) => Box::new(IpLocator::with_url(url.clone())),
        (None, None) => Box::new(IpLocator::new()),
    }
}
