//! Fetch/dispatch loop: location, one provider call, classify, send.
//!
//! Every refresh ends with exactly one message to the device. Failures are
//! logged and replaced by a degraded message; nothing here returns an error to
//! the caller.

use std::time::Duration;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{Instant, interval_at},
};

use crate::{
    bridge::DeviceBridge,
    error::RelayError,
    icon::IconSet,
    location::{LocationSource, PositionOptions, resolve_query},
    model::{AppMessage, WeatherReading},
    options::{OptionsStore, UserOptions},
    provider::WeatherProvider,
};

/// Host events that drive the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// The companion process has started.
    Ready,
    /// The watch asked for fresh weather.
    AppMessage,
    /// The periodic refresh timer fired.
    Timer,
    /// The configuration page closed with this response.
    WebviewClosed(String),
}

pub struct Relay {
    provider: Box<dyn WeatherProvider>,
    locator: Box<dyn LocationSource>,
    bridge: Box<dyn DeviceBridge>,
    store: Box<dyn OptionsStore>,
    position_options: PositionOptions,
    options: watch::Sender<UserOptions>,
}

impl Relay {
    /// Build a relay, loading the current options from `store`.
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        locator: Box<dyn LocationSource>,
        bridge: Box<dyn DeviceBridge>,
        store: Box<dyn OptionsStore>,
    ) -> anyhow::Result<Self> {
        let initial = store.load()?;
        let (options, _) = watch::channel(initial);

        Ok(Self {
            provider,
            locator,
            bridge,
            store,
            position_options: PositionOptions::default(),
            options,
        })
    }

    pub fn with_position_options(mut self, position_options: PositionOptions) -> Self {
        self.position_options = position_options;
        self
    }

    /// Snapshot of the options the next fetch will use.
    pub fn options(&self) -> UserOptions {
        self.options.borrow().clone()
    }

    /// Observe option replacements.
    pub fn subscribe(&self) -> watch::Receiver<UserOptions> {
        self.options.subscribe()
    }

    pub fn icon_set(&self) -> IconSet {
        self.provider.encoding().icon_set()
    }

    async fn fetch(&self, options: &UserOptions) -> Result<WeatherReading, RelayError> {
        let query = resolve_query(options, self.locator.as_ref(), &self.position_options).await?;
        let reading = self.provider.get_weather(&query, options.units).await?;
        Ok(reading)
    }

    /// Run one location + fetch sequence and send the result to the device.
    pub async fn refresh(&self) -> AppMessage {
        let options = self.options();
        let icon_set = self.icon_set();

        let message = match self.fetch(&options).await {
            Ok(reading) => {
                tracing::debug!(condition = %reading.condition, temperature = reading.temperature, "weather reading");
                AppMessage::from_reading(&reading, icon_set, options.invert_color)
            }
            Err(err) => {
                match &err {
                    RelayError::Location(e) => {
                        tracing::warn!(code = e.code(), "location error: {e}");
                    }
                    RelayError::Fetch(e) => tracing::warn!("weather fetch failed: {e}"),
                }
                AppMessage::degraded(err.kind(), icon_set, options.invert_color)
            }
        };

        self.dispatch(&message).await;
        message
    }

    async fn dispatch(&self, message: &AppMessage) {
        match self.bridge.send(message).await {
            Ok(()) => tracing::info!(
                icon = %message.icon,
                temperature = %message.temperature,
                city = message.city.as_deref().unwrap_or(""),
                "sent app message"
            ),
            Err(e) => tracing::warn!("failed to send app message: {e:#}"),
        }
    }

    /// Persist and install new options, then refresh with them.
    pub async fn apply_options(&self, options: UserOptions) -> AppMessage {
        if let Err(e) = self.store.save(&options) {
            tracing::warn!("failed to persist options: {e:#}");
        }

        tracing::info!(
            use_gps = options.use_gps,
            location = %options.location,
            units = %options.units,
            invert_color = options.invert_color,
            "options updated"
        );
        self.options.send_replace(options);

        self.refresh().await
    }

    /// Handle one host event. Returns the message sent, if any.
    pub async fn handle(&self, event: RelayEvent) -> Option<AppMessage> {
        tracing::debug!(?event, "handling event");

        match event {
            RelayEvent::Ready | RelayEvent::AppMessage | RelayEvent::Timer => {
                Some(self.refresh().await)
            }
            RelayEvent::WebviewClosed(response) => {
                match UserOptions::from_webview_response(&response) {
                    Ok(Some(options)) => Some(self.apply_options(options).await),
                    Ok(None) => {
                        tracing::info!("configuration page closed without changes");
                        None
                    }
                    Err(e) => {
                        tracing::warn!("ignoring configuration response: {e:#}");
                        None
                    }
                }
            }
        }
    }

    /// Process events one at a time until every sender is dropped.
    pub async fn run(&self, mut events: mpsc::Receiver<RelayEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        tracing::debug!("event channel closed; relay stopping");
    }
}

/// Emit [`RelayEvent::Timer`] every `period`, first after one full period.
pub fn spawn_timer(tx: mpsc::Sender<RelayEvent>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            if tx.send(RelayEvent::Timer).await.is_err() {
                break;
            }
        }
    })
}
