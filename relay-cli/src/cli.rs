use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Select, Text};
use std::path::{Path, PathBuf};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    task::JoinHandle,
};
use weather_relay_core::{
    Config, Encoding, FileOptionsStore, JsonLinesBridge, ProviderId, Relay, RelayEvent,
    TemperatureUnit, location_from_config, provider_from_config, spawn_timer,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-relay", version, about = "Watchface weather relay")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch once and print the device message.
    Fetch,

    /// Relay host events from stdin.
    ///
    /// One event per line: `ready`, `refresh`, or `config <response>`. When
    /// stdin closes the periodic refresh keeps running until Ctrl-C.
    Run {
        /// Do not start the periodic refresh timer.
        #[arg(long)]
        no_timer: bool,
    },

    /// Interactively choose provider, units and location.
    Configure,

    /// Print the configuration page URL for the current options.
    ConfigUrl,

    /// Apply a configuration page response, then fetch.
    ApplyConfig {
        /// Percent-encoded JSON returned by the configuration page.
        response: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command {
            Command::Fetch => {
                let config = Config::load_from(&path)?;
                let relay = build_relay(&config, &path)?;
                relay.refresh().await;
            }
            Command::Run { no_timer } => {
                let config = Config::load_from(&path)?;
                let relay = build_relay(&config, &path)?;
                let interval = if no_timer { None } else { config.relay.refresh_interval() };
                run_relay(relay, interval).await;
            }
            Command::Configure => {
                let mut config = Config::load_from(&path)?;
                configure(&mut config)?;
                config.save_to(&path)?;
                println!("Configuration saved to {}", path.display());
            }
            Command::ConfigUrl => {
                let config = Config::load_from(&path)?;
                let url = config.options.config_page_url(&config.relay.config_page)?;
                println!("{url}");
            }
            Command::ApplyConfig { response } => {
                let config = Config::load_from(&path)?;
                let relay = build_relay(&config, &path)?;
                if relay.handle(RelayEvent::WebviewClosed(response)).await.is_none() {
                    anyhow::bail!("Configuration response was cancelled or could not be parsed");
                }
            }
        }

        Ok(())
    }
}

fn build_relay(config: &Config, path: &Path) -> Result<Relay> {
    let provider = provider_from_config(config)?;
    let locator = location_from_config(&config.location);
    let bridge = JsonLinesBridge::stdout();
    let store = FileOptionsStore::new(path);

    let relay = Relay::new(provider, locator, Box::new(bridge), Box::new(store))?
        .with_position_options(config.location.position_options());

    Ok(relay)
}

async fn run_relay(relay: Relay, interval: Option<std::time::Duration>) {
    let (tx, rx) = mpsc::channel(16);

    if tx.send(RelayEvent::Ready).await.is_err() {
        return;
    }

    let timer = interval.map(|period| {
        tracing::info!(minutes = period.as_secs() / 60, "periodic refresh enabled");
        spawn_timer(tx.clone(), period)
    });

    let reader = tokio::spawn(read_host_events(tx));

    tokio::join!(relay.run(rx), wait_for_shutdown(reader, timer, interrupted()));
}

/// Wait for stdin to close. With a timer running, keep refreshing until
/// `shutdown` resolves; the relay stops once both senders are gone.
async fn wait_for_shutdown(
    reader: JoinHandle<()>,
    timer: Option<JoinHandle<()>>,
    shutdown: impl Future<Output = ()>,
) {
    if let Err(e) = reader.await {
        tracing::warn!("stdin reader stopped: {e}");
    }

    if let Some(timer) = timer {
        tracing::info!("stdin closed; periodic refresh continues until interrupted");
        shutdown.await;
        timer.abort();
    }
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for interrupt: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("interrupted; stopping relay");
}

async fn read_host_events(tx: mpsc::Sender<RelayEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(event) = parse_host_event(&line) else {
                    if !line.trim().is_empty() {
                        tracing::warn!(line = %line, "unrecognised host event");
                    }
                    continue;
                };
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("failed to read stdin: {e}");
                break;
            }
        }
    }
}

fn parse_host_event(line: &str) -> Option<RelayEvent> {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    match head.to_lowercase().as_str() {
        "ready" => Some(RelayEvent::Ready),
        "refresh" | "appmessage" => Some(RelayEvent::AppMessage),
        "config" | "webviewclosed" => Some(RelayEvent::WebviewClosed(rest.trim().to_string())),
        _ => None,
    }
}

fn configure(config: &mut Config) -> Result<()> {
    let provider = Select::new("Weather provider:", ProviderId::all().to_vec())
        .prompt()
        .context("Provider selection cancelled")?;
    config.set_provider(provider);

    if provider == ProviderId::OpenWeather {
        let encoding = Select::new(
            "Watchface icon set:",
            vec![Encoding::IconCode.as_str(), Encoding::WeatherId.as_str()],
        )
        .prompt()
        .context("Icon set selection cancelled")?;
        config.provider.encoding = Encoding::try_from(encoding)?;

        let key = Text::new("OpenWeather API key (leave empty for none):")
            .with_default(config.provider.api_key.as_deref().unwrap_or(""))
            .prompt()
            .context("API key entry cancelled")?;
        config.provider.api_key = Some(key.trim().to_string()).filter(|k| !k.is_empty());
    }

    let units = Select::new(
        "Temperature unit:",
        vec![TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius],
    )
    .prompt()
    .context("Unit selection cancelled")?;
    config.options.units = units;

    config.options.use_gps = Confirm::new("Use current position?")
        .with_default(config.options.use_gps)
        .prompt()
        .context("Location choice cancelled")?;

    if !config.options.use_gps {
        let location = Text::new("Location name:")
            .with_default(&config.options.location)
            .prompt()
            .context("Location entry cancelled")?;
        config.options.location = location.trim().to_string();
    }

    config.options.invert_color = Confirm::new("Invert watchface colours?")
        .with_default(config.options.invert_color)
        .prompt()
        .context("Colour choice cancelled")?;

    Ok(())
}
