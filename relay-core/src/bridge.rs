//! Outbound channel to the watch. Messages are fire-and-forget.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::{Mutex, mpsc},
};

use crate::model::AppMessage;

#[async_trait]
pub trait DeviceBridge: Send + Sync {
    async fn send(&self, message: &AppMessage) -> Result<()>;
}

/// Writes each message as one JSON object per line.
pub struct JsonLinesBridge<W> {
    writer: Mutex<W>,
}

impl<W> JsonLinesBridge<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer) }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl JsonLinesBridge<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

#[async_trait]
impl<W> DeviceBridge for JsonLinesBridge<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&self, message: &AppMessage) -> Result<()> {
        let mut line = serde_json::to_vec(message).context("Failed to encode app message")?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await.context("Failed to write app message")?;
        writer.flush().await.context("Failed to flush app message")?;
        Ok(())
    }
}

/// Forwards messages into an in-process channel.
#[derive(Debug, Clone)]
pub struct ChannelBridge {
    tx: mpsc::UnboundedSender<AppMessage>,
}

impl ChannelBridge {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AppMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl DeviceBridge for ChannelBridge {
    async fn send(&self, message: &AppMessage) -> Result<()> {
        self.tx
            .send(message.clone())
            .map_err(|_| anyhow!("device channel closed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::IconValue;

    fn message() -> AppMessage {
        AppMessage {
            icon: IconValue::Index(0),
            temperature: "70°F".into(),
            city: Some("Austin".into()),
            invert_color: Some(0),
        }
    }

    #[tokio::test]
    async fn json_lines_bridge_writes_one_line_per_message() {
        let bridge = JsonLinesBridge::new(Vec::new());
        bridge.send(&message()).await.unwrap();
        bridge.send(&message()).await.unwrap();

        let out = String::from_utf8(bridge.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: AppMessage = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed, message());
    }

    #[tokio::test]
    async fn channel_bridge_forwards() {
        let (bridge, mut rx) = ChannelBridge::new();
        bridge.send(&message()).await.unwrap();
        assert_eq!(rx.recv().await, Some(message()));
    }

    #[tokio::test]
    async fn channel_bridge_errors_when_closed() {
        let (bridge, rx) = ChannelBridge::new();
        drop(rx);
        assert!(bridge.send(&message()).await.is_err());
    }
}
