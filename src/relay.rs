use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Destination;

/// Transport that delivers one payload to one destination.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn deliver(
        &self,
        destination: &Destination,
        payload: &Map<String, Value>,
    ) -> Result<()>;
}

/// POSTs the payload as JSON. The timeout covers the whole request.
pub struct HttpRelay {
    client: reqwest::Client,
}

impl HttpRelay {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build relay HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Relay for HttpRelay {
    async fn deliver(
        &self,
        destination: &Destination,
        payload: &Map<String, Value>,
    ) -> Result<()> {
        let response = self
            .client
            .post(&destination.url)
            .json(payload)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Destination responded with {}", status);
        }
        Ok(())
    }
}

/// Fans a payload out to every configured destination without waiting.
///
/// Each delivery runs on its own detached task; outcomes are only logged.
/// Nothing is retried and nothing is reported back to the caller.
#[derive(Clone)]
pub struct RelayDispatcher {
    relay: Arc<dyn Relay>,
    destinations: Arc<[Destination]>,
}

impl RelayDispatcher {
    pub fn new(relay: Arc<dyn Relay>, destinations: Vec<Destination>) -> Self {
        Self {
            relay,
            destinations: destinations.into(),
        }
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// Start delivery to a single destination and return immediately.
    pub fn dispatch(
        &self,
        event_id: Uuid,
        destination: Destination,
        payload: Arc<Map<String, Value>>,
    ) {
        let relay = Arc::clone(&self.relay);
        tokio::spawn(async move {
            match relay.deliver(&destination, &payload).await {
                Ok(()) => debug!(
                    "Relayed event {} to {} ({})",
                    event_id,
                    destination.name,
                    destination.redacted_url()
                ),
                Err(e) => warn!(
                    "Relay of event {} to {} ({}) failed: {:#}",
                    event_id,
                    destination.name,
                    destination.redacted_url(),
                    e
                ),
            }
        });
    }

    pub fn dispatch_all(&self, event_id: Uuid, payload: Arc<Map<String, Value>>) {
        for destination in self.destinations.iter() {
            self.dispatch(event_id, destination.clone(), Arc::clone(&payload));
        }
    }
}
