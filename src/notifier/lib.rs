//! Subscriber registry and broadcast delivery.
//!
//! A small in-process pub/sub mediator: dynamic registration backed by
//! synchronous persistence, and best-effort broadcast with per-subscriber
//! failure isolation. Delivery itself is a capability
//! ([`DeliveryTransport`]), not a concrete transport.

pub mod store;

pub use store::{FileSubscriberStore, SubscriberSet, SubscriberStore};

use crate::common::model::{DeliveryAttempt, StructuredContent};
use crate::errors::{DeliveryError, Result};
use async_trait::async_trait;
use base64::Engine;
use futures::future::join_all;
use log::{debug, warn};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    /// Sends structured content to one endpoint, returning the accepted
    /// status. Non-success responses and transport failures are errors; they
    /// affect only this one delivery.
    async fn deliver(
        &self,
        endpoint: &str,
        content: &StructuredContent,
    ) -> std::result::Result<u16, DeliveryError>;
}

/// HTTP delivery: POST with the base64-encoded JSON text of the content as
/// body, mirroring the push endpoint so instances can chain.
pub struct HttpDelivery {
    client: Client,
}

impl HttpDelivery {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Unreachable(e.into()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DeliveryTransport for HttpDelivery {
    async fn deliver(
        &self,
        endpoint: &str,
        content: &StructuredContent,
    ) -> std::result::Result<u16, DeliveryError> {
        let json = serde_json::to_string(content.as_value())
            .map_err(|e| DeliveryError::Unreachable(e.into()))?;
        let body = base64::engine::general_purpose::STANDARD.encode(json);
        let response = self
            .client
            .post(endpoint)
            .body(body)
            .send()
            .await
            .map_err(|e| DeliveryError::Unreachable(e.into()))?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            Ok(status)
        } else {
            Err(DeliveryError::Rejected(status))
        }
    }
}

/// Mapping from subscriber name to delivery endpoint, persisted across
/// restarts and able to fan updates out to every registered endpoint.
pub struct SubscriberRegistry {
    // The mutex also serializes the paired store write, so concurrent
    // register/remove calls cannot interleave into a torn persisted file.
    subscribers: Mutex<SubscriberSet>,
    store: Arc<dyn SubscriberStore>,
    transport: Arc<dyn DeliveryTransport>,
    attempts: RwLock<Vec<DeliveryAttempt>>,
}

impl SubscriberRegistry {
    /// Creates the registry, loading the persisted set from the store.
    pub async fn load(
        store: Arc<dyn SubscriberStore>,
        transport: Arc<dyn DeliveryTransport>,
    ) -> Self {
        let subscribers = store.load().await;
        debug!("loaded {} persisted subscribers", subscribers.len());
        Self {
            subscribers: Mutex::new(subscribers),
            store,
            transport,
            attempts: RwLock::new(Vec::new()),
        }
    }

    /// Adds or overwrites a subscriber and persists the full set before
    /// returning. The in-memory set is only committed after a successful
    /// save, so memory and disk converge on every completed call.
    pub async fn register(&self, name: &str, endpoint: &str) -> Result<()> {
        let mut guard = self.subscribers.lock().await;
        let mut next = guard.clone();
        next.insert(name.to_string(), endpoint.to_string());
        self.store.save(&next).await?;
        *guard = next;
        debug!("registered subscriber {} -> {}", name, endpoint);
        Ok(())
    }

    /// Removes a subscriber if present and persists. Removing an absent name
    /// is a no-op.
    pub async fn remove(&self, name: &str) -> Result<()> {
        let mut guard = self.subscribers.lock().await;
        if !guard.contains_key(name) {
            return Ok(());
        }
        let mut next = guard.clone();
        next.remove(name);
        self.store.save(&next).await?;
        *guard = next;
        debug!("removed subscriber {}", name);
        Ok(())
    }

    /// Snapshot of the current subscriber set.
    pub async fn subscribers(&self) -> SubscriberSet {
        self.subscribers.lock().await.clone()
    }

    /// Attempts delivery of the content to every registered subscriber,
    /// concurrently. One endpoint failing or stalling does not prevent the
    /// others; all per-subscriber outcomes replace the retained attempt set.
    pub async fn broadcast(&self, content: &StructuredContent) -> Vec<DeliveryAttempt> {
        let entries: Vec<(String, String)> = self
            .subscribers
            .lock()
            .await
            .iter()
            .map(|(name, endpoint)| (name.clone(), endpoint.clone()))
            .collect();

        let deliveries = entries.iter().map(|(name, endpoint)| async move {
            match self.transport.deliver(endpoint, content).await {
                Ok(status) => DeliveryAttempt::success(name, endpoint, status),
                Err(DeliveryError::Rejected(status)) => {
                    warn!("subscriber {} rejected delivery: status {}", name, status);
                    DeliveryAttempt::rejected(name, endpoint, status)
                }
                Err(err) => {
                    warn!("subscriber {} unreachable: {}", name, err);
                    DeliveryAttempt::unreachable(name, endpoint, err)
                }
            }
        });
        let attempts = join_all(deliveries).await;

        *self.attempts.write().await = attempts.clone();
        attempts
    }

    /// Per-subscriber outcomes of the most recent broadcast.
    pub async fn last_attempts(&self) -> Vec<DeliveryAttempt> {
        self.attempts.read().await.clone()
    }
}
