//! Raw-content sources.
//!
//! The pipeline depends on [`ContentSource`] as a capability; the HTTP pull
//! source is the production implementation, tests substitute their own.

use crate::common::model::RawContent;
use crate::errors::{Error, FetchError, Result};
use async_trait::async_trait;
use base64::Engine;
use log::warn;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// What one fetch observed at the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Status 200: raw content is present.
    Content(RawContent),
    /// Status 204: the source explicitly reports no content.
    Empty,
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches the current raw content. Any non-200/204 status or transport
    /// failure is an error; callers keep their last-known value and retry on
    /// the next cycle.
    async fn fetch(&self) -> Result<FetchOutcome>;
}

#[derive(Deserialize)]
struct ContentEnvelope {
    content: String,
}

/// Pull source issuing a GET against a configured endpoint that returns
/// `{"content": "<base64>"}`.
pub struct HttpContentSource {
    client: Client,
    url: String,
}

impl HttpContentSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::from(FetchError::Network(e.into())))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch(&self) -> Result<FetchOutcome> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if status.as_u16() == 204 {
            return Ok(FetchOutcome::Empty);
        }
        if !status.is_success() {
            warn!("content source returned status {}", status);
            return Err(Error::source_unavailable(status.as_u16()));
        }

        let envelope: ContentEnvelope = response
            .json()
            .await
            .map_err(|e| Error::from(FetchError::InvalidPayload(e.to_string())))?;
        let decoded = base64::engine::general_purpose::STANDARD.decode(envelope.content)?;
        let text = String::from_utf8(decoded)
            .map_err(|e| Error::from(FetchError::Decode(e.into())))?;
        Ok(FetchOutcome::Content(RawContent::new(text)))
    }
}
