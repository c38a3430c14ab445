use super::pipeline::ContentPipeline;
use crate::common::model::RawContent;
use crate::downloader::{ContentSource, FetchOutcome};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Background task that owns the poll-and-update cycle for one source.
///
/// Runs independently of the request-serving tasks; the only shared state is
/// the pipeline's structured-content slot. Terminates cleanly on shutdown
/// with no requirement to complete an in-flight cycle.
pub struct PollMonitor {
    source: Arc<dyn ContentSource>,
    pipeline: Arc<ContentPipeline>,
    interval: Duration,
}

impl PollMonitor {
    pub fn new(
        source: Arc<dyn ContentSource>,
        pipeline: Arc<ContentPipeline>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            pipeline,
            interval,
        }
    }

    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!("poll monitor started, interval {:?}", self.interval);
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("poll monitor received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {
                    self.tick().await;
                }
            }
        }
    }

    /// One poll cycle: fetch, compare against the stored raw value, and run
    /// the update only on change. Fetch failures keep the last-known
    /// content; an explicit no-content status resets it.
    async fn tick(&self) {
        match self.source.fetch().await {
            Ok(FetchOutcome::Content(raw)) => {
                if self.pipeline.changed(&raw).await {
                    self.pipeline.update(raw).await;
                } else {
                    debug!("raw content unchanged, skipping cycle");
                }
            }
            Ok(FetchOutcome::Empty) => {
                let empty = RawContent::empty();
                if self.pipeline.changed(&empty).await {
                    info!("source reports no content, resetting");
                    self.pipeline.update(empty).await;
                }
            }
            Err(err) => {
                warn!("fetch failed, keeping last known content: {}", err);
            }
        }
    }
}
