use crate::common::model::{RawContent, StructuredContent};
use crate::converter::{sniff, ConverterRegistry};
use crate::notifier::SubscriberRegistry;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Owns the current raw content and its derived structured content.
///
/// Detection triggers conversion, conversion triggers notification: on each
/// update the pipeline classifies the raw bytes against the registry, runs
/// the matching converter (or passes unrecognized content through verbatim),
/// swaps the structured slot, and asks the subscriber registry to broadcast
/// any non-empty result.
///
/// Writes to both slots happen only from the update cycle (single writer);
/// readers take consistent snapshots through the locks.
pub struct ContentPipeline {
    registry: Arc<ConverterRegistry>,
    notifier: Arc<SubscriberRegistry>,
    // The raw and content slots span two locks; whole update cycles are
    // serialized behind `cycle` so the slots always pair up. Both the poll
    // monitor and the push endpoint call `update`.
    cycle: Mutex<()>,
    raw: RwLock<RawContent>,
    content: RwLock<StructuredContent>,
}

impl ContentPipeline {
    pub fn new(registry: Arc<ConverterRegistry>, notifier: Arc<SubscriberRegistry>) -> Self {
        Self {
            registry,
            notifier,
            cycle: Mutex::new(()),
            raw: RwLock::new(RawContent::empty()),
            content: RwLock::new(StructuredContent::empty()),
        }
    }

    /// True when the candidate differs from the currently stored raw value.
    /// Pull sources use this to skip whole cycles for unchanged fetches.
    pub async fn changed(&self, candidate: &RawContent) -> bool {
        *self.raw.read().await != *candidate
    }

    /// Snapshot of the last computed structured content.
    pub async fn content(&self) -> StructuredContent {
        self.content.read().await.clone()
    }

    /// Runs one full update cycle for newly observed raw content.
    ///
    /// Empty input resets both slots and announces nothing. Otherwise the
    /// raw slot is replaced wholesale, the content is classified and
    /// converted (pass-through when no registered format matches), and a
    /// non-empty result is broadcast to all subscribers. Conversion problems
    /// degrade to the empty/pass-through policies; they never surface here.
    pub async fn update(&self, new_raw: RawContent) {
        let _cycle = self.cycle.lock().await;

        if new_raw.is_empty() {
            *self.raw.write().await = new_raw;
            *self.content.write().await = StructuredContent::empty();
            debug!("empty raw content, structured content reset");
            return;
        }

        *self.raw.write().await = new_raw.clone();

        let label = sniff::type_label(&new_raw);
        let structured = match self.registry.match_label(&label) {
            Some(token) => match self.registry.create(token) {
                Ok(mut converter) => {
                    converter.process(&new_raw);
                    converter.content()
                }
                Err(err) => {
                    // A matched token without a factory cannot happen with a
                    // registry frozen at startup; degrade anyway.
                    warn!("converter lookup failed for {}: {}", token, err);
                    StructuredContent::passthrough(&new_raw)
                }
            },
            None => {
                debug!("no converter for label {:?}, passing through", label);
                StructuredContent::passthrough(&new_raw)
            }
        };

        *self.content.write().await = structured.clone();

        if structured.is_empty() {
            debug!("empty conversion result, notification suppressed");
            return;
        }
        self.notifier.broadcast(&structured).await;
    }
}
