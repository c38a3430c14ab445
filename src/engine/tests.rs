use crate::common::model::{RawContent, StructuredContent};
use crate::converter::default_registry;
use crate::downloader::{ContentSource, FetchOutcome};
use crate::engine::monitor::PollMonitor;
use crate::engine::pipeline::ContentPipeline;
use crate::errors::{DeliveryError, Error, Result};
use crate::notifier::{DeliveryTransport, SubscriberRegistry, SubscriberSet, SubscriberStore};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

struct MemoryStore(Mutex<SubscriberSet>);

impl MemoryStore {
    fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(SubscriberSet::new())))
    }
}

#[async_trait]
impl SubscriberStore for MemoryStore {
    async fn load(&self) -> SubscriberSet {
        self.0.lock().unwrap().clone()
    }

    async fn save(&self, set: &SubscriberSet) -> Result<()> {
        *self.0.lock().unwrap() = set.clone();
        Ok(())
    }
}

/// Records every broadcast body it is asked to deliver.
struct RecordingTransport {
    bodies: Mutex<Vec<StructuredContent>>,
}

impl RecordingTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bodies: Mutex::new(Vec::new()),
        })
    }

    fn delivered(&self) -> Vec<StructuredContent> {
        self.bodies.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryTransport for RecordingTransport {
    async fn deliver(
        &self,
        _endpoint: &str,
        content: &StructuredContent,
    ) -> std::result::Result<u16, DeliveryError> {
        self.bodies.lock().unwrap().push(content.clone());
        Ok(200)
    }
}

async fn pipeline_with(transport: Arc<RecordingTransport>) -> Arc<ContentPipeline> {
    let notifier = Arc::new(SubscriberRegistry::load(MemoryStore::new(), transport).await);
    notifier
        .register("observer", "http://observer/update")
        .await
        .unwrap();
    Arc::new(ContentPipeline::new(Arc::new(default_registry()), notifier))
}

const NOTE_XML: &str =
    "<note><to>Smith</to><from>Adams</from><heading>Test</heading><body>Test body</body></note>";

fn note_value() -> serde_json::Value {
    json!({
        "note": {
            "to": "Smith",
            "from": "Adams",
            "heading": "Test",
            "body": "Test body"
        }
    })
}

#[tokio::test]
async fn test_update_converts_recognized_xml() {
    let pipeline = pipeline_with(RecordingTransport::new()).await;
    pipeline.update(RawContent::new(NOTE_XML)).await;
    assert_eq!(pipeline.content().await.as_value(), &note_value());
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let pipeline = pipeline_with(RecordingTransport::new()).await;
    pipeline.update(RawContent::new(NOTE_XML)).await;
    let once = pipeline.content().await;
    pipeline.update(RawContent::new(NOTE_XML)).await;
    assert_eq!(pipeline.content().await, once);
}

#[tokio::test]
async fn test_empty_input_resets_regardless_of_prior_state() {
    let pipeline = pipeline_with(RecordingTransport::new()).await;
    pipeline.update(RawContent::new(NOTE_XML)).await;
    pipeline.update(RawContent::empty()).await;
    assert!(pipeline.content().await.is_empty());
}

#[tokio::test]
async fn test_round_trip_through_empty() {
    let pipeline = pipeline_with(RecordingTransport::new()).await;
    pipeline.update(RawContent::new(NOTE_XML)).await;
    let original = pipeline.content().await;

    pipeline.update(RawContent::empty()).await;
    assert!(pipeline.content().await.is_empty());

    pipeline.update(RawContent::new(NOTE_XML)).await;
    assert_eq!(pipeline.content().await, original);
}

#[tokio::test]
async fn test_unknown_format_passes_through_verbatim() {
    let pipeline = pipeline_with(RecordingTransport::new()).await;
    pipeline.update(RawContent::new("plain text, no format")).await;
    assert_eq!(
        pipeline.content().await.as_value(),
        &json!("plain text, no format")
    );
}

#[tokio::test]
async fn test_header_only_xml_yields_empty_and_suppresses_notification() {
    let transport = RecordingTransport::new();
    let pipeline = pipeline_with(transport.clone()).await;
    pipeline
        .update(RawContent::new("<?xml version='1.0' encoding='UTF-8'?>"))
        .await;
    assert_eq!(pipeline.content().await.as_value(), &json!({}));
    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn test_non_empty_update_broadcasts_to_subscribers() {
    let transport = RecordingTransport::new();
    let pipeline = pipeline_with(transport.clone()).await;
    pipeline.update(RawContent::new(NOTE_XML)).await;

    let delivered = transport.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].as_value(), &note_value());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_keep_raw_and_content_paired() {
    let pipeline = pipeline_with(RecordingTransport::new()).await;
    let note = RawContent::new(NOTE_XML);
    let other = RawContent::new("<other><v>1</v></other>");

    // The poll monitor and the push endpoint can race whole update cycles;
    // whichever cycle lands last must leave its own raw and content paired.
    let mut handles = Vec::new();
    for i in 0..50 {
        let pipeline = pipeline.clone();
        let raw = if i % 2 == 0 { note.clone() } else { other.clone() };
        handles.push(tokio::spawn(async move { pipeline.update(raw).await }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let current_is_note = !pipeline.changed(&note).await;
    let current_is_other = !pipeline.changed(&other).await;
    assert!(current_is_note || current_is_other);

    let expected = if current_is_note {
        note_value()
    } else {
        json!({"other": {"v": "1"}})
    };
    assert_eq!(pipeline.content().await.as_value(), &expected);
}

#[tokio::test]
async fn test_changed_compares_against_stored_raw() {
    let pipeline = pipeline_with(RecordingTransport::new()).await;
    let raw = RawContent::new(NOTE_XML);
    assert!(pipeline.changed(&raw).await);

    pipeline.update(raw.clone()).await;
    assert!(!pipeline.changed(&raw).await);
    assert!(pipeline.changed(&RawContent::new("<other/>")).await);
}

/// Scripted source for monitor tests: yields each outcome once, then
/// repeats the last one.
struct ScriptedSource {
    script: Vec<Result<FetchOutcome>>,
    cursor: AtomicUsize,
}

impl ScriptedSource {
    fn new(script: Vec<Result<FetchOutcome>>) -> Arc<Self> {
        Arc::new(Self {
            script,
            cursor: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ContentSource for ScriptedSource {
    async fn fetch(&self) -> Result<FetchOutcome> {
        let index = self
            .cursor
            .fetch_add(1, Ordering::Relaxed)
            .min(self.script.len() - 1);
        match &self.script[index] {
            Ok(outcome) => Ok(outcome.clone()),
            Err(_) => Err(Error::source_unavailable(503)),
        }
    }
}

#[tokio::test]
async fn test_monitor_skips_unchanged_fetches() {
    let transport = RecordingTransport::new();
    let pipeline = pipeline_with(transport.clone()).await;
    let source = ScriptedSource::new(vec![Ok(FetchOutcome::Content(RawContent::new(NOTE_XML)))]);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let handle = PollMonitor::new(source, pipeline.clone(), Duration::from_millis(10))
        .spawn(shutdown_rx);

    // Several poll ticks fetch identical content; only the first converts
    // and notifies.
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    assert_eq!(pipeline.content().await.as_value(), &note_value());
    assert_eq!(transport.delivered().len(), 1);
}

#[tokio::test]
async fn test_monitor_keeps_last_known_value_when_source_unavailable() {
    let transport = RecordingTransport::new();
    let pipeline = pipeline_with(transport.clone()).await;
    let source = ScriptedSource::new(vec![
        Ok(FetchOutcome::Content(RawContent::new(NOTE_XML))),
        Err(Error::source_unavailable(503)),
    ]);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let handle = PollMonitor::new(source, pipeline.clone(), Duration::from_millis(10))
        .spawn(shutdown_rx);

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    assert_eq!(pipeline.content().await.as_value(), &note_value());
}

#[tokio::test]
async fn test_monitor_resets_on_explicit_no_content() {
    let transport = RecordingTransport::new();
    let pipeline = pipeline_with(transport.clone()).await;
    let source = ScriptedSource::new(vec![
        Ok(FetchOutcome::Content(RawContent::new(NOTE_XML))),
        Ok(FetchOutcome::Empty),
    ]);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let handle = PollMonitor::new(source, pipeline.clone(), Duration::from_millis(10))
        .spawn(shutdown_rx);

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    assert!(pipeline.content().await.is_empty());
}
