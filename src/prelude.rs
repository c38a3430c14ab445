//! Convenience re-exports for embedding the watcher in another service.

pub use crate::common::config::Config;
pub use crate::common::model::{DeliveryAttempt, RawContent, StructuredContent};
pub use crate::converter::{default_registry, Converter, ConverterRegistry, XmlConverter};
pub use crate::downloader::{ContentSource, FetchOutcome, HttpContentSource};
pub use crate::engine::api::{self, ApiState};
pub use crate::engine::{ContentPipeline, PollMonitor};
pub use crate::errors::{Error, ErrorKind, Result};
pub use crate::notifier::{
    DeliveryTransport, FileSubscriberStore, HttpDelivery, SubscriberRegistry, SubscriberSet,
    SubscriberStore,
};
