//! Shared domain models and configuration.
//!
//! Centralizes the building blocks used by the converter, downloader,
//! notifier, and engine modules: content models, delivery records, and the
//! TOML-backed service configuration.

pub mod config;
pub mod model;

pub use model::content::{RawContent, StructuredContent};
pub use model::delivery::DeliveryAttempt;
