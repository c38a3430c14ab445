//! Format-specific conversion of raw content into structured content.
//!
//! Converters are registered in a [`ConverterRegistry`] under a short format
//! token. The pipeline sniffs a human-readable type label from the raw bytes
//! and matches it against the registered tokens; new formats plug in by
//! implementing [`Converter`] and registering a factory, nothing else changes.

pub mod registry;
pub mod sniff;
pub mod xml;

pub use registry::{ConverterFactory, ConverterRegistry};
pub use xml::XmlConverter;

use crate::common::model::{RawContent, StructuredContent};

/// Two-method contract every format implements.
///
/// `process` fully replaces the converter's internal content on every call,
/// so converters behave with value semantics despite the mutable slot.
pub trait Converter: Send + Sync {
    /// Parses raw content into the converter's internal structured slot.
    /// Empty or malformed input resets the slot to the empty mapping; this
    /// is a recoverable condition, never an error to the caller.
    fn process(&mut self, raw: &RawContent);

    /// Returns the current structured content.
    fn content(&self) -> StructuredContent;
}

/// Builds the registry used by the service: XML is the only built-in format.
pub fn default_registry() -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();
    registry.register("xml", || Box::new(XmlConverter::new()));
    registry
}
