use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Unprocessed payload as received from a content source.
///
/// Held exclusively by the pipeline and replaced wholesale on every update;
/// equality comparison drives change detection for pull-style sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawContent(String);

impl RawContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The empty value observed before any content arrives.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<String> for RawContent {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RawContent {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RawContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized, tree-shaped output of a converter, or the raw content itself
/// under the pass-through policy for unrecognized formats.
///
/// The default value is the empty JSON object; consumers get read-only
/// snapshots, only the pipeline's update cycle writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredContent(Value);

impl StructuredContent {
    /// The empty mapping, used as the reset value on empty or malformed input.
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Wraps raw content verbatim for formats with no registered converter.
    pub fn passthrough(raw: &RawContent) -> Self {
        Self(Value::String(raw.as_str().to_string()))
    }

    /// True only for the empty mapping. Non-empty content is what gets
    /// broadcast; everything else suppresses notification.
    pub fn is_empty(&self) -> bool {
        matches!(&self.0, Value::Object(map) if map.is_empty())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl Default for StructuredContent {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for StructuredContent {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
