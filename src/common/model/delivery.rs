use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one notification send to one subscriber.
///
/// Retained only transiently (the latest broadcast's attempts) for
/// inspection; never part of durable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    /// Subscriber name the delivery was addressed to.
    pub subscriber: String,
    /// Endpoint URL at the time of the attempt.
    pub endpoint: String,
    /// HTTP status returned by the endpoint, when one was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Error text when the endpoint was unreachable or rejected delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub delivered: bool,
    pub timestamp: DateTime<Utc>,
}

impl DeliveryAttempt {
    pub fn success(subscriber: &str, endpoint: &str, status: u16) -> Self {
        Self {
            subscriber: subscriber.to_string(),
            endpoint: endpoint.to_string(),
            status: Some(status),
            error: None,
            delivered: true,
            timestamp: Utc::now(),
        }
    }

    pub fn rejected(subscriber: &str, endpoint: &str, status: u16) -> Self {
        Self {
            subscriber: subscriber.to_string(),
            endpoint: endpoint.to_string(),
            status: Some(status),
            error: Some(format!("endpoint rejected delivery: status {status}")),
            delivered: false,
            timestamp: Utc::now(),
        }
    }

    pub fn unreachable(subscriber: &str, endpoint: &str, error: impl ToString) -> Self {
        Self {
            subscriber: subscriber.to_string(),
            endpoint: endpoint.to_string(),
            status: None,
            error: Some(error.to_string()),
            delivered: false,
            timestamp: Utc::now(),
        }
    }
}
