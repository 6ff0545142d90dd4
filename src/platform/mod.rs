pub mod telegram;

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One intake event as kept in the history buffer.
///
/// Records are never mutated after creation and are shared as `Arc<EventRecord>`
/// between the buffer, the relay tasks and the log view.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Correlates the intake log line with relay failures
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub chat_id: Option<i64>,
    pub chat_type: Option<String>,
    pub sender_id: Option<i64>,
    /// Sender's first name
    pub sender_name: Option<String>,
    pub sender_username: Option<String>,
    pub text: Option<String>,
    /// The inbound body exactly as received
    pub raw_payload: Arc<Map<String, Value>>,
}

impl EventRecord {
    /// ISO-8601 with offset, e.g. `2026-10-16T12:00:00.123456+00:00`.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, false)
    }

    /// Best available label for the sender: first name, then username, then id.
    /// Empty strings count as missing.
    pub fn sender_display(&self) -> Option<String> {
        non_empty(&self.sender_name)
            .or_else(|| non_empty(&self.sender_username))
            .or_else(|| self.sender_id.map(|id| id.to_string()))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}
