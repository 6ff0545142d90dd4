use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::platform::EventRecord;

/// Decode a webhook body into a JSON object.
///
/// Telegram always posts an object; anything else (invalid JSON, an empty
/// body, a bare array or scalar) is treated as an empty update.
pub fn parse_body(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Build an [`EventRecord`] from a raw update.
///
/// The `message`, `message.chat` and `message.from` levels are each optional;
/// a missing level, or one of the wrong type, leaves the derived fields empty.
pub fn extract_event(payload: Map<String, Value>) -> EventRecord {
    let empty = Map::new();
    let message = object_at(&payload, "message").unwrap_or(&empty);
    let chat = object_at(message, "chat").unwrap_or(&empty);
    let from = object_at(message, "from").unwrap_or(&empty);

    EventRecord {
        id: Uuid::new_v4(),
        timestamp: Utc::now(),
        chat_id: chat.get("id").and_then(Value::as_i64),
        chat_type: string_at(chat, "type"),
        sender_id: from.get("id").and_then(Value::as_i64),
        sender_name: string_at(from, "first_name"),
        sender_username: string_at(from, "username"),
        text: string_at(message, "text"),
        raw_payload: Arc::new(payload),
    }
}

fn object_at<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    map.get(key).and_then(Value::as_object)
}

fn string_at(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}
