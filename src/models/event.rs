use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Normal,
    Warning,
}

/// Append-only diagnostic record. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub tick: u64,
    pub event_type: EventType,
    pub reason: String,
    pub object_kind: String,
    pub object_name: String,
    pub message: String,
}

impl Event {
    pub fn new(
        tick: u64,
        event_type: EventType,
        reason: &str,
        object_kind: &str,
        object_name: &str,
        message: String,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            tick,
            event_type,
            reason: reason.to_string(),
            object_kind: object_kind.to_string(),
            object_name: object_name.to_string(),
            message,
        }
    }
}
