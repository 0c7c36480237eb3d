//! Type definitions for the HTTP gateway.

use crate::config::ChannelId;
use serde::{Deserialize, Serialize};

/// Body of `POST /interactions`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    /// Command text, e.g. `"server restart"`
    pub command: String,
    /// Channel the command was issued from
    pub channel_id: ChannelId,
}

/// Server-Sent Event message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SSEMessage {
    /// Event type
    pub event: String,
    /// Event data as JSON string
    pub data: String,
    /// Optional event ID
    pub id: Option<String>,
}

impl SSEMessage {
    /// Creates a new SSE message with the given event type, data payload, and optional ID
    pub fn new(event: &str, data: &str, id: Option<&str>) -> Self {
        Self {
            event: event.to_string(),
            data: data.to_string(),
            id: id.map(String::from),
        }
    }
}
