//! Per-interaction SSE event delivery.
//!
//! Each HTTP interaction gets its own channel: every `respond` and
//! `edit_response` becomes one event on the stream returned to the client,
//! and the stream ends when the handler drops the interaction.

use crate::config::ChannelId;
use crate::error::{Error, Result};
use crate::gateway::Interaction;
use crate::gateway::http::types::SSEMessage;
use crate::gateway::reply::Reply;
use actix_web::web::Bytes;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Event name for the initial response
pub const RESPOND_EVENT: &str = "respond";

/// Event name for edits of the response
pub const EDIT_EVENT: &str = "edit";

/// [`Interaction`] that writes replies to an SSE stream.
pub struct SseInteraction {
    id: Uuid,
    channel_id: ChannelId,
    sender: mpsc::UnboundedSender<SSEMessage>,
    sequence: AtomicU64,
}

impl SseInteraction {
    /// Create an interaction and the receiving end of its event stream
    pub fn new(channel_id: ChannelId) -> (Self, mpsc::UnboundedReceiver<SSEMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let interaction = Self {
            id: Uuid::new_v4(),
            channel_id,
            sender,
            sequence: AtomicU64::new(0),
        };
        (interaction, receiver)
    }

    /// Interaction id, echoed to the client in a response header
    pub fn id(&self) -> Uuid {
        self.id
    }

    fn send(&self, event: &str, reply: &Reply) -> Result<()> {
        let data = serde_json::to_string(reply)?;
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst).to_string();
        let message = SSEMessage::new(event, &data, Some(&sequence));

        self.sender.send(message).map_err(|_| {
            tracing::debug!(interaction_id = %self.id, event, "Client disconnected");
            Error::Gateway(format!("Client for interaction {} disconnected", self.id))
        })
    }
}

#[async_trait]
impl Interaction for SseInteraction {
    fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    async fn respond(&self, reply: Reply) -> Result<()> {
        self.send(RESPOND_EVENT, &reply)
    }

    async fn edit_response(&self, reply: Reply) -> Result<()> {
        self.send(EDIT_EVENT, &reply)
    }
}

/// Format an SSEMessage for the wire
pub fn format_sse_message(message: &SSEMessage) -> Bytes {
    let mut result = String::new();

    if let Some(id) = &message.id {
        result.push_str(&format!("id: {}\n", id));
    }

    result.push_str(&format!("event: {}\n", message.event));
    result.push_str(&format!("data: {}\n\n", message.data));

    Bytes::from(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Snowflake;

    #[tokio::test]
    async fn test_replies_become_numbered_events() {
        let (interaction, mut receiver) = SseInteraction::new(Snowflake::new(9));

        interaction.respond(Reply::text("Getting server status...")).await.unwrap();
        interaction.edit_response(Reply::text("Stopping server...")).await.unwrap();
        drop(interaction);

        let first = receiver.recv().await.unwrap();
        assert_eq!(first.event, RESPOND_EVENT);
        assert_eq!(first.id.as_deref(), Some("0"));

        let second = receiver.recv().await.unwrap();
        assert_eq!(second.event, EDIT_EVENT);
        let reply: Reply = serde_json::from_str(&second.data).unwrap();
        assert_eq!(reply.content.as_deref(), Some("Stopping server..."));

        assert!(receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_send_after_disconnect_fails() {
        let (interaction, receiver) = SseInteraction::new(Snowflake::new(9));
        drop(receiver);

        let result = interaction.respond(Reply::text("hello")).await;
        assert!(matches!(result, Err(Error::Gateway(_))));
    }

    #[test]
    fn test_wire_format() {
        let message = SSEMessage::new("edit", "{}", Some("3"));
        let bytes = format_sse_message(&message);
        assert_eq!(&bytes[..], b"id: 3\nevent: edit\ndata: {}\n\n");
    }
}
