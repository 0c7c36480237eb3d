//! Reply payloads sent back through a gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Footer shown on status panels.
pub const PANEL_FOOTER: &str = "Skipper";

/// Message text used when a reply carries only attachments.
pub const ATTACHMENT_ONLY_CONTENT: &str = "\u{200b}";

/// Informational panel rendered for a status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPanel {
    /// Panel author line: the server name
    pub author: String,
    /// "Online" or "Offline"
    pub status: String,
    /// Footer text
    pub footer: String,
    /// When the panel was rendered
    pub timestamp: DateTime<Utc>,
}

impl StatusPanel {
    /// Build the panel for `name` stamped with the current time
    pub fn new(name: &str, online: bool) -> Self {
        Self {
            author: name.to_string(),
            status: if online { "Online" } else { "Offline" }.to_string(),
            footer: PANEL_FOOTER.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// A text file attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// File name shown to the requester
    pub file_name: String,
    /// UTF-8 file contents
    pub content: String,
}

impl Attachment {
    /// Create an attachment
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Content of a response or of an edit to it.
///
/// An edit replaces the whole previous content.
///
/// # Examples
///
/// ```
/// use skipper::gateway::Reply;
///
/// let reply = Reply::text("Stopping server...");
/// assert_eq!(reply.content.as_deref(), Some("Stopping server..."));
/// assert!(reply.attachments.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// Plain message text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Status panel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel: Option<StatusPanel>,
    /// Attached files
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Reply {
    /// Plain text reply
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Panel-only reply
    pub fn panel(panel: StatusPanel) -> Self {
        Self {
            panel: Some(panel),
            ..Self::default()
        }
    }

    /// Attachment reply; the text is a zero-width placeholder
    pub fn attachments(attachments: Vec<Attachment>) -> Self {
        Self {
            content: Some(ATTACHMENT_ONLY_CONTENT.to_string()),
            attachments,
            ..Self::default()
        }
    }
}
