//! Chat-facing side of Skipper.
//!
//! The command handlers only depend on the [`Interaction`] capability:
//! respond once, then edit that response as often as needed. A concrete
//! gateway receives commands, wraps each one in an `Interaction` and hands
//! it to the [`Dispatcher`], which runs the handler as an independent task.
//!
//! * `commands` - Command parsing, definitions and rendering
//! * `dispatcher` - Task-per-invocation execution with failure isolation
//! * `http` - Actix Web gateway streaming replies as Server-Sent Events
//! * `install` - Registration of the command group with the chat platform

pub mod commands;
pub mod dispatcher;
pub mod http;
pub mod install;
pub mod reply;

pub use commands::{Command, CommandDefinition, CommandHandler, command_definitions};
pub use dispatcher::Dispatcher;
pub use install::CommandInstaller;
pub use reply::{Attachment, Reply, StatusPanel};

use crate::config::ChannelId;
use crate::error::Result;
use async_trait::async_trait;

/// One command invocation as seen by the handlers.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Channel the command was invoked from
    fn channel_id(&self) -> ChannelId;

    /// Send the initial response
    async fn respond(&self, reply: Reply) -> Result<()>;

    /// Replace the content of the initial response
    async fn edit_response(&self, reply: Reply) -> Result<()>;
}
