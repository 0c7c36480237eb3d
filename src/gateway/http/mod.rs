//! HTTP gateway built on Actix Web.
//!
//! Clients post a command invocation and receive every response and edit
//! the handler produces as Server-Sent Events on the same connection:
//!
//! ```text
//! POST /interactions {"command": "server restart", "channelId": "42"}
//!
//! id: 0
//! event: respond
//! data: {"content":"Getting server status..."}
//!
//! id: 1
//! event: edit
//! data: {"content":"Stopping server..."}
//! ```

pub use self::events::SseInteraction;
pub use self::server::{HttpGateway, HttpGatewayHandle};
pub use self::types::{InteractionRequest, SSEMessage};

pub mod actix_error;
pub mod auth;
pub mod events;
pub mod handlers;
pub mod server;
pub mod types;
