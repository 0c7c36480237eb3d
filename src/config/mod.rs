//! Configuration module for Skipper.
//!
//! This module handles parsing and validation of the static configuration:
//! the chat credential, the container runtime endpoint, the guild and the
//! ordered list of managed servers. The configuration is read once at
//! startup and handed to every component as an explicit value.
//!
//! # Examples
//!
//! Loading the configuration named by the environment:
//!
//! ```no_run
//! use skipper::config::{Config, validate_config};
//!
//! let config = Config::from_env().unwrap();
//! validate_config(&config).unwrap();
//! println!("Managing {} servers", config.servers.len());
//! ```
//!
//! Creating a configuration programmatically:
//!
//! ```
//! use skipper::config::{Config, ServerMapping, Snowflake};
//!
//! let config = Config {
//!     discord_token: "token".to_string(),
//!     docker_endpoint: "unix:///var/run/docker.sock".to_string(),
//!     guild_id: Snowflake::new(1),
//!     servers: vec![ServerMapping {
//!         name: "Valheim".to_string(),
//!         container: "valheim".to_string(),
//!         channel_id: Snowflake::new(2),
//!     }],
//!     gateway: None,
//!     api_base_url: None,
//! };
//! assert_eq!(config.gateway().port, 8080);
//! ```
mod parser;
pub mod validator;

pub use parser::{
    AuthConfig, BearerAuthConfig, CONFIG_PATH_ENV, ChannelId, Config, DEFAULT_API_BASE_URL,
    DEFAULT_WORKERS, GatewayConfig, GuildId, ServerMapping, Snowflake,
};
pub use validator::validate_config;
