//! Channel to server lookup.

use crate::config::{ChannelId, Config, ServerMapping};

/// Immutable mapping of chat channels to managed servers.
///
/// Built once from the configuration and shared read-only. Lookups return
/// the first mapping bound to a channel.
///
/// # Examples
///
/// ```
/// use skipper::config::{ServerMapping, Snowflake};
/// use skipper::registry::ServerRegistry;
///
/// let registry = ServerRegistry::new(vec![ServerMapping {
///     name: "Valheim".to_string(),
///     container: "valheim".to_string(),
///     channel_id: Snowflake::new(7),
/// }]);
///
/// assert_eq!(registry.resolve(Snowflake::new(7)).unwrap().container, "valheim");
/// assert!(registry.resolve(Snowflake::new(8)).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServerRegistry {
    servers: Vec<ServerMapping>,
}

impl ServerRegistry {
    /// Create a registry from an ordered list of mappings
    pub fn new(servers: Vec<ServerMapping>) -> Self {
        Self { servers }
    }

    /// Create a registry from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.servers.clone())
    }

    /// Find the server bound to `channel_id`
    ///
    /// `None` means the channel has no managed server. It is not a failure
    /// to retry.
    pub fn resolve(&self, channel_id: ChannelId) -> Option<&ServerMapping> {
        self.servers.iter().find(|s| s.channel_id == channel_id)
    }

    /// All mappings in configuration order
    pub fn servers(&self) -> &[ServerMapping] {
        &self.servers
    }

    /// Number of managed servers
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Whether no servers are managed
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
