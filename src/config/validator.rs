use crate::config::{Config, ServerMapping};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Validates a single server entry
pub fn validate_server_mapping(index: usize, mapping: &ServerMapping) -> Result<()> {
    if mapping.name.trim().is_empty() {
        return Err(Error::ConfigInvalid(format!(
            "Server entry #{} has an empty name",
            index
        )));
    }

    if mapping.container.trim().is_empty() {
        return Err(Error::ConfigInvalid(format!(
            "Server '{}' has an empty container",
            mapping.name
        )));
    }

    Ok(())
}

/// Validates the list of server entries
///
/// Channels bound to more than one server are reported with a warning only;
/// lookups resolve to the first entry.
pub fn validate_server_mappings(servers: &[ServerMapping]) -> Result<()> {
    if servers.is_empty() {
        return Err(Error::ConfigInvalid("No servers configured".to_string()));
    }

    let mut seen = HashSet::new();
    for (index, mapping) in servers.iter().enumerate() {
        validate_server_mapping(index, mapping)?;

        if !seen.insert(mapping.channel_id) {
            tracing::warn!(
                channel_id = %mapping.channel_id,
                server = %mapping.name,
                "Channel is bound to more than one server; only the first entry is reachable"
            );
        }
    }

    Ok(())
}

/// Full configuration validation
pub fn validate_config(config: &Config) -> Result<()> {
    if config.discord_token.trim().is_empty() {
        return Err(Error::ConfigInvalid("discordToken is empty".to_string()));
    }

    if config.docker_endpoint.trim().is_empty() {
        return Err(Error::ConfigInvalid("dockerEndpoint is empty".to_string()));
    }

    validate_server_mappings(&config.servers)?;

    if let Some(auth) = config.gateway.as_ref().and_then(|g| g.authenticate.as_ref())
        && auth.bearer.as_ref().is_some_and(|b| b.token.is_empty())
    {
        return Err(Error::ConfigInvalid(
            "gateway bearer token is empty".to_string(),
        ));
    }

    Ok(())
}
