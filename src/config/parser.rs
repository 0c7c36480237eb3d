use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// Environment variable holding the path of the configuration file.
pub const CONFIG_PATH_ENV: &str = "SKIPPER_CONFIG_FILE_PATH";

/// Default number of Actix Web workers for the HTTP gateway.
pub const DEFAULT_WORKERS: usize = 4;

/// Default base URL of the chat platform's REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://discord.com/api/v10";

/// A chat-platform identifier (channel, guild, application).
///
/// Platforms send these 64-bit ids as decimal strings to stay safe in
/// JavaScript clients, so both JSON numbers and strings are accepted.
/// Serialization always produces a string.
///
/// # Examples
///
/// ```
/// use skipper::config::Snowflake;
///
/// let from_string: Snowflake = serde_json::from_str("\"1234\"").unwrap();
/// let from_number: Snowflake = serde_json::from_str("1234").unwrap();
/// assert_eq!(from_string, from_number);
/// assert_eq!(from_string.get(), 1234);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Snowflake(u64);

/// Identifier of the channel a command was invoked from.
pub type ChannelId = Snowflake;

/// Identifier of the guild (workspace) the bot is registered against.
pub type GuildId = Snowflake;

impl Snowflake {
    /// Wrap a raw id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for Snowflake {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Snowflake {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| Error::Serialization(format!("Invalid id '{}': {}", s, e)))
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(Self(id)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// One managed server: a logical name bound to a container and the chat
/// channel its commands are issued from.
///
/// Mappings are immutable after the configuration is loaded.
///
/// # Examples
///
/// ```
/// use skipper::config::{ServerMapping, Snowflake};
///
/// let mapping = ServerMapping {
///     name: "Valheim".to_string(),
///     container: "valheim-server".to_string(),
///     channel_id: Snowflake::new(42),
/// };
/// assert_eq!(mapping.channel_id.get(), 42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMapping {
    /// Display name used in replies.
    pub name: String,

    /// Container name or id understood by the container runtime.
    pub container: String,

    /// Channel whose commands target this server.
    pub channel_id: ChannelId,
}

/// Bearer token authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerAuthConfig {
    /// Token clients must present as `Authorization: Bearer <token>`.
    pub token: String,
}

/// Authentication settings for the HTTP gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Bearer token authentication, if enabled.
    pub bearer: Option<BearerAuthConfig>,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Settings for the HTTP interaction gateway.
///
/// # Examples
///
/// ```
/// use skipper::config::GatewayConfig;
///
/// let gateway: GatewayConfig = serde_json::from_str("{}").unwrap();
/// assert_eq!(gateway.address, "127.0.0.1");
/// assert_eq!(gateway.port, 8080);
/// assert!(gateway.authenticate.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Address to bind.
    #[serde(default = "default_address")]
    pub address: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of Actix Web workers; defaults to [`DEFAULT_WORKERS`].
    #[serde(default)]
    pub workers: Option<usize>,

    /// Optional authentication for incoming interactions.
    #[serde(default)]
    pub authenticate: Option<AuthConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            workers: None,
            authenticate: None,
        }
    }
}

/// Main configuration for Skipper.
///
/// The configuration is loaded once at startup and passed by reference into
/// the registry, the runtime client and the gateway. Nothing reads it through
/// a global.
///
/// # JSON Schema
///
/// ```json
/// {
///   "discordToken": "bot-token",
///   "dockerEndpoint": "unix:///var/run/docker.sock",
///   "guildId": "123456789012345678",
///   "servers": [
///     { "name": "Valheim", "container": "valheim", "channelId": "223456789012345678" }
///   ],
///   "gateway": { "address": "0.0.0.0", "port": 8080 }
/// }
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Chat-platform bot credential.
    pub discord_token: String,

    /// Container runtime endpoint URL (`unix://`, `tcp://` or `http://`).
    pub docker_endpoint: String,

    /// The single guild the commands are registered against.
    pub guild_id: GuildId,

    /// Managed servers, in lookup order.
    pub servers: Vec<ServerMapping>,

    /// HTTP gateway settings; defaults apply when absent.
    #[serde(default)]
    pub gateway: Option<GatewayConfig>,

    /// Override for the chat platform REST API base URL.
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"<redacted>")
            .field("docker_endpoint", &self.docker_endpoint)
            .field("guild_id", &self.guild_id)
            .field("servers", &self.servers)
            .field("gateway", &self.gateway)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl Config {
    /// Loads a configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The file cannot be read
    /// * The file contents are not valid JSON
    /// * The JSON does not conform to the expected schema
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigParse(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse_from_str(&content)
    }

    /// Loads the configuration from the file named by [`CONFIG_PATH_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEnvironment`] if the variable is unset or empty,
    /// otherwise the errors of [`Config::from_file`].
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path),
            _ => Err(Error::MissingEnvironment(CONFIG_PATH_ENV.to_string())),
        }
    }

    /// Parses a configuration from a JSON string.
    pub fn parse_from_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::ConfigParse(format!("Failed to parse JSON config: {}", e)))
    }

    /// Gateway settings, falling back to defaults.
    pub fn gateway(&self) -> GatewayConfig {
        self.gateway.clone().unwrap_or_default()
    }

    /// Chat platform REST API base URL without a trailing slash.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config_str = r#"{
            "discordToken": "token",
            "dockerEndpoint": "unix:///var/run/docker.sock",
            "guildId": 1,
            "servers": [
                { "name": "Valheim", "container": "valheim", "channelId": "1244251924262551573" }
            ]
        }"#;

        let config = Config::parse_from_str(config_str).unwrap();

        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.servers[0].channel_id.get(), 1244251924262551573);
        assert!(config.gateway.is_none());
        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config {
            discord_token: "super-secret".to_string(),
            docker_endpoint: "tcp://localhost:2375".to_string(),
            guild_id: Snowflake::new(1),
            servers: vec![],
            gateway: None,
            api_base_url: Some("http://localhost:9000/".to_string()),
        };

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert_eq!(config.api_base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_snowflake_rejects_garbage() {
        let parsed: std::result::Result<Snowflake, _> = serde_json::from_str("\"abc\"");
        assert!(parsed.is_err());
    }
}
