/// Error handling module for Skipper.
///
/// This module defines the error types used throughout the crate. Only the
/// operational log ever sees these; chat users are shown plain progress text.
///
/// # Example
///
/// ```
/// use skipper::error::{Error, Result};
///
/// fn describe(result: Result<()>) -> String {
///     match result {
///         Ok(_) => "ok".to_string(),
///         Err(Error::ContainerNotFound(name)) => format!("no container named '{}'", name),
///         Err(Error::RuntimeUnavailable(msg)) => format!("runtime unreachable: {}", msg),
///         Err(e) => format!("other error: {}", e),
///     }
/// }
/// ```
use thiserror::Error;

/// Errors that can occur in Skipper.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or parse the configuration file.
    ///
    /// This error occurs when:
    /// - The configuration file cannot be read
    /// - The JSON is malformed
    /// - Required fields are missing or have the wrong type
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration parsed but contains unusable values.
    ///
    /// This error occurs when:
    /// - The chat credential or runtime endpoint is empty
    /// - No servers are configured
    /// - A server entry has an empty name or container
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// A required environment variable is not set.
    #[error("Environment variable {0} is not set")]
    MissingEnvironment(String),

    /// The container runtime endpoint could not be reached.
    ///
    /// This error occurs when:
    /// - The socket or HTTP endpoint refuses the connection
    /// - The request times out
    /// - The endpoint URL uses an unsupported scheme
    #[error("Container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    /// The runtime does not know the requested container.
    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    /// The runtime answered with an error other than "not found".
    #[error("Container runtime error: {0}")]
    Runtime(String),

    /// Error while talking to the chat platform or a gateway client.
    ///
    /// This error occurs when:
    /// - A response or edit cannot be delivered
    /// - The platform rejects a command registration
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Unauthorized access to the gateway.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Error in serializing or deserializing data.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Any other error not covered by the above categories.
    #[error("Other error: {0}")]
    Other(String),
}

/// Result type for Skipper operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
