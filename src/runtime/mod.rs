//! Container runtime capability surface.
//!
//! The lifecycle controller only talks to containers through the
//! [`ContainerRuntime`] trait. Every call is a single network round trip that
//! may fail; mutating calls (`stop`, `kill`, `start`) only *request* a state
//! change and never confirm it. Callers verify with a fresh [`inspect`].
//!
//! [`DockerRuntime`] is the production implementation. Tests substitute a
//! mock of the trait.
//!
//! [`inspect`]: ContainerRuntime::inspect

mod docker;

pub use docker::{DEFAULT_TIMEOUT_SECS, DockerRuntime};

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Signal used when a graceful stop did not take effect.
pub const KILL_SIGNAL: &str = "SIGKILL";

/// Result of one inspect call.
///
/// Always freshly fetched and discarded after the decision it feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerObservation {
    /// Live container id as reported by the runtime
    pub id: String,
    /// Whether the runtime reports the container as running
    pub running: bool,
}

impl ContainerObservation {
    /// Create an observation
    pub fn new(id: impl Into<String>, running: bool) -> Self {
        Self {
            id: id.into(),
            running,
        }
    }
}

/// Buffered output of a container.
///
/// A stream that is absent or contains only whitespace counts as empty.
///
/// # Examples
///
/// ```
/// use skipper::runtime::LogBundle;
///
/// let logs = LogBundle::new(None, Some("  \n".to_string()));
/// assert!(logs.is_empty());
///
/// let logs = LogBundle::new(None, Some("panic!".to_string()));
/// assert_eq!(logs.stderr(), Some("panic!"));
/// assert_eq!(logs.stdout(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBundle {
    stdout: Option<String>,
    stderr: Option<String>,
}

fn non_blank(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.trim().is_empty())
}

impl LogBundle {
    /// Create a bundle from raw stream contents
    pub fn new(stdout: Option<String>, stderr: Option<String>) -> Self {
        Self { stdout, stderr }
    }

    /// Standard output, if non-blank
    pub fn stdout(&self) -> Option<&str> {
        non_blank(&self.stdout)
    }

    /// Standard error, if non-blank
    pub fn stderr(&self) -> Option<&str> {
        non_blank(&self.stderr)
    }

    /// True when neither stream has content
    pub fn is_empty(&self) -> bool {
        self.stdout().is_none() && self.stderr().is_none()
    }
}

/// Operations the controller needs from a container runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Fetch the current state of a container.
    ///
    /// Fails with [`Error::RuntimeUnavailable`] when the endpoint cannot be
    /// reached and [`Error::ContainerNotFound`] when the runtime does not
    /// know the container.
    ///
    /// [`Error::RuntimeUnavailable`]: crate::error::Error::RuntimeUnavailable
    /// [`Error::ContainerNotFound`]: crate::error::Error::ContainerNotFound
    async fn inspect(&self, container: &str) -> Result<ContainerObservation>;

    /// Request a graceful stop, giving the process `grace` before the runtime
    /// escalates on its own.
    async fn stop(&self, container: &str, grace: Duration) -> Result<()>;

    /// Request a forceful termination with `signal`.
    async fn kill(&self, container: &str, signal: &str) -> Result<()>;

    /// Request a start.
    async fn start(&self, container: &str) -> Result<()>;

    /// Fetch the complete buffered stdout and stderr.
    async fn fetch_logs(&self, container: &str) -> Result<LogBundle>;
}
