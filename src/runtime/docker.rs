// src/runtime/docker.rs
use crate::error::{Error, Result};
use crate::runtime::{ContainerObservation, ContainerRuntime, LogBundle};
use async_trait::async_trait;
use bollard::container::LogOutput;
use bollard::errors::Error as BollardError;
use bollard::query_parameters::{
    InspectContainerOptions, KillContainerOptionsBuilder, LogsOptionsBuilder,
    StartContainerOptions, StopContainerOptionsBuilder,
};
use bollard::{API_DEFAULT_VERSION, Docker};
use futures::TryStreamExt;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Transport timeout applied to every Docker Engine API call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// [`ContainerRuntime`] backed by the Docker Engine API.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
    endpoint: String,
}

impl DockerRuntime {
    /// Create a client for `endpoint`.
    ///
    /// Supported schemes are `unix://` (local socket) and `tcp://` or
    /// `http://` (plain HTTP). No connection is made until the first call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuntimeUnavailable`] for unsupported schemes or when
    /// the client cannot be constructed.
    pub fn connect(endpoint: &str) -> Result<Self> {
        let docker = if endpoint.starts_with("unix://") {
            Docker::connect_with_socket(endpoint, DEFAULT_TIMEOUT_SECS, API_DEFAULT_VERSION)
        } else if endpoint.starts_with("tcp://") || endpoint.starts_with("http://") {
            Docker::connect_with_http(endpoint, DEFAULT_TIMEOUT_SECS, API_DEFAULT_VERSION)
        } else {
            return Err(Error::RuntimeUnavailable(format!(
                "Unsupported Docker endpoint scheme: {}",
                endpoint
            )));
        }
        .map_err(|e| {
            Error::RuntimeUnavailable(format!("Failed to create Docker client for {}: {}", endpoint, e))
        })?;

        info!(endpoint = %endpoint, "Docker client configured");

        Ok(Self {
            docker,
            endpoint: endpoint.to_string(),
        })
    }

    /// The configured endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Classify a bollard error for the controller's logs.
fn runtime_error(operation: &'static str, container: &str, source: BollardError) -> Error {
    match source {
        BollardError::DockerResponseServerError {
            status_code: 404, ..
        } => Error::ContainerNotFound(container.to_string()),
        BollardError::DockerResponseServerError {
            status_code,
            message,
        } => Error::Runtime(format!(
            "{} '{}' failed with status {}: {}",
            operation, container, status_code, message
        )),
        other => Error::RuntimeUnavailable(format!("{} '{}': {}", operation, container, other)),
    }
}

fn into_text(buffer: Vec<u8>) -> Option<String> {
    if buffer.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    #[instrument(skip(self))]
    async fn inspect(&self, container: &str) -> Result<ContainerObservation> {
        let info = self
            .docker
            .inspect_container(container, None::<InspectContainerOptions>)
            .await
            .map_err(|e| runtime_error("inspect", container, e))?;

        let running = info.state.and_then(|s| s.running).unwrap_or(false);
        let id = info.id.unwrap_or_else(|| container.to_string());

        debug!(container_id = %id, running, "Container inspected");
        Ok(ContainerObservation { id, running })
    }

    #[instrument(skip(self))]
    async fn stop(&self, container: &str, grace: Duration) -> Result<()> {
        let grace_secs = i32::try_from(grace.as_secs()).unwrap_or(i32::MAX);
        let options = StopContainerOptionsBuilder::new().t(grace_secs).build();

        self.docker
            .stop_container(container, Some(options))
            .await
            .map_err(|e| runtime_error("stop", container, e))
    }

    #[instrument(skip(self))]
    async fn kill(&self, container: &str, signal: &str) -> Result<()> {
        let options = KillContainerOptionsBuilder::new().signal(signal).build();

        self.docker
            .kill_container(container, Some(options))
            .await
            .map_err(|e| runtime_error("kill", container, e))
    }

    #[instrument(skip(self))]
    async fn start(&self, container: &str) -> Result<()> {
        self.docker
            .start_container(container, None::<StartContainerOptions>)
            .await
            .map_err(|e| runtime_error("start", container, e))
    }

    #[instrument(skip(self))]
    async fn fetch_logs(&self, container: &str) -> Result<LogBundle> {
        let options = LogsOptionsBuilder::new()
            .stdout(true)
            .stderr(true)
            .follow(false)
            .build();

        let mut stream = self.docker.logs(container, Some(options));
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        while let Some(chunk) = stream
            .try_next()
            .await
            .map_err(|e| runtime_error("logs", container, e))?
        {
            match chunk {
                LogOutput::StdOut { message } | LogOutput::Console { message } => {
                    stdout.extend_from_slice(&message)
                }
                LogOutput::StdErr { message } => stderr.extend_from_slice(&message),
                LogOutput::StdIn { .. } => {}
            }
        }

        debug!(
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "Container logs retrieved"
        );

        Ok(LogBundle::new(into_text(stdout), into_text(stderr)))
    }
}
