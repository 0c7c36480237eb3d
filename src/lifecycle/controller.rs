use crate::config::{ChannelId, ServerMapping};
use crate::error::Result;
use crate::lifecycle::locks::{ContainerLocks, LockAttempt};
use crate::lifecycle::machine::{RestartAction, RestartMilestone, RestartOutcome, RestartState};
use crate::registry::ServerRegistry;
use crate::runtime::{ContainerRuntime, LogBundle};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Receives restart milestones as they are reached.
///
/// Implementations forward them to the requester; delivery failures are
/// theirs to log, the restart continues regardless.
#[async_trait]
pub trait RestartProgress: Send + Sync {
    /// Called before the action belonging to `milestone` executes.
    async fn report(&self, milestone: RestartMilestone);
}

/// Result of a status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Server display name
    pub name: String,
    /// Whether the container was observed running
    pub online: bool,
}

/// Result of a log query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsReport {
    /// Server display name
    pub name: String,
    /// Buffered container output; empty when nothing could be fetched
    pub logs: LogBundle,
}

/// Status, logs and supervised restart for the servers in a registry.
///
/// Every operation starts by resolving the invoking channel. An unbound
/// channel yields `None` without touching the runtime.
pub struct ServerLifecycleController {
    registry: Arc<ServerRegistry>,
    runtime: Arc<dyn ContainerRuntime>,
    locks: ContainerLocks,
}

impl ServerLifecycleController {
    /// Create a controller over `registry` using `runtime` for container calls
    pub fn new(registry: Arc<ServerRegistry>, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self {
            registry,
            runtime,
            locks: ContainerLocks::new(),
        }
    }

    /// The registry used for channel lookups
    pub fn registry(&self) -> &ServerRegistry {
        &self.registry
    }

    fn resolve(&self, channel_id: ChannelId) -> Option<&ServerMapping> {
        let server = self.registry.resolve(channel_id);
        if server.is_none() {
            debug!("No server is bound to this channel");
        }
        server
    }

    /// Report whether the channel's server is running.
    ///
    /// A failed inspect is logged and reported as offline.
    #[instrument(skip(self), fields(channel_id = %channel_id))]
    pub async fn get_status(&self, channel_id: ChannelId) -> Option<StatusReport> {
        let server = self.resolve(channel_id)?;

        let online = match self.runtime.inspect(&server.container).await {
            Ok(observation) => observation.running,
            Err(e) => {
                warn!(container = %server.container, error = %e, "Inspect failed; reporting offline");
                false
            }
        };

        info!(server = %server.name, online, "Status resolved");
        Some(StatusReport {
            name: server.name.clone(),
            online,
        })
    }

    /// Fetch the buffered logs of the channel's server.
    ///
    /// The container is inspected first to address it by its live id. Any
    /// runtime failure is logged and yields an empty bundle.
    #[instrument(skip(self), fields(channel_id = %channel_id))]
    pub async fn get_logs(&self, channel_id: ChannelId) -> Option<LogsReport> {
        let server = self.resolve(channel_id)?;

        let logs = match self.fetch_logs(&server.container).await {
            Ok(logs) => logs,
            Err(e) => {
                warn!(container = %server.container, error = %e, "Failed to fetch logs");
                LogBundle::default()
            }
        };

        Some(LogsReport {
            name: server.name.clone(),
            logs,
        })
    }

    async fn fetch_logs(&self, container: &str) -> Result<LogBundle> {
        let observation = self.runtime.inspect(container).await?;
        self.runtime.fetch_logs(&observation.id).await
    }

    /// Restart the channel's server through the escalation machine.
    ///
    /// Restarts of the same container are serialised; a caller that has to
    /// queue is told so with [`RestartMilestone::Waiting`].
    #[instrument(skip(self, progress), fields(channel_id = %channel_id))]
    pub async fn restart(
        &self,
        channel_id: ChannelId,
        progress: &dyn RestartProgress,
    ) -> Option<RestartOutcome> {
        let server = self.resolve(channel_id)?;

        let _guard = match self.locks.try_acquire(&server.container) {
            LockAttempt::Acquired(guard) => guard,
            LockAttempt::Contended(lock) => {
                info!(container = %server.container, "Restart already in flight; queueing");
                progress.report(RestartMilestone::Waiting).await;
                lock.lock_owned().await
            }
        };

        let outcome = self.drive_restart(server, progress).await;
        info!(
            server = %server.name,
            outcome = %outcome,
            success = outcome.is_success(),
            "Restart finished"
        );
        Some(outcome)
    }

    async fn drive_restart(
        &self,
        server: &ServerMapping,
        progress: &dyn RestartProgress,
    ) -> RestartOutcome {
        // Mutating calls address the live id once an inspect has returned it.
        let mut target = server.container.clone();
        let mut observed = None;
        let mut state = RestartState::Idle;

        loop {
            let (next, action) = state.transition(observed);
            debug!(from = ?state, to = ?next, action = ?action, "Restart transition");

            if let Some(milestone) = action.milestone() {
                progress.report(milestone).await;
            }

            match action {
                RestartAction::Finish(outcome) => return outcome,
                RestartAction::Inspect => {}
                RestartAction::Stop { grace } => {
                    log_request("stop", &target, self.runtime.stop(&target, grace).await)
                }
                RestartAction::Kill { signal } => {
                    log_request("kill", &target, self.runtime.kill(&target, signal).await)
                }
                RestartAction::Start | RestartAction::RetryStart => {
                    log_request("start", &target, self.runtime.start(&target).await)
                }
            }

            observed = self.verify(&server.container, &mut target, observed).await;
            state = next;
        }
    }

    /// Observe the container again, keeping the last observed state on failure.
    async fn verify(
        &self,
        container: &str,
        target: &mut String,
        last_observed: Option<bool>,
    ) -> Option<bool> {
        match self.runtime.inspect(container).await {
            Ok(observation) => {
                *target = observation.id;
                Some(observation.running)
            }
            Err(e) => {
                warn!(
                    container = %container,
                    error = %e,
                    last_observed = ?last_observed,
                    "Inspect failed; keeping last observed state"
                );
                last_observed
            }
        }
    }
}

fn log_request(operation: &'static str, target: &str, result: Result<()>) {
    match result {
        Ok(()) => debug!(operation, container = %target, "Request accepted"),
        Err(e) => warn!(
            operation,
            container = %target,
            error = %e,
            "Request failed; verifying state anyway"
        ),
    }
}
