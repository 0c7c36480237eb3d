use crate::gateway::Interaction;
use crate::gateway::commands::{Command, CommandHandler};
use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Runs each command invocation as its own task.
///
/// Failures and panics inside a handler are caught here and logged; they
/// never reach the gateway or take the process down. Invocations of
/// different commands (or the same command twice) run concurrently.
pub struct Dispatcher {
    handler: Arc<CommandHandler>,
    tracker: TaskTracker,
}

impl Dispatcher {
    /// Create a dispatcher for `handler`
    pub fn new(handler: Arc<CommandHandler>) -> Self {
        Self {
            handler,
            tracker: TaskTracker::new(),
        }
    }

    /// Start handling `command` for `interaction`.
    ///
    /// Returns `false` without running anything once [`Dispatcher::shutdown`]
    /// has been called.
    pub fn on_command(&self, command: Command, interaction: Arc<dyn Interaction>) -> bool {
        if self.tracker.is_closed() {
            warn!(command = %command, "Shutting down; rejecting interaction");
            return false;
        }

        let span = info_span!(
            "interaction",
            command = %command,
            channel_id = %interaction.channel_id()
        );
        let handler = Arc::clone(&self.handler);

        let invocation = self.tracker.spawn(
            async move { handler.handle(command, interaction.as_ref()).await }
                .instrument(span.clone()),
        );

        self.tracker.spawn(
            async move {
                match invocation.await {
                    Ok(Ok(())) => debug!("Interaction completed"),
                    Ok(Err(e)) => error!(error = %e, "Interaction failed"),
                    Err(e) if e.is_panic() => error!(error = %e, "Interaction handler panicked"),
                    Err(e) => warn!(error = %e, "Interaction handler was cancelled"),
                }
            }
            .instrument(span),
        );

        true
    }

    /// Number of tasks still running (handlers and their supervisors)
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting interactions and wait for in-flight ones to finish.
    ///
    /// In-flight restarts are never cancelled.
    pub async fn shutdown(&self) {
        self.tracker.close();
        let remaining = self.tracker.len();
        if remaining > 0 {
            info!(tasks = remaining, "Waiting for in-flight interactions");
        }
        self.tracker.wait().await;
    }
}
