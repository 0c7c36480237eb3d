/// Server lifecycle module for Skipper.
///
/// This module implements the three operations offered to chat users:
/// status, logs and supervised restart. All public async operations are
/// instrumented with `tracing` spans.
///
/// # Components
///
/// * `machine` - Restart escalation states and the pure transition function
/// * `controller` - Drives the machine against a container runtime
/// * `locks` - Per-container single-flight locks serialising restarts
///
/// # Examples
///
/// Stepping the restart machine by hand:
///
/// ```
/// use skipper::lifecycle::{RestartAction, RestartOutcome, RestartState};
///
/// let (state, action) = RestartState::Idle.transition(None);
/// assert_eq!(action, RestartAction::Inspect);
///
/// // Offline container: go straight to start.
/// let (state, action) = state.transition(Some(false));
/// assert_eq!(action, RestartAction::Start);
///
/// // Came up.
/// let (_, action) = state.transition(Some(true));
/// assert_eq!(action, RestartAction::Finish(RestartOutcome::AlreadyOfflineStarted));
/// ```
pub mod controller;
pub mod locks;
pub mod machine;

pub use controller::{LogsReport, RestartProgress, ServerLifecycleController, StatusReport};
pub use locks::ContainerLocks;
pub use machine::{RestartAction, RestartMilestone, RestartOutcome, RestartState, STOP_GRACE};
