use std::fmt;
use std::time::Duration;

use crate::runtime::KILL_SIGNAL;

/// Grace period requested from the runtime when stopping a container.
pub const STOP_GRACE: Duration = Duration::from_secs(5);

/// Terminal value of one restart invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    /// The container was offline and came up on the first start.
    AlreadyOfflineStarted,
    /// The container was stopped (gracefully or by kill) and came back up.
    Restarted,
    /// The first start did not take but the single retry did.
    RetrySucceeded,
    /// Still running after the graceful stop.
    ///
    /// Never produced: a container still running after stop always
    /// escalates to a kill. Kept so every terminal case has a name.
    StillRunningAfterStop,
    /// Still running after the kill; no start was attempted.
    StillRunningAfterKill,
    /// Neither start attempt left the container running.
    StartFailedTwice,
    /// The initial inspect failed; nothing was stopped, killed or started.
    InspectFailed,
}

impl RestartOutcome {
    /// Whether the container was confirmed running at the end.
    pub fn is_success(self) -> bool {
        matches!(
            self,
            Self::AlreadyOfflineStarted | Self::Restarted | Self::RetrySucceeded
        )
    }

    /// Text shown to the requester.
    pub fn message(self) -> &'static str {
        match self {
            Self::AlreadyOfflineStarted | Self::Restarted | Self::RetrySucceeded => {
                "Server restarted successfully."
            }
            Self::StillRunningAfterStop | Self::StillRunningAfterKill => {
                "Server is still running. Aborting restart."
            }
            Self::StartFailedTwice | Self::InspectFailed => "Server failed to start.",
        }
    }
}

impl fmt::Display for RestartOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AlreadyOfflineStarted => "already-offline-started",
            Self::Restarted => "restarted",
            Self::RetrySucceeded => "retry-succeeded",
            Self::StillRunningAfterStop => "still-running-after-stop",
            Self::StillRunningAfterKill => "still-running-after-kill",
            Self::StartFailedTwice => "start-failed-twice",
            Self::InspectFailed => "inspect-failed",
        };
        f.write_str(name)
    }
}

/// Progress points reported before the corresponding action executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartMilestone {
    /// Another restart of the same container holds the lock.
    Waiting,
    /// About to request a graceful stop.
    Stopping,
    /// The stop did not take; about to kill.
    Killing,
    /// About to request a start.
    Starting,
    /// The first start did not take; about to retry once.
    Retrying,
}

impl RestartMilestone {
    /// Text shown to the requester.
    pub fn message(self) -> &'static str {
        match self {
            Self::Waiting => "Another restart is in progress. Waiting...",
            Self::Stopping => "Stopping server...",
            Self::Killing => "Failed to stop server. Killing server process...",
            Self::Starting => "Starting server...",
            Self::Retrying => "Failed to start server. Retrying...",
        }
    }
}

/// What the driver must do next.
///
/// Every action except [`RestartAction::Finish`] is followed by a fresh
/// inspect whose result is the input of the next transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartAction {
    /// Only observe.
    Inspect,
    /// Request a graceful stop.
    Stop { grace: Duration },
    /// Request a forceful termination.
    Kill { signal: &'static str },
    /// Request the first start.
    Start,
    /// Request the single retry start.
    RetryStart,
    /// Stop driving; report the outcome.
    Finish(RestartOutcome),
}

impl RestartAction {
    /// Milestone to report before executing this action, if any.
    pub fn milestone(&self) -> Option<RestartMilestone> {
        match self {
            Self::Stop { .. } => Some(RestartMilestone::Stopping),
            Self::Kill { .. } => Some(RestartMilestone::Killing),
            Self::Start => Some(RestartMilestone::Starting),
            Self::RetryStart => Some(RestartMilestone::Retrying),
            Self::Inspect | Self::Finish(_) => None,
        }
    }
}

/// Escalation state of one restart.
///
/// Each non-idle, non-terminal state names the observation it is waiting
/// for: the state reached after an action is "verifying" that action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartState {
    /// Nothing observed yet.
    Idle,
    /// Waiting for the initial inspect.
    CheckingRunning,
    /// Waiting for the inspect after the graceful stop.
    VerifyingAfterStop,
    /// Waiting for the inspect after the kill.
    VerifyingAfterKill,
    /// Waiting for the inspect after the first start.
    VerifyingAfterStart { from_offline: bool },
    /// Waiting for the inspect after the retry start.
    VerifyingAfterRetry { from_offline: bool },
    /// Done.
    Terminal(RestartOutcome),
}

impl RestartState {
    /// Advance given the last successfully observed running state.
    ///
    /// `observed` is `None` until an inspect has succeeded. Without an
    /// observation the machine finishes with [`RestartOutcome::InspectFailed`]
    /// and never requests a stop, kill or start. The input is ignored in
    /// [`RestartState::Idle`] and terminal states.
    pub fn transition(self, observed: Option<bool>) -> (RestartState, RestartAction) {
        match (self, observed) {
            (Self::Idle, _) => (Self::CheckingRunning, RestartAction::Inspect),
            (Self::Terminal(outcome), _) => Self::finish(outcome),
            (_, None) => Self::finish(RestartOutcome::InspectFailed),

            (Self::CheckingRunning, Some(true)) => (
                Self::VerifyingAfterStop,
                RestartAction::Stop { grace: STOP_GRACE },
            ),
            (Self::CheckingRunning, Some(false)) => (
                Self::VerifyingAfterStart { from_offline: true },
                RestartAction::Start,
            ),

            (Self::VerifyingAfterStop, Some(true)) => (
                Self::VerifyingAfterKill,
                RestartAction::Kill {
                    signal: KILL_SIGNAL,
                },
            ),
            (Self::VerifyingAfterStop | Self::VerifyingAfterKill, Some(false)) => (
                Self::VerifyingAfterStart {
                    from_offline: false,
                },
                RestartAction::Start,
            ),

            (Self::VerifyingAfterKill, Some(true)) => {
                Self::finish(RestartOutcome::StillRunningAfterKill)
            }

            (Self::VerifyingAfterStart { from_offline }, Some(true)) => {
                Self::finish(if from_offline {
                    RestartOutcome::AlreadyOfflineStarted
                } else {
                    RestartOutcome::Restarted
                })
            }
            (Self::VerifyingAfterStart { from_offline }, Some(false)) => (
                Self::VerifyingAfterRetry { from_offline },
                RestartAction::RetryStart,
            ),

            (Self::VerifyingAfterRetry { .. }, Some(true)) => {
                Self::finish(RestartOutcome::RetrySucceeded)
            }
            (Self::VerifyingAfterRetry { .. }, Some(false)) => {
                Self::finish(RestartOutcome::StartFailedTwice)
            }
        }
    }

    fn finish(outcome: RestartOutcome) -> (RestartState, RestartAction) {
        (Self::Terminal(outcome), RestartAction::Finish(outcome))
    }

    /// Whether the machine has reached an outcome.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run the machine against a scripted list of observations.
    fn run(observations: &[bool]) -> (Vec<RestartAction>, RestartOutcome) {
        let mut state = RestartState::Idle;
        let mut observed = None;
        let mut script = observations.iter().copied();
        let mut actions = Vec::new();

        loop {
            let (next, action) = state.transition(observed);
            if let RestartAction::Finish(outcome) = action {
                return (actions, outcome);
            }
            actions.push(action);
            observed = Some(script.next().expect("script ran out of observations"));
            state = next;
        }
    }

    #[test]
    fn test_idle_inspects_first() {
        let (next, action) = RestartState::Idle.transition(None);
        assert_eq!(next, RestartState::CheckingRunning);
        assert_eq!(action, RestartAction::Inspect);
    }

    #[test]
    fn test_offline_container_skips_stop_and_kill() {
        let (actions, outcome) = run(&[false, true]);
        assert_eq!(actions, vec![RestartAction::Inspect, RestartAction::Start]);
        assert_eq!(outcome, RestartOutcome::AlreadyOfflineStarted);
    }

    #[test]
    fn test_graceful_stop_then_start() {
        let (actions, outcome) = run(&[true, false, true]);
        assert_eq!(
            actions,
            vec![
                RestartAction::Inspect,
                RestartAction::Stop { grace: STOP_GRACE },
                RestartAction::Start,
            ]
        );
        assert_eq!(outcome, RestartOutcome::Restarted);
    }

    #[test]
    fn test_stop_failure_escalates_to_kill() {
        let (actions, outcome) = run(&[true, true, false, true]);
        assert_eq!(
            actions[2],
            RestartAction::Kill {
                signal: KILL_SIGNAL
            }
        );
        assert_eq!(actions[3], RestartAction::Start);
        assert_eq!(outcome, RestartOutcome::Restarted);
    }

    /// Fail-closed policy: a container the runtime still reports as running
    /// after a kill is never started.
    #[test]
    fn test_still_running_after_kill_aborts_without_start() {
        let (actions, outcome) = run(&[true, true, true]);
        assert!(!actions.contains(&RestartAction::Start));
        assert!(!actions.contains(&RestartAction::RetryStart));
        assert_eq!(outcome, RestartOutcome::StillRunningAfterKill);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_single_retry_after_failed_start() {
        let (actions, outcome) = run(&[true, false, false, true]);
        assert_eq!(
            actions[2..],
            [RestartAction::Start, RestartAction::RetryStart]
        );
        assert_eq!(outcome, RestartOutcome::RetrySucceeded);
        assert!(outcome.is_success());
    }

    #[test]
    fn test_two_failed_starts_are_final() {
        let (actions, outcome) = run(&[false, false, false]);
        assert_eq!(
            actions,
            vec![
                RestartAction::Inspect,
                RestartAction::Start,
                RestartAction::RetryStart,
            ]
        );
        assert_eq!(outcome, RestartOutcome::StartFailedTwice);
    }

    #[test]
    fn test_stop_path_never_ends_still_running_after_stop() {
        for script in [
            &[true, true, true][..],
            &[true, true, false, true][..],
            &[true, false, false, false][..],
        ] {
            let (_, outcome) = run(script);
            assert_ne!(outcome, RestartOutcome::StillRunningAfterStop);
        }
    }

    #[test]
    fn test_unobserved_container_is_never_touched() {
        let (next, action) = RestartState::CheckingRunning.transition(None);
        assert_eq!(next, RestartState::Terminal(RestartOutcome::InspectFailed));
        assert_eq!(action, RestartAction::Finish(RestartOutcome::InspectFailed));
        assert_eq!(action.milestone(), None);
        assert!(!RestartOutcome::InspectFailed.is_success());
    }

    #[test]
    fn test_terminal_state_is_stable() {
        let state = RestartState::Terminal(RestartOutcome::Restarted);
        let (next, action) = state.transition(None);
        assert!(next.is_terminal());
        assert_eq!(action, RestartAction::Finish(RestartOutcome::Restarted));
    }

    #[test]
    fn test_milestones_precede_actions() {
        assert_eq!(
            RestartAction::Stop { grace: STOP_GRACE }.milestone(),
            Some(RestartMilestone::Stopping)
        );
        assert_eq!(RestartAction::Inspect.milestone(), None);
        assert_eq!(
            RestartAction::RetryStart.milestone(),
            Some(RestartMilestone::Retrying)
        );
    }
}
