//! Wait outcome: the single terminal result of waiting on a handle.
//!
//! This module is deliberately free of polling mechanics: it only defines the
//! "shape" of results a command handler can receive and how those map to
//! operator-facing text and process exit codes.

use std::time::Duration;

/// Terminal result of one wait on a notification handle.
///
/// Exactly one of these is produced per wait; the waiter never retries after
/// returning and never exposes intermediate states to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Backend reported the task completed.
    Success,

    /// Backend explicitly reported failure; the reason is surfaced verbatim.
    Failure(String),

    /// Overall wait budget exhausted without a terminal remote status.
    /// The true outcome is unknown — the task may still finish server-side.
    Timeout { elapsed: Duration },

    /// Submit failed outright, or consecutive inconclusive polls exceeded the
    /// configured ceiling.
    TransportError(String),

    /// Operator interrupt during the wait. The submitted mutation is NOT
    /// rolled back; it keeps running server-side.
    Cancelled,
}

impl WaitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WaitOutcome::Success)
    }

    /// Process exit code for this outcome.
    ///
    /// Distinct codes per variant so scripts can tell "failed" from "outcome
    /// unknown". 130 matches the shell convention for SIGINT.
    pub fn exit_code(&self) -> i32 {
        match self {
            WaitOutcome::Success => 0,
            WaitOutcome::Failure(_) => 1,
            WaitOutcome::Timeout { .. } => 2,
            WaitOutcome::TransportError(_) => 3,
            WaitOutcome::Cancelled => 130,
        }
    }

    /// One-line operator report. Timeout wording is intentionally different
    /// from failure wording: on timeout the operation may still complete.
    pub fn report(&self) -> String {
        match self {
            WaitOutcome::Success => "Task completed.".to_string(),
            WaitOutcome::Failure(reason) => format!("Task failed: {reason}"),
            WaitOutcome::Timeout { elapsed } => format!(
                "Timed out after {}s; the operation may still be completing \
                 server-side. Check its status manually.",
                elapsed.as_secs()
            ),
            WaitOutcome::TransportError(cause) => {
                format!("Could not reach the control plane: {cause}")
            }
            WaitOutcome::Cancelled => {
                "Cancelled. The submitted operation keeps running server-side.".to_string()
            }
        }
    }
}
