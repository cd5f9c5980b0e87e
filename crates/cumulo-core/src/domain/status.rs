//! Task status: the classification of one poll response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Remote task status as reported by one status poll.
///
/// State transitions (as observed, the control plane owns the machine):
/// - Pending -> InProgress -> Completed
/// - Pending -> InProgress -> Failed
/// - any poll may yield Unknown (transport hiccup, malformed payload)
///
/// Design note: Using an enum ensures exhaustive matching in the waiter loop;
/// there is no "other" escape hatch that could silently terminate a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Accepted by the backend, not started yet.
    Pending,

    /// Backend is actively working on the task.
    InProgress,

    /// Terminal: the task finished successfully.
    Completed,

    /// Terminal: the backend reports the task failed.
    Failed,

    /// Transient/ambiguous: transport error, per-request timeout, or a
    /// payload we could not interpret. Never terminal on its own.
    Unknown,
}

impl TaskStatus {
    /// Is this a terminal status (unconditionally ends the wait)?
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// The result of one poll: status plus whatever context came with it.
///
/// `message` carries the backend's reason on `Failed` and the degradation
/// cause on `Unknown`. `observed_at` is the raw response timestamp and is
/// used by the waiter to spot stale/duplicate responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollReport {
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

impl PollReport {
    pub fn new(status: TaskStatus) -> Self {
        Self {
            status,
            message: None,
            observed_at: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_observed_at(mut self, at: DateTime<Utc>) -> Self {
        self.observed_at = Some(at);
        self
    }

    /// Convenience for the degraded path: unknown status with a cause.
    pub fn unknown(cause: impl Into<String>) -> Self {
        Self::new(TaskStatus::Unknown).with_message(cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());

        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(!TaskStatus::Unknown.is_terminal());
    }

    #[test]
    fn status_serializes_kebab_case() {
        let s = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(s, "\"in-progress\"");

        let back: TaskStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(back, TaskStatus::Completed);
    }

    #[test]
    fn unknown_report_carries_cause() {
        let report = PollReport::unknown("transport: connection refused");
        assert_eq!(report.status, TaskStatus::Unknown);
        assert_eq!(
            report.message.as_deref(),
            Some("transport: connection refused")
        );
    }
}
