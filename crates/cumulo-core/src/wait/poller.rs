//! Status poller: one status check, classified into a [`PollReport`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{NotificationId, PollReport, TaskStatus};
use crate::ports::CloudApi;

/// Shape we expect the raw notification payload to have.
///
/// Anything that doesn't deserialize into this is treated as ambiguous, not
/// as failure; the control plane owns the vocabulary and we stay permissive.
#[derive(Debug, Deserialize)]
struct RawNotification {
    status: String,

    #[serde(default)]
    message: Option<String>,

    /// Response timestamp (`completed_at` in some API revisions).
    #[serde(default, alias = "completed_at")]
    updated_at: Option<DateTime<Utc>>,
}

/// Performs one status check against a notification and classifies the
/// response.
///
/// Stateless across calls: every invariant about attempt counts and elapsed
/// time lives in the [`TaskWaiter`](crate::wait::TaskWaiter), which makes this
/// component trivially substitutable with a scripted fake in tests.
pub struct StatusPoller {
    api: Arc<dyn CloudApi>,

    /// Budget for a single status request, distinct from the overall wait
    /// timeout.
    request_timeout: Duration,
}

impl StatusPoller {
    pub fn new(api: Arc<dyn CloudApi>, request_timeout: Duration) -> Self {
        Self {
            api,
            request_timeout,
        }
    }
}

#[async_trait::async_trait]
impl crate::wait::Poller for StatusPoller {
    /// Issue one status request and classify the result.
    ///
    /// Never returns an error: transport failures, per-request timeouts and
    /// malformed payloads all degrade to `Unknown` with the cause attached.
    /// The backend task may well still be progressing server-side.
    async fn poll_once(&self, id: &NotificationId) -> PollReport {
        let response =
            tokio::time::timeout(self.request_timeout, self.api.poll_notification(id)).await;

        match response {
            Err(_elapsed) => PollReport::unknown("request timeout"),
            Ok(Err(err)) => PollReport::unknown(err.cause_label()),
            Ok(Ok(payload)) => classify(&payload),
        }
    }
}

/// Map a raw payload onto the status vocabulary.
///
/// Status strings are matched case-insensitively; both `in-progress` and
/// `in_progress` spellings are accepted. Unrecognized strings classify as
/// `Unknown` so a vocabulary extension on the platform side degrades to
/// "keep polling" instead of a wrong terminal outcome.
fn classify(payload: &Value) -> PollReport {
    let raw: RawNotification = match serde_json::from_value(payload.clone()) {
        Ok(raw) => raw,
        Err(err) => return PollReport::unknown(format!("malformed payload: {err}")),
    };

    let status = match raw.status.to_ascii_lowercase().as_str() {
        "pending" => TaskStatus::Pending,
        "in-progress" | "in_progress" => TaskStatus::InProgress,
        "completed" => TaskStatus::Completed,
        "failed" => TaskStatus::Failed,
        other => {
            return PollReport::unknown(format!("unrecognized status \"{other}\""));
        }
    };

    let mut report = PollReport::new(status);
    report.message = raw.message;
    report.observed_at = raw.updated_at;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::domain::{ApiError, Application, Database, Environment, NotificationHandle, Tag};
    use crate::wait::Poller;

    /// Minimal CloudApi that only answers polls, from a fixed response.
    struct OnePollApi {
        response: Result<Value, ApiError>,
    }

    #[async_trait]
    impl CloudApi for OnePollApi {
        async fn list_applications(&self) -> Result<Vec<Application>, ApiError> {
            unimplemented!("not used by poller tests")
        }
        async fn list_environments(&self, _app: &str) -> Result<Vec<Environment>, ApiError> {
            unimplemented!("not used by poller tests")
        }
        async fn list_databases(&self, _app: &str) -> Result<Vec<Database>, ApiError> {
            unimplemented!("not used by poller tests")
        }
        async fn list_tags(&self, _app: &str) -> Result<Vec<Tag>, ApiError> {
            unimplemented!("not used by poller tests")
        }
        async fn create_tag(
            &self,
            _app: &str,
            _name: &str,
            _color: &str,
        ) -> Result<NotificationHandle, ApiError> {
            unimplemented!("not used by poller tests")
        }
        async fn delete_tag(
            &self,
            _app: &str,
            _name: &str,
        ) -> Result<NotificationHandle, ApiError> {
            unimplemented!("not used by poller tests")
        }
        async fn poll_notification(&self, _id: &NotificationId) -> Result<Value, ApiError> {
            match &self.response {
                Ok(v) => Ok(v.clone()),
                Err(ApiError::Transport(msg)) => Err(ApiError::Transport(msg.clone())),
                Err(ApiError::Timeout) => Err(ApiError::Timeout),
                Err(ApiError::Malformed(msg)) => Err(ApiError::Malformed(msg.clone())),
                Err(ApiError::NotFound(msg)) => Err(ApiError::NotFound(msg.clone())),
            }
        }
    }

    fn poller(response: Result<Value, ApiError>) -> StatusPoller {
        StatusPoller::new(Arc::new(OnePollApi { response }), Duration::from_secs(30))
    }

    #[tokio::test]
    async fn classifies_known_statuses() {
        for (raw, expected) in [
            ("pending", TaskStatus::Pending),
            ("in-progress", TaskStatus::InProgress),
            ("in_progress", TaskStatus::InProgress),
            ("COMPLETED", TaskStatus::Completed),
            ("failed", TaskStatus::Failed),
        ] {
            let p = poller(Ok(json!({ "status": raw })));
            let report = p.poll_once(&NotificationId::new("n-1")).await;
            assert_eq!(report.status, expected, "raw status {raw:?}");
        }
    }

    #[tokio::test]
    async fn failed_status_carries_backend_message() {
        let p = poller(Ok(json!({ "status": "failed", "message": "quota exceeded" })));
        let report = p.poll_once(&NotificationId::new("n-1")).await;

        assert_eq!(report.status, TaskStatus::Failed);
        assert_eq!(report.message.as_deref(), Some("quota exceeded"));
    }

    #[tokio::test]
    async fn transport_error_degrades_to_unknown_not_failed() {
        let p = poller(Err(ApiError::Transport("connection refused".into())));
        let report = p.poll_once(&NotificationId::new("n-1")).await;

        assert_eq!(report.status, TaskStatus::Unknown);
        assert!(report.message.as_deref().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn malformed_payload_degrades_to_unknown() {
        let p = poller(Ok(json!({ "statvs": "completed" })));
        let report = p.poll_once(&NotificationId::new("n-1")).await;
        assert_eq!(report.status, TaskStatus::Unknown);
    }

    #[tokio::test]
    async fn unrecognized_status_string_degrades_to_unknown() {
        let p = poller(Ok(json!({ "status": "paused" })));
        let report = p.poll_once(&NotificationId::new("n-1")).await;

        assert_eq!(report.status, TaskStatus::Unknown);
        assert!(report.message.as_deref().unwrap().contains("paused"));
    }

    #[tokio::test]
    async fn response_timestamp_is_parsed() {
        let p = poller(Ok(json!({
            "status": "completed",
            "updated_at": "2026-08-30T12:00:00Z",
        })));
        let report = p.poll_once(&NotificationId::new("n-1")).await;
        assert!(report.observed_at.is_some());
    }
}
