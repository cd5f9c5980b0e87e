//! Notification handle: the control plane's receipt for an async mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a backend notification/task.
///
/// The control plane assigns this at mutation time; we never inspect its
/// structure, only echo it back on status polls. Kept as a newtype so it
/// cannot be confused with application UUIDs in signatures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A reference to an in-flight backend task, returned by a mutating API call.
///
/// Immutable once created. A handle is owned by the single
/// [`TaskWaiter`](crate::wait::TaskWaiter) run that processes it; there is
/// never more than one poller in flight for the same handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationHandle {
    id: NotificationId,
    submitted_at: DateTime<Utc>,
}

impl NotificationHandle {
    pub fn new(id: NotificationId, submitted_at: DateTime<Utc>) -> Self {
        Self { id, submitted_at }
    }

    pub fn id(&self) -> &NotificationId {
        &self.id
    }

    /// Logical submission time, used for timeout accounting and reporting.
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

impl fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification {}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_id_roundtrips_as_plain_string() {
        let id = NotificationId::new("f3b2a9d0-1111-4222-8333-94444abcde55");
        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s, "\"f3b2a9d0-1111-4222-8333-94444abcde55\"");

        let back: NotificationId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn handle_is_immutable_value() {
        let id = NotificationId::new("n-1");
        let handle = NotificationHandle::new(id.clone(), Utc::now());
        assert_eq!(handle.id(), &id);

        let cloned = handle.clone();
        assert_eq!(cloned, handle);
    }
}
