//! Waiting engine: poller, backoff policy, and the task waiter that drives
//! them to a terminal [`WaitOutcome`](crate::domain::WaitOutcome).

mod backoff;
mod poller;
mod waiter;

pub use backoff::BackoffPolicy;
pub use poller::StatusPoller;
pub use waiter::{TaskWaiter, WaitConfig};

use async_trait::async_trait;

use crate::domain::{NotificationId, PollReport};

/// One status check, classified.
///
/// The seam between the waiter's state machine and the transport: production
/// code uses [`StatusPoller`] over a [`CloudApi`](crate::ports::CloudApi),
/// tests substitute a scripted implementation so the state machine runs
/// without any network.
#[async_trait]
pub trait Poller: Send + Sync {
    async fn poll_once(&self, id: &NotificationId) -> PollReport;
}
