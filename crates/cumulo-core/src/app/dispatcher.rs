//! Dispatcher: runs one mutate-then-wait command to a terminal outcome.

use std::sync::Arc;

use tokio::sync::watch;

use crate::app::MutatingCommand;
use crate::domain::WaitOutcome;
use crate::ports::CloudApi;
use crate::wait::{BackoffPolicy, StatusPoller, TaskWaiter, WaitConfig};

/// Wires an injected API client to the waiting engine.
///
/// One dispatcher per invocation; the API client and all policy knobs are
/// passed in explicitly at construction (no ambient/global client).
pub struct Dispatcher {
    api: Arc<dyn CloudApi>,
    policy: BackoffPolicy,
    config: WaitConfig,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn CloudApi>, policy: BackoffPolicy, config: WaitConfig) -> Self {
        Self {
            api,
            policy,
            config,
        }
    }

    pub fn api(&self) -> &Arc<dyn CloudApi> {
        &self.api
    }

    /// Submit the mutation, then block on its notification.
    ///
    /// A submit-time API error is a transport outcome: nothing was observed
    /// to start, so there is no handle to keep polling.
    pub async fn run(
        &self,
        command: &dyn MutatingCommand,
        cancel: watch::Receiver<bool>,
    ) -> WaitOutcome {
        println!("{}", command.describe());

        let handle = match command.submit(self.api.as_ref()).await {
            Ok(handle) => handle,
            Err(err) => return WaitOutcome::TransportError(err.to_string()),
        };

        let poller = StatusPoller::new(Arc::clone(&self.api), self.config.request_timeout);
        let waiter = TaskWaiter::new(Arc::new(poller), self.policy.clone(), self.config.clone());
        waiter.wait(&handle, cancel).await
    }
}
