//! Task waiter: drives poller + backoff to a single terminal outcome.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::domain::{NotificationHandle, PollReport, TaskStatus, WaitOutcome};
use crate::wait::{BackoffPolicy, Poller};

/// Knobs for one wait operation.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Overall wait budget. Exceeding it produces `Timeout`, never `Failure`:
    /// the remote outcome is genuinely unknown at that point.
    pub overall_timeout: Duration,

    /// Budget for a single status request.
    pub request_timeout: Duration,

    /// Optional early escalation: after this many consecutive inconclusive
    /// polls, give up with `TransportError` instead of waiting out the full
    /// budget. `None` retries inconclusive polls until the overall timeout.
    pub max_consecutive_unknown: Option<u32>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            overall_timeout: Duration::from_secs(600),
            request_timeout: Duration::from_secs(30),
            max_consecutive_unknown: None,
        }
    }
}

/// Drives repeated polls on one notification handle to exactly one
/// [`WaitOutcome`].
///
/// The waiter owns the whole loop: attempt counting, elapsed accounting,
/// stale-response detection, cancellation. The poller it drives is just
/// "one classified status check" and carries no state, so the state machine
/// here is testable with a scripted poller and paused time.
pub struct TaskWaiter {
    poller: Arc<dyn Poller>,
    policy: BackoffPolicy,
    config: WaitConfig,
}

impl TaskWaiter {
    pub fn new(poller: Arc<dyn Poller>, policy: BackoffPolicy, config: WaitConfig) -> Self {
        Self {
            poller,
            policy,
            config,
        }
    }

    /// Wait for the backend task behind `handle` to reach a terminal state.
    ///
    /// Loop invariants:
    /// - the attempt counter is monotonically non-decreasing;
    /// - a `completed`/`failed` report returns immediately, no further polls;
    /// - elapsed time never exceeds the overall budget before `Timeout` is
    ///   returned;
    /// - every suspension point (the in-flight poll as much as the backoff
    ///   sleep) races the cancel flag, so an operator interrupt is honored
    ///   within one scheduling point.
    pub async fn wait(
        &self,
        handle: &NotificationHandle,
        mut cancel: watch::Receiver<bool>,
    ) -> WaitOutcome {
        let started = Instant::now();
        let deadline = started + self.config.overall_timeout;

        let mut attempt: u32 = 0;
        let mut consecutive_unknown: u32 = 0;
        let mut newest_observed: Option<DateTime<Utc>> = None;

        if *cancel.borrow() {
            return WaitOutcome::Cancelled;
        }

        loop {
            // A hung status request must not delay an interrupt by up to the
            // per-request budget: the poll itself is a suspension point too.
            let mut report = tokio::select! {
                report = self.poller.poll_once(handle.id()) => report,
                () = cancel_fired(&mut cancel) => return WaitOutcome::Cancelled,
            };
            report = degrade_if_stale(report, &mut newest_observed);

            match report.status {
                TaskStatus::Completed => return WaitOutcome::Success,
                TaskStatus::Failed => {
                    let reason = report
                        .message
                        .unwrap_or_else(|| "task failed (no reason reported)".to_string());
                    return WaitOutcome::Failure(reason);
                }
                TaskStatus::Unknown => {
                    consecutive_unknown += 1;
                    if let Some(ceiling) = self.config.max_consecutive_unknown
                        && consecutive_unknown >= ceiling
                    {
                        let cause = report.message.as_deref().unwrap_or("no cause recorded");
                        return WaitOutcome::TransportError(format!(
                            "{consecutive_unknown} consecutive inconclusive polls (last: {cause})"
                        ));
                    }
                }
                TaskStatus::Pending | TaskStatus::InProgress => {
                    // A conclusive in-flight status resets the flake counter.
                    consecutive_unknown = 0;
                }
            }

            let delay = self.policy.next_delay(attempt);

            // Sleeping the full delay would cross the deadline: sleep out what
            // is left of the budget and report the timeout without another
            // poll.
            if Instant::now() + delay >= deadline {
                if sleep_until_or_cancel(deadline, &mut cancel).await {
                    return WaitOutcome::Cancelled;
                }
                return WaitOutcome::Timeout {
                    elapsed: started.elapsed(),
                };
            }

            if sleep_until_or_cancel(Instant::now() + delay, &mut cancel).await {
                return WaitOutcome::Cancelled;
            }
            attempt += 1;
        }
    }
}

/// Degrade a report whose timestamp is older than one we already saw.
///
/// Out-of-order status responses happen behind load balancers; acting on a
/// stale terminal status would report the wrong outcome, so the report is
/// retried as inconclusive instead.
fn degrade_if_stale(
    report: PollReport,
    newest_observed: &mut Option<DateTime<Utc>>,
) -> PollReport {
    let Some(observed_at) = report.observed_at else {
        return report;
    };

    match *newest_observed {
        Some(newest) if observed_at < newest => {
            PollReport::unknown("stale response (older than a previous poll)")
        }
        _ => {
            *newest_observed = Some(observed_at);
            report
        }
    }
}

/// Sleep until `deadline`, returning `true` if the cancel flag fired first.
async fn sleep_until_or_cancel(deadline: Instant, cancel: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep_until(deadline) => false,
        () = cancel_fired(cancel) => true,
    }
}

/// Completes once the cancel flag flips to `true`.
///
/// A dropped sender disables cancellation but must not wake the waiter: the
/// future then pends forever and the racing branch wins.
async fn cancel_fired(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::domain::NotificationId;

    /// Scripted poller: pops pre-canned reports, falls back to a repeating
    /// report once the script runs out, and panics if polled with neither.
    struct ScriptedPoller {
        script: Mutex<VecDeque<PollReport>>,
        fallback: Option<PollReport>,
        polls: AtomicU32,
    }

    impl ScriptedPoller {
        fn new(script: Vec<PollReport>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback: None,
                polls: AtomicU32::new(0),
            }
        }

        fn repeating(report: PollReport) -> Self {
            let mut poller = Self::new(Vec::new());
            poller.fallback = Some(report);
            poller
        }

        fn polls(&self) -> u32 {
            self.polls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl Poller for ScriptedPoller {
        async fn poll_once(&self, _id: &NotificationId) -> PollReport {
            self.polls.fetch_add(1, Ordering::Relaxed);
            if let Some(report) = self.script.lock().unwrap().pop_front() {
                return report;
            }
            self.fallback
                .clone()
                .expect("poller called after its script was exhausted")
        }
    }

    fn handle() -> NotificationHandle {
        NotificationHandle::new(NotificationId::new("n-test"), Utc::now())
    }

    fn waiter(poller: &Arc<ScriptedPoller>, config: WaitConfig) -> TaskWaiter {
        TaskWaiter::new(
            Arc::clone(poller) as Arc<dyn Poller>,
            BackoffPolicy::default(),
            config,
        )
    }

    fn no_cancel() -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        // Keep the sender alive for the whole test.
        std::mem::forget(tx);
        rx
    }

    #[tokio::test(start_paused = true)]
    async fn pending_pending_completed_succeeds_after_exactly_three_polls() {
        let poller = Arc::new(ScriptedPoller::new(vec![
            PollReport::new(TaskStatus::Pending),
            PollReport::new(TaskStatus::Pending),
            PollReport::new(TaskStatus::Completed),
        ]));
        let waiter = waiter(&poller, WaitConfig::default());

        let started = Instant::now();
        let outcome = waiter.wait(&handle(), no_cancel()).await;

        assert_eq!(outcome, WaitOutcome::Success);
        assert_eq!(poller.polls(), 3);
        // Backoff d0=2s then d1=4s elapsed between the three polls.
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_on_first_poll_returns_failure_after_one_poll() {
        let poller = Arc::new(ScriptedPoller::new(vec![
            PollReport::new(TaskStatus::Failed).with_message("quota exceeded"),
        ]));
        let waiter = waiter(&poller, WaitConfig::default());

        let outcome = waiter.wait(&handle(), no_cancel()).await;

        assert_eq!(outcome, WaitOutcome::Failure("quota exceeded".into()));
        assert_eq!(poller.polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_unknown_times_out_with_full_elapsed_budget() {
        let poller = Arc::new(ScriptedPoller::repeating(PollReport::unknown(
            "transport: connection refused",
        )));
        let config = WaitConfig {
            overall_timeout: Duration::from_secs(5),
            ..WaitConfig::default()
        };
        let waiter = waiter(&poller, config);

        let started = Instant::now();
        let outcome = waiter.wait(&handle(), no_cancel()).await;

        match outcome {
            WaitOutcome::Timeout { elapsed } => {
                assert!(elapsed >= Duration::from_secs(5), "elapsed {elapsed:?}");
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
        assert!(started.elapsed() >= Duration::from_secs(5));
        // Budget 5s with delays 2s,4s: polls at t=0 and t=2, then the 4s
        // delay would cross the deadline, so the waiter sleeps out the rest.
        assert_eq!(poller.polls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn no_poll_happens_after_a_terminal_report() {
        // Script has exactly one report; ScriptedPoller panics on a second
        // poll, so finishing cleanly proves the waiter stopped.
        let poller = Arc::new(ScriptedPoller::new(vec![PollReport::new(
            TaskStatus::Completed,
        )]));
        let waiter = waiter(&poller, WaitConfig::default());

        let outcome = waiter.wait(&handle(), no_cancel()).await;
        assert_eq!(outcome, WaitOutcome::Success);
        assert_eq!(poller.polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_unknown_ceiling_escalates_to_transport_error() {
        let poller = Arc::new(ScriptedPoller::repeating(PollReport::unknown(
            "transport: connection refused",
        )));
        let config = WaitConfig {
            max_consecutive_unknown: Some(3),
            ..WaitConfig::default()
        };
        let waiter = waiter(&poller, config);

        let outcome = waiter.wait(&handle(), no_cancel()).await;

        match outcome {
            WaitOutcome::TransportError(cause) => {
                assert!(cause.contains("3 consecutive"), "cause: {cause}");
                assert!(cause.contains("connection refused"), "cause: {cause}");
            }
            other => panic!("expected TransportError, got {other:?}"),
        }
        assert_eq!(poller.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn conclusive_status_resets_the_unknown_counter() {
        let poller = Arc::new(ScriptedPoller::new(vec![
            PollReport::unknown("flake"),
            PollReport::unknown("flake"),
            PollReport::new(TaskStatus::InProgress),
            PollReport::unknown("flake"),
            PollReport::unknown("flake"),
            PollReport::new(TaskStatus::Completed),
        ]));
        let config = WaitConfig {
            max_consecutive_unknown: Some(3),
            ..WaitConfig::default()
        };
        let waiter = waiter(&poller, config);

        // Two flakes, a conclusive in-progress, two more flakes: the ceiling
        // of three is never reached and the wait completes.
        let outcome = waiter.wait(&handle(), no_cancel()).await;
        assert_eq!(outcome, WaitOutcome::Success);
        assert_eq!(poller.polls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_sleep_returns_cancelled_promptly() {
        let poller = Arc::new(ScriptedPoller::repeating(PollReport::new(
            TaskStatus::InProgress,
        )));
        let waiter = waiter(&poller, WaitConfig::default());
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = handle();

        let started = Instant::now();
        let wait = waiter.wait(&handle, cancel_rx);
        let interrupt = async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            cancel_tx.send(true).unwrap();
        };

        let (outcome, ()) = tokio::join!(wait, interrupt);

        assert_eq!(outcome, WaitOutcome::Cancelled);
        // Interrupt landed mid-sleep (t=3s, inside the 2s..6s backoff sleep)
        // and was honored without waiting for the sleep to finish.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    /// Poller whose status request never resolves (hung transport).
    struct HungPoller;

    #[async_trait]
    impl Poller for HungPoller {
        async fn poll_once(&self, _id: &NotificationId) -> PollReport {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_a_hung_poll_is_honored_promptly() {
        let waiter = TaskWaiter::new(
            Arc::new(HungPoller),
            BackoffPolicy::default(),
            WaitConfig::default(),
        );
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = handle();

        let started = Instant::now();
        let wait = waiter.wait(&handle, cancel_rx);
        let interrupt = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            cancel_tx.send(true).unwrap();
        };

        let (outcome, ()) = tokio::join!(wait, interrupt);

        // The request hangs well past the 30s per-request budget; the
        // interrupt still lands at t=1s because the poll itself is raced
        // against the cancel flag.
        assert_eq!(outcome, WaitOutcome::Cancelled);
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn already_cancelled_flag_short_circuits_before_any_poll() {
        let poller = Arc::new(ScriptedPoller::new(vec![]));
        let waiter = waiter(&poller, WaitConfig::default());
        let (cancel_tx, cancel_rx) = watch::channel(true);
        drop(cancel_tx);

        let outcome = waiter.wait(&handle(), cancel_rx).await;
        assert_eq!(outcome, WaitOutcome::Cancelled);
        assert_eq!(poller.polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_terminal_report_is_retried_not_trusted() {
        let t0 = Utc::now();
        let earlier = t0 - chrono::Duration::seconds(60);
        let later = t0 + chrono::Duration::seconds(60);

        let poller = Arc::new(ScriptedPoller::new(vec![
            PollReport::new(TaskStatus::InProgress).with_observed_at(t0),
            // Out-of-order response: older than what we already saw.
            PollReport::new(TaskStatus::Completed).with_observed_at(earlier),
            PollReport::new(TaskStatus::Completed).with_observed_at(later),
        ]));
        let waiter = waiter(&poller, WaitConfig::default());

        let outcome = waiter.wait(&handle(), no_cancel()).await;
        assert_eq!(outcome, WaitOutcome::Success);
        assert_eq!(poller.polls(), 3);
    }
}
