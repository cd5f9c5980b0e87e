//! Backoff policy: decides the delay between successive polls.

use std::time::Duration;

use rand::Rng;

/// Exponential backoff with a cap and optional bounded jitter.
///
/// `base_delay(n)` is a pure function of the attempt count and the policy
/// parameters; `next_delay(n)` adds a uniform perturbation within
/// `±jitter_fraction` of the base so concurrent invocations don't poll in
/// lockstep.
///
/// Example with initial=2s, multiplier=2.0, max=30s:
/// - attempt 0: 2s
/// - attempt 1: 4s
/// - attempt 2: 8s
/// - attempt 3: 16s
/// - attempt 4+: 30s (capped)
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Delay before the second poll (attempt 0).
    pub initial_delay: Duration,

    /// Upper bound: delays never grow past this.
    pub max_delay: Duration,

    /// Growth factor per attempt.
    pub multiplier: f64,

    /// Fraction of the base delay used as the jitter band. 0.0 disables
    /// jitter and makes `next_delay` fully deterministic.
    pub jitter_fraction: f64,

    /// Exponent clamp. Attempts beyond this still get the capped maximum;
    /// it also keeps `powi` away from f64 overflow on pathological counts.
    pub attempt_ceiling: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter_fraction: 0.0,
            attempt_ceiling: 16,
        }
    }
}

impl BackoffPolicy {
    /// Deterministic delay for the given attempt (0-indexed), before jitter.
    ///
    /// Monotonically non-decreasing in `attempt` until the cap, then constant.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(self.attempt_ceiling);
        let raw = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent as i32);
        let capped = raw.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Delay for the given attempt with jitter applied.
    ///
    /// With `jitter_fraction == 0.0` this equals [`Self::base_delay`].
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        if self.jitter_fraction <= 0.0 {
            return base;
        }

        let band = base.as_secs_f64() * self.jitter_fraction;
        let offset = rand::thread_rng().gen_range(-band..=band);
        let jittered = (base.as_secs_f64() + offset).max(0.0);
        Duration::from_secs_f64(jittered)
    }

    pub fn with_jitter(mut self, fraction: f64) -> Self {
        self.jitter_fraction = fraction;
        self
    }
}
