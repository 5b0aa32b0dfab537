//! Strike-counted retry with a fixed backoff.
//!
//! Every probe and every slide fetch runs through [`with_strikes`]. The
//! budget belongs to one call: a new probe or a new slide index starts with
//! a clean slate. Between attempts the loop sleeps for the configured
//! backoff (at least that long, never less). An optional job deadline cuts
//! the loop short, both between attempts and during an in-flight attempt.

use crate::config::GrabConfig;
use crate::error::SlideError;
use std::future::Future;
use tokio::time::{sleep, timeout_at, Duration, Instant};
use tracing::warn;

/// Retry parameters shared by all operations of one job.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, `max_error_strike + 1`.
    pub max_attempts: u32,
    pub backoff: Duration,
    pub deadline: Option<Instant>,
}

impl RetryPolicy {
    /// Policy for a job started now.
    pub fn from_config(config: &GrabConfig) -> Self {
        Self {
            max_attempts: config.max_attempts(),
            backoff: config.retry_backoff(),
            deadline: config.job_deadline().map(|d| Instant::now() + d),
        }
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Why [`with_strikes`] gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaveUp {
    /// Every attempt failed.
    Exhausted,
    /// The job deadline passed first.
    Deadline,
}

/// Result of a retried operation.
#[derive(Debug)]
pub struct Attempted<T> {
    pub outcome: Result<T, GaveUp>,
    /// Attempts actually started.
    pub attempts: u32,
    /// Failed attempts.
    pub strikes: u32,
    pub last_error: Option<SlideError>,
}

/// Run `op` until it succeeds, the strikes run out, or the deadline passes.
///
/// `what` and `identity` only feed the log lines.
pub async fn with_strikes<T, F, Fut>(
    policy: &RetryPolicy,
    identity: &str,
    what: &str,
    mut op: F,
) -> Attempted<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SlideError>>,
{
    let mut strikes = 0u32;
    let mut last_error = None;

    for attempt in 0..policy.max_attempts {
        if attempt > 0 && !policy.backoff.is_zero() {
            sleep(policy.backoff).await;
        }
        if policy.deadline_passed() {
            return gave_up(GaveUp::Deadline, attempt, strikes, last_error);
        }

        let result = match policy.deadline {
            Some(deadline) => match timeout_at(deadline, op()).await {
                Ok(result) => result,
                Err(_) => return gave_up(GaveUp::Deadline, attempt + 1, strikes, last_error),
            },
            None => op().await,
        };

        match result {
            Ok(value) => {
                return Attempted {
                    outcome: Ok(value),
                    attempts: attempt + 1,
                    strikes,
                    last_error,
                }
            }
            Err(e) => {
                strikes += 1;
                warn!(
                    "[{}] {}: attempt {}/{} failed: {}",
                    identity,
                    what,
                    attempt + 1,
                    policy.max_attempts,
                    e
                );
                last_error = Some(e);
            }
        }
    }

    gave_up(GaveUp::Exhausted, policy.max_attempts, strikes, last_error)
}

fn gave_up<T>(
    why: GaveUp,
    attempts: u32,
    strikes: u32,
    last_error: Option<SlideError>,
) -> Attempted<T> {
    if why == GaveUp::Deadline {
        warn!("job deadline reached after {} attempt(s)", attempts);
    }
    Attempted {
        outcome: Err(why),
        attempts,
        strikes,
        last_error,
    }
}
