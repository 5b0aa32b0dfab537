//! Slide fetching: retrieve every index in `[1, length]` concurrently.
//!
//! Each index carries its own strike budget. A slide that keeps failing
//! turns into a hole; it never fails the batch and never steals attempts
//! from other indices. Results come back in slide order whatever order the
//! requests complete in.

use super::retry::{with_strikes, RetryPolicy};
use super::source::SlideSource;
use crate::output::SlideResult;
use crate::progress::ProgressCallback;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

/// Fetch slides `1..=length`.
///
/// `concurrency` bounds in-flight requests; `None` issues all of them at
/// once. `result[i]` is always slide `i + 1`.
pub async fn fetch_all(
    source: &dyn SlideSource,
    policy: &RetryPolicy,
    length: usize,
    concurrency: Option<usize>,
    identity: &str,
    progress: Option<&ProgressCallback>,
) -> Vec<SlideResult> {
    let limit = concurrency.unwrap_or(length).max(1);

    stream::iter(
        (1..=length).map(|index| fetch_one(source, policy, index, length, identity, progress)),
    )
    .buffered(limit)
    .collect()
    .await
}

async fn fetch_one(
    source: &dyn SlideSource,
    policy: &RetryPolicy,
    index: usize,
    total: usize,
    identity: &str,
    progress: Option<&ProgressCallback>,
) -> SlideResult {
    let what = format!("fetch slide {index}/{total}");
    let attempted = with_strikes(policy, identity, &what, move || source.fetch(index)).await;

    match attempted.outcome {
        Ok(body) => {
            debug!("[{}] slide {} fetched ({} bytes)", identity, index, body.len());
            if let Some(cb) = progress {
                cb.on_slide_fetched(index, total, body.len());
            }
            SlideResult {
                index,
                content: Some(body),
                attempts: attempted.attempts,
                error: attempted.last_error,
            }
        }
        Err(why) => {
            let detail = attempted
                .last_error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("{why:?}"));
            warn!(
                "[{}] slide {} lost after {} attempt(s): {}",
                identity, index, attempted.attempts, detail
            );
            if let Some(cb) = progress {
                cb.on_slide_lost(index, total, &detail);
            }
            SlideResult {
                index,
                content: None,
                attempts: attempted.attempts,
                error: attempted.last_error,
            }
        }
    }
}
