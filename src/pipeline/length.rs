//! Length discovery: how many contiguous slides exist from index 1.
//!
//! Slides are probed with a cheap presence check and the boundary between
//! present and absent indices is found by binary search, so a 300-slide deck
//! costs about ten probes instead of three hundred.
//!
//! The search looks for the first absent index in `[2, max_length + 1]`
//! once slide 1 is known to exist. `l <= r` holds throughout; the loop ends
//! at `l == r` and `l - 1` is the length. A probe that keeps failing is
//! treated as absent, which can only shorten the result, never stall it.

use super::retry::{with_strikes, RetryPolicy};
use super::source::SlideSource;
use crate::output::LengthReport;
use tracing::{debug, warn};

/// Count the slides behind `source`.
///
/// Never fails: transport trouble degrades to "absent".
pub async fn discover_length(
    source: &dyn SlideSource,
    policy: &RetryPolicy,
    max_length: usize,
    identity: &str,
) -> LengthReport {
    let mut report = LengthReport::default();

    if max_length == 0 || !probe(source, policy, 1, identity, &mut report).await {
        debug!("[{}] slide 1 absent, presentation is empty", identity);
        return report;
    }

    let mut l = 2usize;
    let mut r = max_length + 1;

    while l < r {
        let m = l + (r - l) / 2;
        if probe(source, policy, m, identity, &mut report).await {
            l = m + 1;
        } else {
            r = m;
        }
    }

    report.length = l - 1;
    report.capped = l == max_length + 1;
    if report.capped {
        warn!(
            "[{}] every slide up to {} exists; length capped at {}",
            identity, max_length, report.length
        );
    }
    report
}

async fn probe(
    source: &dyn SlideSource,
    policy: &RetryPolicy,
    index: usize,
    identity: &str,
    report: &mut LengthReport,
) -> bool {
    let what = format!("probe slide {index}");
    let attempted = with_strikes(policy, identity, &what, move || source.probe(index)).await;
    match attempted.outcome {
        Ok(present) => {
            debug!("[{}] slide {} present: {}", identity, index, present);
            present
        }
        Err(why) => {
            warn!(
                "[{}] slide {} probe gave up ({:?}), treating as absent",
                identity, index, why
            );
            report.inconclusive_probes += 1;
            false
        }
    }
}
