//! Result types produced by a job.

use crate::error::SlideError;
use serde::{Deserialize, Serialize};

/// Outcome of fetching one slide index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideResult {
    /// 1-based position; defines page order.
    pub index: usize,
    /// Raw SVG markup, or `None` for a hole.
    pub content: Option<String>,
    /// Attempts spent on this index.
    pub attempts: u32,
    /// Last error seen, if any attempt failed.
    pub error: Option<SlideError>,
}

impl SlideResult {
    pub fn present(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: Some(content.into()),
            attempts: 1,
            error: None,
        }
    }

    pub fn hole(index: usize) -> Self {
        Self {
            index,
            content: None,
            attempts: 0,
            error: None,
        }
    }

    pub fn is_hole(&self) -> bool {
        self.content.is_none()
    }
}

/// What length discovery found out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LengthReport {
    /// Count of contiguous present slides starting at 1.
    pub length: usize,
    /// Every probed index up to `max_length` was present, so the real
    /// presentation may be longer.
    pub capped: bool,
    /// Probes that were treated as absent after exhausting their strikes
    /// or running past the job deadline.
    pub inconclusive_probes: usize,
}

/// Statistics for a finished job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrabStats {
    pub total_slides: usize,
    pub fetched_slides: usize,
    /// 1-based indices that ended up as holes.
    pub missing_slides: Vec<usize>,
    /// 1-based indices whose markup could not be rendered (blank page emitted).
    pub unrenderable_slides: Vec<usize>,
    /// Failed attempts across all slide fetches.
    pub fetch_retries: u64,
    pub length_capped: bool,
    pub inconclusive_probes: usize,
    pub count_duration_ms: u64,
    pub download_duration_ms: u64,
    pub assembly_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// The finished artifact handed to the completion callback.
#[derive(Clone, Serialize, Deserialize)]
pub struct Presentation {
    /// Complete PDF file.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub filename: String,
    /// `false` when at least one slide was unrecoverable.
    pub is_complete: bool,
    pub stats: GrabStats,
}

impl std::fmt::Debug for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("filename", &self.filename)
            .field("is_complete", &self.is_complete)
            .field("stats", &self.stats)
            .finish()
    }
}
