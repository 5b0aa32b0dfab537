//! Error types for the slides2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SlidesError`]: **Fatal**: the job cannot be started or its result
//!   cannot be delivered (malformed link, bad configuration, a job already
//!   running for the same identity). Returned as `Err(SlidesError)`.
//!
//! * [`SlideError`]: **Non-fatal**: one probe or fetch attempt for a single
//!   slide index failed. These are logged and counted as strikes; once the
//!   strike budget is spent the index is treated as absent (length search)
//!   or becomes a hole (fetch). They never abort a job.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the slides2pdf library.
#[derive(Debug, Error)]
pub enum SlidesError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input does not look like a `<root>/svg/<n>` presentation link.
    #[error("Invalid presentation link '{input}': expected an http(s) URL ending in /svg/ or /svg/<slide>")]
    InvalidLink { input: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    // ── Contention ────────────────────────────────────────────────────────
    /// A job for this identity is still in flight.
    #[error("A download is already running for '{identity}', wait for it to finish")]
    JobAlreadyRunning { identity: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single probe or fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum SlideError {
    /// Connection refused, reset, DNS failure, malformed response.
    #[error("Slide {index}: transport error: {detail}")]
    Transport { index: usize, detail: String },

    /// The request exceeded the per-request timeout.
    #[error("Slide {index}: request timed out")]
    Timeout { index: usize },

    /// The server answered with a non-success status while fetching a body.
    #[error("Slide {index}: HTTP {status}")]
    Status { index: usize, status: u16 },

    /// The server answered 200 with an empty body.
    #[error("Slide {index}: empty body")]
    EmptyBody { index: usize },
}

impl SlideError {
    /// The slide index this error refers to.
    pub fn index(&self) -> usize {
        match self {
            SlideError::Transport { index, .. }
            | SlideError::Timeout { index }
            | SlideError::Status { index, .. }
            | SlideError::EmptyBody { index } => *index,
        }
    }

    /// Map a reqwest failure for `index` into a slide error.
    pub(crate) fn from_reqwest(index: usize, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            SlideError::Timeout { index }
        } else {
            SlideError::Transport {
                index,
                detail: err.to_string(),
            }
        }
    }
}
