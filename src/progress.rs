//! Progress-callback trait for job and per-slide events.
//!
//! Inject an [`Arc<dyn JobProgressCallback>`] via
//! [`crate::config::GrabConfigBuilder::progress_callback`] to receive events
//! while a job counts, downloads and assembles a presentation.
//!
//! Slide events fire from concurrently running fetches, so implementations
//! must be `Send + Sync` and guard any shared state themselves.
//!
//! # Example
//!
//! ```rust
//! use slides2pdf::{GrabConfig, JobProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl JobProgressCallback for Counter {
//!     fn on_slide_fetched(&self, index: usize, total: usize, bytes: usize) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("slide {index}/{total}: {bytes} bytes");
//!     }
//! }
//!
//! let config = GrabConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by a job as it moves through its phases.
///
/// All methods default to no-ops.
pub trait JobProgressCallback: Send + Sync {
    /// Called once before length discovery starts.
    fn on_job_start(&self, base_link: &str) {
        let _ = base_link;
    }

    /// Called once the presentation length is known (may be 0).
    fn on_length_discovered(&self, length: usize) {
        let _ = length;
    }

    /// Called when a slide body arrives.
    ///
    /// * `index`: 1-based slide index
    /// * `total`: discovered length
    /// * `bytes`: body size
    fn on_slide_fetched(&self, index: usize, total: usize, bytes: usize) {
        let _ = (index, total, bytes);
    }

    /// Called when a slide exhausts its strikes and becomes a hole.
    fn on_slide_lost(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called before the PDF is assembled.
    fn on_assembly_start(&self, pages: usize) {
        let _ = pages;
    }

    /// Called once the job has a result.
    ///
    /// `pages == 0` means the link had no slides and no document was built.
    fn on_job_complete(&self, pages: usize, is_complete: bool) {
        let _ = (pages, is_complete);
    }
}

/// No-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl JobProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GrabConfig`].
pub type ProgressCallback = Arc<dyn JobProgressCallback>;
