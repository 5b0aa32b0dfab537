//! Configuration types for slide acquisition and PDF assembly.
//!
//! All job behaviour is controlled through [`GrabConfig`], built via its
//! [`GrabConfigBuilder`]. One struct holds every knob so a config can be
//! cloned into each job, logged, and shared across the registry.

use crate::error::SlidesError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::time::Duration;

/// Strikes allowed per probe or per slide before giving up.
pub const DEFAULT_MAX_ERROR_STRIKE: u32 = 5;

/// Upper bound of the length binary search.
pub const DEFAULT_MAX_LENGTH: usize = 500;

/// Fixed delay between two attempts of the same probe or fetch.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1000;

/// Name of the produced artifact. Never derived from slide content.
pub const DEFAULT_FILENAME: &str = "presentation.pdf";

/// Configuration for a presentation grab.
///
/// # Example
/// ```rust
/// use slides2pdf::GrabConfig;
///
/// let config = GrabConfig::builder()
///     .max_error_strike(3)
///     .max_length(200)
///     .retry_backoff_ms(250)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_length, 200);
/// ```
#[derive(Clone)]
pub struct GrabConfig {
    /// Failed attempts tolerated per probe or per slide. Default: 5.
    ///
    /// Each operation gets `max_error_strike + 1` attempts in total. The
    /// budget is scoped to a single probe call or a single slide index; it is
    /// never shared between indices.
    pub max_error_strike: u32,

    /// Largest slide index the length search will consider. Default: 500.
    pub max_length: usize,

    /// Delay between attempts in milliseconds. Default: 1000.
    ///
    /// The delay is fixed, not exponential. It is a lower bound only; the
    /// actual gap depends on the scheduler.
    pub retry_backoff_ms: u64,

    /// Per-request transport timeout for the HTTP source, in seconds. Default: 30.
    pub request_timeout_secs: u64,

    /// Optional wall-clock budget for a whole job, in seconds. Default: None.
    ///
    /// Once the deadline passes, pending probes count as absent and pending
    /// slides become holes; the job still assembles what it has.
    pub job_deadline_secs: Option<u64>,

    /// Maximum slide fetches in flight. Default: None (all at once).
    pub concurrency: Option<usize>,

    /// File name reported with the finished document. Default: `presentation.pdf`.
    pub filename: String,

    /// Load the system font database for `<text>` elements. Default: true.
    ///
    /// Slides exported with outlined glyphs do not need fonts; disabling the
    /// scan makes assembly start faster.
    pub load_system_fonts: bool,

    /// Receives per-phase and per-slide events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            max_error_strike: DEFAULT_MAX_ERROR_STRIKE,
            max_length: DEFAULT_MAX_LENGTH,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            request_timeout_secs: 30,
            job_deadline_secs: None,
            concurrency: None,
            filename: DEFAULT_FILENAME.to_string(),
            load_system_fonts: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GrabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrabConfig")
            .field("max_error_strike", &self.max_error_strike)
            .field("max_length", &self.max_length)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("job_deadline_secs", &self.job_deadline_secs)
            .field("concurrency", &self.concurrency)
            .field("filename", &self.filename)
            .field("load_system_fonts", &self.load_system_fonts)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn JobProgressCallback>"),
            )
            .finish()
    }
}

impl GrabConfig {
    /// Create a new builder for `GrabConfig`.
    pub fn builder() -> GrabConfigBuilder {
        GrabConfigBuilder {
            config: Self::default(),
        }
    }

    /// Total attempts per operation.
    pub fn max_attempts(&self) -> u32 {
        self.max_error_strike.saturating_add(1)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn job_deadline(&self) -> Option<Duration> {
        self.job_deadline_secs.map(Duration::from_secs)
    }
}

/// Builder for [`GrabConfig`].
#[derive(Debug)]
pub struct GrabConfigBuilder {
    config: GrabConfig,
}

impl GrabConfigBuilder {
    pub fn max_error_strike(mut self, n: u32) -> Self {
        self.config.max_error_strike = n;
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.config.max_length = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn job_deadline_secs(mut self, secs: u64) -> Self {
        self.config.job_deadline_secs = Some(secs);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = Some(n);
        self
    }

    pub fn filename(mut self, name: impl Into<String>) -> Self {
        self.config.filename = name.into();
        self
    }

    pub fn load_system_fonts(mut self, v: bool) -> Self {
        self.config.load_system_fonts = v;
        self
    }

    /// Attach a progress callback.
    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GrabConfig, SlidesError> {
        let c = &self.config;
        if c.max_length == 0 {
            return Err(SlidesError::InvalidConfig(
                "max_length must be ≥ 1".into(),
            ));
        }
        if c.concurrency == Some(0) {
            return Err(SlidesError::InvalidConfig(
                "concurrency must be ≥ 1".into(),
            ));
        }
        if c.request_timeout_secs == 0 {
            return Err(SlidesError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.filename.trim().is_empty() {
            return Err(SlidesError::InvalidConfig(
                "filename must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = GrabConfig::default();
        assert_eq!(c.max_error_strike, 5);
        assert_eq!(c.max_attempts(), 6);
        assert_eq!(c.max_length, 500);
        assert_eq!(c.retry_backoff(), Duration::from_millis(1000));
        assert_eq!(c.filename, "presentation.pdf");
        assert!(c.job_deadline().is_none());
        assert!(c.concurrency.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let c = GrabConfig::builder()
            .max_error_strike(2)
            .max_length(10)
            .retry_backoff_ms(0)
            .job_deadline_secs(30)
            .concurrency(4)
            .filename("deck.pdf")
            .load_system_fonts(false)
            .build()
            .unwrap();
        assert_eq!(c.max_attempts(), 3);
        assert_eq!(c.max_length, 10);
        assert_eq!(c.retry_backoff(), Duration::ZERO);
        assert_eq!(c.job_deadline(), Some(Duration::from_secs(30)));
        assert_eq!(c.concurrency, Some(4));
        assert_eq!(c.filename, "deck.pdf");
        assert!(!c.load_system_fonts);
    }

    #[test]
    fn builder_rejects_zero_length() {
        let err = GrabConfig::builder().max_length(0).build().unwrap_err();
        assert!(matches!(err, SlidesError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_concurrency() {
        assert!(GrabConfig::builder().concurrency(0).build().is_err());
    }

    #[test]
    fn builder_rejects_empty_filename() {
        assert!(GrabConfig::builder().filename("  ").build().is_err());
    }

    #[test]
    fn debug_hides_callback() {
        let dbg = format!("{:?}", GrabConfig::default());
        assert!(dbg.contains("max_error_strike"));
        assert!(dbg.contains("progress_callback: None"));
    }
}
