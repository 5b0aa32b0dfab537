//! Jobs: one acquisition request from link to finished PDF.
//!
//! A [`Job`] owns its base link, an identity tag used in log lines, a
//! [`SlideSource`] and a [`StatusHistory`]. [`Job::run`] drives the three
//! stages and always resets the status to `NotStarted` when it returns.
//! For one-shot use the free functions [`grab`], [`grab_to_file`],
//! [`grab_sync`] and [`inspect`] normalise a link and run a job for it.

use crate::config::GrabConfig;
use crate::error::SlidesError;
use crate::link::normalize_link;
use crate::output::{GrabStats, LengthReport, Presentation};
use crate::pipeline::assemble::assemble_blocking;
use crate::pipeline::fetch::fetch_all;
use crate::pipeline::length::discover_length;
use crate::pipeline::retry::RetryPolicy;
use crate::pipeline::source::{HttpSlideSource, SlideSource};
use crate::status::{Phase, StatusHistory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Identity used by the free functions.
pub const LOCAL_IDENTITY: &str = "local";

/// One in-flight acquisition request.
pub struct Job {
    base_link: String,
    identity: String,
    source: Arc<dyn SlideSource>,
    config: GrabConfig,
    status: StatusHistory,
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("base_link", &self.base_link)
            .field("identity", &self.identity)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Job {
    /// A job fetching over HTTP from `base_link` (already normalised).
    pub fn new(
        base_link: impl Into<String>,
        identity: impl Into<String>,
        config: GrabConfig,
    ) -> Result<Self, SlidesError> {
        let base_link = base_link.into();
        let source = HttpSlideSource::new(base_link.clone(), config.request_timeout())?;
        Ok(Self::with_source(base_link, identity, Arc::new(source), config))
    }

    /// A job reading from an arbitrary source.
    pub fn with_source(
        base_link: impl Into<String>,
        identity: impl Into<String>,
        source: Arc<dyn SlideSource>,
        config: GrabConfig,
    ) -> Self {
        Self {
            base_link: base_link.into(),
            identity: identity.into(),
            source,
            config,
            status: StatusHistory::new(),
        }
    }

    pub fn base_link(&self) -> &str {
        &self.base_link
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Reader handle on this job's status history.
    pub fn status(&self) -> StatusHistory {
        self.status.clone()
    }

    /// Count, download and assemble.
    ///
    /// Returns `Ok(None)` when slide 1 does not exist. Lost slides do not
    /// fail the job; they show up as `is_complete == false`.
    ///
    /// # Errors
    /// Only [`SlidesError::Internal`], when the assembly task dies.
    pub async fn run(&self) -> Result<Option<Presentation>, SlidesError> {
        let total_start = Instant::now();
        let policy = RetryPolicy::from_config(&self.config);
        let cb = self.config.progress_callback.as_ref();
        let source = self.source.as_ref();

        self.status.set(Phase::Started);
        info!("[{}] Starting job for {}", self.identity, self.base_link);
        if let Some(cb) = cb {
            cb.on_job_start(&self.base_link);
        }

        // ── Step 1: Count slides ─────────────────────────────────────────
        self.status.push(Phase::Counting);
        let count_start = Instant::now();
        let report = discover_length(source, &policy, self.config.max_length, &self.identity).await;
        let count_duration_ms = count_start.elapsed().as_millis() as u64;
        self.status.remove(Phase::Counting);

        info!(
            "[{}] Presentation has {} slides ({}ms)",
            self.identity, report.length, count_duration_ms
        );
        if let Some(cb) = cb {
            cb.on_length_discovered(report.length);
        }

        if report.length == 0 {
            info!("[{}] No slides behind {}", self.identity, self.base_link);
            self.status.set(Phase::NotStarted);
            if let Some(cb) = cb {
                cb.on_job_complete(0, true);
            }
            return Ok(None);
        }

        // ── Step 2: Download slides ──────────────────────────────────────
        self.status.push(Phase::Downloading);
        let download_start = Instant::now();
        let slides = fetch_all(
            source,
            &policy,
            report.length,
            self.config.concurrency,
            &self.identity,
            cb,
        )
        .await;
        let download_duration_ms = download_start.elapsed().as_millis() as u64;
        self.status.remove(Phase::Downloading);

        let fetched_slides = slides.iter().filter(|s| !s.is_hole()).count();
        let fetch_retries: u64 = slides
            .iter()
            .map(|s| u64::from(s.attempts.saturating_sub(u32::from(!s.is_hole()))))
            .sum();
        info!(
            "[{}] Downloaded {}/{} slides in {}ms",
            self.identity, fetched_slides, report.length, download_duration_ms
        );

        // ── Step 3: Build the document ───────────────────────────────────
        self.status.push(Phase::CreatingDocument);
        if let Some(cb) = cb {
            cb.on_assembly_start(slides.len());
        }
        let assembly_start = Instant::now();
        let assembled = assemble_blocking(slides, self.config.load_system_fonts).await;
        let assembly_duration_ms = assembly_start.elapsed().as_millis() as u64;
        self.status.remove(Phase::CreatingDocument);
        self.status.set(Phase::NotStarted);
        let doc = assembled?;

        let is_complete = doc.is_complete();
        if !is_complete {
            warn!(
                "[{}] Document is missing slides {:?}",
                self.identity, doc.missing
            );
        }

        let stats = GrabStats {
            total_slides: report.length,
            fetched_slides,
            missing_slides: doc.missing.clone(),
            unrenderable_slides: doc.unrenderable.clone(),
            fetch_retries,
            length_capped: report.capped,
            inconclusive_probes: report.inconclusive_probes,
            count_duration_ms,
            download_duration_ms,
            assembly_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        info!(
            "[{}] Job complete: {} pages, {} bytes, {}ms total",
            self.identity,
            doc.page_count(),
            doc.bytes.len(),
            stats.total_duration_ms
        );
        if let Some(cb) = cb {
            cb.on_job_complete(doc.page_count(), is_complete);
        }

        Ok(Some(Presentation {
            bytes: doc.bytes,
            filename: self.config.filename.clone(),
            is_complete,
            stats,
        }))
    }

    /// Run only the counting stage.
    pub async fn count(&self) -> LengthReport {
        let policy = RetryPolicy::from_config(&self.config);
        discover_length(
            self.source.as_ref(),
            &policy,
            self.config.max_length,
            &self.identity,
        )
        .await
    }
}

/// Grab a presentation from a slide link.
///
/// `link` may point at any slide (`…/svg/17`) or at the base (`…/svg/`).
///
/// # Example
/// ```rust,no_run
/// use slides2pdf::{grab, GrabConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = GrabConfig::default();
/// if let Some(p) = grab("https://bbb.example.org/presentation/abc/svg/1", &config).await? {
///     std::fs::write(&p.filename, &p.bytes)?;
/// }
/// # Ok(())
/// # }
/// ```
pub async fn grab(
    link: impl AsRef<str>,
    config: &GrabConfig,
) -> Result<Option<Presentation>, SlidesError> {
    let base_link = normalize_link(link.as_ref())?;
    Job::new(base_link, LOCAL_IDENTITY, config.clone())?
        .run()
        .await
}

/// Grab a presentation and write it to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
/// Returns `Ok(None)` and writes nothing when there are no slides.
pub async fn grab_to_file(
    link: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &GrabConfig,
) -> Result<Option<GrabStats>, SlidesError> {
    let Some(presentation) = grab(link, config).await? else {
        return Ok(None);
    };
    let path = output_path.as_ref();
    let write_err = |source| SlidesError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &presentation.bytes)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    Ok(Some(presentation.stats))
}

/// Synchronous wrapper around [`grab`].
///
/// Creates a temporary tokio runtime internally.
pub fn grab_sync(
    link: impl AsRef<str>,
    config: &GrabConfig,
) -> Result<Option<Presentation>, SlidesError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SlidesError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(grab(link, config))
}

/// Count the slides behind a link without downloading them.
pub async fn inspect(
    link: impl AsRef<str>,
    config: &GrabConfig,
) -> Result<LengthReport, SlidesError> {
    let base_link = normalize_link(link.as_ref())?;
    Ok(Job::new(base_link, LOCAL_IDENTITY, config.clone())?
        .count()
        .await)
}
