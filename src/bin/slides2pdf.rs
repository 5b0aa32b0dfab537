//! CLI binary for slides2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `GrabConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use slides2pdf::{
    find_link, grab_to_file, inspect, normalize_link, GrabConfig, JobProgressCallback,
    ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while counting, then a bar that advances as slides arrive.
/// Slides finish out of order; the bar only counts them.
struct CliProgressCallback {
    bar: ProgressBar,
    lost: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Counting");
        bar.set_message("probing slides…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            lost: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} slides  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Downloading");
    }
}

impl JobProgressCallback for CliProgressCallback {
    fn on_length_discovered(&self, length: usize) {
        if length == 0 {
            return;
        }
        self.activate_bar(length);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {length} slides"))
        ));
    }

    fn on_slide_fetched(&self, index: usize, total: usize, bytes: usize) {
        self.bar.println(format!(
            "  {} Slide {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            dim(&format!("{:>7} bytes", bytes)),
        ));
        self.bar.inc(1);
    }

    fn on_slide_lost(&self, index: usize, total: usize, error: &str) {
        self.lost.fetch_add(1, Ordering::SeqCst);
        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Slide {:>3}/{:<3}  {}",
            red("✗"),
            index,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_assembly_start(&self, pages: usize) {
        self.bar.set_prefix("Assembling");
        self.bar.set_message(format!("{pages} pages"));
    }

    fn on_job_complete(&self, pages: usize, is_complete: bool) {
        self.bar.finish_and_clear();
        if pages == 0 {
            return;
        }
        if is_complete {
            eprintln!("{} {} pages assembled", green("✔"), bold(&pages.to_string()));
        } else {
            eprintln!(
                "{} {} pages assembled  ({} slides missing)",
                cyan("⚠"),
                bold(&pages.to_string()),
                red(&self.lost.load(Ordering::SeqCst).to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Grab a deck from any of its slide links
  slides2pdf https://bbb.example.org/presentation/abc/svg/3

  # Choose the output file
  slides2pdf https://bbb.example.org/presentation/abc/svg/ -o lecture.pdf

  # Only count the slides
  slides2pdf --count-only https://bbb.example.org/presentation/abc/svg/1

  # Be patient with a flaky server, but give up after two minutes
  slides2pdf --max-error-strike 10 --retry-backoff-ms 2000 --deadline 120 LINK

  # Paste a whole chat message; the first slide link in it is used
  slides2pdf "here are the slides: https://host/p/svg/4 enjoy"

ENVIRONMENT VARIABLES:
  SLIDES2PDF_OUTPUT            Output file
  SLIDES2PDF_MAX_ERROR_STRIKE  Failed attempts tolerated per probe / slide
  SLIDES2PDF_MAX_LENGTH        Largest slide index considered
  SLIDES2PDF_CONCURRENCY       Maximum fetches in flight
  RUST_LOG                     Override the log filter
"#;

/// Download SVG slide decks and assemble them into a PDF.
#[derive(Parser, Debug)]
#[command(
    name = "slides2pdf",
    version,
    about = "Download SVG slide decks and assemble them into a PDF",
    long_about = "Download a presentation published as one SVG per slide (…/svg/1, …/svg/2, …) \
and assemble the slides into a single PDF. The number of slides is found by binary search, \
slides are fetched concurrently, and slides that cannot be fetched become blank pages.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Slide link (…/svg/ or …/svg/<n>), or text containing one.
    link: String,

    /// Write the PDF here. Default: ./presentation.pdf
    #[arg(short, long, env = "SLIDES2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Failed attempts tolerated per probe or per slide.
    #[arg(long, env = "SLIDES2PDF_MAX_ERROR_STRIKE", default_value_t = slides2pdf::config::DEFAULT_MAX_ERROR_STRIKE)]
    max_error_strike: u32,

    /// Largest slide index the length search considers.
    #[arg(long, env = "SLIDES2PDF_MAX_LENGTH", default_value_t = slides2pdf::config::DEFAULT_MAX_LENGTH)]
    max_length: usize,

    /// Delay between attempts, in milliseconds.
    #[arg(long, env = "SLIDES2PDF_RETRY_BACKOFF_MS", default_value_t = slides2pdf::config::DEFAULT_RETRY_BACKOFF_MS)]
    retry_backoff_ms: u64,

    /// Per-request timeout in seconds.
    #[arg(long, env = "SLIDES2PDF_REQUEST_TIMEOUT", default_value_t = 30)]
    request_timeout: u64,

    /// Wall-clock budget for the whole job, in seconds.
    #[arg(long, env = "SLIDES2PDF_DEADLINE")]
    deadline: Option<u64>,

    /// Maximum slide fetches in flight. Default: all at once.
    #[arg(short, long, env = "SLIDES2PDF_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Skip loading system fonts (faster; text without outlines is dropped).
    #[arg(long, env = "SLIDES2PDF_NO_SYSTEM_FONTS")]
    no_system_fonts: bool,

    /// Count slides only, download nothing.
    #[arg(long)]
    count_only: bool,

    /// Print results as JSON on stdout.
    #[arg(long, env = "SLIDES2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "SLIDES2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SLIDES2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SLIDES2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless -v is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let link = resolve_link(&cli.link)?;

    // ── Count-only mode ──────────────────────────────────────────────────
    if cli.count_only {
        let config = build_config(&cli, None)?;
        let report = inspect(&link, &config)
            .await
            .context("Failed to count slides")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else {
            println!("Link:         {}", link);
            println!("Slides:       {}", report.length);
            if report.capped {
                println!("Capped:       yes (raise --max-length to look further)");
            }
            if report.inconclusive_probes > 0 {
                println!("Inconclusive: {} probes", report.inconclusive_probes);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn JobProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.filename));

    // ── Run job ──────────────────────────────────────────────────────────
    let Some(stats) = grab_to_file(&link, &output_path, &config)
        .await
        .context("Download failed")?
    else {
        anyhow::bail!("No slides found behind {}", link);
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    } else if !cli.quiet {
        let complete = stats.missing_slides.is_empty();
        eprintln!(
            "{}  {}/{} slides  {}ms  →  {}",
            if complete { green("✔") } else { cyan("⚠") },
            stats.fetched_slides,
            stats.total_slides,
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        if !complete {
            eprintln!(
                "   missing: {}",
                red(&format!("{:?}", stats.missing_slides))
            );
        }
        if !stats.unrenderable_slides.is_empty() {
            eprintln!(
                "   unrenderable: {}",
                dim(&format!("{:?}", stats.unrenderable_slides))
            );
        }
        if stats.length_capped {
            eprintln!(
                "   {}",
                dim("length capped at --max-length; the deck may be longer")
            );
        }
    }

    Ok(())
}

/// Accept a bare link or a message that contains one.
fn resolve_link(input: &str) -> Result<String> {
    if let Ok(link) = normalize_link(input.trim()) {
        return Ok(link);
    }
    let found = find_link(input)
        .with_context(|| format!("No slide link found in '{}'", input))?;
    normalize_link(&found).context("Invalid slide link")
}

/// Map CLI args to `GrabConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GrabConfig> {
    let mut builder = GrabConfig::builder()
        .max_error_strike(cli.max_error_strike)
        .max_length(cli.max_length)
        .retry_backoff_ms(cli.retry_backoff_ms)
        .request_timeout_secs(cli.request_timeout)
        .load_system_fonts(!cli.no_system_fonts);

    if let Some(secs) = cli.deadline {
        builder = builder.job_deadline_secs(secs);
    }
    if let Some(n) = cli.concurrency {
        builder = builder.concurrency(n);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
