//! # slides2pdf
//!
//! Download a presentation published as one SVG document per slide and
//! assemble it into a single PDF.
//!
//! ## Why this crate?
//!
//! Web conferencing systems often expose uploaded slide decks only as a
//! numbered sequence of SVG files behind `…/svg/1`, `…/svg/2`, … with no
//! index and no way to download the original. This crate finds out how many
//! slides exist with a binary search over cheap presence probes, fetches them
//! all concurrently, and lays each one out on a PDF page of the size the
//! slide itself declares.
//!
//! ## Pipeline Overview
//!
//! ```text
//! link
//!  │
//!  ├─ 1. Link     normalise …/svg/17 → …/svg/
//!  ├─ 2. Count    binary search over HEAD probes (strike-counted retries)
//!  ├─ 3. Fetch    concurrent GETs, order-preserving, holes on failure
//!  ├─ 4. Size     page size from pt/px width & height, inherited otherwise
//!  └─ 5. Assemble one page per slide via svg2pdf (spawn_blocking)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slides2pdf::{grab, GrabConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GrabConfig::default();
//!     match grab("https://bbb.example.org/presentation/abc/svg/3", &config).await? {
//!         Some(p) => {
//!             std::fs::write(&p.filename, &p.bytes)?;
//!             eprintln!("{} pages, complete: {}", p.stats.total_slides, p.is_complete);
//!         }
//!         None => eprintln!("no slides behind that link"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Running many jobs
//!
//! [`JobRegistry`] allows one job per identity and answers status queries
//! while jobs run; see [`describe_status`] for the one-line report.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `slides2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! slides2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod job;
pub mod link;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod registry;
pub mod status;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GrabConfig, GrabConfigBuilder};
pub use error::{SlideError, SlidesError};
pub use job::{grab, grab_sync, grab_to_file, inspect, Job};
pub use link::{find_link, normalize_link};
pub use output::{GrabStats, LengthReport, Presentation, SlideResult};
pub use pipeline::size::PageSpec;
pub use pipeline::source::{HttpSlideSource, SlideSource};
pub use progress::{JobProgressCallback, NoopProgressCallback, ProgressCallback};
pub use registry::JobRegistry;
pub use status::{describe_status, Phase, StatusEntry, StatusHistory};
