//! Job status history.
//!
//! A job keeps a short stack of `{phase, started_at}` entries. The base
//! [`Phase::Started`] entry persists while more specific phases are pushed on
//! top and stripped again when they conclude:
//!
//! ```text
//! NotStarted → Started → Started/Counting → Started → Started/Downloading
//!            → Started → Started/CreatingDocument → Started → NotStarted
//! ```
//!
//! Only the owning job mutates its history. Everyone else reads
//! [`StatusHistory::snapshot`] copies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// A job phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    Started,
    Counting,
    Downloading,
    CreatingDocument,
}

impl Phase {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Phase::NotStarted => "Not started",
            Phase::Started => "Started",
            Phase::Counting => "Counting slides",
            Phase::Downloading => "Downloading slides",
            Phase::CreatingDocument => "Creating document",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the history stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub phase: Phase,
    pub started_at: DateTime<Utc>,
}

impl StatusEntry {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            started_at: Utc::now(),
        }
    }

    /// Time spent in this phase so far (zero if the clock went backwards).
    pub fn elapsed(&self) -> std::time::Duration {
        (Utc::now() - self.started_at).to_std().unwrap_or_default()
    }
}

/// Shared handle to a job's status stack.
///
/// Cloning the handle shares the underlying history.
#[derive(Debug, Clone)]
pub struct StatusHistory {
    entries: Arc<Mutex<Vec<StatusEntry>>>,
}

impl Default for StatusHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusHistory {
    /// A fresh history holding a single `NotStarted` entry.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(vec![StatusEntry::new(Phase::NotStarted)])),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StatusEntry>> {
        // A panic while holding the lock cannot leave the Vec half-updated.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the whole history with one entry.
    pub(crate) fn set(&self, phase: Phase) {
        let mut entries = self.lock();
        entries.clear();
        entries.push(StatusEntry::new(phase));
    }

    /// Append an entry, keeping the existing ones.
    pub(crate) fn push(&self, phase: Phase) {
        self.lock().push(StatusEntry::new(phase));
    }

    /// Strip every entry of `phase`.
    pub(crate) fn remove(&self, phase: Phase) {
        self.lock().retain(|e| e.phase != phase);
    }

    /// Copy of the current stack, oldest first.
    pub fn snapshot(&self) -> Vec<StatusEntry> {
        self.lock().clone()
    }

    /// The most specific (last pushed) entry.
    pub fn current(&self) -> Option<StatusEntry> {
        self.lock().last().cloned()
    }
}

/// Render `elapsed` in its largest non-zero unit: `2d`, `5h`, `3m`, `12s`, `40ms`.
pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    let ms = elapsed.as_millis();
    let units: [(u128, &str); 4] = [
        (86_400_000, "d"),
        (3_600_000, "h"),
        (60_000, "m"),
        (1_000, "s"),
    ];
    units
        .iter()
        .find(|(size, _)| ms >= *size)
        .map(|(size, unit)| format!("{}{}", ms / size, unit))
        .unwrap_or_else(|| format!("{ms}ms"))
}

/// One-line status report: `Started / Counting slides - 12s`.
///
/// Returns `None` for an empty history.
pub fn describe_status(entries: &[StatusEntry]) -> Option<String> {
    let last = entries.last()?;
    let phases = entries
        .iter()
        .map(|e| e.phase.label())
        .collect::<Vec<_>>()
        .join(" / ");
    Some(format!("{phases} - {}", format_elapsed(last.elapsed())))
}
