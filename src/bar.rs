// src/bar.rs
// Glyph rendering and progress snapshots

use std::time::Duration;
use thiserror::Error;

/// Cell width of the remote bar glyph.
pub const DEFAULT_BAR_WIDTH: usize = 10;

/// Raised when a snapshot is taken of a bar whose total is zero or unset.
#[derive(Debug, Error)]
#[error("progress total must be positive")]
pub struct InvalidTotal;

/// Render a fixed-width character bar for a completion ratio.
///
/// `ratio` is clamped into `[0, 1]`. The result is always exactly `width`
/// characters: `floor(ratio * width)` filled cells followed by empty cells.
pub fn render_bar(ratio: f64, filled: char, empty: char, width: usize) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    let filled_cells = (ratio * width as f64).floor() as usize;
    let empty_cells = width - filled_cells;

    let mut bar = String::with_capacity(width * filled.len_utf8().max(empty.len_utf8()));
    for _ in 0..filled_cells {
        bar.push(filled);
    }
    for _ in 0..empty_cells {
        bar.push(empty);
    }
    bar
}

/// Point-in-time view of a progress run, taken on each tick.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub current: u64,
    pub total: u64,
    pub eta: Duration,
}

impl ProgressSnapshot {
    /// Fails fast when `total` is zero, since the ratio is undefined.
    pub fn new(current: u64, total: u64, eta: Duration) -> Result<Self, InvalidTotal> {
        if total == 0 {
            return Err(InvalidTotal);
        }
        Ok(Self {
            current,
            total,
            eta,
        })
    }

    /// Completion ratio in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        (self.current as f64 / self.total as f64).clamp(0.0, 1.0)
    }

    /// Whole percent complete, rounded down.
    pub fn percent(&self) -> u32 {
        (self.ratio() * 100.0).floor() as u32
    }
}

/// Format a remaining-time estimate as `MM:SS`, or `H:MM:SS` above an hour.
pub fn format_eta(eta: Duration) -> String {
    let secs = eta.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
