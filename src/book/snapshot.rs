//! Depth snapshots: capture window, rendering, and the replay recorder.
//!
//! A snapshot is a read-only projection of the book — taking one never
//! mutates anything. The recorder accumulates snapshots taken inside the
//! capture window and renders them as flat text lines:
//!
//! ```text
//! <symbol>, <timestamp>, <qty>@<price> ... X <qty>@<price> ...
//! ```
//!
//! Bid entries (best/highest first) precede the literal `X`; ask entries
//! (best/lowest first) follow it. An empty side simply contributes zero
//! entries around the separator.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::Price;

/// Inclusive timestamp range during which book states are recorded.
///
/// `start == 0` selects "final state at or before `end`" semantics: only
/// the last qualifying snapshot is retained. Any non-zero `start` retains
/// every qualifying snapshot in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureWindow {
    pub start: i64,
    pub end: i64,
}

impl CaptureWindow {
    /// Create a window over `[start, end]`, both inclusive.
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// A window that captures everything and keeps only the final state.
    pub fn final_state() -> Self {
        Self {
            start: 0,
            end: i64::MAX,
        }
    }

    /// Whether `timestamp` falls inside the window.
    #[inline]
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Whether only the last qualifying snapshot should be retained.
    #[inline]
    pub fn is_final_only(&self) -> bool {
        self.start == 0
    }
}

impl Default for CaptureWindow {
    fn default() -> Self {
        Self::final_state()
    }
}

/// Immutable point-in-time depth projection of one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Timestamp of the event that produced this state
    pub timestamp: i64,

    /// Symbol of the book the snapshot was taken from
    pub symbol: String,

    /// Up to K `(quantity, price)` bid entries, best (highest) first
    pub bids: Vec<(u64, Price)>,

    /// Up to K `(quantity, price)` ask entries, best (lowest) first
    pub asks: Vec<(u64, Price)>,
}

impl Snapshot {
    /// Render the flat output line for this snapshot.
    pub fn render_line(&self) -> String {
        let mut out = format!("{}, {}, ", self.symbol, self.timestamp);
        for (quantity, price) in &self.bids {
            out.push_str(&format!("{quantity}@{price} "));
        }
        out.push('X');
        for (quantity, price) in &self.asks {
            out.push_str(&format!(" {quantity}@{price}"));
        }
        out
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_line())
    }
}

/// Collects the snapshots taken during one replay run.
///
/// Scoped to a single book instance — construct fresh per symbol and
/// discard after flushing, so parallel multi-symbol replays never share
/// accumulation state.
#[derive(Debug, Clone)]
pub struct SnapshotRecorder {
    window: CaptureWindow,
    snapshots: Vec<Snapshot>,
}

impl SnapshotRecorder {
    /// Create a recorder for the given capture window.
    pub fn new(window: CaptureWindow) -> Self {
        Self {
            window,
            snapshots: Vec::new(),
        }
    }

    /// The window this recorder was configured with.
    #[inline]
    pub fn window(&self) -> CaptureWindow {
        self.window
    }

    /// Retain a snapshot taken inside the capture window.
    ///
    /// Under final-only semantics each capture replaces the previous one.
    pub fn capture(&mut self, snapshot: Snapshot) {
        if self.window.is_final_only() {
            self.snapshots.clear();
        }
        self.snapshots.push(snapshot);
    }

    /// Retained snapshots in capture order.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if nothing was retained.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Render all retained snapshots, one line each.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for snapshot in &self.snapshots {
            out.push_str(&snapshot.render_line());
            out.push('\n');
        }
        out
    }

    /// Write the rendered snapshot lines to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for snapshot in &self.snapshots {
            writeln!(writer, "{}", snapshot.render_line())?;
        }
        Ok(())
    }

    /// Write the rendered snapshot lines to a file at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()
    }
}
