//! Single-symbol order book: event dispatch and snapshot capture.
//!
//! The book owns one [`BookSide`] per side plus the snapshot recorder for
//! its replay run. Events are applied in log order; cancellation and trade
//! are forward-only corrections, never rollbacks. A recoverable rejection
//! (`ReferenceNotFound`, `InsufficientQuantity`, `DuplicateOrder`) leaves
//! the book byte-for-byte unchanged.

use serde::Serialize;

use crate::book::side::BookSide;
use crate::book::snapshot::{CaptureWindow, Snapshot, SnapshotRecorder};
use crate::error::Result;
use crate::types::{Category, OrderEvent, Price, Side};

/// Default number of price levels exposed per snapshot side.
pub const DEFAULT_DEPTH: usize = 5;

/// Configuration for order book behavior.
#[derive(Debug, Clone)]
pub struct BookConfig {
    /// Number of best price levels per side in captured snapshots
    pub depth: usize,

    /// Inclusive timestamp window during which snapshots are captured
    pub window: CaptureWindow,

    /// Re-verify the aggregate invariants after every applied event.
    /// Costs a full walk of both sides; meant for tests and debugging.
    pub check_invariants: bool,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            window: CaptureWindow::final_state(),
            check_invariants: false,
        }
    }
}

impl BookConfig {
    /// Create a config with the given snapshot depth.
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    /// Set the capture window.
    pub fn with_window(mut self, window: CaptureWindow) -> Self {
        self.window = window;
        self
    }

    /// Enable/disable per-event invariant verification.
    pub fn with_invariant_checks(mut self, check: bool) -> Self {
        self.check_invariants = check;
        self
    }
}

/// Counters for monitoring one book's replay.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookStats {
    /// Events applied successfully
    pub events_applied: u64,

    /// Events rejected with a recoverable error
    pub events_rejected: u64,

    /// Snapshots handed to the recorder (captures, not retained count)
    pub snapshots_captured: u64,

    /// Timestamp of the last applied event
    pub last_timestamp: Option<i64>,
}

/// A two-sided limit order book for exactly one symbol.
#[derive(Debug, Clone)]
pub struct OrderBook {
    symbol: String,
    config: BookConfig,
    bids: BookSide,
    asks: BookSide,
    recorder: SnapshotRecorder,
    stats: BookStats,
}

impl OrderBook {
    /// Create a book with default config (depth 5, final-state window).
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_config(symbol, BookConfig::default())
    }

    /// Create a book with custom configuration.
    pub fn with_config(symbol: impl Into<String>, config: BookConfig) -> Self {
        let recorder = SnapshotRecorder::new(config.window);
        Self {
            symbol: symbol.into(),
            config,
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            recorder,
            stats: BookStats::default(),
        }
    }

    /// The symbol this book tracks.
    #[inline]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Current configuration.
    #[inline]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Apply one event to the book.
    ///
    /// Dispatches on category:
    /// - NEW → rest the order at the back of its price level's queue
    /// - CANCEL → remove the resting `(price, order_id)` entirely
    /// - TRADE → consume quantity from the front of the level at `price`
    ///
    /// On success, if the event timestamp falls inside the capture window,
    /// a depth snapshot is taken and handed to the recorder. On a
    /// recoverable error the book state is exactly what it was before the
    /// call; the caller decides whether to log-and-continue or halt.
    pub fn apply(&mut self, event: &OrderEvent) -> Result<()> {
        if let Err(err) = self.dispatch(event) {
            if err.is_recoverable() {
                self.stats.events_rejected += 1;
            }
            return Err(err);
        }

        self.stats.events_applied += 1;
        self.stats.last_timestamp = Some(event.timestamp);

        if self.config.check_invariants {
            self.check_integrity()?;
        }

        if self.config.window.contains(event.timestamp) {
            let snapshot = self.snapshot_at(self.config.depth, event.timestamp);
            self.recorder.capture(snapshot);
            self.stats.snapshots_captured += 1;
        }

        Ok(())
    }

    fn dispatch(&mut self, event: &OrderEvent) -> Result<()> {
        let side = match event.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        match event.category {
            Category::New => side.upsert(event.price, event.order_id, event.quantity),
            Category::Cancel => side.cancel(event.price, event.order_id).map(|_| ()),
            Category::Trade => side.trade(event.price, event.order_id, event.quantity),
        }
    }

    /// Take a depth snapshot of the current state. Pure read.
    pub fn snapshot(&self, depth: usize) -> Snapshot {
        self.snapshot_at(depth, self.stats.last_timestamp.unwrap_or(0))
    }

    fn snapshot_at(&self, depth: usize, timestamp: i64) -> Snapshot {
        Snapshot {
            timestamp,
            symbol: self.symbol.clone(),
            bids: self.bids.top(depth),
            asks: self.asks.top(depth),
        }
    }

    /// Best bid price and aggregate quantity.
    pub fn best_bid(&self) -> Option<(Price, u64)> {
        self.bids.best()
    }

    /// Best ask price and aggregate quantity.
    pub fn best_ask(&self) -> Option<(Price, u64)> {
        self.asks.best()
    }

    /// Number of populated bid levels.
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Number of populated ask levels.
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// Replay counters.
    pub fn stats(&self) -> &BookStats {
        &self.stats
    }

    /// Snapshots retained so far.
    pub fn recorder(&self) -> &SnapshotRecorder {
        &self.recorder
    }

    /// Consume the book, yielding its recorder for flushing.
    pub fn into_recorder(self) -> SnapshotRecorder {
        self.recorder
    }

    /// Verify both sides' aggregate invariants.
    ///
    /// A failure here is fatal for the instance: the book's state can no
    /// longer be trusted and processing for this symbol must stop.
    pub fn check_integrity(&self) -> Result<()> {
        self.bids.check_integrity()?;
        self.asks.check_integrity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReplayError;

    fn price(s: &str) -> Price {
        s.parse().unwrap()
    }

    fn event(
        timestamp: i64,
        order_id: u64,
        side: Side,
        category: Category,
        price_text: &str,
        quantity: u64,
    ) -> OrderEvent {
        OrderEvent::new(
            timestamp,
            order_id,
            "SCH",
            side,
            category,
            price(price_text),
            quantity,
        )
    }

    /// The §spec round-trip scenario: five NEW events, then check top-of-book.
    fn populated_book() -> OrderBook {
        let mut book = OrderBook::new("SCH");
        book.apply(&event(1, 1, Side::Buy, Category::New, "9.9", 20))
            .unwrap();
        book.apply(&event(2, 2, Side::Sell, Category::New, "9.7", 30))
            .unwrap();
        book.apply(&event(3, 3, Side::Buy, Category::New, "9.5", 5))
            .unwrap();
        book.apply(&event(4, 4, Side::Buy, Category::New, "9.9", 40))
            .unwrap();
        book.apply(&event(5, 5, Side::Sell, Category::New, "9.7", 15))
            .unwrap();
        book
    }

    #[test]
    fn test_round_trip_scenario_top_of_book() {
        let book = populated_book();
        let snapshot = book.snapshot(2);
        assert_eq!(snapshot.bids, vec![(60, price("9.9")), (5, price("9.5"))]);
        assert_eq!(snapshot.asks, vec![(45, price("9.7"))]);
        assert_eq!(book.best_bid(), Some((price("9.9"), 60)));
        assert_eq!(book.best_ask(), Some((price("9.7"), 45)));
    }

    #[test]
    fn test_snapshot_is_pure_read() {
        let book = populated_book();
        let first = book.snapshot(5);
        let second = book.snapshot(5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cancel_requires_original_price() {
        let mut book = populated_book();
        // Order 1 rests at 9.9; naming any other price is ReferenceNotFound
        let err = book
            .apply(&event(6, 1, Side::Buy, Category::Cancel, "9.5", 0))
            .unwrap_err();
        assert!(matches!(err, ReplayError::ReferenceNotFound { .. }));
        assert_eq!(book.stats().events_rejected, 1);
        // Book unchanged
        assert_eq!(book.best_bid(), Some((price("9.9"), 60)));
        assert_eq!(book.snapshot(1).bids, vec![(60, price("9.9"))]);
    }

    #[test]
    fn test_trade_consumes_price_time_priority() {
        let mut book = OrderBook::new("SCH");
        book.apply(&event(1, 1, Side::Buy, Category::New, "9.5", 4))
            .unwrap();
        book.apply(&event(2, 2, Side::Buy, Category::New, "9.5", 6))
            .unwrap();
        book.apply(&event(3, 9, Side::Buy, Category::Trade, "9.5", 5))
            .unwrap();

        let level_quantity = book.snapshot(1).bids[0].0;
        assert_eq!(level_quantity, 5);
        // id1 was fully consumed before id2 was touched
        let mut book2 = book.clone();
        assert!(book2
            .apply(&event(4, 2, Side::Buy, Category::Cancel, "9.5", 0))
            .is_ok());
        assert_eq!(book2.bid_levels(), 0);
    }

    #[test]
    fn test_trade_rejection_is_atomic() {
        let mut book = populated_book();
        let err = book
            .apply(&event(6, 9, Side::Sell, Category::Trade, "9.7", 46))
            .unwrap_err();
        assert!(matches!(err, ReplayError::InsufficientQuantity { .. }));
        assert_eq!(book.snapshot(1).asks, vec![(45, price("9.7"))]);
        book.check_integrity().unwrap();
    }

    #[test]
    fn test_rejected_event_takes_no_snapshot() {
        let config = BookConfig::new(5).with_window(CaptureWindow::new(1, 100));
        let mut book = OrderBook::with_config("SCH", config);
        book.apply(&event(1, 1, Side::Buy, Category::New, "9.9", 20))
            .unwrap();
        let captured = book.stats().snapshots_captured;
        let _ = book.apply(&event(2, 2, Side::Buy, Category::Cancel, "9.9", 0));
        assert_eq!(book.stats().snapshots_captured, captured);
        assert_eq!(book.recorder().len(), 1);
    }

    #[test]
    fn test_final_only_window_keeps_last_state() {
        let config = BookConfig::new(2).with_window(CaptureWindow::new(0, 4));
        let mut book = OrderBook::with_config("SCH", config);
        book.apply(&event(1, 1, Side::Buy, Category::New, "9.9", 20))
            .unwrap();
        book.apply(&event(2, 2, Side::Sell, Category::New, "9.7", 30))
            .unwrap();
        book.apply(&event(3, 3, Side::Buy, Category::New, "9.5", 5))
            .unwrap();
        // Outside the window: applied but not captured
        book.apply(&event(5, 4, Side::Buy, Category::New, "9.9", 40))
            .unwrap();

        let recorder = book.recorder();
        assert_eq!(recorder.len(), 1);
        let last = &recorder.snapshots()[0];
        assert_eq!(last.timestamp, 3);
        assert_eq!(last.bids, vec![(20, price("9.9")), (5, price("9.5"))]);
    }

    #[test]
    fn test_ranged_window_captures_each_event() {
        let config = BookConfig::new(5).with_window(CaptureWindow::new(2, 4));
        let mut book = OrderBook::with_config("SCH", config);
        for (ts, id) in [(1i64, 1u64), (2, 2), (3, 3), (4, 4), (5, 5)] {
            book.apply(&event(ts, id, Side::Buy, Category::New, "9.9", 10))
                .unwrap();
        }
        let times: Vec<i64> = book
            .recorder()
            .snapshots()
            .iter()
            .map(|s| s.timestamp)
            .collect();
        assert_eq!(times, vec![2, 3, 4]);
    }

    #[test]
    fn test_depth_truncation() {
        let mut book = OrderBook::new("SCH");
        for (i, p) in ["9.1", "9.2", "9.3", "9.4", "9.5", "9.6", "9.7"]
            .iter()
            .enumerate()
        {
            book.apply(&event(i as i64 + 1, i as u64 + 1, Side::Buy, Category::New, p, 10))
                .unwrap();
        }
        let snapshot = book.snapshot(5);
        assert_eq!(snapshot.bids.len(), 5);
        assert_eq!(snapshot.bids[0].1, price("9.7"));
        assert_eq!(snapshot.bids[4].1, price("9.3"));
    }

    #[test]
    fn test_integrity_check_passes_after_replay() {
        let config = BookConfig::new(5).with_invariant_checks(true);
        let mut book = OrderBook::with_config("SCH", config);
        book.apply(&event(1, 1, Side::Buy, Category::New, "9.9", 20))
            .unwrap();
        book.apply(&event(2, 2, Side::Buy, Category::New, "9.9", 40))
            .unwrap();
        book.apply(&event(3, 9, Side::Buy, Category::Trade, "9.9", 25))
            .unwrap();
        book.apply(&event(4, 2, Side::Buy, Category::Cancel, "9.9", 0))
            .unwrap();
        assert_eq!(book.bid_levels(), 0);
    }

    #[test]
    fn test_stats_accounting() {
        let mut book = populated_book();
        let _ = book.apply(&event(6, 99, Side::Buy, Category::Cancel, "9.9", 0));
        let stats = book.stats();
        assert_eq!(stats.events_applied, 5);
        assert_eq!(stats.events_rejected, 1);
        assert_eq!(stats.last_timestamp, Some(5));
    }
}
