//! Event log parsing and the replay driver.
//!
//! Input is a flat UTF-8 text log, one event per line, seven
//! whitespace-delimited fields:
//!
//! ```text
//! <timestamp> <orderId> <symbol> <BUY|SELL> <NEW|CANCEL|TRADE> <price> <quantity>
//! ```
//!
//! Malformed lines never reach the book: they are counted, logged, and
//! skipped. Rejected events (`ReferenceNotFound`, `InsufficientQuantity`,
//! `DuplicateOrder`) are likewise logged and skipped — the reference
//! behavior is log-and-continue. Only a fatal error (an invariant
//! violation or I/O failure) aborts the run.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::book::OrderBook;
use crate::error::{ReplayError, Result};
use crate::types::{Category, OrderEvent, Price, Side};

/// Number of fields in an input event record.
const EVENT_FIELDS: usize = 7;

/// Parse one log line into an [`OrderEvent`].
///
/// Extra tokens beyond the seventh are ignored, matching the source log
/// format; fewer than seven is a parse error.
pub fn parse_event(line: &str) -> Result<OrderEvent> {
    let tokens: Vec<&str> = line.split_whitespace().take(EVENT_FIELDS).collect();
    if tokens.len() < EVENT_FIELDS {
        return Err(ReplayError::Parse(format!(
            "expected {EVENT_FIELDS} fields, got {}",
            tokens.len()
        )));
    }

    let timestamp: i64 = tokens[0]
        .parse()
        .map_err(|_| ReplayError::Parse(format!("timestamp '{}'", tokens[0])))?;
    let order_id: u64 = tokens[1]
        .parse()
        .map_err(|_| ReplayError::Parse(format!("order id '{}'", tokens[1])))?;
    let symbol = tokens[2];
    let side = Side::from_token(tokens[3])
        .ok_or_else(|| ReplayError::Parse(format!("side '{}'", tokens[3])))?;
    let category = Category::from_token(tokens[4])
        .ok_or_else(|| ReplayError::Parse(format!("category '{}'", tokens[4])))?;
    let price: Price = tokens[5].parse()?;
    let quantity: u64 = tokens[6]
        .parse()
        .map_err(|_| ReplayError::Parse(format!("quantity '{}'", tokens[6])))?;

    let event = OrderEvent::new(timestamp, order_id, symbol, side, category, price, quantity);
    event.validate()?;
    Ok(event)
}

/// Counters for one replay run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayStats {
    /// Lines read from the input
    pub lines_read: u64,

    /// Lines skipped because they failed to parse
    pub parse_errors: u64,

    /// Events applied to the book
    pub events_applied: u64,

    /// Events the book rejected (reference not found, insufficient
    /// quantity, duplicate id)
    pub events_rejected: u64,

    /// Well-formed events for a symbol other than the book's
    pub other_symbols: u64,
}

impl ReplayStats {
    /// Save the counters as pretty-printed JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

/// Feeds parsed events to one order book in log order.
pub struct Replayer {
    book: OrderBook,
    stats: ReplayStats,
    last_timestamp: Option<i64>,
}

impl Replayer {
    /// Create a replayer driving the given book.
    pub fn new(book: OrderBook) -> Self {
        Self {
            book,
            stats: ReplayStats::default(),
            last_timestamp: None,
        }
    }

    /// The book being driven.
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Counters so far.
    pub fn stats(&self) -> &ReplayStats {
        &self.stats
    }

    /// Process one input line.
    ///
    /// Recoverable problems are absorbed here (counted and logged);
    /// only fatal errors propagate.
    pub fn replay_line(&mut self, line: &str) -> Result<()> {
        self.stats.lines_read += 1;

        let event = match parse_event(line) {
            Ok(event) => event,
            Err(err) => {
                self.stats.parse_errors += 1;
                log::warn!("skipping line {}: {err}", self.stats.lines_read);
                return Ok(());
            }
        };

        // One book instance handles exactly one symbol
        if event.symbol != self.book.symbol() {
            self.stats.other_symbols += 1;
            return Ok(());
        }

        if let Some(last) = self.last_timestamp {
            if event.timestamp < last {
                log::debug!(
                    "timestamp regression at line {}: {} < {last}",
                    self.stats.lines_read,
                    event.timestamp
                );
            }
        }
        self.last_timestamp = Some(event.timestamp);

        match self.book.apply(&event) {
            Ok(()) => self.stats.events_applied += 1,
            Err(err) if err.is_recoverable() => {
                self.stats.events_rejected += 1;
                log::warn!(
                    "rejected {} for order {} at {}: {err}",
                    event.category,
                    event.order_id,
                    event.price
                );
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }

    /// Replay every line from a reader.
    pub fn replay_from<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for line in reader.lines() {
            let line = line?;
            self.replay_line(&line)?;
        }
        Ok(())
    }

    /// Replay an event log file.
    pub fn replay_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::open(path)?;
        self.replay_from(BufReader::new(file))
    }

    /// Finish the run, yielding the book and the counters.
    pub fn finish(self) -> (OrderBook, ReplayStats) {
        (self.book, self.stats)
    }
}
