//! # lob-replay
//!
//! Reconstructs a two-sided limit order book from a sequential log of order
//! events and produces point-in-time or ranged depth snapshots.
//!
//! ## Features
//!
//! - **Exact prices**: fixed-point [`Price`] keys, parsed digit-wise — no
//!   floating-point drift across insert/aggregate cycles
//! - **Price-time priority**: each level keeps a FIFO queue with a cached
//!   aggregate and an O(1) order-id index
//! - **Forward-only event machine**: NEW / CANCEL / TRADE dispatch with
//!   all-or-nothing rejection semantics
//! - **Windowed snapshot capture**: final-state or every-event-in-range
//!   retention, rendered as flat text lines
//!
//! ## Quick Start
//!
//! ```rust
//! use lob_replay::{BookConfig, CaptureWindow, OrderBook, Replayer};
//!
//! let log = "\
//! 1 1 SCH BUY NEW 9.9 20
//! 2 2 SCH SELL NEW 9.7 30
//! 3 3 SCH BUY NEW 9.5 5
//! ";
//!
//! let config = BookConfig::new(5).with_window(CaptureWindow::new(0, 10));
//! let mut replayer = Replayer::new(OrderBook::with_config("SCH", config));
//! replayer.replay_from(log.as_bytes()).unwrap();
//!
//! let (book, stats) = replayer.finish();
//! assert_eq!(stats.events_applied, 3);
//! for line in book.into_recorder().render().lines() {
//!     println!("{line}");
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Core types: `OrderEvent`, `Price`, `Side`, `Category` |
//! | [`book`] | The state engine: `OrderBook`, `BookSide`, `PriceLevel`, snapshots |
//! | [`replay`] | Log parsing and the `Replayer` driver |
//! | [`error`] | `ReplayError` taxonomy and `Result` alias |
//!
//! ## Model notes
//!
//! One book instance handles exactly one symbol; replay is single-threaded
//! and sequential, with events presented in non-decreasing timestamp order.
//! CANCEL and TRADE must name the resting price of the originating NEW —
//! there is no cross-level search by order id.

pub mod book;
pub mod error;
pub mod replay;
pub mod types;

// Re-exports - errors
pub use error::{ReplayError, Result};

// Re-exports - core types
pub use types::{Category, OrderEvent, Price, RestingOrder, Side, PRICE_DECIMALS, PRICE_SCALE};

// Re-exports - book engine
pub use book::{
    BookConfig, BookSide, BookStats, CaptureWindow, OrderBook, PriceLevel, Snapshot,
    SnapshotRecorder, DEFAULT_DEPTH,
};

// Re-exports - replay driver
pub use replay::{parse_event, ReplayStats, Replayer};
