//! Order book state engine: price levels, sides, the book, and snapshots.

pub mod book;
pub mod price_level;
pub mod side;
pub mod snapshot;

pub use book::{BookConfig, BookStats, OrderBook, DEFAULT_DEPTH};
pub use price_level::PriceLevel;
pub use side::BookSide;
pub use snapshot::{CaptureWindow, Snapshot, SnapshotRecorder};
