//! Error types for order book replay.
//!
//! Clean error handling using `thiserror` for ergonomic error definitions.
//!
//! Two of the variants are recoverable by design: a `ReferenceNotFound` or
//! `InsufficientQuantity` leaves the book exactly as it was, so the replayer
//! can log the rejected event and continue. `InvariantViolation` is fatal to
//! the book instance — once the cached aggregates and the queues disagree,
//! nothing downstream can be trusted.

use thiserror::Error;

use crate::types::{Price, Side};

/// Result type alias for replay operations.
pub type Result<T> = std::result::Result<T, ReplayError>;

/// Main error type for order book replay.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// Malformed input line; never reaches the book
    #[error("parse error: {0}")]
    Parse(String),

    /// A CANCEL or TRADE named a price/order with no matching resting state
    #[error("no resting order at {side} {price} matching order {order_id}")]
    ReferenceNotFound {
        side: Side,
        price: Price,
        order_id: u64,
    },

    /// A TRADE requested more quantity than rests at the named price
    #[error("trade for {requested} exceeds {available} resting at {side} {price}")]
    InsufficientQuantity {
        side: Side,
        price: Price,
        requested: u64,
        available: u64,
    },

    /// A NEW named an order id already resting at the price
    #[error("order {order_id} already resting at {side} {price}")]
    DuplicateOrder {
        side: Side,
        price: Price,
        order_id: u64,
    },

    /// Cached aggregates and queue contents diverged (fatal)
    #[error("book invariant violated: {0}")]
    InvariantViolation(String),

    /// I/O failure in the replay layer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReplayError {
    /// Whether the book is left intact and replay may continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ReplayError::Parse(_)
                | ReplayError::ReferenceNotFound { .. }
                | ReplayError::InsufficientQuantity { .. }
                | ReplayError::DuplicateOrder { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReplayError::ReferenceNotFound {
            side: Side::Buy,
            price: Price::from_ticks(95_000),
            order_id: 42,
        };
        assert_eq!(
            err.to_string(),
            "no resting order at BUY 9.5 matching order 42"
        );
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(ReplayError::Parse("short line".into()).is_recoverable());
        assert!(ReplayError::InsufficientQuantity {
            side: Side::Sell,
            price: Price::from_ticks(97_000),
            requested: 50,
            available: 45,
        }
        .is_recoverable());
        assert!(!ReplayError::InvariantViolation("aggregate drift".into()).is_recoverable());
    }
}
