//! One side of the book: an ordered index of price levels.
//!
//! Both sides share a single `BTreeMap` abstraction; the side only selects
//! the iteration direction (bids descend from the highest price, asks
//! ascend from the lowest). Prices are exact fixed-point keys, so map
//! equality never drifts across insert/update cycles.

use std::collections::BTreeMap;

use crate::book::price_level::PriceLevel;
use crate::error::{ReplayError, Result};
use crate::types::{Price, Side};

/// Ordered price → level index for one side of the book.
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<Price, PriceLevel>,
}

impl BookSide {
    /// Create an empty side.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Which side this index orders for.
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Rest a new order at `price`, creating the level if needed.
    ///
    /// O(log n) level lookup, O(1) append at the back of the queue.
    pub fn upsert(&mut self, price: Price, order_id: u64, quantity: u64) -> Result<()> {
        let level = self.levels.entry(price).or_default();
        if !level.add_resting(order_id, quantity) {
            // Only a pre-existing, populated level can report a duplicate
            return Err(ReplayError::DuplicateOrder {
                side: self.side,
                price,
                order_id,
            });
        }
        Ok(())
    }

    /// Remove the resting order `(price, order_id)`, returning its
    /// quantity. The level is deleted the instant its queue empties.
    pub fn cancel(&mut self, price: Price, order_id: u64) -> Result<u64> {
        let not_found = ReplayError::ReferenceNotFound {
            side: self.side,
            price,
            order_id,
        };
        let level = self.levels.get_mut(&price).ok_or(not_found)?;
        let quantity = level
            .cancel(order_id)
            .ok_or(ReplayError::ReferenceNotFound {
                side: self.side,
                price,
                order_id,
            })?;
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Ok(quantity)
    }

    /// Consume `quantity` from the level at `price`, front of queue first.
    ///
    /// `order_id` is carried for error context only; consumption follows
    /// price-time priority, not the id. All-or-nothing at the level.
    pub fn trade(&mut self, price: Price, order_id: u64, quantity: u64) -> Result<()> {
        let level = self
            .levels
            .get_mut(&price)
            .ok_or(ReplayError::ReferenceNotFound {
                side: self.side,
                price,
                order_id,
            })?;
        if !level.consume(quantity) {
            return Err(ReplayError::InsufficientQuantity {
                side: self.side,
                price,
                requested: quantity,
                available: level.total_quantity(),
            });
        }
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Ok(())
    }

    /// Up to `k` `(aggregate quantity, price)` pairs, best price first.
    ///
    /// Pure read; repeated calls between mutations return the same answer.
    pub fn top(&self, k: usize) -> Vec<(u64, Price)> {
        let mut out = Vec::with_capacity(k.min(self.levels.len()));
        match self.side {
            // Best bid = highest price (BTreeMap iterates ascending)
            Side::Buy => {
                for (&price, level) in self.levels.iter().rev().take(k) {
                    out.push((level.total_quantity(), price));
                }
            }
            // Best ask = lowest price
            Side::Sell => {
                for (&price, level) in self.levels.iter().take(k) {
                    out.push((level.total_quantity(), price));
                }
            }
        }
        out
    }

    /// Best price and its aggregate quantity.
    pub fn best(&self) -> Option<(Price, u64)> {
        let entry = match self.side {
            Side::Buy => self.levels.iter().next_back(),
            Side::Sell => self.levels.iter().next(),
        };
        entry.map(|(&price, level)| (price, level.total_quantity()))
    }

    /// Number of populated price levels.
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check if the side has no levels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Look up the level at `price`, if populated.
    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Verify the side-wide invariants: no empty level is indexed, and
    /// every cached aggregate matches its queue sum.
    pub fn check_integrity(&self) -> Result<()> {
        for (&price, level) in &self.levels {
            if level.is_empty() || level.total_quantity() == 0 {
                return Err(ReplayError::InvariantViolation(format!(
                    "{} side holds an empty level at {price}",
                    self.side
                )));
            }
            let actual = level.compute_actual_total();
            if actual != level.total_quantity() {
                return Err(ReplayError::InvariantViolation(format!(
                    "{} level {price}: cached aggregate {} != queue sum {actual}",
                    self.side,
                    level.total_quantity()
                )));
            }
        }
        Ok(())
    }
}
