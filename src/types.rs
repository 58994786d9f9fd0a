//! Core data types for order events and resting state.
//!
//! Prices are fixed-point integers, never `f64`: the book keys its price
//! levels by exact value, and repeated insert/aggregate cycles must not
//! drift. `Price` parses decimal text digit-wise and renders the exact
//! decimal back out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReplayError;

/// Implied decimal places in a [`Price`] tick value.
pub const PRICE_DECIMALS: u32 = 4;

/// Ticks per whole unit of price (10^[`PRICE_DECIMALS`]).
pub const PRICE_SCALE: i64 = 10_000;

/// Order side (bid or ask half of the book).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Parse a side from its log token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "BUY" => Some(Side::Buy),
            "SELL" => Some(Side::Sell),
            _ => None,
        }
    }

    /// The log token for this side.
    pub fn as_token(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }

    /// Check if this is the bid side.
    #[inline]
    pub fn is_buy(self) -> bool {
        matches!(self, Side::Buy)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Event category (what happened to the order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// A new order joins the back of its price level's queue
    New,
    /// A resting order is removed in full
    Cancel,
    /// Quantity is consumed from the front of a price level
    Trade,
}

impl Category {
    /// Parse a category from its log token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "NEW" => Some(Category::New),
            "CANCEL" => Some(Category::Cancel),
            "TRADE" => Some(Category::Trade),
            _ => None,
        }
    }

    /// The log token for this category.
    pub fn as_token(self) -> &'static str {
        match self {
            Category::New => "NEW",
            Category::Cancel => "CANCEL",
            Category::Trade => "TRADE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Fixed-point price, [`PRICE_DECIMALS`] implied decimal places.
///
/// Total order and equality are exact integer comparisons, so `Price` is
/// safe as an ordered-map key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(i64);

impl Price {
    /// Construct from a raw tick count.
    #[inline]
    pub const fn from_ticks(ticks: i64) -> Self {
        Price(ticks)
    }

    /// Raw tick count.
    #[inline]
    pub const fn ticks(self) -> i64 {
        self.0
    }

    /// Whether the price is strictly positive.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl FromStr for Price {
    type Err = ReplayError;

    /// Parse a decimal price such as `9.5` or `101.25` without going
    /// through floating point.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = |reason: &str| ReplayError::Parse(format!("price '{s}': {reason}"));

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(bad("empty"));
        }
        if frac_part.len() > PRICE_DECIMALS as usize {
            return Err(bad("more than 4 decimal places"));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(bad("not an unsigned decimal"));
        }

        let mut ticks: i64 = 0;
        if !int_part.is_empty() {
            let whole: i64 = int_part.parse().map_err(|_| bad("integer part overflows"))?;
            ticks = whole
                .checked_mul(PRICE_SCALE)
                .ok_or_else(|| bad("out of range"))?;
        }
        if !frac_part.is_empty() {
            // "25" at scale 4 means 2500 ticks
            let frac: i64 = frac_part.parse().map_err(|_| bad("fraction overflows"))?;
            let shift = 10i64.pow(PRICE_DECIMALS - frac_part.len() as u32);
            ticks = ticks
                .checked_add(frac * shift)
                .ok_or_else(|| bad("out of range"))?;
        }
        Ok(Price(ticks))
    }
}

impl fmt::Display for Price {
    /// Render the exact decimal value, trailing zeros trimmed (`9.5`, not
    /// `9.5000`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / PRICE_SCALE;
        let frac = (self.0 % PRICE_SCALE).abs();
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            let mut digits = format!("{frac:04}");
            while digits.ends_with('0') {
                digits.pop();
            }
            write!(f, "{whole}.{digits}")
        }
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Price({self})")
    }
}

/// A single order book event, immutable once constructed.
///
/// CANCEL and TRADE events reference a prior NEW by order id *and* price:
/// the book always looks a resting order up through its price level, never
/// by id alone across levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Log-order key, non-decreasing across the event log
    pub timestamp: i64,

    /// Identifier, unique among currently-resting orders on one side
    pub order_id: u64,

    /// Instrument symbol
    pub symbol: String,

    /// Which half of the book the event targets
    pub side: Side,

    /// What happened to the order
    pub category: Category,

    /// Resting price (for CANCEL/TRADE: the originating NEW's price)
    pub price: Price,

    /// Order or execution quantity
    pub quantity: u64,
}

impl OrderEvent {
    /// Create a new event.
    pub fn new(
        timestamp: i64,
        order_id: u64,
        symbol: impl Into<String>,
        side: Side,
        category: Category,
        price: Price,
        quantity: u64,
    ) -> Self {
        Self {
            timestamp,
            order_id,
            symbol: symbol.into(),
            side,
            category,
            price,
            quantity,
        }
    }

    /// Validate field ranges before the event reaches the book.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.order_id == 0 {
            return Err(ReplayError::Parse("order id must be non-zero".into()));
        }
        if !self.price.is_positive() {
            return Err(ReplayError::Parse(format!(
                "price {} must be positive",
                self.price
            )));
        }
        if self.quantity == 0 && self.category != Category::Cancel {
            return Err(ReplayError::Parse(format!(
                "{} event with zero quantity",
                self.category
            )));
        }
        Ok(())
    }
}

/// A resting order as seen in a price level's FIFO queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestingOrder {
    pub order_id: u64,
    pub quantity: u64,
}
