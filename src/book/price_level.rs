//! Price level: FIFO queue of resting orders with a cached aggregate.
//!
//! # Invariant
//!
//! `total_quantity` MUST always equal the sum of the live queue entries,
//! and a level with zero live orders is removed from its side immediately.
//! The invariant is enforced through encapsulated mutation methods and
//! verified in debug builds via `verify_invariant()`.
//!
//! # Layout
//!
//! The queue pairs a `VecDeque` of slots with an order-id index, so cancel
//! locates its slot in O(1) while trade consumption still walks strict
//! arrival order. Removed slots become tombstones; tombstones at the front
//! are compacted eagerly, interior ones wait until the queue drains past
//! them. Each slot carries a monotone sequence number assigned at append
//! time; `head_seq` is the sequence of the current front, so a slot's
//! position is just `seq - head_seq`.
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `add_resting` | O(1) amortized |
//! | `cancel` | O(1) amortized |
//! | `consume` | O(orders consumed) |
//! | `total_quantity` | O(1) |

use std::collections::VecDeque;

use ahash::AHashMap;

use crate::types::RestingOrder;

#[derive(Debug, Clone)]
struct Slot {
    order_id: u64,
    quantity: u64,
    alive: bool,
}

/// One price level: aggregate quantity plus the FIFO queue behind it.
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    /// Resting orders in arrival order, including tombstones
    queue: VecDeque<Slot>,
    /// order_id → sequence number of its slot
    index: AHashMap<u64, u64>,
    /// Sequence number of the slot at the front of the queue
    head_seq: u64,
    /// Cached aggregate (invariant: == sum of live quantities)
    total_quantity: u64,
    /// Number of live (non-tombstone) slots
    live_orders: usize,
}

impl PriceLevel {
    /// Create a new empty price level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new resting order at the back of the queue (price-time
    /// priority: later arrivals are consumed after earlier ones).
    ///
    /// Returns `false` without mutating if the order id is already resting
    /// here.
    pub fn add_resting(&mut self, order_id: u64, quantity: u64) -> bool {
        if self.index.contains_key(&order_id) {
            return false;
        }
        let seq = self.head_seq + self.queue.len() as u64;
        self.queue.push_back(Slot {
            order_id,
            quantity,
            alive: true,
        });
        self.index.insert(order_id, seq);
        self.total_quantity = self.total_quantity.saturating_add(quantity);
        self.live_orders += 1;

        #[cfg(debug_assertions)]
        self.verify_invariant();

        true
    }

    /// Remove a resting order, returning its quantity, or `None` if the id
    /// is not resting at this level.
    pub fn cancel(&mut self, order_id: u64) -> Option<u64> {
        let seq = self.index.remove(&order_id)?;
        let pos = (seq - self.head_seq) as usize;
        let slot = &mut self.queue[pos];
        debug_assert!(slot.alive, "indexed slot must be live");
        slot.alive = false;
        let quantity = slot.quantity;
        self.total_quantity -= quantity;
        self.live_orders -= 1;
        self.compact_front();

        #[cfg(debug_assertions)]
        self.verify_invariant();

        Some(quantity)
    }

    /// Consume `quantity` from the front of the queue, oldest order first.
    ///
    /// All-or-nothing: returns `false` without any mutation when the level
    /// holds less than `quantity`. On success the walk stops as soon as the
    /// requested quantity is fully subtracted; orders driven to zero are
    /// removed.
    pub fn consume(&mut self, quantity: u64) -> bool {
        if quantity > self.total_quantity {
            return false;
        }
        let mut remaining = quantity;
        for slot in self.queue.iter_mut() {
            if remaining == 0 {
                break;
            }
            if !slot.alive {
                continue;
            }
            if slot.quantity <= remaining {
                remaining -= slot.quantity;
                slot.quantity = 0;
                slot.alive = false;
                self.index.remove(&slot.order_id);
                self.live_orders -= 1;
            } else {
                slot.quantity -= remaining;
                remaining = 0;
            }
        }
        debug_assert_eq!(remaining, 0, "aggregate guaranteed full consumption");
        self.total_quantity -= quantity;
        self.compact_front();

        #[cfg(debug_assertions)]
        self.verify_invariant();

        true
    }

    /// Drop tombstones off the front so `head_seq` tracks the live front.
    fn compact_front(&mut self) {
        while let Some(front) = self.queue.front() {
            if front.alive {
                break;
            }
            self.queue.pop_front();
            self.head_seq += 1;
        }
    }

    /// Cached aggregate quantity (O(1)).
    #[inline]
    pub fn total_quantity(&self) -> u64 {
        self.total_quantity
    }

    /// Check if the level has no live orders left.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live_orders == 0
    }

    /// Number of live resting orders.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.live_orders
    }

    /// Check if an order id is resting at this level.
    #[inline]
    pub fn contains(&self, order_id: u64) -> bool {
        self.index.contains_key(&order_id)
    }

    /// Live resting orders in arrival order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = RestingOrder> + '_ {
        self.queue.iter().filter(|s| s.alive).map(|s| RestingOrder {
            order_id: s.order_id,
            quantity: s.quantity,
        })
    }

    /// Compute the actual aggregate by summing live slots (O(n)).
    pub fn compute_actual_total(&self) -> u64 {
        self.queue
            .iter()
            .filter(|s| s.alive)
            .fold(0u64, |acc, s| acc.saturating_add(s.quantity))
    }

    /// Verify the aggregate invariant holds.
    #[cfg(debug_assertions)]
    pub fn verify_invariant(&self) {
        let actual = self.compute_actual_total();
        debug_assert_eq!(
            actual, self.total_quantity,
            "PriceLevel invariant violated: actual={}, cached={}",
            actual, self.total_quantity
        );
        let live = self.queue.iter().filter(|s| s.alive).count();
        debug_assert_eq!(live, self.live_orders);
    }

    #[cfg(not(debug_assertions))]
    pub fn verify_invariant(&self) {}
}
