//! Position guard
//!
//! Tracks which (market, outcome) pairs already hold an acquired position.
//! Owned by the scanner, which is the single writer; queried before every
//! trade attempt on every poll, so lookups stay O(1) expected.

use crate::market::OutcomeSide;
use std::collections::{HashMap, HashSet};

/// Per-run acquisition state
#[derive(Debug, Default)]
pub struct PositionGuard {
    positions: HashMap<String, HashSet<OutcomeSide>>,
}

impl PositionGuard {
    /// Create an empty guard
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a position exists for this market and outcome
    pub fn has_position(&self, market_id: &str, outcome: OutcomeSide) -> bool {
        self.positions
            .get(market_id)
            .is_some_and(|outcomes| outcomes.contains(&outcome))
    }

    /// Whether any outcome of this market holds a position
    pub fn any_position(&self, market_id: &str) -> bool {
        self.positions
            .get(market_id)
            .is_some_and(|outcomes| !outcomes.is_empty())
    }

    /// Record a successful (or simulated) acquisition. Entries never shrink
    /// while the market stays open.
    pub fn mark_acquired(&mut self, market_id: &str, outcome: OutcomeSide) {
        self.positions
            .entry(market_id.to_string())
            .or_default()
            .insert(outcome);
    }

    /// Drop entries for markets that have closed. Entries are only eligible
    /// for removal once their market is past close; correctness within a run
    /// never depends on this, it only bounds memory across many windows.
    pub fn release_closed<'a, I>(&mut self, closed: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in closed {
            self.positions.remove(id);
        }
    }

    /// Number of markets with at least one position
    pub fn market_count(&self) -> usize {
        self.positions.len()
    }
}
