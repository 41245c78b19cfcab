//! Weighted random choice over a fixed outcome table.

use rand::rngs::StdRng;
use rand::Rng;

/// A static table of `(outcome, weight)` pairs.
///
/// One roll in `0..total` is drawn and walked through the cumulative
/// weights, so a table with weights `[15, 45]` maps rolls `0..15` to the
/// first outcome and `15..60` to the second.
#[derive(Debug, Clone, Copy)]
pub struct WeightedTable<T: 'static> {
    entries: &'static [(T, u32)],
}

impl<T: Copy + 'static> WeightedTable<T> {
    pub const fn new(entries: &'static [(T, u32)]) -> Self {
        Self { entries }
    }

    /// Sum of all weights.
    pub fn total(&self) -> u32 {
        self.entries.iter().map(|(_, weight)| weight).sum()
    }

    /// Outcome selected by a roll in `0..total`.
    pub fn outcome_for(&self, roll: u32) -> Option<T> {
        let mut remaining = roll;
        for &(outcome, weight) in self.entries {
            if remaining < weight {
                return Some(outcome);
            }
            remaining -= weight;
        }
        None
    }

    /// Draws one outcome. Returns `None` only for a table with zero total weight.
    pub fn choose(&self, rng: &mut StdRng) -> Option<T> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        self.outcome_for(rng.gen_range(0..total))
    }
}
