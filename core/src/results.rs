use std::time::Duration;

use crate::strategy::Strategy;

/// Elapsed time of one strategy, or `None` when its output was rejected.
pub type StrategyResult = Option<Duration>;

/// Outcome of one harness run: one slot per strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Results {
    time_sequential: StrategyResult,
    time_per_vector: StrategyResult,
    time_shuffle: StrategyResult,
    time_dynamic: StrategyResult,
    time_static: StrategyResult,
}

impl Results {
    pub fn new(
        time_sequential: StrategyResult,
        time_per_vector: StrategyResult,
        time_shuffle: StrategyResult,
        time_dynamic: StrategyResult,
        time_static: StrategyResult,
    ) -> Self {
        Self {
            time_sequential,
            time_per_vector,
            time_shuffle,
            time_dynamic,
            time_static,
        }
    }

    pub fn get(&self, strategy: Strategy) -> StrategyResult {
        match strategy {
            Strategy::Sequential => self.time_sequential,
            Strategy::PerVector => self.time_per_vector,
            Strategy::Shuffle => self.time_shuffle,
            Strategy::Dynamic => self.time_dynamic,
            Strategy::Static => self.time_static,
        }
    }

    pub fn is_valid(&self, strategy: Strategy) -> bool {
        self.get(strategy).is_some()
    }

    /// Slots in [`Strategy::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Strategy, StrategyResult)> + '_ {
        Strategy::ALL.into_iter().map(|strategy| (strategy, self.get(strategy)))
    }

    pub fn validity(&self) -> [bool; 5] {
        Strategy::ALL.map(|strategy| self.is_valid(strategy))
    }
}
