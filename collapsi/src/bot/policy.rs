use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Difficulty;

/// Budgets for one minimax search.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Deepest iteration, in whole turns. `None` deepens until the result
    /// is exact or time runs out.
    pub max_depth: Option<u32>,
    pub time_budget: Duration,
}

/// How a bot of some difficulty picks its moves.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierPolicy {
    /// Chance per turn of searching instead of walking randomly.
    pub search_probability: f64,
    pub limits: SearchLimits,
}

impl TierPolicy {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let (search_probability, max_depth, millis) = match difficulty {
            Difficulty::Random => (0.0, Some(0), 0),
            Difficulty::Easy => (0.33, Some(6), 400),
            Difficulty::Medium => (0.67, Some(7), 600),
            Difficulty::Hard => (1.0, None, 3000),
        };
        Self {
            search_probability,
            limits: SearchLimits {
                max_depth,
                time_budget: Duration::from_millis(millis),
            },
        }
    }

    /// The same policy with the time budget multiplied by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        let millis = self.limits.time_budget.as_millis() as f64 * factor.max(0.0);
        self.with_time_budget(Duration::from_millis(millis.round() as u64))
    }

    pub fn with_time_budget(self, time_budget: Duration) -> Self {
        Self {
            limits: SearchLimits {
                time_budget,
                ..self.limits
            },
            ..self
        }
    }
}
