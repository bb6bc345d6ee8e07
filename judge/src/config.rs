use std::path::Path;

use collapsi::{Difficulty, SetupPolicy, TierPolicy};
use serde::{Deserialize, Serialize};

/// Settings for a series of bot games, loaded from JSON and/or the command line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub board_size: u8,
    /// One bot per seat, by difficulty.
    pub bots: Vec<Difficulty>,
    pub num_games: usize,
    pub seed: Option<u64>,
    /// Allow any board size / player count that fills the board.
    pub relaxed_pairing: bool,
    /// Multiplies every bot's thinking time.
    pub time_scale: f64,
    /// Run the bots' searches on worker threads.
    pub background_search: bool,
    /// Pause after each step, in milliseconds.
    pub step_delay_ms: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            board_size: 4,
            bots: vec![Difficulty::Hard, Difficulty::Random],
            num_games: 10,
            seed: None,
            relaxed_pairing: false,
            time_scale: 1.0,
            background_search: false,
            step_delay_ms: 0,
        }
    }
}

impl MatchConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn setup_policy(&self) -> SetupPolicy {
        if self.relaxed_pairing {
            SetupPolicy::Relaxed
        } else {
            SetupPolicy::Standard
        }
    }

    /// The policy of a bot, with its time budget scaled.
    pub fn tier_policy(&self, difficulty: Difficulty) -> TierPolicy {
        TierPolicy::for_difficulty(difficulty).scaled(self.time_scale)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            anyhow::bail!("Time scale must be a non-negative number, not {}", self.time_scale);
        }
        if self.num_games == 0 {
            anyhow::bail!("At least one game must be played");
        }
        self.setup_policy()
            .validate(self.bots.len(), self.board_size)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: MatchConfig =
            serde_json::from_str(r#"{"board_size": 5, "bots": [1, 3, 4]}"#).unwrap();
        assert_eq!(config.board_size, 5);
        assert_eq!(
            config.bots,
            vec![Difficulty::Random, Difficulty::Medium, Difficulty::Hard]
        );
        assert_eq!(config.num_games, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_difficulty() {
        assert!(serde_json::from_str::<MatchConfig>(r#"{"bots": [0, 2]}"#).is_err());
    }

    #[test]
    fn pairing_depends_on_the_flag() {
        let mut config = MatchConfig {
            board_size: 6,
            ..MatchConfig::default()
        };
        assert!(config.validate().is_err());
        config.bots = vec![Difficulty::Easy; 4];
        assert!(config.validate().is_ok());

        config.board_size = 4;
        assert!(config.validate().is_err());
        config.relaxed_pairing = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn scaled_policies() {
        let config = MatchConfig {
            time_scale: 0.1,
            ..MatchConfig::default()
        };
        let policy = config.tier_policy(Difficulty::Medium);
        assert_eq!(policy.limits.time_budget.as_millis(), 60);
    }
}
