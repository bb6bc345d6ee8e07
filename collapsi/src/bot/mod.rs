//! Computer players.
//!
//! A [`BotPlayer`] plans a whole turn up front with [`BotPlayer::plan_turn`]
//! and then hands out one step at a time through [`BotPlayer::next_step`],
//! so a driver can refresh its display between steps like for a human.

mod eval;
mod policy;
mod search;
mod worker;

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use eval::evaluate;
pub use policy::*;
pub use search::*;
pub use worker::*;

use crate::{Color, Coord, Difficulty, GameError, GameState, InvalidState, Speculation};

/// How a turn was chosen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Random,
    Search,
}

/// The steps a bot intends to take this turn.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlannedTurn {
    pub player: Color,
    pub steps: Vec<Coord>,
    pub strategy: Strategy,
    /// Present when the turn was searched.
    pub report: Option<SearchReport>,
}

pub struct BotPlayer {
    policy: TierPolicy,
    rng: StdRng,
    planned_for: Option<Color>,
    pending: VecDeque<Coord>,
}

impl BotPlayer {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_policy(
            TierPolicy::for_difficulty(difficulty),
            StdRng::seed_from_u64(seed),
        )
    }

    pub fn with_policy(policy: TierPolicy, rng: StdRng) -> Self {
        Self {
            policy,
            rng,
            planned_for: None,
            pending: VecDeque::new(),
        }
    }

    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }

    /// Decides the rest of the current player's turn.
    ///
    /// Depending on the policy this is either a search or a random walk
    /// that picks uniformly among the legal steps at every step. `state` is
    /// only borrowed as scratch space and is left as it was.
    pub fn plan_turn(
        &mut self,
        state: &mut GameState,
        deadline: Option<Instant>,
        stop: Option<&AtomicBool>,
    ) -> Result<PlannedTurn, GameError> {
        if state.is_over() {
            return Err(InvalidState::GameOver.into());
        }
        let player = state.current_player().color;
        let probability = self.policy.search_probability.clamp(0.0, 1.0);
        let plan = if self.rng.gen_bool(probability) {
            let report = search_best_path(state, &self.policy.limits, deadline, stop)?;
            PlannedTurn {
                player,
                steps: report.path.steps.clone(),
                strategy: Strategy::Search,
                report: Some(report),
            }
        } else {
            PlannedTurn {
                player,
                steps: self.random_walk(state)?,
                strategy: Strategy::Random,
                report: None,
            }
        };
        debug!(%player, strategy = ?plan.strategy, steps = plan.steps.len(), "Planned turn");
        self.adopt(&plan);
        Ok(plan)
    }

    /// Queues the steps of a plan made elsewhere, e.g. by a [`BotWorker`].
    pub fn adopt(&mut self, plan: &PlannedTurn) {
        self.planned_for = Some(plan.player);
        self.pending = plan.steps.iter().copied().collect();
    }

    /// The next planned step for the player whose turn it is.
    pub fn next_step(&mut self, state: &GameState) -> Result<Coord, GameError> {
        let current = state.current_player().color;
        match self.planned_for {
            Some(bot) if bot != current => {
                return Err(InvalidState::NotBotsTurn { bot, current }.into())
            }
            None => return Err(InvalidState::NoPlannedStep.into()),
            Some(_) => {}
        }
        let step = self.pending.pop_front().ok_or(InvalidState::NoPlannedStep)?;
        if self.pending.is_empty() {
            self.planned_for = None;
        }
        Ok(step)
    }

    pub fn has_pending_steps(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The player the queued steps belong to.
    pub fn planned_player(&self) -> Option<Color> {
        self.planned_for
    }

    fn random_walk(&mut self, state: &mut GameState) -> Result<Vec<Coord>, GameError> {
        let mover = state.current_index();
        let mut speculation = Speculation::new(state);
        let mut steps = Vec::new();
        while speculation.current_index() == mover
            && speculation.current_player().remaining_steps > 0
        {
            let color = speculation.current_player().color;
            let &dest = speculation
                .possible_moves()
                .choose(&mut self.rng)
                .ok_or(InvalidState::NoLegalMove { color })?;
            speculation.move_to(dest)?;
            steps.push(dest);
            if speculation.is_over() {
                break;
            }
        }
        Ok(steps)
    }
}
