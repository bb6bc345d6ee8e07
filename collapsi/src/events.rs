use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Color, Coord};

/// Notifications emitted by the rules engine after each mutating operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    TurnStarted { player: Color, steps: u8 },
    StepTaken { player: Color, from: Coord, to: Coord },
    TurnEnded { player: Color },
    PlayerEliminated { player: Color, rank: u8 },
    /// `winner` is `None` only if the last players were eliminated together.
    GameEnded { winner: Option<Color> },
    /// The whole state was replaced by undo or redo.
    StateRestored { undo: bool },
}

/// Subscriber for [`GameEvent`]s, e.g. a renderer or a network relay.
pub trait GameObserver: Send {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent) + Send> GameObserver for F {
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

/// Writes every event to the `tracing` log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl GameObserver for TracingObserver {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::TurnStarted { player, steps } => {
                debug!(%player, steps, "Turn started")
            }
            GameEvent::StepTaken { player, from, to } => {
                debug!(%player, %from, %to, "Step taken")
            }
            GameEvent::TurnEnded { player } => debug!(%player, "Turn ended"),
            GameEvent::PlayerEliminated { player, rank } => {
                info!(%player, rank, "Player eliminated")
            }
            GameEvent::GameEnded { winner } => match winner {
                Some(winner) => info!(%winner, "Game ended"),
                None => info!("Game ended without a winner"),
            },
            GameEvent::StateRestored { undo } => debug!(undo, "State restored"),
        }
    }
}
