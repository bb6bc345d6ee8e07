use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    BotPlayer, Color, Coord, GameError, GameEvent, GameObserver, GameState, History, InvalidState,
    PlannedTurn, PlayerKind, RemoteMove, SetupPolicy,
};

/// One running game: the state plus its undo/redo history.
#[derive(Clone, Debug)]
pub struct Session {
    state: GameState,
    history: History,
    /// Pause between the steps of a bot or remote turn, for display.
    step_delay: Duration,
}

impl Session {
    pub fn new<R: Rng + ?Sized>(
        kinds: &[PlayerKind],
        board_size: u8,
        policy: SetupPolicy,
        rng: &mut R,
    ) -> Result<(Self, Vec<GameEvent>), GameError> {
        let (state, events) = GameState::new(kinds, board_size, policy, rng)?;
        Ok((Self::from_state(state), events))
    }

    /// Wraps a state built elsewhere, with empty history.
    pub fn from_state(state: GameState) -> Self {
        Self {
            state,
            history: History::new(),
            step_delay: Duration::ZERO,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    pub fn set_step_delay(&mut self, step_delay: Duration) {
        self.step_delay = step_delay;
    }

    pub fn can_move_to(&self, dest: Coord) -> Result<bool, GameError> {
        self.state.can_move_to(dest)
    }

    /// Takes a step and records the state before it for undo.
    pub fn move_to(&mut self, dest: Coord) -> Result<Vec<GameEvent>, GameError> {
        let before = self.state.clone();
        let events = self.state.move_to(dest)?;
        self.history.record(before);
        Ok(events)
    }

    pub fn end_turn(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let before = self.state.clone();
        let events = self.state.end_turn()?;
        self.history.record(before);
        Ok(events)
    }

    pub fn undo(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.history.undo(&mut self.state)?;
        Ok(vec![GameEvent::StateRestored { undo: true }])
    }

    pub fn redo(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.history.redo(&mut self.state)?;
        Ok(vec![GameEvent::StateRestored { undo: false }])
    }

    /// Lets `bot` plan the current player's turn. The state is only
    /// borrowed for speculation and is unchanged afterwards.
    pub fn plan_bot_turn(
        &mut self,
        bot: &mut BotPlayer,
        deadline: Option<Instant>,
    ) -> Result<PlannedTurn, GameError> {
        #[cfg(debug_assertions)]
        let before = self.state.clone();
        let plan = bot.plan_turn(&mut self.state, deadline, None)?;
        #[cfg(debug_assertions)]
        debug_assert_eq!(self.state, before);
        Ok(plan)
    }

    /// Plays the next step of `bot`'s plan, planning the turn first if needed.
    pub fn make_bot_move(&mut self, bot: &mut BotPlayer) -> Result<Vec<GameEvent>, GameError> {
        if bot.planned_player() != Some(self.state.current_player().color) {
            self.plan_bot_turn(bot, None)?;
        }
        let step = bot.next_step(&self.state)?;
        self.move_to(step)
    }

    pub fn apply_remote_move(&mut self, remote: &RemoteMove) -> Result<Vec<GameEvent>, GameError> {
        let dest = remote.destination(&self.state)?;
        self.move_to(dest)
    }
}

/// What is kept of a session after the game ends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub winner: Option<Color>,
    /// Colors by final place, winner first.
    pub ranking: Vec<(Color, u8)>,
    /// Steps and explicit turn ends that were not undone.
    pub actions: usize,
}

impl GameSummary {
    fn from_session(session: &Session) -> Self {
        let state = session.state();
        let mut ranking: Vec<(Color, u8)> = state
            .players()
            .iter()
            .filter_map(|p| p.rank.map(|rank| (p.color, rank)))
            .collect();
        ranking.sort_by_key(|&(_, rank)| rank);
        Self {
            winner: state.winner(),
            ranking,
            actions: session.history().undo_len(),
        }
    }
}

/// Entry point for drivers: owns the session, if any, and forwards every
/// event to the registered observers.
///
/// The session is dropped as soon as the game is over; its outcome stays
/// available through [`GameHost::summary`].
#[derive(Default)]
pub struct GameHost {
    session: Option<Session>,
    observers: Vec<Box<dyn GameObserver>>,
    summary: Option<GameSummary>,
}

impl GameHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer<O: GameObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    /// Deals a new game, replacing any running one.
    pub fn start_new_game<R: Rng + ?Sized>(
        &mut self,
        kinds: &[PlayerKind],
        board_size: u8,
        policy: SetupPolicy,
        rng: &mut R,
    ) -> Result<(), GameError> {
        let (session, events) = Session::new(kinds, board_size, policy, rng)?;
        info!(board_size, players = kinds.len(), "New game");
        self.summary = None;
        self.session = Some(session);
        self.with_session(|_| Ok(events))
    }

    /// Hosts a game that was set up elsewhere, e.g. from a peer's layout.
    pub fn resume(&mut self, session: Session) -> Result<(), GameError> {
        self.summary = None;
        self.session = Some(session);
        self.with_session(|_| Ok(Vec::new()))
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Result<&mut Session, GameError> {
        self.session
            .as_mut()
            .ok_or_else(|| InvalidState::NoSession.into())
    }

    pub fn state(&self) -> Result<&GameState, GameError> {
        self.session
            .as_ref()
            .map(Session::state)
            .ok_or_else(|| InvalidState::NoSession.into())
    }

    /// The outcome of the last finished game.
    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }

    pub fn can_move_to(&self, dest: Coord) -> Result<bool, GameError> {
        self.state()?.can_move_to(dest)
    }

    pub fn move_to(&mut self, dest: Coord) -> Result<(), GameError> {
        self.with_session(|session| session.move_to(dest))
    }

    pub fn end_turn(&mut self) -> Result<(), GameError> {
        self.with_session(Session::end_turn)
    }

    pub fn undo(&mut self) -> Result<(), GameError> {
        self.with_session(Session::undo)
    }

    pub fn redo(&mut self) -> Result<(), GameError> {
        self.with_session(Session::redo)
    }

    pub fn plan_bot_turn(
        &mut self,
        bot: &mut BotPlayer,
        deadline: Option<Instant>,
    ) -> Result<PlannedTurn, GameError> {
        self.session_mut()?.plan_bot_turn(bot, deadline)
    }

    pub fn make_bot_move(&mut self, bot: &mut BotPlayer) -> Result<(), GameError> {
        self.with_session(|session| session.make_bot_move(bot))
    }

    pub fn apply_remote_move(&mut self, remote: &RemoteMove) -> Result<(), GameError> {
        self.with_session(|session| session.apply_remote_move(remote))
    }

    fn with_session<F>(&mut self, action: F) -> Result<(), GameError>
    where
        F: FnOnce(&mut Session) -> Result<Vec<GameEvent>, GameError>,
    {
        let session = self.session.as_mut().ok_or(InvalidState::NoSession)?;
        let events = action(session)?;
        let over = session.state().is_over();
        for event in &events {
            for observer in &mut self.observers {
                observer.on_event(event);
            }
        }
        if over {
            if let Some(session) = self.session.take() {
                let summary = GameSummary::from_session(&session);
                info!(winner = ?summary.winner, actions = summary.actions, "Session closed");
                self.summary = Some(summary);
            }
        }
        Ok(())
    }
}
