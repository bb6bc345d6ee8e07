use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Board, Color, Coord, GameError, GameEvent, IllegalMove, InvalidSetup, InvalidState, Player,
    PlayerKind, SetupPolicy,
};

/// Where the game stands, from the point of view of the current player.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The current player has steps left and may move.
    AwaitingMove,
    /// The current player's turn is used up but not yet handed on.
    TurnComplete,
    /// At most one player is alive.
    GameOver,
}

/// The complete state of one game: board, players and whose turn it is.
///
/// Cloning produces a fully independent copy, which is what undo/redo
/// snapshots and speculative search rely on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StateParts")]
pub struct GameState {
    /// Fixed seating order, which is also the turn order.
    players: Vec<Player>,
    board: Board,
    current: usize,
}

#[derive(Deserialize)]
struct StateParts {
    players: Vec<Player>,
    board: Board,
    current: usize,
}

impl TryFrom<StateParts> for GameState {
    type Error = GameError;

    fn try_from(parts: StateParts) -> Result<Self, GameError> {
        GameState::from_parts(parts.board, parts.players, parts.current)
    }
}

impl GameState {
    /// Deals a new board and opens the first turn.
    ///
    /// Players get the colors of [`Color::ALL`] in order. Returns the events
    /// of opening the first turn.
    pub fn new<R: Rng + ?Sized>(
        kinds: &[PlayerKind],
        board_size: u8,
        policy: SetupPolicy,
        rng: &mut R,
    ) -> Result<(Self, Vec<GameEvent>), GameError> {
        policy.validate(kinds.len(), board_size)?;
        let colors = &Color::ALL[..kinds.len()];
        let (board, _) = Board::generate(colors, board_size, policy, rng)?;
        Self::from_board(kinds, board)
    }

    /// Starts a game on a board dealt elsewhere, e.g. received from a peer.
    ///
    /// Every player begins on the start tile of its color.
    pub fn from_board(
        kinds: &[PlayerKind],
        board: Board,
    ) -> Result<(Self, Vec<GameEvent>), GameError> {
        if !(2..=4).contains(&kinds.len()) {
            return Err(InvalidSetup::PlayerCount {
                players: kinds.len(),
            }
            .into());
        }
        if board.start_tiles().count() != kinds.len() {
            return Err(InvalidSetup::Inconsistent {
                reason: "the number of start tiles does not match the players",
            }
            .into());
        }
        let players = Color::ALL
            .iter()
            .zip(kinds)
            .map(|(&color, &kind)| {
                board
                    .start_tiles()
                    .find(|tile| tile.start == Some(color))
                    .map(|tile| Player::new(color, kind, tile.coord))
                    .ok_or(InvalidSetup::Inconsistent {
                        reason: "a player has no start tile",
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut state = Self {
            players,
            board,
            current: 0,
        };
        let mut events = Vec::new();
        state.open_turn(&mut events);
        Ok((state, events))
    }

    /// Reassembles a state from persisted parts, validating its invariants.
    ///
    /// The players are taken as they are, including the remaining steps of
    /// the current player; no turn is opened.
    pub fn from_parts(
        board: Board,
        players: Vec<Player>,
        current: usize,
    ) -> Result<Self, GameError> {
        if !(2..=4).contains(&players.len()) {
            return Err(InvalidSetup::PlayerCount {
                players: players.len(),
            }
            .into());
        }
        for (idx, player) in players.iter().enumerate() {
            if player.position.board_size != board.size() {
                return Err(GameError::IncompatibleBoardSize {
                    expected: board.size(),
                    found: player.position.board_size,
                });
            }
            let mut coords = std::iter::once(&player.position).chain(&player.visited);
            if !coords.all(|c| c.board_size == board.size() && c.is_wrapped()) {
                return Err(InvalidSetup::Inconsistent {
                    reason: "a player stands or has stepped outside the board",
                }
                .into());
            }
            if players[..idx].iter().any(|other| other.color == player.color) {
                return Err(InvalidSetup::Inconsistent {
                    reason: "two players share a color",
                }
                .into());
            }
        }
        let any_alive = players.iter().any(|p| p.alive);
        match players.get(current) {
            None => {
                return Err(InvalidSetup::Inconsistent {
                    reason: "the current player index is out of range",
                }
                .into())
            }
            Some(player) if any_alive && !player.alive => {
                return Err(InvalidSetup::Inconsistent {
                    reason: "the current player has been eliminated",
                }
                .into())
            }
            Some(_) => {}
        }
        Ok(Self {
            players,
            board,
            current,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_size(&self) -> u8 {
        self.board.size()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, color: Color) -> Option<&Player> {
        self.players.iter().find(|p| p.color == color)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    pub fn is_over(&self) -> bool {
        self.alive_count() <= 1
    }

    pub fn phase(&self) -> Phase {
        if self.is_over() {
            Phase::GameOver
        } else if self.current_player().remaining_steps > 0 {
            Phase::AwaitingMove
        } else {
            Phase::TurnComplete
        }
    }

    /// The last player standing, once the game is over.
    pub fn winner(&self) -> Option<Color> {
        if !self.is_over() {
            return None;
        }
        self.players.iter().find(|p| p.alive).map(|p| p.color)
    }

    /// The color of a living player other than the current one standing on `coord`.
    pub fn occupant(&self, coord: Coord) -> Option<Color> {
        self.players
            .iter()
            .enumerate()
            .find(|&(idx, p)| idx != self.current && p.alive && p.position == coord)
            .map(|(_, p)| p.color)
    }

    /// Checks a single step of the current player, without side effects.
    ///
    /// A board size mismatch is reported as [`GameError::IncompatibleBoardSize`],
    /// every other reason as [`GameError::IllegalMove`].
    pub fn check_move(&self, dest: Coord) -> Result<(), GameError> {
        if dest.board_size != self.board.size() {
            return Err(GameError::IncompatibleBoardSize {
                expected: self.board.size(),
                found: dest.board_size,
            });
        }
        if self.is_over() {
            return Err(IllegalMove::GameOver.into());
        }
        let player = self.current_player();
        if !player.alive {
            return Err(IllegalMove::PlayerEliminated {
                color: player.color,
            }
            .into());
        }
        if player.remaining_steps == 0 {
            return Err(IllegalMove::NoStepsRemaining {
                color: player.color,
            }
            .into());
        }
        if !player.position.is_adjacent(dest)? {
            return Err(IllegalMove::NotAdjacent {
                from: player.position,
                to: dest,
            }
            .into());
        }
        let tile = self.board.tile(dest);
        if tile.collapsed {
            return Err(IllegalMove::TileCollapsed { at: dest }.into());
        }
        if tile.visited {
            return Err(IllegalMove::TileVisited { at: dest }.into());
        }
        // Passing through an occupied tile is fine, ending the turn there is not.
        if player.remaining_steps == 1 {
            if let Some(occupant) = self.occupant(dest) {
                return Err(IllegalMove::OccupiedOnFinalStep { at: dest, occupant }.into());
            }
        }
        Ok(())
    }

    /// Whether the current player may step onto `dest`.
    ///
    /// Fails closed: any rule violation yields `Ok(false)`. Only a board
    /// size mismatch is an error.
    pub fn can_move_to(&self, dest: Coord) -> Result<bool, GameError> {
        match self.check_move(dest) {
            Ok(()) => Ok(true),
            Err(GameError::IllegalMove(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// All neighbours the current player may step onto right now.
    pub fn possible_moves(&self) -> Vec<Coord> {
        self.current_player()
            .position
            .neighbours()
            .into_iter()
            .filter(|&dest| self.check_move(dest).is_ok())
            .collect()
    }

    pub fn has_legal_move(&self) -> bool {
        self.current_player()
            .position
            .neighbours()
            .into_iter()
            .any(|dest| self.check_move(dest).is_ok())
    }

    /// Takes one step with the current player.
    ///
    /// The tile left on the first step of a turn collapses; every tile left is
    /// marked visited until the turn ends. A player left without a legal
    /// step mid-turn is eliminated on the spot. The turn ends when the steps
    /// run out, and the next living player's turn is opened.
    ///
    /// Nothing is mutated if the step is rejected.
    pub fn move_to(&mut self, dest: Coord) -> Result<Vec<GameEvent>, GameError> {
        self.check_move(dest)?;

        let mut events = Vec::new();
        let idx = self.current;
        let from = self.players[idx].position;
        let first_step = self.players[idx].is_first_step();

        let left_tile = self.board.tile_mut(from);
        if first_step {
            left_tile.collapsed = true;
        }
        left_tile.visited = true;

        let player = &mut self.players[idx];
        player.visited.push(from);
        player.position = dest;
        player.remaining_steps -= 1;
        let remaining = player.remaining_steps;
        events.push(GameEvent::StepTaken {
            player: player.color,
            from,
            to: dest,
        });

        if remaining > 0 {
            if !self.has_legal_move() {
                self.eliminate(idx, &mut events);
                self.complete_turn(&mut events);
            }
        } else {
            self.complete_turn(&mut events);
        }
        Ok(events)
    }

    /// Ends the current player's turn, forfeiting any steps left, and hands
    /// the turn to the next living player.
    ///
    /// At least one step must have been taken: the current player can always
    /// move, so skipping a whole turn is never allowed.
    pub fn end_turn(&mut self) -> Result<Vec<GameEvent>, GameError> {
        match self.alive_count() {
            0 => return Err(InvalidState::NoLivingPlayers.into()),
            1 => return Err(InvalidState::GameOver.into()),
            _ => {}
        }
        let player = self.current_player();
        if player.is_first_step() {
            return Err(IllegalMove::NoStepTaken {
                color: player.color,
            }
            .into());
        }
        if let Some(occupant) = self.occupant(player.position) {
            return Err(IllegalMove::OccupiedOnFinalStep {
                at: player.position,
                occupant,
            }
            .into());
        }
        let mut events = Vec::new();
        self.complete_turn(&mut events);
        Ok(events)
    }

    fn eliminate(&mut self, idx: usize, events: &mut Vec<GameEvent>) {
        // First out takes the last place
        let rank = (self.alive_count() - 1) as u8;
        let player = &mut self.players[idx];
        player.alive = false;
        player.rank = Some(rank);
        let (color, position) = (player.color, player.position);
        self.board.tile_mut(position).collapsed = true;
        events.push(GameEvent::PlayerEliminated {
            player: color,
            rank,
        });
    }

    fn clear_turn(&mut self, idx: usize, events: &mut Vec<GameEvent>) {
        let player = &mut self.players[idx];
        player.remaining_steps = 0;
        let visited = std::mem::take(&mut player.visited);
        let color = player.color;
        for coord in visited {
            self.board.tile_mut(coord).visited = false;
        }
        events.push(GameEvent::TurnEnded { player: color });
    }

    fn complete_turn(&mut self, events: &mut Vec<GameEvent>) {
        self.clear_turn(self.current, events);
        self.advance(events);
    }

    /// Moves the turn pointer to the next living player and opens their turn.
    fn advance(&mut self, events: &mut Vec<GameEvent>) {
        if self.is_over() {
            self.finish_game(events);
            return;
        }
        let n = self.players.len();
        let next = (1..=n)
            .map(|offset| (self.current + offset) % n)
            .find(|&idx| self.players[idx].alive);
        match next {
            Some(idx) => {
                self.current = idx;
                self.open_turn(events);
            }
            None => self.finish_game(events),
        }
    }

    /// Opens the current player's turn. A player who cannot take a single
    /// step is eliminated right away and the turn passes on.
    fn open_turn(&mut self, events: &mut Vec<GameEvent>) {
        let idx = self.current;
        let steps = self.board.tile(self.players[idx].position).steps;
        self.players[idx].remaining_steps = steps;
        events.push(GameEvent::TurnStarted {
            player: self.players[idx].color,
            steps,
        });
        if !self.has_legal_move() {
            self.eliminate(idx, events);
            self.clear_turn(idx, events);
            self.advance(events);
        }
    }

    fn finish_game(&mut self, events: &mut Vec<GameEvent>) {
        let winner = self.players.iter().position(|p| p.alive);
        if let Some(idx) = winner {
            let player = &mut self.players[idx];
            player.rank = Some(0);
            player.remaining_steps = 0;
            self.current = idx;
        }
        events.push(GameEvent::GameEnded {
            winner: winner.map(|idx| self.players[idx].color),
        });
    }
}
