use crate::{Color, Coord};

/// The error type for starting a game with an unsupported setup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidSetup {
    PlayerCount { players: usize },
    BoardSize { board_size: u8 },
    UnsupportedPairing { board_size: u8, players: usize },
    Difficulty { level: u8 },
    /// A reconstructed board or state is internally inconsistent.
    Inconsistent { reason: &'static str },
}

impl std::error::Error for InvalidSetup {}

impl std::fmt::Display for InvalidSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidSetup::PlayerCount { players } => {
                write!(f, "A game needs 2 to 4 players, but {} were given", players)
            }
            InvalidSetup::BoardSize { board_size } => {
                write!(f, "The board size must be 4, 5 or 6, but was {}", board_size)
            }
            InvalidSetup::UnsupportedPairing {
                board_size,
                players,
            } => write!(
                f,
                "A {}x{} board cannot be played with {} players",
                board_size, board_size, players
            ),
            InvalidSetup::Difficulty { level } => {
                write!(f, "Bot difficulty must be between 1 and 4, but was {}", level)
            }
            InvalidSetup::Inconsistent { reason } => {
                write!(f, "Inconsistent game state: {}", reason)
            }
        }
    }
}

/// The reason why a single step was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IllegalMove {
    GameOver,
    PlayerEliminated { color: Color },
    NoStepsRemaining { color: Color },
    NotAdjacent { from: Coord, to: Coord },
    TileCollapsed { at: Coord },
    TileVisited { at: Coord },
    OccupiedOnFinalStep { at: Coord, occupant: Color },
    NotYourTurn { expected: Color, found: Color },
    NoStepTaken { color: Color },
}

impl std::error::Error for IllegalMove {}

impl std::fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IllegalMove::GameOver => write!(f, "The game is already over"),
            IllegalMove::PlayerEliminated { color } => {
                write!(f, "The {} player has been eliminated", color)
            }
            IllegalMove::NoStepsRemaining { color } => {
                write!(f, "The {} player has no steps left this turn", color)
            }
            IllegalMove::NotAdjacent { from, to } => {
                write!(f, "{} is not adjacent to {}", to, from)
            }
            IllegalMove::TileCollapsed { at } => write!(f, "The tile at {} has collapsed", at),
            IllegalMove::TileVisited { at } => {
                write!(f, "The tile at {} was already visited this turn", at)
            }
            IllegalMove::OccupiedOnFinalStep { at, occupant } => write!(
                f,
                "The final step would end on {}, which is occupied by the {} player",
                at, occupant
            ),
            IllegalMove::NotYourTurn { expected, found } => write!(
                f,
                "It is the {} player's turn, but a move for the {} player arrived",
                expected, found
            ),
            IllegalMove::NoStepTaken { color } => write!(
                f,
                "The {} player must take a step before ending the turn",
                color
            ),
        }
    }
}

/// A contract violation by the caller: the operation makes no sense in the
/// current state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidState {
    NoSession,
    GameOver,
    NothingToUndo,
    NothingToRedo,
    NoLivingPlayers,
    NoLegalMove { color: Color },
    NoPlannedStep,
    NotBotsTurn { bot: Color, current: Color },
    WorkerUnavailable,
}

impl std::error::Error for InvalidState {}

impl std::fmt::Display for InvalidState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidState::NoSession => write!(f, "No game is in progress"),
            InvalidState::GameOver => write!(f, "The game is already over"),
            InvalidState::NothingToUndo => write!(f, "There is nothing to undo"),
            InvalidState::NothingToRedo => write!(f, "There is nothing to redo"),
            InvalidState::NoLivingPlayers => {
                write!(f, "Cannot advance the turn, no player is alive")
            }
            InvalidState::NoLegalMove { color } => {
                write!(f, "The {} player has no legal move", color)
            }
            InvalidState::NoPlannedStep => write!(f, "The bot has no planned step left"),
            InvalidState::NotBotsTurn { bot, current } => write!(
                f,
                "The {} bot was asked to move, but it is the {} player's turn",
                bot, current
            ),
            InvalidState::WorkerUnavailable => write!(f, "The bot worker thread has stopped"),
        }
    }
}

/// The error type for every fallible operation of the rules engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameError {
    InvalidSetup(InvalidSetup),
    /// Two coordinates bound to different board sizes were mixed.
    IncompatibleBoardSize { expected: u8, found: u8 },
    IllegalMove(IllegalMove),
    InvalidState(InvalidState),
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::InvalidSetup(err) => Some(err),
            GameError::IllegalMove(err) => Some(err),
            GameError::InvalidState(err) => Some(err),
            GameError::IncompatibleBoardSize { .. } => None,
        }
    }
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::InvalidSetup(_) => write!(f, "Invalid game setup"),
            GameError::IncompatibleBoardSize { expected, found } => write!(
                f,
                "Coordinate belongs to a board of size {}, but the board has size {}",
                found, expected
            ),
            GameError::IllegalMove(_) => write!(f, "Illegal move"),
            GameError::InvalidState(_) => write!(f, "Invalid state"),
        }
    }
}

impl From<InvalidSetup> for GameError {
    fn from(err: InvalidSetup) -> Self {
        GameError::InvalidSetup(err)
    }
}

impl From<IllegalMove> for GameError {
    fn from(err: IllegalMove) -> Self {
        GameError::IllegalMove(err)
    }
}

impl From<InvalidState> for GameError {
    fn from(err: InvalidState) -> Self {
        GameError::InvalidState(err)
    }
}
