use serde::{Deserialize, Serialize};

use crate::{Coord, InvalidSetup};

/// Pawn colors, in seating order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    /// Single letter used in board renderings.
    pub fn letter(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Blue => 'B',
            Color::Green => 'G',
            Color::Yellow => 'Y',
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
        };
        write!(f, "{}", name)
    }
}

/// Bot strength, from 1 (random) to 4 (always searches).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Random = 1,
    Easy = 2,
    Medium = 3,
    Hard = 4,
}

impl Difficulty {
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = InvalidSetup;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Difficulty::Random),
            2 => Ok(Difficulty::Easy),
            3 => Ok(Difficulty::Medium),
            4 => Ok(Difficulty::Hard),
            _ => Err(InvalidSetup::Difficulty { level }),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> u8 {
        difficulty.level()
    }
}

/// Who decides the moves of a player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlayerKind {
    Local,
    Bot { difficulty: Difficulty },
    Remote,
}

impl PlayerKind {
    pub fn difficulty(self) -> Option<Difficulty> {
        match self {
            PlayerKind::Bot { difficulty } => Some(difficulty),
            _ => None,
        }
    }
}

/// The state of a single player during one game.
///
/// Once eliminated, only `alive`, `rank` and `position` carry meaning: the
/// pawn stays where it was but never moves again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub color: Color,
    pub kind: PlayerKind,
    pub position: Coord,
    /// Steps the player still has to take in the running turn.
    pub remaining_steps: u8,
    /// Tiles left during the running turn, in order.
    pub visited: Vec<Coord>,
    pub alive: bool,
    /// Final place, 0 being the winner. Set on elimination and at game end.
    pub rank: Option<u8>,
}

impl Player {
    pub fn new(color: Color, kind: PlayerKind, position: Coord) -> Self {
        Self {
            color,
            kind,
            position,
            remaining_steps: 0,
            visited: Vec::new(),
            alive: true,
            rank: None,
        }
    }

    /// True before the first step of a turn has been taken.
    pub fn is_first_step(&self) -> bool {
        self.visited.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_levels_round_trip() {
        for level in 1..=4 {
            assert_eq!(Difficulty::try_from(level).unwrap().level(), level);
        }
        assert_eq!(
            Difficulty::try_from(5),
            Err(InvalidSetup::Difficulty { level: 5 })
        );
    }

    #[test]
    fn player_kind_json() {
        let kind = PlayerKind::Bot {
            difficulty: Difficulty::Medium,
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, r#"{"kind":"bot","difficulty":3}"#);
        assert!(serde_json::from_str::<PlayerKind>(r#"{"kind":"bot","difficulty":9}"#).is_err());
    }
}
