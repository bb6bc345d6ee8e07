//! Types exchanged with peers in remote games.

use serde::{Deserialize, Serialize};

use crate::{Board, Color, Coord, Direction, GameError, GameState, IllegalMove, InvalidSetup, Tile};

/// The dealt board as sent to the other players before the first move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    pub board_size: u8,
    /// One entry per tile, in row-major order.
    pub tiles: Vec<TileLayout>,
}

/// A tile of a [`BoardLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayout {
    pub x: u8,
    pub y: u8,
    pub steps: u8,
    /// Only present on start tiles.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub start: Option<Color>,
}

impl Board {
    /// The layout of this board, ignoring collapse and visit flags.
    pub fn layout(&self) -> BoardLayout {
        BoardLayout {
            board_size: self.size(),
            tiles: self
                .tiles()
                .iter()
                .map(|tile| TileLayout {
                    x: tile.coord.x,
                    y: tile.coord.y,
                    steps: tile.steps,
                    start: tile.start,
                })
                .collect(),
        }
    }

    /// Rebuilds a fresh board from a layout.
    pub fn from_layout(layout: &BoardLayout) -> Result<Self, InvalidSetup> {
        let size = layout.board_size;
        let tiles = layout
            .tiles
            .iter()
            .map(|t| {
                if t.x >= size || t.y >= size {
                    return Err(InvalidSetup::Inconsistent {
                        reason: "a tile lies outside the board",
                    });
                }
                let coord = Coord::new(i32::from(t.x), i32::from(t.y), size);
                Ok(Tile::new(coord, t.steps, t.start))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Board::from_tiles(size, tiles)
    }
}

/// A step chosen by a remote player, sent as a direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMove {
    pub color: Color,
    pub direction: Direction,
}

impl RemoteMove {
    /// Where the step leads in `state`. The move must come from the player
    /// whose turn it is.
    pub fn destination(&self, state: &GameState) -> Result<Coord, GameError> {
        let current = state.current_player();
        if current.color != self.color {
            return Err(IllegalMove::NotYourTurn {
                expected: current.color,
                found: self.color,
            }
            .into());
        }
        Ok(current.position.step(self.direction))
    }

    /// Encodes a local step for sending.
    pub fn from_step(state: &GameState, dest: Coord) -> Result<Self, GameError> {
        let current = state.current_player();
        let direction = current
            .position
            .direction_to(dest)?
            .ok_or(IllegalMove::NotAdjacent {
                from: current.position,
                to: dest,
            })?;
        Ok(Self {
            color: current.color,
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::arbitrary::RandomPlayout;
    use crate::{PlayerKind, SetupPolicy};

    #[test]
    fn peers_rebuild_the_same_game() {
        let mut rng = StdRng::seed_from_u64(77);
        let kinds = [PlayerKind::Local, PlayerKind::Remote, PlayerKind::Remote];
        let (host, _) = GameState::new(&kinds, 5, SetupPolicy::Standard, &mut rng).unwrap();

        let json = serde_json::to_string(&host.board().layout()).unwrap();
        let layout: BoardLayout = serde_json::from_str(&json).unwrap();
        let board = Board::from_layout(&layout).unwrap();
        let (peer, events) = GameState::from_board(&kinds, board).unwrap();
        assert_eq!(peer, host);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn layout_outside_the_board_is_rejected() {
        let state = RandomPlayout::new(1, 4, 2, 0).state;
        let mut layout = state.board().layout();
        layout.tiles[3].x = 4;
        assert!(matches!(
            Board::from_layout(&layout),
            Err(InvalidSetup::Inconsistent { .. })
        ));
    }

    #[test]
    fn remote_moves_decode_to_neighbours() {
        let state = RandomPlayout::new(6, 4, 2, 0).state;
        let current = state.current_player();
        let wire = RemoteMove {
            color: current.color,
            direction: Direction::Left,
        };
        assert_eq!(wire.destination(&state), Ok(current.position.left()));
        assert_eq!(
            RemoteMove::from_step(&state, current.position.left()),
            Ok(wire)
        );

        let impostor = RemoteMove {
            color: Color::Blue,
            direction: Direction::Up,
        };
        assert_eq!(
            impostor.destination(&state),
            Err(IllegalMove::NotYourTurn {
                expected: Color::Red,
                found: Color::Blue
            }
            .into())
        );
    }
}
