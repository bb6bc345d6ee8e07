use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Color, Coord, InvalidSetup};

/// The step value of every start tile.
pub const START_STEPS: u8 = 1;

/// Board sizes a game can be started on.
pub const BOARD_SIZES: [u8; 3] = [4, 5, 6];

/// How many free tiles carry each step value, per board size.
///
/// Start tiles come on top of these counts. When the players leave fewer
/// free tiles than listed, the table is cut off from the high end.
pub fn step_distribution(board_size: u8) -> Option<&'static [(u8, usize)]> {
    match board_size {
        4 => Some(&[(1, 4), (2, 4), (3, 4), (4, 2)]),
        5 => Some(&[(1, 6), (2, 6), (3, 6), (4, 6)]),
        6 => Some(&[(1, 8), (2, 8), (3, 8), (4, 8)]),
        _ => None,
    }
}

/// Which board size / player count combinations are accepted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupPolicy {
    /// Size 4 for 2 players, 5 for 3, 6 for 4.
    #[default]
    Standard,
    /// Any combination for which start tiles plus the step table cover the board.
    Relaxed,
}

impl SetupPolicy {
    pub fn validate(self, players: usize, board_size: u8) -> Result<(), InvalidSetup> {
        if !(2..=4).contains(&players) {
            return Err(InvalidSetup::PlayerCount { players });
        }
        let distribution =
            step_distribution(board_size).ok_or(InvalidSetup::BoardSize { board_size })?;
        let pairing_ok = match self {
            SetupPolicy::Standard => usize::from(board_size) == players + 2,
            SetupPolicy::Relaxed => {
                let listed: usize = distribution.iter().map(|&(_, count)| count).sum();
                players + listed >= usize::from(board_size) * usize::from(board_size)
            }
        };
        if !pairing_ok {
            return Err(InvalidSetup::UnsupportedPairing {
                board_size,
                players,
            });
        }
        Ok(())
    }
}

/// A single tile of the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: Coord,
    /// How many steps a turn starting on this tile must take.
    pub steps: u8,
    /// The color whose pawn started here, if this is a start tile.
    pub start: Option<Color>,
    /// Collapsed tiles can never be entered again.
    pub collapsed: bool,
    /// Entered earlier in the running turn.
    pub visited: bool,
}

impl Tile {
    pub fn new(coord: Coord, steps: u8, start: Option<Color>) -> Self {
        Self {
            coord,
            steps,
            start,
            collapsed: false,
            visited: false,
        }
    }

    /// Neither collapsed nor visited this turn.
    pub fn is_enterable(&self) -> bool {
        !self.collapsed && !self.visited
    }
}

/// The square torus of tiles.
///
/// There is exactly one tile per coordinate, stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardParts")]
pub struct Board {
    size: u8,
    tiles: Vec<Tile>,
}

#[derive(Deserialize)]
struct BoardParts {
    size: u8,
    tiles: Vec<Tile>,
}

impl TryFrom<BoardParts> for Board {
    type Error = InvalidSetup;

    fn try_from(parts: BoardParts) -> Result<Self, InvalidSetup> {
        Board::from_tiles(parts.size, parts.tiles)
    }
}

impl Board {
    /// Generates a shuffled board and returns it with the start coordinate
    /// of each color, in the given order.
    pub fn generate<R: Rng + ?Sized>(
        colors: &[Color],
        board_size: u8,
        policy: SetupPolicy,
        rng: &mut R,
    ) -> Result<(Self, Vec<Coord>), InvalidSetup> {
        policy.validate(colors.len(), board_size)?;
        let distribution =
            step_distribution(board_size).ok_or(InvalidSetup::BoardSize { board_size })?;

        let mut coords: Vec<Coord> = Coord::all(board_size).collect();
        coords.shuffle(rng);
        let (starts, free) = coords.split_at(colors.len());

        let mut tiles: Vec<Tile> = starts
            .iter()
            .zip(colors)
            .map(|(&coord, &color)| Tile::new(coord, START_STEPS, Some(color)))
            .collect();
        let step_values = distribution
            .iter()
            .flat_map(|&(steps, count)| std::iter::repeat(steps).take(count));
        tiles.extend(
            free.iter()
                .zip(step_values)
                .map(|(&coord, steps)| Tile::new(coord, steps, None)),
        );

        let board = Self::from_tiles(board_size, tiles)?;
        Ok((board, starts.to_vec()))
    }

    /// Builds a board from a list of tiles in any order.
    ///
    /// Fails unless every coordinate of the board has exactly one tile.
    pub fn from_tiles(board_size: u8, mut tiles: Vec<Tile>) -> Result<Self, InvalidSetup> {
        if !BOARD_SIZES.contains(&board_size) {
            return Err(InvalidSetup::BoardSize { board_size });
        }
        let expected = usize::from(board_size) * usize::from(board_size);
        if tiles.len() != expected {
            return Err(InvalidSetup::Inconsistent {
                reason: "the number of tiles does not match the board size",
            });
        }
        if tiles.iter().any(|tile| tile.coord.board_size != board_size) {
            return Err(InvalidSetup::Inconsistent {
                reason: "a tile belongs to a board of another size",
            });
        }
        if tiles.iter().any(|tile| !tile.coord.is_wrapped()) {
            return Err(InvalidSetup::Inconsistent {
                reason: "a tile lies outside the board",
            });
        }
        if tiles.iter().any(|tile| !(1..=4).contains(&tile.steps)) {
            return Err(InvalidSetup::Inconsistent {
                reason: "step values must be between 1 and 4",
            });
        }
        tiles.sort_by_key(|tile| tile.coord.index());
        if tiles
            .iter()
            .enumerate()
            .any(|(idx, tile)| tile.coord.index() != idx)
        {
            return Err(InvalidSetup::Inconsistent {
                reason: "a coordinate has no tile or more than one",
            });
        }
        Ok(Self {
            size: board_size,
            tiles,
        })
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// The tile at `coord`, which must belong to this board.
    pub fn tile(&self, coord: Coord) -> &Tile {
        debug_assert_eq!(coord.board_size, self.size);
        &self.tiles[coord.index()]
    }

    pub fn tile_mut(&mut self, coord: Coord) -> &mut Tile {
        debug_assert_eq!(coord.board_size, self.size);
        &mut self.tiles[coord.index()]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn start_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(|tile| tile.start.is_some())
    }

    pub fn count_collapsed(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.collapsed).count()
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn count_steps(board: &Board, steps: u8) -> usize {
        board.tiles().iter().filter(|t| t.steps == steps).count()
    }

    /// How many tiles of each step value 1 to 4 a fresh board must have.
    fn expected_counts(board_size: u8, players: usize) -> [usize; 4] {
        let n = usize::from(board_size);
        let mut free = n * n - players;
        let mut counts = [0; 4];
        counts[usize::from(START_STEPS) - 1] += players;
        for &(steps, count) in step_distribution(board_size).unwrap_or_default() {
            let taken = count.min(free);
            counts[usize::from(steps) - 1] += taken;
            free -= taken;
        }
        counts
    }

    quickcheck! {
        fn every_valid_setup_is_complete(seed: u64, players: u8, size: u8) -> bool {
            let players = usize::from(players % 3 + 2);
            let board_size = BOARD_SIZES[usize::from(size % 3)];
            let colors = &Color::ALL[..players];
            let mut rng = StdRng::seed_from_u64(seed);
            match Board::generate(colors, board_size, SetupPolicy::Relaxed, &mut rng) {
                Ok((board, starts)) => {
                    let n = usize::from(board_size);
                    let counts = (1..=4).map(|steps| count_steps(&board, steps));
                    board.tiles().len() == n * n
                        && board.start_tiles().count() == players
                        && starts.len() == players
                        && starts
                            .iter()
                            .zip(colors)
                            .all(|(&c, &color)| board.tile(c).start == Some(color))
                        && board.tiles().iter().all(|t| !t.collapsed && !t.visited)
                        && counts.eq(expected_counts(board_size, players))
                }
                Err(InvalidSetup::UnsupportedPairing { .. }) => board_size == 6 && players < 4,
                Err(_) => false,
            }
        }
    }

    #[test]
    fn expected_counts_follow_the_table() {
        assert_eq!(expected_counts(4, 2), [6, 4, 4, 2]);
        assert_eq!(expected_counts(4, 4), [8, 4, 4, 0]);
        assert_eq!(expected_counts(5, 3), [9, 6, 6, 4]);
        assert_eq!(expected_counts(6, 4), [12, 8, 8, 8]);
    }

    #[test]
    fn two_players_on_four_by_four() {
        let mut rng = StdRng::seed_from_u64(7);
        let (board, _) =
            Board::generate(&Color::ALL[..2], 4, SetupPolicy::Standard, &mut rng).unwrap();
        assert_eq!(board.tiles().len(), 16);
        assert_eq!(board.start_tiles().count(), 2);
        assert_eq!(count_steps(&board, 1), 6);
        assert_eq!(count_steps(&board, 2), 4);
        assert_eq!(count_steps(&board, 3), 4);
        assert_eq!(count_steps(&board, 4), 2);
    }

    #[test]
    fn distribution_is_truncated_from_the_top() {
        let mut rng = StdRng::seed_from_u64(1);
        let (board, _) =
            Board::generate(&Color::ALL[..3], 5, SetupPolicy::Standard, &mut rng).unwrap();
        assert_eq!(count_steps(&board, 1), 6 + 3);
        assert_eq!(count_steps(&board, 2), 6);
        assert_eq!(count_steps(&board, 3), 6);
        assert_eq!(count_steps(&board, 4), 4);
    }

    #[test]
    fn rejects_bad_setups() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            Board::generate(&Color::ALL[..1], 4, SetupPolicy::Relaxed, &mut rng).unwrap_err(),
            InvalidSetup::PlayerCount { players: 1 }
        );
        assert_eq!(
            Board::generate(&Color::ALL[..2], 7, SetupPolicy::Relaxed, &mut rng).unwrap_err(),
            InvalidSetup::BoardSize { board_size: 7 }
        );
        assert_eq!(
            Board::generate(&Color::ALL[..3], 4, SetupPolicy::Standard, &mut rng).unwrap_err(),
            InvalidSetup::UnsupportedPairing {
                board_size: 4,
                players: 3
            }
        );
        assert!(Board::generate(&Color::ALL[..3], 4, SetupPolicy::Relaxed, &mut rng).is_ok());
    }

    #[test]
    fn from_tiles_rejects_duplicates() {
        let mut tiles: Vec<Tile> = Coord::all(4).map(|c| Tile::new(c, 2, None)).collect();
        tiles[3].coord = tiles[4].coord;
        assert!(matches!(
            Board::from_tiles(4, tiles),
            Err(InvalidSetup::Inconsistent { .. })
        ));
    }

    #[test]
    fn tiles_off_the_board_are_rejected() {
        // (1, 2) has index 9, the same as an unwrapped (9, 0).
        let mut tiles: Vec<Tile> = Coord::all(4).map(|c| Tile::new(c, 2, None)).collect();
        tiles[9].coord = Coord {
            x: 9,
            y: 0,
            board_size: 4,
        };
        assert!(matches!(
            Board::from_tiles(4, tiles.clone()),
            Err(InvalidSetup::Inconsistent { .. })
        ));

        let json = serde_json::json!({ "size": 4, "tiles": tiles });
        assert!(serde_json::from_value::<Board>(json).is_err());
    }
}
