use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::{
    Board, Color, Coord, GameState, Player, PlayerKind, SetupPolicy, Tile, BOARD_SIZES,
};

/// A coordinate on a board of one of the playable sizes.
#[derive(Clone, Debug)]
pub struct ArbitraryCoord(pub Coord);

impl quickcheck::Arbitrary for ArbitraryCoord {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let board_size = *g.choose(&BOARD_SIZES).unwrap();
        ArbitraryCoord(Coord::new(
            i32::from(u8::arbitrary(g)),
            i32::from(u8::arbitrary(g)),
            board_size,
        ))
    }
}

/// A freshly dealt game after a random number of random legal steps.
#[derive(Clone, Debug)]
pub struct RandomPlayout {
    pub steps: usize,
    pub state: GameState,
    /// The states before each step, oldest first.
    pub history: Vec<GameState>,
}

/// Every board size and player count the relaxed policy accepts.
pub const SETUPS: [(u8, usize); 7] = [(4, 2), (4, 3), (4, 4), (5, 2), (5, 3), (5, 4), (6, 4)];

impl RandomPlayout {
    pub fn new(seed: u64, board_size: u8, players: usize, max_steps: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let kinds = vec![PlayerKind::Local; players];
        let (mut state, _) =
            GameState::new(&kinds, board_size, SetupPolicy::Relaxed, &mut rng).unwrap();
        let mut history = Vec::new();
        for _ in 0..max_steps {
            let Some(&dest) = state.possible_moves().choose(&mut rng) else {
                break;
            };
            history.push(state.clone());
            state.move_to(dest).unwrap();
        }
        Self {
            steps: history.len(),
            state,
            history,
        }
    }
}

impl quickcheck::Arbitrary for RandomPlayout {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let &(board_size, players) = g.choose(&SETUPS).unwrap();
        let max_steps = usize::from(u8::arbitrary(g) % 40);
        RandomPlayout::new(u64::arbitrary(g), board_size, players, max_steps)
    }
}

/// Builds a state from a picture of the board.
///
/// Each row lists the tiles of one `y`, separated by whitespace: a digit is
/// the step value, `x` a collapsed tile. Pawns are placed in color order and
/// the first one is to move, with the steps of its tile.
pub fn fixture(rows: &[&str], pawns: &[(i32, i32)]) -> GameState {
    let board_size = rows.len() as u8;
    let mut tiles = Vec::new();
    for (y, row) in rows.iter().enumerate() {
        for (x, token) in row.split_whitespace().enumerate() {
            let coord = Coord::new(x as i32, y as i32, board_size);
            let mut tile = match token {
                "x" => Tile::new(coord, 1, None),
                digit => Tile::new(coord, digit.parse().unwrap(), None),
            };
            tile.collapsed = token == "x";
            tiles.push(tile);
        }
    }
    let mut players: Vec<Player> = pawns
        .iter()
        .zip(Color::ALL)
        .map(|(&(x, y), color)| {
            let coord = Coord::new(x, y, board_size);
            let tile = tiles.iter_mut().find(|t| t.coord == coord).unwrap();
            tile.start = Some(color);
            Player::new(color, PlayerKind::Local, coord)
        })
        .collect();
    let board = Board::from_tiles(board_size, tiles).unwrap();
    players[0].remaining_steps = board.tile(players[0].position).steps;
    GameState::from_parts(board, players, 0).unwrap()
}
