use serde::{Deserialize, Serialize};

use crate::GameError;

/// A position on the torus.
///
/// Every coordinate knows the size of the board it lives on, and all
/// arithmetic wraps around modulo that size, so `x` and `y` are always in
/// `0..board_size`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: u8,
    pub y: u8,
    pub board_size: u8,
}

/// One of the four orthogonal directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }
}

impl Coord {
    /// Creates a coordinate, wrapping `x` and `y` into the board.
    ///
    /// Panics if `board_size` is zero.
    pub fn new(x: i32, y: i32, board_size: u8) -> Self {
        assert!(board_size > 0);
        let n = i32::from(board_size);
        // rem_euclid is floored, so -1 becomes n - 1
        Self {
            x: x.rem_euclid(n) as u8,
            y: y.rem_euclid(n) as u8,
            board_size,
        }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(
            i32::from(self.x) + dx,
            i32::from(self.y) + dy,
            self.board_size,
        )
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    pub fn left(self) -> Self {
        self.step(Direction::Left)
    }

    pub fn right(self) -> Self {
        self.step(Direction::Right)
    }

    pub fn up(self) -> Self {
        self.step(Direction::Up)
    }

    pub fn down(self) -> Self {
        self.step(Direction::Down)
    }

    /// The four wrapped neighbours, in the order of [`Direction::ALL`].
    pub fn neighbours(self) -> [Coord; 4] {
        Direction::ALL.map(|direction| self.step(direction))
    }

    /// Fails if the two coordinates belong to boards of different sizes.
    pub fn ensure_same_board(self, other: Coord) -> Result<(), GameError> {
        if self.board_size != other.board_size {
            return Err(GameError::IncompatibleBoardSize {
                expected: self.board_size,
                found: other.board_size,
            });
        }
        Ok(())
    }

    /// Whether `other` is one wrapped step away.
    ///
    /// On a board of size 1 or 2 a coordinate can be its own neighbour, or
    /// reachable in two directions; that never happens on playable sizes.
    pub fn is_adjacent(self, other: Coord) -> Result<bool, GameError> {
        self.ensure_same_board(other)?;
        Ok(self.neighbours().contains(&other))
    }

    /// The direction leading from `self` to the adjacent `other`, if any.
    pub fn direction_to(self, other: Coord) -> Result<Option<Direction>, GameError> {
        self.ensure_same_board(other)?;
        Ok(Direction::ALL
            .into_iter()
            .find(|&direction| self.step(direction) == other))
    }

    /// Shortest wrapped Manhattan distance.
    pub fn distance(self, other: Coord) -> Result<u8, GameError> {
        self.ensure_same_board(other)?;
        let axis = |a: u8, b: u8| {
            let d = a.abs_diff(b);
            d.min(self.board_size - d)
        };
        Ok(axis(self.x, other.x) + axis(self.y, other.y))
    }

    /// True when both components lie within `0..board_size`, as every
    /// coordinate built by `new` does.
    pub fn is_wrapped(self) -> bool {
        self.x < self.board_size && self.y < self.board_size
    }

    /// Row-major index into a board of this coordinate's size.
    pub fn index(self) -> usize {
        usize::from(self.y) * usize::from(self.board_size) + usize::from(self.x)
    }

    /// All coordinates of a board, in row-major order.
    pub fn all(board_size: u8) -> impl Iterator<Item = Coord> {
        (0..board_size).flat_map(move |y| {
            (0..board_size).map(move |x| Coord { x, y, board_size })
        })
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::ArbitraryCoord;

    quickcheck! {
        fn left_then_right_is_identity(c: ArbitraryCoord) -> bool {
            let c = c.0;
            c.left().right() == c && c.up().down() == c
        }

        fn neighbours_stay_on_the_board(c: ArbitraryCoord) -> bool {
            let c = c.0;
            c.neighbours()
                .iter()
                .all(|n| n.x < c.board_size && n.y < c.board_size && n.board_size == c.board_size)
        }

        fn adjacency_is_symmetric(a: ArbitraryCoord, dx: i8, dy: i8) -> bool {
            let a = a.0;
            let b = a.offset(i32::from(dx), i32::from(dy));
            a.is_adjacent(b).unwrap() == b.is_adjacent(a).unwrap()
        }
    }

    #[test]
    fn wraps_negative_values() {
        let c = Coord::new(-1, -5, 4);
        assert_eq!((c.x, c.y), (3, 3));
        let c = Coord::new(0, 0, 5).left();
        assert_eq!((c.x, c.y), (4, 0));
    }

    #[test]
    fn wrapped_neighbours_are_adjacent() {
        let corner = Coord::new(0, 0, 6);
        assert!(corner.is_adjacent(Coord::new(5, 0, 6)).unwrap());
        assert!(corner.is_adjacent(Coord::new(0, 5, 6)).unwrap());
        assert!(!corner.is_adjacent(Coord::new(5, 5, 6)).unwrap());
        assert_eq!(
            corner.direction_to(Coord::new(0, 5, 6)).unwrap(),
            Some(Direction::Up)
        );
    }

    #[test]
    fn mixing_board_sizes_fails() {
        let a = Coord::new(1, 1, 4);
        let b = Coord::new(1, 2, 5);
        assert_eq!(
            a.is_adjacent(b),
            Err(GameError::IncompatibleBoardSize {
                expected: 4,
                found: 5
            })
        );
    }

    #[test]
    fn distance_uses_the_short_way_around() {
        let a = Coord::new(0, 0, 6);
        assert_eq!(a.distance(Coord::new(5, 5, 6)).unwrap(), 2);
        assert_eq!(a.distance(Coord::new(3, 3, 6)).unwrap(), 6);
    }
}
