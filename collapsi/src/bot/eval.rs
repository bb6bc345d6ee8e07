use std::collections::VecDeque;

use crate::{Color, Coord, GameState};

const HORIZON: u8 = 3;

/// Static score of a position for `me`, used when a search stops before
/// the game is decided.
///
/// Compares how much open ground each pawn has around it: immediate exits
/// weigh most, tiles a few steps out less. Eliminated opponents add a bonus.
pub fn evaluate(state: &GameState, me: Color) -> i32 {
    let mut mine = 0;
    let mut best_opponent = 0;
    let mut opponents_out = 0;
    for player in state.players() {
        if player.color == me {
            mine = room(state, player.position);
        } else if player.alive {
            best_opponent = best_opponent.max(room(state, player.position));
        } else {
            opponents_out += 1;
        }
    }
    10 * (mine - best_opponent) + 200 * opponents_out
}

/// Open tiles within [`HORIZON`] steps, nearer ones weighing more.
fn room(state: &GameState, from: Coord) -> i32 {
    let board = state.board();
    let mut seen = vec![false; board.tiles().len()];
    seen[from.index()] = true;
    let mut queue = VecDeque::from([(from, 0u8)]);
    let mut score = 0;
    while let Some((coord, distance)) = queue.pop_front() {
        if distance == HORIZON {
            continue;
        }
        for next in coord.neighbours() {
            if seen[next.index()] || board.tile(next).collapsed {
                continue;
            }
            seen[next.index()] = true;
            score += i32::from(HORIZON - distance);
            queue.push_back((next, distance + 1));
        }
    }
    score
}
