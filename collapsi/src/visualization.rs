use crate::GameState;

/// Draws the board as a grid of two-character cells.
///
/// A living pawn is shown by the lowercase letter of its color, the current
/// player's in uppercase. Other tiles show their step value, `·` when
/// visited this turn and nothing when collapsed. Start tiles that are still
/// standing are marked with `*`.
pub fn visualize_board(state: &GameState) -> String {
    let board = state.board();
    let size = board.size();

    let mut result = String::from("    ");
    for x in 0..size {
        result += &format!("{:>2}", x);
    }
    result += "\n    ╭";
    for _ in 0..size {
        result += "──";
    }
    result += "╮";

    for tile in board.tiles() {
        if tile.coord.x == 0 {
            result += &format!("\n{:>3} │", tile.coord.y);
        }
        let pawn = state
            .players()
            .iter()
            .enumerate()
            .find(|(_, p)| p.alive && p.position == tile.coord);
        let cell = match pawn {
            Some((idx, player)) if idx == state.current_index() => {
                format!("{} ", player.color.letter())
            }
            Some((_, player)) => format!("{} ", player.color.letter().to_ascii_lowercase()),
            None if tile.collapsed => String::from("  "),
            None if tile.visited => String::from("· "),
            None if tile.start.is_some() => format!("{}*", tile.steps),
            None => format!("{} ", tile.steps),
        };
        result += &cell;
        if tile.coord.x + 1 == size {
            result += "│";
        }
    }

    result += "\n    ╰";
    for _ in 0..size {
        result += "──";
    }
    result += "╯";
    result
}
