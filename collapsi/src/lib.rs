pub use board::*;
pub use bot::*;
pub use coord::*;
pub use errors::*;
pub use events::*;
pub use game_state::*;
pub use history::*;
pub use paths::*;
pub use player_state::*;
pub use protocol_types::*;
pub use session::*;
pub use speculation::*;
pub use visualization::*;

#[cfg(test)]
mod arbitrary;
mod board;
mod bot;
mod coord;
mod errors;
mod events;
mod game_state;
mod history;
mod paths;
mod player_state;
mod protocol_types;
mod session;
mod speculation;
mod visualization;
