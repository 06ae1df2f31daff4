//! Game record parsing
pub mod pgn;

pub use pgn::{replay_pgn_file, replay_pgn_string, ReplayedGame};
