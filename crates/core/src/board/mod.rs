//! Board state and move generation

pub mod movegen;
mod state;
mod types;

pub use movegen::{all_moves, legal_destinations};
pub use state::{BoardState, MoveCommand, MoveRecord, RulesError};
pub use types::{file_to_col, rank_to_row, Piece, PieceId, PieceKind, Side, Square};
