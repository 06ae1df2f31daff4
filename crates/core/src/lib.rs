//! Infinite Chess Core Library
//!
//! Board state, a simplified move generator, the notation interpreter and the
//! turn controller for a human-versus-service chess game.

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod notation;
pub mod parser;
pub mod selfplay;
pub mod service;

pub use board::{BoardState, MoveCommand, MoveRecord, Piece, PieceId, PieceKind, Side, Square};
pub use config::Config;
pub use error::{Error, Result};
pub use game::{GameSession, HistoryEntry, MoveOrigin, TurnController, TurnEvent, TurnOutcome};
pub use service::{MoveRequest, MoveResponse, MoveService, MoveServiceClient};
