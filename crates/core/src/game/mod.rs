//! Turn control and the game session around it

mod controller;
mod session;

pub use controller::{HistoryEntry, MoveOrigin, TurnController, TurnEvent, TurnOutcome};
pub use session::GameSession;
