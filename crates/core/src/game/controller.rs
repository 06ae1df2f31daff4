//! Turn controller: selection, move commitment and turn hand-over
//!
//! The controller is a small state machine over the board's selection:
//! `Idle` (nothing selected) or `Selected(piece)`. Square activations from the
//! human side drive it; moves for the other side arrive as notation text
//! through [`TurnController::apply_external_move`].
//!
//! Whenever a commit hands the turn to the external side, the outcome carries
//! one [`MoveRequest`] for the caller to answer. No further request is issued
//! until that one is answered or reported as failed.

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::board::{all_moves, BoardState, MoveCommand, MoveRecord, PieceId, Side, Square};
use crate::error::Error;
use crate::notation;
use crate::service::MoveRequest;

/// Where a committed move came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOrigin {
    Human,
    /// Resolved from the service's notation
    Interpreted,
    /// Random substitute after the notation failed to resolve
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    Move { record: MoveRecord, origin: MoveOrigin },
    Pass { side: Side },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// Input arrived while the human may not act
    Ignored,
    Selected {
        piece: PieceId,
        destinations: Vec<Square>,
    },
    /// Selection cleared without a move
    Cleared,
    Moved {
        record: MoveRecord,
        origin: MoveOrigin,
    },
    /// The side had no legal move and the turn passed
    Passed { side: Side },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub event: TurnEvent,
    pub request: Option<MoveRequest>,
}

impl From<TurnEvent> for TurnOutcome {
    fn from(event: TurnEvent) -> Self {
        Self {
            event,
            request: None,
        }
    }
}

pub struct TurnController {
    board: BoardState,
    human_side: Side,
    auto_requests: bool,
    pending: bool,
    last_error: Option<String>,
    history: Vec<HistoryEntry>,
}

impl TurnController {
    pub fn new(human_side: Side) -> Self {
        Self {
            board: BoardState::new(),
            human_side,
            auto_requests: true,
            pending: false,
            last_error: None,
            history: Vec::new(),
        }
    }

    /// Starts a new game in place.
    ///
    /// Does not request a move even if the external side moves first; call
    /// [`request_external_move`](Self::request_external_move) once the service is known to be up.
    pub fn reset(&mut self) {
        self.board.reset();
        self.pending = false;
        self.last_error = None;
        self.history.clear();
        info!(human = %self.human_side, "new game");
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn human_side(&self) -> Side {
        self.human_side
    }

    pub fn side_to_move(&self) -> Side {
        self.board.side_to_move()
    }

    pub fn selected(&self) -> Option<PieceId> {
        self.board.selected()
    }

    pub fn highlights(&self) -> impl Iterator<Item = Square> + '_ {
        self.board.highlights().iter().copied()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_awaiting_external(&self) -> bool {
        self.pending
    }

    pub fn auto_requests_enabled(&self) -> bool {
        self.auto_requests
    }

    pub fn set_service_available(&mut self, available: bool) {
        if available && !self.auto_requests {
            info!("move service available again");
        }
        self.auto_requests = available;
    }

    /// Handles a click on `square` by the human player
    pub fn activate_square(&mut self, square: Square) -> TurnOutcome {
        if self.pending || self.board.side_to_move() != self.human_side {
            debug!(%square, "input ignored outside the human turn");
            return TurnEvent::Ignored.into();
        }

        if let Some(selected) = self.board.selected() {
            if self.board.highlights().contains(&square) {
                return self.commit(MoveCommand::new(selected, square), MoveOrigin::Human);
            }
        }

        self.board.clear_selection();

        let side = self.board.side_to_move();
        let own_piece = self
            .board
            .piece_at(square)
            .filter(|p| p.side() == side)
            .map(|p| p.id());

        match own_piece {
            Some(id) => match self.board.select(id) {
                Ok(destinations) => {
                    let destinations: Vec<Square> = destinations.iter().copied().collect();
                    debug!(piece = %id, %square, moves = destinations.len(), "piece selected");
                    TurnEvent::Selected {
                        piece: id,
                        destinations,
                    }
                    .into()
                }
                Err(e) => {
                    error!(%e, "selection failed");
                    TurnEvent::Cleared.into()
                }
            },
            None => TurnEvent::Cleared.into(),
        }
    }

    /// Issues a move request if the external side is to move, automatic
    /// requests are enabled, and none is outstanding
    pub fn request_external_move(&mut self) -> Option<MoveRequest> {
        if self.pending || !self.auto_requests || self.board.side_to_move() == self.human_side {
            return None;
        }
        self.pending = true;
        info!(side = %self.board.side_to_move(), "requesting external move");
        Some(MoveRequest::from_board(&self.board))
    }

    /// Applies move text proposed by the service, falling back to a random
    /// legal move when it does not resolve
    pub fn apply_external_move(&mut self, text: &str) -> TurnOutcome {
        self.apply_external_move_with(text, &mut rand::rng())
    }

    pub fn apply_external_move_with<R: Rng + ?Sized>(&mut self, text: &str, rng: &mut R) -> TurnOutcome {
        if self.board.side_to_move() == self.human_side {
            warn!(text, "external move arrived on the human turn");
            return TurnEvent::Ignored.into();
        }
        self.pending = false;

        match notation::interpret(text, &self.board) {
            Some(command) => self.commit(command, MoveOrigin::Interpreted),
            None => {
                warn!(text, "move text did not resolve, playing a random move");
                self.fallback_move(rng)
            }
        }
    }

    /// Records a failed service interaction.
    ///
    /// The board and turn are left as they are. Transport failures switch off
    /// automatic requests until the service is marked available again.
    pub fn record_service_failure(&mut self, error: &Error) {
        self.pending = false;
        self.last_error = Some(error.to_string());
        if error.is_transport() {
            self.auto_requests = false;
        }
    }

    fn fallback_move<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TurnOutcome {
        let moves = all_moves(&self.board);
        match moves.choose(rng) {
            Some(command) => self.commit(*command, MoveOrigin::Fallback),
            None => {
                let side = self.board.side_to_move();
                warn!(%side, "no legal moves, passing");
                self.board.pass_turn();
                self.history.push(HistoryEntry::Pass { side });
                TurnOutcome {
                    event: TurnEvent::Passed { side },
                    request: self.request_external_move(),
                }
            }
        }
    }

    fn commit(&mut self, command: MoveCommand, origin: MoveOrigin) -> TurnOutcome {
        match self.board.commit(&command) {
            Ok(record) => {
                self.history.push(HistoryEntry::Move {
                    record: record.clone(),
                    origin,
                });
                TurnOutcome {
                    event: TurnEvent::Moved { record, origin },
                    request: self.request_external_move(),
                }
            }
            Err(e) => {
                error!(%e, "refused to commit move");
                TurnEvent::Ignored.into()
            }
        }
    }
}
