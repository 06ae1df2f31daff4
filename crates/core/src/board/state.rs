//! The canonical mutable game record

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::movegen;
use super::types::{Piece, PieceId, PieceKind, Side, Square};
use crate::service::MoveRequest;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Violations of the board's placement invariants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("no piece with id {0}")]
    UnknownPiece(PieceId),

    #[error("{0} is occupied by a piece of the moving side")]
    SameSideCapture(Square),

    #[error("{0} is already occupied")]
    SquareOccupied(Square),
}

/// A concrete move: which piece goes where, with an optional promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCommand {
    pub piece: PieceId,
    pub destination: Square,
    pub promotion: Option<PieceKind>,
}

impl MoveCommand {
    pub fn new(piece: PieceId, destination: Square) -> Self {
        Self { piece, destination, promotion: None }
    }

    pub fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promotion = Some(kind);
        self
    }
}

/// What a committed move did to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub piece: PieceId,
    pub side: Side,
    pub kind: PieceKind,
    pub from: Square,
    pub to: Square,
    pub captured: Option<Piece>,
    pub promotion: Option<PieceKind>,
}

#[derive(Debug, Clone)]
pub struct BoardState {
    pieces: BTreeMap<PieceId, Piece>,
    occupancy: BTreeMap<Square, PieceId>,
    side_to_move: Side,
    selected: Option<PieceId>,
    highlights: BTreeSet<Square>,
    next_id: u32,
}

impl BoardState {
    /// A board in the standard starting arrangement, White to move
    pub fn new() -> Self {
        let mut board = Self::empty(Side::White);
        board.reset();
        board
    }

    /// A board with no pieces
    pub fn empty(side_to_move: Side) -> Self {
        Self {
            pieces: BTreeMap::new(),
            occupancy: BTreeMap::new(),
            side_to_move,
            selected: None,
            highlights: BTreeSet::new(),
            next_id: 0,
        }
    }

    /// Rebuilds a board from a move-request snapshot
    pub fn from_snapshot(request: &MoveRequest) -> Result<Self, RulesError> {
        let mut board = Self::empty(request.side_to_move);
        for piece in &request.pieces {
            board.place(piece.side, piece.kind, piece.square)?;
        }
        Ok(board)
    }

    /// Restores the starting arrangement in place
    pub fn reset(&mut self) {
        self.pieces.clear();
        self.occupancy.clear();
        self.side_to_move = Side::White;
        self.clear_selection();

        for side in [Side::Black, Side::White] {
            for (col, kind) in BACK_RANK.iter().enumerate() {
                let square = Square::new(side.back_rank(), col as u8);
                self.place_new(side, *kind, square);
            }
            for col in 0..8 {
                let square = Square::new(side.pawn_rank(), col);
                self.place_new(side, PieceKind::Pawn, square);
            }
        }
    }

    fn place_new(&mut self, side: Side, kind: PieceKind, square: Option<Square>) {
        if let Some(square) = square {
            let placed = self.place(side, kind, square);
            debug_assert!(placed.is_ok(), "starting squares are distinct");
        }
    }

    /// Adds a new piece, assigning it a fresh id
    pub fn place(&mut self, side: Side, kind: PieceKind, square: Square) -> Result<PieceId, RulesError> {
        if self.occupancy.contains_key(&square) {
            return Err(RulesError::SquareOccupied(square));
        }
        let id = PieceId(self.next_id);
        self.next_id += 1;
        self.pieces.insert(id, Piece::new(id, side, kind, square));
        self.occupancy.insert(square, id);
        Ok(id)
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// Pieces in creation order
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = &Piece> {
        self.pieces().filter(move |p| p.side() == side)
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.occupancy.get(&square).and_then(|id| self.pieces.get(id))
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn selected(&self) -> Option<PieceId> {
        self.selected
    }

    pub fn highlights(&self) -> &BTreeSet<Square> {
        &self.highlights
    }

    /// Selects a piece and highlights its legal destinations
    pub(crate) fn select(&mut self, id: PieceId) -> Result<&BTreeSet<Square>, RulesError> {
        let piece = self.piece(id).ok_or(RulesError::UnknownPiece(id))?;
        self.highlights = movegen::legal_destinations(piece, self);
        self.selected = Some(id);
        Ok(&self.highlights)
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected = None;
        self.highlights.clear();
    }

    /// Commits a move, capturing any opponent piece on the destination.
    ///
    /// Does not check the move against the generator; callers commit only
    /// destinations produced by it.
    pub fn commit(&mut self, command: &MoveCommand) -> Result<MoveRecord, RulesError> {
        let mover = self
            .pieces
            .get(&command.piece)
            .ok_or(RulesError::UnknownPiece(command.piece))?;
        let (side, kind, from) = (mover.side(), mover.kind, mover.square);

        if let Some(occupant) = self.piece_at(command.destination) {
            debug_assert!(
                occupant.side() != side,
                "attempted to capture own piece on {}",
                command.destination
            );
            if occupant.side() == side {
                return Err(RulesError::SameSideCapture(command.destination));
            }
        }

        let captured = self
            .occupancy
            .remove(&command.destination)
            .and_then(|id| self.pieces.remove(&id));

        self.occupancy.remove(&from);
        self.occupancy.insert(command.destination, command.piece);
        if let Some(piece) = self.pieces.get_mut(&command.piece) {
            piece.square = command.destination;
            if let Some(promotion) = command.promotion {
                piece.kind = promotion;
            }
        }

        self.pass_turn();
        debug_assert_eq!(self.occupancy.len(), self.pieces.len());

        debug!(piece = %command.piece, %from, to = %command.destination, captured = captured.is_some(), "move committed");

        Ok(MoveRecord {
            piece: command.piece,
            side,
            kind,
            from,
            to: command.destination,
            captured,
            promotion: command.promotion,
        })
    }

    /// Flips the side to move without moving anything
    pub(crate) fn pass_turn(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
        self.clear_selection();
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8u8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8u8 {
                let symbol = Square::new(row, col)
                    .and_then(|sq| self.piece_at(sq))
                    .map(|p| p.kind.symbol(p.side()))
                    .unwrap_or('.');
                write!(f, " {}", symbol)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
