//! Random legal move proposals

use infinite_chess_core::board::{
    all_moves, BoardState, MoveCommand, PieceKind, Side, Square as BoardSquare,
};
use infinite_chess_core::notation::format_san;
use rand::seq::IndexedRandom;
use rand::Rng;
use shakmaty::san::San;
use shakmaty::{
    Board, CastlingMode, Chess, Color, File, FromSetup, Move, Position, Rank, Role, Setup, Square,
};
use tracing::debug;

/// Picks a random move for the side to move, in SAN.
///
/// Positions that are legal chess are handled by shakmaty, so check and
/// promotion are respected. Anything shakmaty rejects (a missing king, pawns
/// on a back rank) falls back to the simplified movement rules of the core
/// crate. Either way the text is written by the core's `format_san`, which
/// disambiguates against the same candidates the client's interpreter sees.
pub fn propose<R: Rng + ?Sized>(board: &BoardState, rng: &mut R) -> Option<String> {
    match to_chess(board) {
        Some(pos) => {
            let moves = pos.legal_moves();
            let m = moves.choose(rng)?;
            match to_command(board, m) {
                Some(command) => Some(format_san(&command, board)),
                None => Some(San::from_move(&pos, m.clone()).to_string()),
            }
        }
        None => {
            debug!("position rejected by shakmaty, using simplified rules");
            let moves = all_moves(board);
            let command = moves.choose(rng)?;
            Some(format_san(command, board))
        }
    }
}

fn to_chess(board: &BoardState) -> Option<Chess> {
    let mut placement = Board::empty();
    for piece in board.pieces() {
        let target = shakmaty::Piece {
            color: color(piece.side()),
            role: role(piece.kind),
        };
        placement.set_piece_at(square(piece.square), target);
    }

    let mut setup = Setup::empty();
    setup.board = placement;
    setup.turn = color(board.side_to_move());

    Chess::from_setup(setup, CastlingMode::Standard)
        .or_else(|e| e.ignore_too_much_material())
        .or_else(|e| e.ignore_impossible_check())
        .ok()
}

/// The core command for a shakmaty move on the same position
fn to_command(board: &BoardState, m: &Move) -> Option<MoveCommand> {
    let from = board_square(m.from()?)?;
    let piece = board.piece_at(from)?;
    let command = MoveCommand::new(piece.id(), board_square(m.to())?);
    Some(match m.promotion() {
        Some(promoted) => command.with_promotion(kind(promoted)),
        None => command,
    })
}

fn board_square(sq: Square) -> Option<BoardSquare> {
    BoardSquare::from_algebraic(&sq.to_string())
}

fn square(sq: BoardSquare) -> Square {
    // row 0 is rank 8
    Square::from_coords(File::new(sq.col() as u32), Rank::new(7 - sq.row() as u32))
}

fn color(side: Side) -> Color {
    match side {
        Side::White => Color::White,
        Side::Black => Color::Black,
    }
}

fn role(kind: PieceKind) -> Role {
    match kind {
        PieceKind::Pawn => Role::Pawn,
        PieceKind::Knight => Role::Knight,
        PieceKind::Bishop => Role::Bishop,
        PieceKind::Rook => Role::Rook,
        PieceKind::Queen => Role::Queen,
        PieceKind::King => Role::King,
    }
}

fn kind(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}
