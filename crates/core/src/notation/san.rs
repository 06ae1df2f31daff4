//! SAN rendering of legal moves

use crate::board::{legal_destinations, BoardState, MoveCommand, PieceKind};

/// Renders `command` in SAN for the current board.
///
/// Check and mate suffixes are never added; the ruleset has no check.
/// Returns an empty string for an unknown piece.
pub fn format_san(command: &MoveCommand, board: &BoardState) -> String {
    let Some(piece) = board.piece(command.piece) else {
        return String::new();
    };
    let to = command.destination;
    let capture = board
        .piece_at(to)
        .is_some_and(|other| other.side() != piece.side());

    let mut san = String::new();
    match piece.kind.letter() {
        None => {
            if capture {
                san.push(piece.square.file_char());
                san.push('x');
            }
        }
        Some(letter) => {
            san.push(letter);

            let rivals: Vec<_> = board
                .pieces_of(piece.side())
                .filter(|other| other.id() != piece.id() && other.kind == piece.kind)
                .filter(|other| legal_destinations(other, board).contains(&to))
                .collect();

            if !rivals.is_empty() {
                let shares_file = rivals.iter().any(|r| r.square.col() == piece.square.col());
                let shares_rank = rivals.iter().any(|r| r.square.row() == piece.square.row());
                if !shares_file {
                    san.push(piece.square.file_char());
                } else if !shares_rank {
                    san.push(piece.square.rank_char());
                } else {
                    san.push(piece.square.file_char());
                    san.push(piece.square.rank_char());
                }
            }

            if capture {
                san.push('x');
            }
        }
    }

    san.push_str(&to.to_string());

    if let Some(letter) = command.promotion.and_then(PieceKind::letter) {
        san.push('=');
        san.push(letter);
    }

    san
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Side, Square};
    use crate::notation::interpret;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn test_format_simple_moves() {
        let board = BoardState::new();
        let pawn = board.piece_at(sq("e2")).unwrap().id();
        let knight = board.piece_at(sq("g1")).unwrap().id();

        assert_eq!(format_san(&MoveCommand::new(pawn, sq("e4")), &board), "e4");
        assert_eq!(format_san(&MoveCommand::new(knight, sq("f3")), &board), "Nf3");
    }

    #[test]
    fn test_format_captures_and_promotion() {
        let mut board = BoardState::empty(Side::White);
        let pawn = board.place(Side::White, PieceKind::Pawn, sq("e4")).unwrap();
        board.place(Side::Black, PieceKind::Pawn, sq("d5")).unwrap();
        let runner = board.place(Side::White, PieceKind::Pawn, sq("b7")).unwrap();
        board.place(Side::Black, PieceKind::Rook, sq("a8")).unwrap();

        assert_eq!(format_san(&MoveCommand::new(pawn, sq("d5")), &board), "exd5");
        let promote = MoveCommand::new(runner, sq("a8")).with_promotion(PieceKind::Knight);
        assert_eq!(format_san(&promote, &board), "bxa8=N");
    }

    #[test]
    fn test_format_disambiguation() {
        let mut board = BoardState::empty(Side::White);
        let a_rook = board.place(Side::White, PieceKind::Rook, sq("a1")).unwrap();
        board.place(Side::White, PieceKind::Rook, sq("h1")).unwrap();
        let low = board.place(Side::White, PieceKind::Knight, sq("b3")).unwrap();
        board.place(Side::White, PieceKind::Knight, sq("b5")).unwrap();

        assert_eq!(format_san(&MoveCommand::new(a_rook, sq("d1")), &board), "Rad1");
        assert_eq!(format_san(&MoveCommand::new(low, sq("d4")), &board), "N3d4");
    }

    #[test]
    fn test_formatted_moves_interpret_back() {
        let board = BoardState::new();
        for command in crate::board::all_moves(&board) {
            let san = format_san(&command, &board);
            assert_eq!(interpret(&san, &board), Some(command), "{}", san);
        }
    }
}
