//! Per-piece legal destination generation
//!
//! The ruleset has no castling, no en passant and no
//! check of any kind. A king may move onto an attacked square.

use std::collections::BTreeSet;

use super::state::{BoardState, MoveCommand};
use super::types::{Piece, PieceKind, Square};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

const ADJACENT: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Every square `piece` may move to on `board`.
pub fn legal_destinations(piece: &Piece, board: &BoardState) -> BTreeSet<Square> {
    match piece.kind {
        PieceKind::Pawn => pawn_destinations(piece, board),
        PieceKind::Knight => step_destinations(piece, board, &KNIGHT_OFFSETS),
        PieceKind::King => step_destinations(piece, board, &ADJACENT),
        PieceKind::Bishop => ray_destinations(piece, board, &DIAGONAL),
        PieceKind::Rook => ray_destinations(piece, board, &ORTHOGONAL),
        PieceKind::Queen => ray_destinations(piece, board, &ADJACENT),
    }
}

/// Every move available to the side to move, in piece order then square order
pub fn all_moves(board: &BoardState) -> Vec<MoveCommand> {
    board
        .pieces_of(board.side_to_move())
        .flat_map(|piece| {
            legal_destinations(piece, board)
                .into_iter()
                .map(move |to| MoveCommand::new(piece.id(), to))
        })
        .collect()
}

fn is_enemy(piece: &Piece, board: &BoardState, square: Square) -> bool {
    board
        .piece_at(square)
        .is_some_and(|other| other.side() != piece.side())
}

fn pawn_destinations(piece: &Piece, board: &BoardState) -> BTreeSet<Square> {
    let mut destinations = BTreeSet::new();
    let forward = piece.side().forward();
    let from = piece.square;

    if let Some(one) = from.offset(forward, 0) {
        if board.piece_at(one).is_none() {
            destinations.insert(one);

            if from.row() == piece.side().pawn_rank() {
                if let Some(two) = one.offset(forward, 0) {
                    if board.piece_at(two).is_none() {
                        destinations.insert(two);
                    }
                }
            }
        }
    }

    for dc in [-1, 1] {
        if let Some(diagonal) = from.offset(forward, dc) {
            if is_enemy(piece, board, diagonal) {
                destinations.insert(diagonal);
            }
        }
    }

    destinations
}

fn step_destinations(piece: &Piece, board: &BoardState, offsets: &[(i8, i8)]) -> BTreeSet<Square> {
    offsets
        .iter()
        .filter_map(|&(dr, dc)| piece.square.offset(dr, dc))
        .filter(|&to| match board.piece_at(to) {
            Some(other) => other.side() != piece.side(),
            None => true,
        })
        .collect()
}

fn ray_destinations(piece: &Piece, board: &BoardState, directions: &[(i8, i8)]) -> BTreeSet<Square> {
    let mut destinations = BTreeSet::new();

    for &(dr, dc) in directions {
        let mut current = piece.square;
        while let Some(next) = current.offset(dr, dc) {
            match board.piece_at(next) {
                None => {
                    destinations.insert(next);
                    current = next;
                }
                Some(other) => {
                    if other.side() != piece.side() {
                        destinations.insert(next);
                    }
                    break;
                }
            }
        }
    }

    destinations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{PieceId, Side};
    use crate::notation::{format_san, interpret};
    use rand::rngs::StdRng;
    use rand::seq::IndexedRandom;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn squares(names: &[&str]) -> BTreeSet<Square> {
        names.iter().map(|n| sq(n)).collect()
    }

    fn destinations(board: &BoardState, id: PieceId) -> BTreeSet<Square> {
        legal_destinations(board.piece(id).unwrap(), board)
    }

    #[test]
    fn test_starting_position_has_twenty_moves() {
        let board = BoardState::new();
        assert_eq!(all_moves(&board).len(), 20);
    }

    #[test]
    fn test_pawn_single_and_double_step() {
        let board = BoardState::new();
        let pawn = board.piece_at(sq("e2")).unwrap().id();
        assert_eq!(destinations(&board, pawn), squares(&["e3", "e4"]));

        let black = board.piece_at(sq("d7")).unwrap().id();
        assert_eq!(destinations(&board, black), squares(&["d6", "d5"]));
    }

    #[test]
    fn test_pawn_blocked_and_off_home_rank() {
        let mut board = BoardState::empty(Side::White);
        let blocked = board.place(Side::White, PieceKind::Pawn, sq("c2")).unwrap();
        board.place(Side::Black, PieceKind::Knight, sq("c3")).unwrap();
        let half_blocked = board.place(Side::White, PieceKind::Pawn, sq("f2")).unwrap();
        board.place(Side::White, PieceKind::Bishop, sq("f4")).unwrap();
        let advanced = board.place(Side::White, PieceKind::Pawn, sq("h3")).unwrap();

        assert!(destinations(&board, blocked).is_empty());
        assert_eq!(destinations(&board, half_blocked), squares(&["f3"]));
        assert_eq!(destinations(&board, advanced), squares(&["h4"]));
    }

    #[test]
    fn test_pawn_captures_only_opponents() {
        let mut board = BoardState::empty(Side::White);
        let pawn = board.place(Side::White, PieceKind::Pawn, sq("e4")).unwrap();
        board.place(Side::Black, PieceKind::Pawn, sq("d5")).unwrap();
        board.place(Side::White, PieceKind::Knight, sq("f5")).unwrap();

        assert_eq!(destinations(&board, pawn), squares(&["e5", "d5"]));
    }

    #[test]
    fn test_pawn_on_last_rank_has_no_moves() {
        let mut board = BoardState::empty(Side::White);
        let pawn = board.place(Side::White, PieceKind::Pawn, sq("a8")).unwrap();
        assert!(destinations(&board, pawn).is_empty());
    }

    #[test]
    fn test_knight_in_corner() {
        let mut board = BoardState::empty(Side::White);
        let knight = board.place(Side::White, PieceKind::Knight, sq("a1")).unwrap();
        board.place(Side::White, PieceKind::Pawn, sq("b3")).unwrap();

        assert_eq!(destinations(&board, knight), squares(&["c2"]));
    }

    #[test]
    fn test_rook_rays_stop_at_first_occupant() {
        let mut board = BoardState::empty(Side::White);
        let rook = board.place(Side::White, PieceKind::Rook, sq("d4")).unwrap();
        board.place(Side::White, PieceKind::Pawn, sq("d6")).unwrap();
        board.place(Side::Black, PieceKind::Pawn, sq("f4")).unwrap();
        board.place(Side::Black, PieceKind::Pawn, sq("g4")).unwrap();

        let expected = squares(&["d5", "d3", "d2", "d1", "c4", "b4", "a4", "e4", "f4"]);
        assert_eq!(destinations(&board, rook), expected);
    }

    #[test]
    fn test_bishop_rays() {
        let mut board = BoardState::empty(Side::White);
        let bishop = board.place(Side::White, PieceKind::Bishop, sq("c1")).unwrap();
        board.place(Side::Black, PieceKind::Rook, sq("e3")).unwrap();

        assert_eq!(destinations(&board, bishop), squares(&["b2", "a3", "d2", "e3"]));
    }

    #[test]
    fn test_queen_combines_rook_and_bishop() {
        let mut board = BoardState::empty(Side::Black);
        let queen = board.place(Side::Black, PieceKind::Queen, sq("d4")).unwrap();
        assert_eq!(destinations(&board, queen).len(), 27);
    }

    #[test]
    fn test_king_ignores_attacks() {
        let mut board = BoardState::empty(Side::White);
        let king = board.place(Side::White, PieceKind::King, sq("e1")).unwrap();
        board.place(Side::Black, PieceKind::Rook, sq("a2")).unwrap();
        board.place(Side::White, PieceKind::Pawn, sq("d2")).unwrap();

        assert_eq!(destinations(&board, king), squares(&["d1", "e2", "f2", "f1"]));
    }

    #[test]
    fn test_random_games_keep_board_invariants() {
        let mut rng = StdRng::seed_from_u64(2024);

        for _ in 0..20 {
            let mut board = BoardState::new();
            for _ in 0..200 {
                let occupied: HashSet<Square> = board.pieces().map(|p| p.square).collect();
                assert_eq!(occupied.len(), board.piece_count());

                let moves = all_moves(&board);
                for command in &moves {
                    let mover = board.piece(command.piece).unwrap();
                    assert!(board
                        .piece_at(command.destination)
                        .map_or(true, |p| p.side() != mover.side()));

                    let san = format_san(command, &board);
                    assert_eq!(interpret(&san, &board), Some(*command), "{}", san);
                }

                let Some(command) = moves.choose(&mut rng) else {
                    break;
                };
                board.commit(command).unwrap();
            }
        }
    }
}
