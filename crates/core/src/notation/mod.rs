//! Algebraic move notation
//!
//! Turns SAN-like move text from the move service into a [`MoveCommand`]
//! against the current board. Interpretation never mutates the board.
//!
//! Parsing happens in two stages: [`parse`] recognizes the structure of the
//! text, then the parsed form is resolved against the legal destinations of
//! the side to move. Castling is recognized but never resolves, since the
//! ruleset has no castling.

mod san;

pub use san::format_san;

use crate::board::{
    file_to_col, legal_destinations, rank_to_row, BoardState, MoveCommand, Piece, PieceKind, Square,
};

/// Structural reading of a move text, before it is checked against a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notation {
    Castle { long: bool },
    Piece {
        kind: PieceKind,
        from_file: Option<u8>,
        from_rank: Option<u8>,
        capture: bool,
        destination: Square,
    },
    Pawn {
        from_file: u8,
        capture: bool,
        destination: Square,
        promotion: Option<PieceKind>,
    },
}

/// Resolves `text` to a concrete move for the side to move on `board`.
pub fn interpret(text: &str, board: &BoardState) -> Option<MoveCommand> {
    let notation = parse(text)?;
    resolve(&notation, board)
}

/// Recognizes the structure of a move text.
pub fn parse(text: &str) -> Option<Notation> {
    let text = strip_decorations(text);
    if text.is_empty() {
        return None;
    }

    parse_castle(text)
        .or_else(|| parse_piece_move(text))
        .or_else(|| parse_pawn_move(text))
}

fn strip_decorations(text: &str) -> &str {
    text.trim().trim_end_matches(['+', '#', '!', '?']).trim_end()
}

fn parse_castle(text: &str) -> Option<Notation> {
    match text {
        "O-O" | "0-0" => Some(Notation::Castle { long: false }),
        "O-O-O" | "0-0-0" => Some(Notation::Castle { long: true }),
        _ => None,
    }
}

/// Splits off the trailing two-character destination square
fn split_destination(chars: &[char]) -> Option<(&[char], Square)> {
    let n = chars.len();
    if n < 2 {
        return None;
    }
    let col = file_to_col(chars[n - 2])?;
    let row = rank_to_row(chars[n - 1])?;
    Some((&chars[..n - 2], Square::new(row, col)?))
}

fn parse_piece_move(text: &str) -> Option<Notation> {
    let chars: Vec<char> = text.chars().collect();
    let kind = PieceKind::from_letter(*chars.first()?)?;
    let (middle, destination) = split_destination(&chars[1..])?;

    let mut from_file = None;
    let mut from_rank = None;
    let mut capture = false;

    for &c in middle {
        if c == 'x' && !capture {
            capture = true;
        } else if let Some(col) = file_to_col(c) {
            from_file = Some(col);
        } else if let Some(row) = rank_to_row(c) {
            from_rank = Some(row);
        } else {
            return None;
        }
    }

    Some(Notation::Piece {
        kind,
        from_file,
        from_rank,
        capture,
        destination,
    })
}

fn parse_pawn_move(text: &str) -> Option<Notation> {
    let (body, promotion) = match text.split_once('=') {
        Some((body, suffix)) => {
            let mut letters = suffix.chars();
            let kind = PieceKind::from_promotion_letter(letters.next()?)?;
            if letters.next().is_some() {
                return None;
            }
            (body, Some(kind))
        }
        None => (text, None),
    };

    let chars: Vec<char> = body.chars().collect();
    match chars.as_slice() {
        [_, _] => {
            let (_, destination) = split_destination(&chars)?;
            Some(Notation::Pawn {
                from_file: destination.col(),
                capture: false,
                destination,
                promotion,
            })
        }
        [file, 'x', _, _] => {
            let from_file = file_to_col(*file)?;
            let (_, destination) = split_destination(&chars[2..])?;
            Some(Notation::Pawn {
                from_file,
                capture: true,
                destination,
                promotion,
            })
        }
        _ => None,
    }
}

fn resolve(notation: &Notation, board: &BoardState) -> Option<MoveCommand> {
    match *notation {
        Notation::Castle { .. } => None,
        Notation::Piece {
            kind,
            from_file,
            from_rank,
            capture,
            destination,
        } => {
            if capture && !holds_opponent(board, destination) {
                return None;
            }
            first_candidate(board, destination, |piece| {
                piece.kind == kind
                    && from_file.map_or(true, |col| piece.square.col() == col)
                    && from_rank.map_or(true, |row| piece.square.row() == row)
            })
            .map(|piece| MoveCommand::new(piece.id(), destination))
        }
        Notation::Pawn {
            from_file,
            capture,
            destination,
            promotion,
        } => {
            if capture && !holds_opponent(board, destination) {
                return None;
            }
            if promotion.is_some() && destination.row() != board.side_to_move().last_rank() {
                return None;
            }
            let pawn = first_candidate(board, destination, |piece| {
                piece.kind == PieceKind::Pawn && piece.square.col() == from_file
            })?;
            let command = MoveCommand::new(pawn.id(), destination);
            Some(match promotion {
                Some(kind) => command.with_promotion(kind),
                None => command,
            })
        }
    }
}

fn holds_opponent(board: &BoardState, square: Square) -> bool {
    board
        .piece_at(square)
        .is_some_and(|p| p.side() != board.side_to_move())
}

/// First piece of the side to move, in creation order, that passes `filter`
/// and can legally reach `destination`
fn first_candidate<'a>(
    board: &'a BoardState,
    destination: Square,
    filter: impl Fn(&Piece) -> bool,
) -> Option<&'a Piece> {
    board
        .pieces_of(board.side_to_move())
        .filter(|piece| filter(*piece))
        .find(|piece| legal_destinations(piece, board).contains(&destination))
}
