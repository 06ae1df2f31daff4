//! Board vocabulary: squares, sides, piece kinds and pieces

use serde::{Deserialize, Serialize};
use std::fmt;

/// A square on the 8x8 board.
///
/// Row 0 is rank 8 (Black's back rank) and row 7 is rank 1; column 0 is the a-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSquare")]
pub struct Square {
    row: u8,
    col: u8,
}

#[derive(Deserialize)]
struct RawSquare {
    row: i64,
    col: i64,
}

impl TryFrom<RawSquare> for Square {
    type Error = String;

    fn try_from(raw: RawSquare) -> Result<Self, Self::Error> {
        Square::from_coords(raw.row, raw.col)
            .ok_or_else(|| format!("square ({}, {}) is off the board", raw.row, raw.col))
    }
}

impl Square {
    /// Creates a square, returning `None` when either coordinate is outside 0..8
    pub fn new(row: u8, col: u8) -> Option<Self> {
        (row < 8 && col < 8).then_some(Self { row, col })
    }

    fn from_coords(row: i64, col: i64) -> Option<Self> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Self { row: row as u8, col: col as u8 })
        } else {
            None
        }
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    /// The square `(dr, dc)` away from this one, if it is still on the board
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        Self::from_coords(self.row as i64 + dr as i64, self.col as i64 + dc as i64)
    }

    /// Parses algebraic coordinates such as `"e4"`
    pub fn from_algebraic(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let (file, rank) = (chars.next()?, chars.next()?);
        if chars.next().is_some() {
            return None;
        }
        Some(Self { row: rank_to_row(rank)?, col: file_to_col(file)? })
    }

    /// File letter, `'a'..='h'`
    pub fn file_char(self) -> char {
        (b'a' + self.col) as char
    }

    /// Rank digit, `'1'..='8'`
    pub fn rank_char(self) -> char {
        (b'8' - self.row) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

/// Column index for a file letter
pub fn file_to_col(file: char) -> Option<u8> {
    ('a'..='h').contains(&file).then(|| file as u8 - b'a')
}

/// Row index for a rank digit
pub fn rank_to_row(rank: char) -> Option<u8> {
    ('1'..='8').contains(&rank).then(|| b'8' - rank as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// First mover
    White,
    /// Second mover
    Black,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Row delta of a forward pawn step
    pub fn forward(self) -> i8 {
        match self {
            Side::White => -1,
            Side::Black => 1,
        }
    }

    pub fn back_rank(self) -> u8 {
        match self {
            Side::White => 7,
            Side::Black => 0,
        }
    }

    pub fn pawn_rank(self) -> u8 {
        match self {
            Side::White => 6,
            Side::Black => 1,
        }
    }

    /// The row a pawn of this side promotes on
    pub fn last_rank(self) -> u8 {
        self.opponent().back_rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "white" | "w" => Ok(Side::White),
            "black" | "b" => Ok(Side::Black),
            other => Err(format!("unknown side: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Uppercase SAN letter; pawns have none
    pub fn letter(self) -> Option<char> {
        match self {
            PieceKind::Pawn => None,
            PieceKind::Knight => Some('N'),
            PieceKind::Bishop => Some('B'),
            PieceKind::Rook => Some('R'),
            PieceKind::Queen => Some('Q'),
            PieceKind::King => Some('K'),
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Kinds a pawn may promote to
    pub fn from_promotion_letter(letter: char) -> Option<Self> {
        match Self::from_letter(letter)? {
            PieceKind::King => None,
            kind => Some(kind),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }

    /// Diagram symbol: uppercase for White, lowercase for Black
    pub fn symbol(self, side: Side) -> char {
        let c = self.letter().unwrap_or('P');
        match side {
            Side::White => c,
            Side::Black => c.to_ascii_lowercase(),
        }
    }
}

/// Stable piece identity, assigned once per game and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    id: PieceId,
    side: Side,
    pub kind: PieceKind,
    pub square: Square,
}

impl Piece {
    pub(crate) fn new(id: PieceId, side: Side, kind: PieceKind, square: Square) -> Self {
        Self { id, side, kind, square }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }
}
