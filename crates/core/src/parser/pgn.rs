//! PGN replay through the notation interpreter

use pgn_reader::{RawTag, SanPlus, Skip, Visitor};
use std::fs;
use std::io::Cursor;
use std::ops::ControlFlow;
use std::path::Path;
use tracing::debug;

use crate::board::BoardState;
use crate::error::{Error, Result};
use crate::notation;

/// A game from a PGN file, replayed as far as the ruleset allows
#[derive(Debug, Clone)]
pub struct ReplayedGame {
    pub event: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    /// Moves that resolved and were committed, in order
    pub moves: Vec<String>,
    /// Ply index and text of the first move that did not resolve
    pub stopped_at: Option<(usize, String)>,
    pub final_board: BoardState,
}

impl ReplayedGame {
    pub fn is_complete(&self) -> bool {
        self.stopped_at.is_none()
    }

    pub fn summary(&self) -> String {
        let white = self.white.as_deref().unwrap_or("Unknown");
        let black = self.black.as_deref().unwrap_or("Unknown");
        let result = self.result.as_deref().unwrap_or("*");
        format!("{} vs {} - {}", white, black, result)
    }
}

#[derive(Default)]
struct GameTags {
    event: Option<String>,
    white: Option<String>,
    black: Option<String>,
    result: Option<String>,
}

struct GameMoves {
    tags: GameTags,
    moves: Vec<String>,
    board: BoardState,
    stopped_at: Option<(usize, String)>,
}

struct ReplayVisitor;

impl Visitor for ReplayVisitor {
    type Tags = GameTags;
    type Movetext = GameMoves;
    type Output = ReplayedGame;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let value = value.decode_utf8_lossy().to_string();

        match name {
            b"Event" => tags.event = Some(value),
            b"White" => tags.white = Some(value),
            b"Black" => tags.black = Some(value),
            b"Result" => tags.result = Some(value),
            _ => {}
        }

        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(GameMoves {
            tags,
            moves: Vec::new(),
            board: BoardState::new(),
            stopped_at: None,
        })
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        if movetext.stopped_at.is_some() {
            return ControlFlow::Continue(());
        }

        let text = san.san.to_string();
        let ply = movetext.moves.len();

        match notation::interpret(&text, &movetext.board) {
            Some(command) => match movetext.board.commit(&command) {
                Ok(_) => movetext.moves.push(text),
                Err(_) => movetext.stopped_at = Some((ply, text)),
            },
            None => {
                debug!(ply, san = %text, "replay stopped");
                movetext.stopped_at = Some((ply, text));
            }
        }

        ControlFlow::Continue(())
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        ReplayedGame {
            event: movetext.tags.event,
            white: movetext.tags.white,
            black: movetext.tags.black,
            result: movetext.tags.result,
            moves: movetext.moves,
            stopped_at: movetext.stopped_at,
            final_board: movetext.board,
        }
    }
}

pub fn replay_pgn_file<P: AsRef<Path>>(path: P) -> Result<Vec<ReplayedGame>> {
    let contents = fs::read_to_string(path)?;
    replay_pgn_string(&contents)
}

pub fn replay_pgn_string(pgn: &str) -> Result<Vec<ReplayedGame>> {
    let mut visitor = ReplayVisitor;
    let mut games = Vec::new();

    let cursor = Cursor::new(pgn.as_bytes());
    let mut reader = pgn_reader::Reader::new(cursor);

    loop {
        match reader.read_game(&mut visitor) {
            Ok(Some(game)) => games.push(game),
            Ok(None) => break,
            Err(e) => return Err(Error::Pgn(e.to_string())),
        }
    }

    if games.is_empty() {
        Err(Error::Pgn("No valid games found in PGN".to_string()))
    } else {
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{PieceKind, Side, Square};

    const SAMPLE_PGN: &str = r#"[Event "Test"]
[White "Alice"]
[Black "Bob"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Bxc6 dxc6 1-0
"#;

    const CASTLING_PGN: &str = r#"[Event "Castle"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. O-O Nf6 *
"#;

    #[test]
    fn test_replay_full_game() {
        let games = replay_pgn_string(SAMPLE_PGN).unwrap();
        assert_eq!(games.len(), 1);

        let game = &games[0];
        assert!(game.is_complete());
        assert_eq!(game.moves.len(), 8);
        assert_eq!(game.summary(), "Alice vs Bob - 1-0");
        assert_eq!(game.final_board.side_to_move(), Side::White);
        assert_eq!(game.final_board.piece_count(), 30);

        let c6 = Square::from_algebraic("c6").unwrap();
        let piece = game.final_board.piece_at(c6).unwrap();
        assert_eq!((piece.kind, piece.side()), (PieceKind::Pawn, Side::Black));
    }

    #[test]
    fn test_replay_stops_at_castling() {
        let games = replay_pgn_string(CASTLING_PGN).unwrap();
        let game = &games[0];

        assert_eq!(game.stopped_at, Some((6, "O-O".to_string())));
        assert_eq!(game.moves.len(), 6);
        assert_eq!(game.final_board.side_to_move(), Side::White);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(replay_pgn_string(""), Err(Error::Pgn(_))));
    }
}
