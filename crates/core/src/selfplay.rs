//! Random self-play
//!
//! Both sides pick uniformly among their moves until one side has none, a
//! king is taken, or the ply limit is reached. Games are written out as PGN
//! that [`crate::parser::replay_pgn_string`] reads back move for move.

use chrono::NaiveDateTime;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::board::{all_moves, BoardState, MoveCommand, MoveRecord, PieceKind, Side};
use crate::error::Result;
use crate::notation::format_san;

pub const DEFAULT_MAX_PLIES: usize = 500;

const PLAYER_NAME: &str = "RandomEngine";

/// Why a self-play game stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The side to move had nothing to play
    NoMoves(Side),
    KingCaptured { winner: Side },
    PlyLimit,
}

impl Termination {
    /// PGN result token
    pub fn result(&self) -> &'static str {
        match self {
            Termination::KingCaptured { winner: Side::White } => "1-0",
            Termination::KingCaptured { winner: Side::Black } => "0-1",
            Termination::NoMoves(_) | Termination::PlyLimit => "1/2-1/2",
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            Termination::KingCaptured { winner } => Some(*winner),
            _ => None,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::NoMoves(side) => write!(f, "{} has no moves (draw)", side),
            Termination::KingCaptured { winner } => write!(f, "{} wins by capturing the king", winner),
            Termination::PlyLimit => write!(f, "ply limit reached (draw)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelfPlayGame {
    /// SAN of every move, in order
    pub moves: Vec<String>,
    pub records: Vec<MoveRecord>,
    pub termination: Termination,
    pub final_board: BoardState,
}

impl SelfPlayGame {
    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }

    pub fn to_pgn(&self, round: u32, played_at: NaiveDateTime) -> String {
        let result = self.termination.result();
        let mut pgn = String::new();

        for (name, value) in [
            ("Event", "Random Chess Game".to_string()),
            ("Site", "InfiniteChess".to_string()),
            ("Date", played_at.format("%Y.%m.%d").to_string()),
            ("Round", round.to_string()),
            ("White", PLAYER_NAME.to_string()),
            ("Black", PLAYER_NAME.to_string()),
            ("Result", result.to_string()),
        ] {
            pgn.push_str(&format!("[{} \"{}\"]\n", name, value));
        }
        pgn.push('\n');

        let mut tokens = Vec::with_capacity(self.moves.len() * 3 / 2 + 1);
        for (ply, san) in self.moves.iter().enumerate() {
            if ply % 2 == 0 {
                tokens.push(format!("{}.", ply / 2 + 1));
            }
            tokens.push(san.clone());
        }
        tokens.push(result.to_string());

        let mut line_len = 0;
        for token in tokens {
            if line_len > 0 && line_len + 1 + token.len() > 79 {
                pgn.push('\n');
                line_len = 0;
            } else if line_len > 0 {
                pgn.push(' ');
                line_len += 1;
            }
            line_len += token.len();
            pgn.push_str(&token);
        }
        pgn.push('\n');

        pgn
    }

    /// Writes the game to `dir` as `random_game_<timestamp>_<round>.pgn`
    pub fn save_pgn(&self, dir: &Path, round: u32, played_at: NaiveDateTime) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "random_game_{}_{}.pgn",
            played_at.format("%Y%m%d_%H%M%S"),
            round
        ));
        fs::write(&path, self.to_pgn(round, played_at))?;
        Ok(path)
    }
}

/// Plays a random game from the starting position
pub fn play_random_game<R: Rng + ?Sized>(rng: &mut R, max_plies: usize) -> Result<SelfPlayGame> {
    play_out(BoardState::new(), rng, max_plies)
}

/// Plays random moves from `board` until the game stops.
///
/// Pawns reaching the last rank become queens.
pub fn play_out<R: Rng + ?Sized>(
    mut board: BoardState,
    rng: &mut R,
    max_plies: usize,
) -> Result<SelfPlayGame> {
    let mut moves = Vec::new();
    let mut records = Vec::new();

    let termination = loop {
        if moves.len() >= max_plies {
            break Termination::PlyLimit;
        }

        let side = board.side_to_move();
        let Some(command) = all_moves(&board).choose(rng).copied() else {
            break Termination::NoMoves(side);
        };
        let command = with_auto_queen(&board, command);

        let san = format_san(&command, &board);
        let record = board.commit(&command)?;
        debug!(ply = moves.len() + 1, %side, san = %san, "self-play move");
        moves.push(san);

        let king_taken = record
            .captured
            .as_ref()
            .is_some_and(|p| p.kind == PieceKind::King);
        records.push(record);
        if king_taken {
            break Termination::KingCaptured { winner: side };
        }
    };

    info!(plies = moves.len(), %termination, "self-play game finished");

    Ok(SelfPlayGame {
        moves,
        records,
        termination,
        final_board: board,
    })
}

fn with_auto_queen(board: &BoardState, command: MoveCommand) -> MoveCommand {
    match board.piece(command.piece) {
        Some(piece)
            if piece.kind == PieceKind::Pawn
                && command.destination.row() == piece.side().last_rank() =>
        {
            command.with_promotion(PieceKind::Queen)
        }
        _ => command,
    }
}

/// Win/draw tally over several games
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelfPlayStats {
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
}

impl SelfPlayStats {
    pub fn record(&mut self, game: &SelfPlayGame) {
        match game.termination.winner() {
            Some(Side::White) => self.white_wins += 1,
            Some(Side::Black) => self.black_wins += 1,
            None => self.draws += 1,
        }
    }

    pub fn games(&self) -> u32 {
        self.white_wins + self.black_wins + self.draws
    }

    fn rate(&self, count: u32) -> f64 {
        match self.games() {
            0 => 0.0,
            games => count as f64 / games as f64 * 100.0,
        }
    }
}

impl fmt::Display for SelfPlayStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Games played: {}", self.games())?;
        writeln!(f, "White wins: {} ({:.1}%)", self.white_wins, self.rate(self.white_wins))?;
        writeln!(f, "Black wins: {} ({:.1}%)", self.black_wins, self.rate(self.black_wins))?;
        write!(f, "Draws: {} ({:.1}%)", self.draws, self.rate(self.draws))
    }
}
