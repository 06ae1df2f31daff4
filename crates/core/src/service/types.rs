//! Move service wire types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::board::{BoardState, PieceKind, Side, Square};
use crate::error::{Error, Result};

/// Status token the service reports when it is usable
pub const HEALTHY: &str = "healthy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub kind: PieceKind,
    pub side: Side,
    pub square: Square,
}

/// Board snapshot sent when asking the service for a move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub pieces: Vec<PieceSnapshot>,
    pub side_to_move: Side,
}

impl MoveRequest {
    pub fn from_board(board: &BoardState) -> Self {
        let pieces = board
            .pieces()
            .map(|p| PieceSnapshot {
                kind: p.kind,
                side: p.side(),
                square: p.square,
            })
            .collect();

        Self {
            pieces,
            side_to_move: board.side_to_move(),
        }
    }

    /// Checks the snapshot describes a placeable board
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for piece in &self.pieces {
            if !seen.insert(piece.square) {
                return Err(Error::InvalidSnapshot(format!(
                    "two pieces on {}",
                    piece.square
                )));
            }
        }

        for side in [Side::White, Side::Black] {
            let count = self.pieces.iter().filter(|p| p.side == side).count();
            if count > 16 {
                return Err(Error::InvalidSnapshot(format!(
                    "{} has {} pieces",
                    side, count
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub success: bool,
    #[serde(rename = "move", default, skip_serializing_if = "Option::is_none")]
    pub mv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MoveResponse {
    pub fn proposed(mv: String) -> Self {
        Self {
            success: true,
            mv: Some(mv),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            mv: None,
            error: Some(error.into()),
        }
    }

    /// The proposed move text, if the service produced one
    pub fn into_move(self) -> Result<String> {
        match (self.success, self.mv) {
            (true, Some(mv)) => Ok(mv),
            (_, _) => Err(Error::NoMoveAvailable(
                self.error.unwrap_or_else(|| "no move in response".to_string()),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: HEALTHY.to_string(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HEALTHY
    }
}
