//! Error types for infinite-chess-core

use thiserror::Error;

use crate::board::RulesError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Move service error: {0}")]
    Service(String),

    #[error("No move available: {0}")]
    NoMoveAvailable(String),

    #[error("Invalid board snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Rules violation: {0}")]
    Rules(#[from] RulesError),

    #[error("PGN parsing error: {0}")]
    Pgn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the collaborator could not be reached or answered nonsense
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Json(_) | Error::Service(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PieceId;

    #[test]
    fn test_rules_errors_are_not_transport() {
        let error: Error = RulesError::UnknownPiece(PieceId(3)).into();
        assert!(matches!(error, Error::Rules(RulesError::UnknownPiece(PieceId(3)))));
        assert!(!error.is_transport());
        assert!(Error::Service("502".into()).is_transport());
    }
}
