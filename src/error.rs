use thiserror::Error;

use crate::types::Color;

/// Errors raised by the rules engine and the search.
///
/// Illegal moves are not errors: they are reported through
/// [`MoveOutcome`](crate::game::MoveOutcome) and leave the board untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("square ({row}, {col}) is off the board")]
    InvalidSquare { row: i8, col: i8 },
    #[error("malformed square {0:?}")]
    MalformedSquare(String),
    #[error("invalid FEN: {0}")]
    InvalidFen(String),
    #[error("{} has no legal moves", .0.to_human())]
    NoLegalMoves(Color),
    #[error("search depth must be at least 1, got {0}")]
    InvalidDepth(u8),
}
