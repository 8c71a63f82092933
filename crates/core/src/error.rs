//! Error kinds shared by the board, the pipeline and the controller.
//!
//! None of these escape the controller as a panic: a tap that fails is
//! reported back as a dropped tap, a timeout is logged, and an invariant
//! violation ends the game.

use blast_grid_types::Phase;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("position ({x}, {y}) is outside the board")]
    OutOfBounds { x: i32, y: i32 },

    #[error("tapped cell is empty")]
    EmptyCell,

    #[error("group of {size} is too small to blast")]
    NotEnoughMatches { size: usize },

    #[error("no moves left")]
    NoMovesLeft,

    #[error("input is locked")]
    InputLocked,

    #[error("board invariant violated: {0}")]
    InvariantViolation(String),

    #[error("collaborator did not acknowledge the {phase} phase in time")]
    CollaboratorTimeout { phase: Phase },
}

impl GameError {
    /// Fatal errors end the game; everything else only drops the input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::InvariantViolation(_))
    }
}

/// The high score could not be flushed to storage
#[derive(Debug, Error)]
#[error("failed to save high score: {0}")]
pub struct SaveError(#[source] Box<dyn std::error::Error + Send + Sync>);

impl SaveError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}
