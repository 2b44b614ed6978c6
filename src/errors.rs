//! Crate error types.
//!
//! Only caller misuse surfaces as an error, and every rejected call leaves
//! battle state untouched. Malformed dice notation is never an error: the
//! dice engine degrades to fallback values so one bad ability definition
//! cannot abort a battle.

use crate::battle::controller::Side;
use std::fmt;

/// Errors for actions the turn controller refuses to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnError {
    /// No battle has been started, or it was reset.
    BattleNotStarted,
    /// The battle has already ended.
    BattleOver,
    /// The acting side does not hold the current turn.
    NotYourTurn(Side),
    /// A previous action, or its round flush, has not resolved yet.
    MoveInProgress,
    /// Ability index out of range for the acting combatant's loadout.
    InvalidAbility(usize),
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnError::BattleNotStarted => write!(f, "No battle in progress"),
            TurnError::BattleOver => write!(f, "The battle has already ended"),
            TurnError::NotYourTurn(side) => write!(f, "It is not side {}'s turn", side),
            TurnError::MoveInProgress => write!(f, "A move is already in progress"),
            TurnError::InvalidAbility(index) => write!(f, "Invalid ability index: {}", index),
        }
    }
}

impl std::error::Error for TurnError {}

/// Type alias for Results using TurnError.
pub type TurnResult<T> = Result<T, TurnError>;
