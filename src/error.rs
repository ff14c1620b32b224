//! Error types for coreshuffle.
//!
//! All errors are strongly typed using thiserror. Move errors are the recoverable
//! rejections a presentation layer re-prompts on; `Diverged` is the one condition
//! after which a session must not be used again.

use thiserror::Error;

use crate::inventory::SlotId;
use crate::position::Position;

/// Validation errors for malformed inputs (shapes, coordinates, stock, commands).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Unknown core shape '{name}'")]
    UnknownShape {
        name: String,
    },

    #[error("Invalid core shape '{name}': {reason}")]
    InvalidShape {
        name: String,
        reason: String,
    },

    #[error("Invalid coordinate '{input}': {reason}")]
    InvalidCoordinate {
        input: String,
        reason: String,
    },

    #[error("Invalid inventory stock: {reason}")]
    InvalidStock {
        reason: String,
    },

    #[error("Invalid command '{input}': {reason}")]
    InvalidCommand {
        input: String,
        reason: String,
    },

    #[error("Assembly label cannot be empty")]
    EmptyLabel,
}

/// Rejections raised by the move primitives and by commit.
///
/// None of these leave a partially applied move behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MoveError {
    #[error("Position {position} is outside the {width}x{height} core")]
    OutOfBounds {
        position: Position,
        width: usize,
        height: usize,
    },

    #[error("Invalid move at {position}: {reason}")]
    InvalidMove {
        position: Position,
        reason: String,
    },

    #[error("Unsupported operation '{operation}': {reason}")]
    UnsupportedOperation {
        operation: String,
        reason: String,
    },

    #[error("Inventory slot {slot} has no assemblies left")]
    InsufficientInventory {
        slot: SlotId,
    },

    #[error("Inventory slot {slot} already exists")]
    SlotInUse {
        slot: SlotId,
    },

    #[error("Core is not fully loaded: {} empty position(s)", empty.len())]
    IncompleteCore {
        empty: Vec<Position>,
    },
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level error type for coreshuffle.
#[derive(Debug, Error)]
pub enum ShuffleError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Move rejected: {0}")]
    Move(#[from] MoveError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The undo postcondition failed: replaying the history backwards did not
    /// reproduce the baseline.
    #[error("Undo diverged from baseline at {position}: expected {expected}, found {actual}")]
    Diverged {
        position: String,
        expected: String,
        actual: String,
    },

    #[error("Session is poisoned by an earlier divergence and must be discarded")]
    SessionPoisoned,

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl ShuffleError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a move rejection.
    #[must_use]
    pub const fn is_move(&self) -> bool {
        matches!(self, Self::Move(_))
    }

    /// Returns the move rejection, if this is one.
    #[must_use]
    pub const fn as_move(&self) -> Option<&MoveError> {
        match self {
            Self::Move(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true if the caller may re-prompt and keep using the session.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Move(_) | Self::Config(_) => true,
            Self::Diverged { .. } | Self::SessionPoisoned | Self::Internal { .. } => false,
        }
    }
}

/// Result type alias for coreshuffle operations.
pub type ShuffleResult<T> = Result<T, ShuffleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = MoveError::OutOfBounds {
            position: Position::new(20, 3),
            width: 15,
            height: 15,
        };
        let msg = format!("{err}");
        assert!(msg.contains("(20, 3)"));
        assert!(msg.contains("15x15"));
    }

    #[test]
    fn test_incomplete_core_counts_positions() {
        let err = MoveError::IncompleteCore {
            empty: vec![Position::new(0, 0), Position::new(1, 0)],
        };
        assert!(format!("{err}").contains("2 empty"));
    }

    #[test]
    fn test_insufficient_inventory_names_slot() {
        let slot = SlotId::new();
        let err = MoveError::InsufficientInventory { slot };
        assert!(format!("{err}").contains(&slot.to_string()));
    }

    #[test]
    fn test_slot_in_use_is_recoverable() {
        let slot = SlotId::new();
        let err: ShuffleError = MoveError::SlotInUse { slot }.into();
        assert!(err.is_recoverable());
        assert!(format!("{err}").contains("already exists"));
    }

    #[test]
    fn test_shuffle_error_from_move() {
        let err: ShuffleError = MoveError::UnsupportedOperation {
            operation: "rotate".to_string(),
            reason: "shape is not square".to_string(),
        }
        .into();
        assert!(err.is_move());
        assert!(err.is_recoverable());
        assert!(matches!(
            err.as_move(),
            Some(MoveError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_shuffle_error_from_validation() {
        let err: ShuffleError = ValidationError::EmptyLabel.into();
        assert!(err.is_validation());
        assert!(err.is_recoverable());
        assert!(err.as_move().is_none());
    }

    #[test]
    fn test_divergence_is_fatal() {
        let err = ShuffleError::Diverged {
            position: "H8".to_string(),
            expected: "H8".to_string(),
            actual: "G9".to_string(),
        };
        assert!(!err.is_recoverable());
        assert!(!ShuffleError::SessionPoisoned.is_recoverable());
        let msg = format!("{err}");
        assert!(msg.contains("expected H8"));
        assert!(msg.contains("found G9"));
    }

    #[test]
    fn test_internal_error() {
        let err = ShuffleError::internal("unexpected state");
        assert!(!err.is_recoverable());
        assert!(format!("{err}").contains("unexpected state"));
    }
}
