//! Error types for the automaton core

use thiserror::Error;

/// Failures raised by rule tables, grids and the stepping engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    #[error("invalid rule {rule}: {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("invalid dimension {0}: only 1 and 2 are supported")]
    InvalidDimension(u8),

    #[error("invalid grid size {0}: size must be at least 1")]
    InvalidSize(usize),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid neighborhood: {0}")]
    InvalidNeighborhood(String),

    #[error("unsupported neighborhood size {size}: expected 1..={max}")]
    UnsupportedNeighborhoodSize { size: usize, max: usize },

    #[error("position {position} is outside a grid of size {size}")]
    PositionOutOfBounds { position: String, size: usize },
}

impl AutomatonError {
    /// Process exit status the CLI reports for this kind of failure
    pub fn exit_code(&self) -> i32 {
        match self {
            AutomatonError::InvalidRule { .. } => 2,
            AutomatonError::InvalidDimension(_) => 3,
            AutomatonError::InvalidSize(_) => 4,
            AutomatonError::InvalidConfiguration(_) => 5,
            AutomatonError::InvalidNeighborhood(_) => 6,
            AutomatonError::UnsupportedNeighborhoodSize { .. } => 7,
            AutomatonError::PositionOutOfBounds { .. } => 8,
        }
    }
}

pub type AutomatonResult<T> = std::result::Result<T, AutomatonError>;
