//! Error types for qlearn

use thiserror::Error;

/// Main error type for qlearn
#[derive(Error, Debug)]
pub enum QLearnError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State {state} out of range (num_states = {num_states})")]
    InvalidState { state: usize, num_states: usize },

    #[error("Action {action} out of range (num_actions = {num_actions})")]
    InvalidAction { action: usize, num_actions: usize },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Environment must be reset before calling step")]
    NotReset,

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for qlearn operations
pub type Result<T> = std::result::Result<T, QLearnError>;
