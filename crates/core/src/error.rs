use thiserror::Error;

/// Errors that can occur in the cascade system
#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("Invalid action index: {0}")]
    InvalidAction(usize),

    #[error("Invalid placement at column {column} (action {action})")]
    InvalidPlacement { action: usize, column: usize },

    #[error("Environment transition failed: {0}")]
    Transition(String),

    #[error("Environment transition timed out after {0} ms")]
    TransitionTimeout(u64),

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Convenience Result type for cascade operations
pub type Result<T> = std::result::Result<T, CascadeError>;
