use thiserror::Error;

/// Result type for flappy-dqn operations
pub type Result<T> = std::result::Result<T, FlappyError>;

/// Main error type for the crate.
///
/// None of these are transient: a failed prediction or gradient step is a
/// data or programming error and is propagated to the caller, never retried.
#[derive(Error, Debug)]
pub enum FlappyError {
    /// An observation or target vector does not match the fixed arity of the
    /// approximator (5 inputs, 2 outputs).
    #[error("Shape error: {what} expects {expected} values, got {actual}")]
    Shape {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A minibatch larger than the memory contents was requested.
    ///
    /// `Agent::replay` checks the memory size before sampling, so this only
    /// surfaces when `ReplayBuffer::sample` is driven directly.
    #[error("Empty batch: requested {requested} transitions but only {available} are stored")]
    EmptyBatch { requested: usize, available: usize },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Action index outside of the discrete action space
    #[error("Invalid action {action}: must be less than {max_actions}")]
    InvalidAction { action: usize, max_actions: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// Helper functions for common error patterns
impl FlappyError {
    pub fn shape(what: &'static str, expected: usize, actual: usize) -> Self {
        FlappyError::Shape {
            what,
            expected,
            actual,
        }
    }

    pub fn invalid_parameter<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        FlappyError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a shape mismatch.
    pub fn is_shape(&self) -> bool {
        matches!(self, FlappyError::Shape { .. })
    }
}
