use thiserror::Error;

/// Error types for the constrained clustering library
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// The number of clusters k is invalid (must be > 0)
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// Not enough data points for the requested number of clusters
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The point set has no rows or no columns
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Row vectors of different lengths were supplied
    #[error("Ragged input: {0}")]
    RaggedInput(String),

    /// Dimension mismatch between data and model
    #[error("Dimension mismatch: {0}")]
    InvalidDimensions(String),

    /// A configuration parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A distance provider returned a malformed matrix
    #[error("Invalid distance matrix: {0}")]
    InvalidDistance(String),

    /// Model has not been fitted yet
    #[error("Model has not been fitted. Call fit() first.")]
    NotFitted,
}

impl ClusterError {
    /// Whether this error was caused by the caller's input or configuration.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, ClusterError::NotFitted)
    }
}
