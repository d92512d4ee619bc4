use thiserror::Error;

/// Main error type for elastiq operations
#[derive(Error, Debug)]
pub enum ElastiqError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid field expression: {0}")]
    InvalidExpression(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for elastiq operations
pub type Result<T> = std::result::Result<T, ElastiqError>;

impl ElastiqError {
    /// Check if this error was raised while constructing a query, before
    /// anything was sent over the wire
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            ElastiqError::InvalidArgument(_) | ElastiqError::InvalidExpression(_)
        )
    }
}
