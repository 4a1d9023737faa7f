use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Payout gateway error: {0}")]
    GatewayError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl ApiError {
    /// Wrap a store-layer error into the api taxonomy.
    pub fn database(err: impl std::fmt::Display) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
