use thiserror::Error;

/// API error taxonomy for the smart-home guard service.
///
/// Lower-level clients return plain errors; handlers and the pipeline
/// translate them into one of these at their own boundary. The router is
/// the single place where an `ApiError` becomes a response - nothing
/// crosses that boundary unconverted.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("Upstream failure: {0}")]
    Upstream(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::Validation(_) => 400,
            ApiError::Upstream(_) => 500,
        }
    }
}
