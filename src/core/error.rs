use thiserror::Error;

/// Errors raised by the image prediction collaborator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImageError {
    #[error("Image is empty")]
    Empty,

    #[error("Unsupported or unreadable image: {0}")]
    Unsupported(String),

    #[error("Prediction service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid prediction response: {0}")]
    InvalidResponse(String),
}

/// Errors that can occur in the recommendation engine
///
/// Validation and configuration errors are caller contract violations and are
/// never retried. Image errors are propagated untouched to the boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
