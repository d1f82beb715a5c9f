//! Service error types.

use hyper::StatusCode;
use waypoint_llm::LlmError;

/// Result alias for Waypoint operations.
pub type Result<T> = std::result::Result<T, WaypointError>;

/// Error type for Waypoint operations.
///
/// Not-found is a distinct variant so handlers can report it as a 404
/// rather than conflating it with generic failure.
#[derive(Debug, thiserror::Error)]
pub enum WaypointError {
    /// MongoDB operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// LLM completion failed
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Requested entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Request body or parameters were invalid
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// I/O error (listener setup)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WaypointError {
    /// HTTP status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            WaypointError::NotFound(_) => StatusCode::NOT_FOUND,
            WaypointError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            WaypointError::Database(_) | WaypointError::Llm(_) | WaypointError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
