use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Shown when the catalog signals a failure without a message of its own
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch movies";

/// Shown for every transport or parse failure
pub const GENERIC_FETCH_ERROR: &str = "Error fetching movies. Please try again later.";

/// Failures of a single catalog query
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Catalog returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Catalog rejected the query: {}", .message.as_deref().unwrap_or("<no message>"))]
    Service { message: Option<String> },

    #[error("Malformed catalog response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog request did not complete: {0}")]
    Aborted(String),
}

impl CatalogError {
    /// The short message a user is allowed to see.
    ///
    /// Only a well-formed service rejection passes its own text through;
    /// everything else collapses to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Service { message } => message
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(FETCH_FAILED_MESSAGE)
                .to_string(),
            _ => GENERIC_FETCH_ERROR.to_string(),
        }
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Catalog(e) => {
                tracing::error!(error = %e, "Catalog query failed");
                (StatusCode::BAD_GATEWAY, e.user_message())
            }
            AppError::Cache(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
