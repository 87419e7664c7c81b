use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use plaza_db::DbError;
use plaza_types::ValidationErrors;
use plaza_types::api::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Body or query string could not be decoded.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("internal server error")]
    Internal,
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast_ref::<DbError>() {
            Some(DbError::PostNotFound(_)) => Self::NotFound(e.to_string()),
            Some(DbError::PostHasDependents(_)) => Self::Conflict(e.to_string()),
            _ => {
                error!("Request failed: {:#}", e);
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    error: "validation failed".to_string(),
                    fields: Some(errors),
                },
            ),
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: message,
                    fields: None,
                },
            ),
            Self::Conflict(message) => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: message,
                    fields: None,
                },
            ),
            Self::Rejected { status, message } => (
                status,
                ErrorResponse {
                    error: message,
                    fields: None,
                },
            ),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "internal server error".to_string(),
                    fields: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
