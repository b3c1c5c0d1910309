use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-path failures. Every variant renders the same
/// `{ success: false, message }` envelope the client expects.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Registration number and verification number are required")]
    MissingInput,

    // one message whether the reg_no or the code was wrong, so callers
    // cannot enumerate registration numbers
    #[error("Invalid registration number or verification number")]
    InvalidCombination,

    #[error("Database error occurred")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MissingInput => StatusCode::BAD_REQUEST,
            AppError::InvalidCombination => StatusCode::NOT_FOUND,
            AppError::Database(ref source) => {
                error!("Database error: {source}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
