use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use super::validation::FieldError;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("validation failed: {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("user {0} not found")]
    NotFound(Uuid),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type UserResult<T> = Result<T, UserError>;

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        match self {
            UserError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            UserError::NotFound(id) => {
                (StatusCode::NOT_FOUND, format!("User {} not found", id)).into_response()
            }
            UserError::Hashing(msg) => {
                error!(error = %msg, "password hashing failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()).into_response()
            }
            UserError::Storage(e) => {
                error!(error = ?e, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()).into_response()
            }
        }
    }
}
