//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the CRUD handler layer.
///
/// `PermissionDenied` is an authorization failure and is never retried.
/// `FailedToFind` means no primary-key predicate could be built for the
/// request. `Db` wraps whatever the underlying store raised, unchanged.
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("{0} not found")]
    NotFound(String),
    #[error("failed to find")]
    FailedToFind,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AdminError::PermissionDenied => (StatusCode::FORBIDDEN, "permission_denied"),
            AdminError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AdminError::FailedToFind => (StatusCode::NOT_FOUND, "failed_to_find"),
            AdminError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AdminError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
