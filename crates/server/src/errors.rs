use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use common::envelope::ErrorEnvelope;
use models::errors::ModelError;
use service::errors::ServiceError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid request: {0}")]
    BadRequest(String),
}

/// Validation messages that start with a known code keep that code in the
/// envelope so clients can branch on it (e.g. `amount_mismatch`).
fn validation_code(message: &str) -> &'static str {
    if message.starts_with("amount_mismatch") {
        "amount_mismatch"
    } else {
        "validation"
    }
}

impl ApiError {
    fn status_code_and_body(&self) -> (StatusCode, ErrorEnvelope) {
        match self {
            ApiError::Service(ServiceError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                ErrorEnvelope::new(validation_code(msg), msg.clone()),
            ),
            ApiError::Service(ServiceError::Model(ModelError::Validation(msg))) => (
                StatusCode::BAD_REQUEST,
                ErrorEnvelope::new(validation_code(msg), msg.clone()),
            ),
            ApiError::Service(ServiceError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, ErrorEnvelope::new("not_found", msg.clone()))
            }
            ApiError::Service(ServiceError::Conflict(msg)) => {
                (StatusCode::CONFLICT, ErrorEnvelope::new("version_conflict", msg.clone()))
            }
            ApiError::Service(ServiceError::Db(msg))
            | ApiError::Service(ServiceError::Model(ModelError::Db(msg))) => {
                error!(error = %msg, "database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorEnvelope::new("internal", "internal server error"),
                )
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorEnvelope::new("unauthorized", "missing or invalid bearer token"),
            ),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorEnvelope::new("validation", msg.clone()))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_code_and_body();
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let e = ApiError::Service(ServiceError::Validation("name required".into()));
        let (status, body) = e.status_code_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, "validation");
    }

    #[test]
    fn amount_mismatch_keeps_its_code() {
        let e = ApiError::Service(ServiceError::Model(ModelError::Validation(
            "amount_mismatch: total must equal base + usage - discount + tax".into(),
        )));
        let (status, body) = e.status_code_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, "amount_mismatch");
    }

    #[test]
    fn conflict_maps_to_409() {
        let e = ApiError::Service(ServiceError::version_conflict(1, 3));
        let (status, body) = e.status_code_and_body();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error.code, "version_conflict");
    }

    #[test]
    fn db_errors_never_leak_details() {
        let e = ApiError::Service(ServiceError::Db("connection refused at 10.0.0.5".into()));
        let (status, body) = e.status_code_and_body();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.message, "internal server error");
    }
}
