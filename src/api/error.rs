/**
 * Maps `CoreError` onto the HTTP status table in spec §6/§7. The core
 * itself is transport-agnostic; this is the one place that knows about
 * status codes.
 */
use axum::{http::StatusCode, response::IntoResponse, response::Json};
use serde::Serialize;

use crate::core::CoreError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            CoreError::NotFound(_) | CoreError::VenueNotFound(_) | CoreError::ItemNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            CoreError::Validation { .. } | CoreError::TooLong { .. } => StatusCode::BAD_REQUEST,
            CoreError::NotOrganizer => StatusCode::FORBIDDEN,
            CoreError::Revoked | CoreError::Finalized | CoreError::Expired => {
                StatusCode::BAD_REQUEST
            }
            CoreError::Duplicate(_) => StatusCode::CONFLICT,
            CoreError::StorageFailure | CoreError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            code: self.0.kind(),
            message: self.0.to_string(),
            details: self.0.details(),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
