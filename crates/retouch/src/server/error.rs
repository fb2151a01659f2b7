//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use retouch_core::{PipelineError, RetouchError};
use serde::Serialize;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Could not decode image: {0}")]
    DecodeFailed(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Stage not available: {0}")]
    StageUnavailable(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::DecodeFailed(_) => (StatusCode::UNPROCESSABLE_ENTITY, "DECODE_FAILED"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ApiError::StageUnavailable(_) => (StatusCode::NOT_IMPLEMENTED, "STAGE_UNAVAILABLE"),
            ApiError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let message = match self {
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                "An internal error occurred".to_string()
            }
            ApiError::BadRequest(detail)
            | ApiError::DecodeFailed(detail)
            | ApiError::PayloadTooLarge(detail)
            | ApiError::StageUnavailable(detail)
            | ApiError::Timeout(detail) => {
                tracing::debug!(code, detail = %detail, "Request rejected");
                detail
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<RetouchError> for ApiError {
    fn from(err: RetouchError) -> Self {
        match err {
            RetouchError::Pipeline(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let message = err.to_string();
        match err {
            PipelineError::Decode { .. } => ApiError::DecodeFailed(message),
            PipelineError::FileTooLarge { .. } | PipelineError::ImageTooLarge { .. } => {
                ApiError::PayloadTooLarge(message)
            }
            PipelineError::StageUnavailable(_) => ApiError::StageUnavailable(message),
            PipelineError::Timeout { .. } | PipelineError::Cancelled { .. } => {
                ApiError::Timeout(message)
            }
            PipelineError::Encode { .. } | PipelineError::Stage { .. } => {
                ApiError::Internal(message)
            }
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}
