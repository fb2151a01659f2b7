//! Request handlers.

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::error::ApiError;
use super::form::EnhanceForm;
use super::AppState;

/// `POST /api/enhance`: enhance the uploaded image and return it as PNG.
pub async fn enhance(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = EnhanceForm::from_multipart(&mut multipart).await?;
    tracing::info!(
        bytes = form.file.len(),
        upscale = form.params.upscale.multiplier(),
        denoise = form.params.denoise,
        face_restore = form.params.face_restore,
        "Enhance request"
    );

    let result = state.processor.process(form.file, &form.params).await?;
    tracing::info!(
        width = result.width,
        height = result.height,
        total_ms = result.stats.total_ms,
        "Enhance complete"
    );

    Ok((
        [(header::CONTENT_TYPE, state.processor.content_type())],
        result.png,
    )
        .into_response())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /api/health`: liveness check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: retouch_core::VERSION,
    })
}
