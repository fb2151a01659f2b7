//! HTTP API.
//!
//! Routes:
//! - `POST /api/enhance`: multipart upload in, PNG out
//! - `GET /api/health`: liveness check
//!
//! The router is built from an explicit [`Config`]; there is no global app.

mod error;
mod form;
mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use retouch_core::{Config, ImageProcessor};
use tower_http::trace::TraceLayer;

/// State shared by all handlers. Read-only; each request owns its buffers.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<ImageProcessor>,
}

/// Build the API router for `config`.
pub fn build_router(config: &Config) -> Router {
    let state = AppState {
        processor: Arc::new(ImageProcessor::new(config)),
    };
    let body_limit = usize::try_from(config.server.max_body_mb.saturating_mul(1024 * 1024))
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/api/enhance", post(handlers::enhance))
        .route("/api/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "retouch-test-boundary";

    enum Part<'a> {
        File(&'a [u8]),
        Text(&'a str, &'a str),
    }

    fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::File(bytes) => {
                    body.extend_from_slice(
                        b"Content-Disposition: form-data; name=\"file\"; filename=\"upload.png\"\r\n\
                          Content-Type: application/octet-stream\r\n\r\n",
                    );
                    body.extend_from_slice(bytes);
                }
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/enhance")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn solid_png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([250, 128, 3]));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    async fn error_code(response: axum::response::Response) -> String {
        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        json["error"]["code"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn solid_image_returns_same_size_png() {
        let app = build_router(&Config::default());
        let png = solid_png(10, 10);

        let response = app
            .oneshot(multipart_request(&[Part::File(&png)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let output = image::load_from_memory(&body_bytes(response).await).unwrap();
        assert_eq!((output.width(), output.height()), (10, 10));
    }

    #[tokio::test]
    async fn upscale_two_doubles_size() {
        let app = build_router(&Config::default());
        let png = solid_png(10, 6);

        let response = app
            .oneshot(multipart_request(&[
                Part::Text("upscale", "2"),
                Part::File(&png),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let output = image::load_from_memory(&body_bytes(response).await).unwrap();
        assert_eq!((output.width(), output.height()), (20, 12));
    }

    #[tokio::test]
    async fn all_flags_are_accepted() {
        let app = build_router(&Config::default());
        let png = solid_png(8, 8);

        let response = app
            .oneshot(multipart_request(&[
                Part::File(&png),
                Part::Text("upscale", "1"),
                Part::Text("denoise", "true"),
                Part::Text("face_restore", "true"),
                Part::Text("comment", "ignored"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_image_is_decode_failure() {
        let app = build_router(&Config::default());

        let response = app
            .oneshot(multipart_request(&[Part::File(b"this is not an image")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(response).await, "DECODE_FAILED");
    }

    #[tokio::test]
    async fn missing_file_is_bad_request() {
        let app = build_router(&Config::default());

        let response = app
            .oneshot(multipart_request(&[Part::Text("denoise", "true")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "BAD_REQUEST");
    }

    #[tokio::test]
    async fn invalid_flag_values_are_bad_requests() {
        let png = solid_png(4, 4);
        for part in [Part::Text("upscale", "double"), Part::Text("denoise", "maybe")] {
            let app = build_router(&Config::default());
            let response = app
                .oneshot(multipart_request(&[Part::File(&png), part]))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn strict_policy_rejects_face_restore() {
        let mut config = Config::default();
        config.stages.reject_unimplemented = true;
        let app = build_router(&config);
        let png = solid_png(4, 4);

        let response = app
            .oneshot(multipart_request(&[
                Part::File(&png),
                Part::Text("face_restore", "1"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(error_code(response).await, "STAGE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let mut config = Config::default();
        config.limits.max_file_size_mb = 1;
        let app = build_router(&config);

        let mut file = vec![0u8; 1024 * 1024 + 16];
        file[..4].copy_from_slice(&[0x89, b'P', b'N', b'G']);

        let response = app
            .oneshot(multipart_request(&[Part::File(&file)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error_code(response).await, "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn oversized_dimensions_are_payload_too_large() {
        let app = build_router(&Config::default());
        // Tiny on the wire, but wider than the default 8192 limit.
        let png = solid_png(9000, 10);

        let response = app
            .oneshot(multipart_request(&[Part::File(&png)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error_code(response).await, "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn slow_processing_is_gateway_timeout() {
        let mut config = Config::default();
        config.limits.process_timeout_ms = 1;
        let app = build_router(&config);

        let mut state: u32 = 0x2545_F491;
        let noise = RgbImage::from_fn(160, 160, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            Rgb([state as u8, (state >> 8) as u8, (state >> 16) as u8])
        });
        let mut buffer = Cursor::new(Vec::new());
        noise.write_to(&mut buffer, ImageFormat::Png).unwrap();
        let png = buffer.into_inner();

        let response = app
            .oneshot(multipart_request(&[
                Part::File(&png),
                Part::Text("denoise", "true"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(error_code(response).await, "TIMEOUT");
    }

    #[tokio::test]
    async fn body_over_limit_is_rejected() {
        let mut config = Config::default();
        config.server.max_body_mb = 1;
        let app = build_router(&config);

        let file = vec![0u8; 2 * 1024 * 1024];
        let response = app
            .oneshot(multipart_request(&[Part::File(&file)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = build_router(&Config::default());
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], retouch_core::VERSION);
    }

    #[tokio::test]
    async fn get_on_enhance_is_not_allowed() {
        let app = build_router(&Config::default());
        let request = Request::builder()
            .uri("/api/enhance")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
