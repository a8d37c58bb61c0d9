//! HTTP API for the alignment engine.
//!
//! `POST /align` runs one job; `GET /` is a liveness probe. CORS-permissive
//! so browser tools can call it directly.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use kashi_core::types::{AlignRequest, ErrorBody, HealthStatus, LineTiming};

use crate::error::AlignError;
use crate::pipeline::AlignService;

/// Build the axum router with a shared [`AlignService`].
pub fn router(service: AlignService) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/align", post(align))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<AlignError> for ApiError {
    fn from(e: AlignError) -> Self {
        Self {
            status: e.status(),
            detail: e.detail(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::default())
}

async fn align(
    State(service): State<AlignService>,
    payload: Result<Json<AlignRequest>, JsonRejection>,
) -> Result<Json<Vec<LineTiming>>, ApiError> {
    let Json(req) = payload?;
    let lines = service.align(req).await?;
    Ok(Json(lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    use kashi_core::types::AlignerConfig;

    fn app() -> Router {
        router(AlignService::new(AlignerConfig::default()).unwrap())
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/align")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_service() {
        let resp = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({"status": "ok", "service": "Japanese Lyrics Alignment"})
        );
    }

    #[tokio::test]
    async fn empty_lyrics_is_422() {
        let resp = app()
            .oneshot(post_json(
                r#"{"audio_url":"https://a.example/x.mp3","lyrics":[]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(resp).await["detail"], "lyrics cannot be empty");
    }

    #[tokio::test]
    async fn multiline_lyric_is_422() {
        let resp = app()
            .oneshot(post_json(
                r#"{"audio_url":"https://a.example/x.mp3","lyrics":["a","b\nc"]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let detail = body_json(resp).await["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("lyrics[1] appears to be a multiline string"));
    }

    #[tokio::test]
    async fn bad_scheme_is_422() {
        let resp = app()
            .oneshot(post_json(r#"{"audio_url":"ftp://a.example/x.mp3","lyrics":["a"]}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn wrong_shape_is_client_error() {
        let resp = app()
            .oneshot(post_json(r#"{"audio_url":"https://a.example/x.mp3","lyrics":[1]}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(resp).await["detail"].is_string());

        let resp = app().oneshot(post_json("{not json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_415() {
        let req = Request::builder()
            .method("POST")
            .uri("/align")
            .body(Body::from(r#"{"audio_url":"https://a.example","lyrics":["a"]}"#))
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn align_end_to_end() {
        let h = crate::testutil::harness(None).await;
        let app = router(AlignService::new(h.config.clone()).unwrap());
        let body = serde_json::json!({
            "audio_url": h.server.url("/song.mp3"),
            "lyrics": ["さくら", "はな"],
        })
        .to_string();

        let resp = app.oneshot(post_json(&body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!([
                {"line_index": 1, "text": "さくら", "start": 0.0, "end": 1.2},
                {"line_index": 2, "text": "はな", "start": 1.2, "end": 2.0},
            ])
        );
        assert!(crate::testutil::is_empty(h.work.path()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn conversion_failure_is_500() {
        let h = crate::testutil::harness(None).await;
        let config = AlignerConfig {
            ffmpeg_bin: h.work.path().join("no-ffmpeg").display().to_string(),
            ..h.config.clone()
        };
        let app = router(AlignService::new(config).unwrap());
        let body = serde_json::json!({
            "audio_url": h.server.url("/song.mp3"),
            "lyrics": ["さくら"],
        })
        .to_string();

        let resp = app.oneshot(post_json(&body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(resp).await["detail"],
            "Audio conversion failed: ffmpeg not found. Please install ffmpeg."
        );
    }
}
