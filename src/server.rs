//! Callable-function gateway
//!
//! Exposes the handlers over HTTP using the callable envelope: requests carry
//! their payload under `data`, successes come back under `result` and failures
//! under `error` with a canonical status name.

use crate::error::ErrorKind;
use crate::handlers::{ImageHandler, VideoHandler};
use crate::models::{ImageRequest, ModelAnswer, VideoRequest, MAX_CALLABLE_BODY_BYTES};
use crate::Error;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub image: Arc<ImageHandler>,
    pub video: Arc<VideoHandler>,
}

#[derive(Debug, Deserialize)]
pub struct CallableRequest<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct CallableResponse {
    pub result: ModelAnswer,
}

#[derive(Debug, Serialize)]
struct CallableErrorBody {
    error: CallableErrorDetail,
}

#[derive(Debug, Serialize)]
struct CallableErrorDetail {
    status: &'static str,
    message: String,
}

/// Failure reported to a callable client.
#[derive(Debug)]
pub enum ApiError {
    InvalidArgument(String),
    Handler(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Handler(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidArgument(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", msg),
            ApiError::Handler(err) => match err.kind() {
                ErrorKind::InvalidLocatorFormat => {
                    (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", err.to_string())
                }
                ErrorKind::Configuration
                | ErrorKind::ModelInvocation
                | ErrorKind::ResponseParse
                | ErrorKind::Internal => {
                    tracing::error!("Request failed: {}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", err.to_string())
                }
            },
        };

        let body = Json(CallableErrorBody {
            error: CallableErrorDetail {
                status: code,
                message,
            },
        });

        (status, body).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/image", post(image))
        .route("/video", post(video))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_CALLABLE_BODY_BYTES))
        .with_state(state)
}

async fn image(
    State(state): State<AppState>,
    payload: Result<Json<CallableRequest<ImageRequest>>, JsonRejection>,
) -> Result<Json<CallableResponse>, ApiError> {
    let Json(request) = payload?;
    let result = state.image.handle(request.data).await?;
    Ok(Json(CallableResponse { result }))
}

async fn video(
    State(state): State<AppState>,
    payload: Result<Json<CallableRequest<VideoRequest>>, JsonRejection>,
) -> Result<Json<CallableResponse>, ApiError> {
    let Json(request) = payload?;
    let result = state.video.handle(request.data).await?;
    Ok(Json(CallableResponse { result }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockModelHost, ModelHost};
    use crate::prompts::Prompts;
    use axum::body::Body;
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn router(image_host: Option<MockModelHost>, video_host: MockModelHost) -> Router {
        let prompts = Arc::new(Prompts::default());
        create_router(AppState {
            image: Arc::new(ImageHandler::new(
                image_host.map(|h| Arc::new(h) as Arc<dyn ModelHost>),
                prompts.clone(),
            )),
            video: Arc::new(VideoHandler::new(Arc::new(video_host), prompts)),
        })
    }

    async fn call(router: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_image_without_query_returns_scene() {
        let host = MockModelHost::new().with_response(
            r#"{"Danger": "No", "Title": "Cozy Coffee Shop", "Description": "Warm light and armchairs."}"#,
        );

        let (status, body) = call(
            router(Some(host), MockModelHost::new()),
            "/image",
            serde_json::json!({ "data": { "data": "iVBORw==", "mime_type": "image/png" } }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "result": {
                    "Danger": "No",
                    "Title": "Cozy Coffee Shop",
                    "Description": "Warm light and armchairs."
                }
            })
        );
    }

    #[tokio::test]
    async fn test_image_with_query_returns_text() {
        let host = MockModelHost::new().with_response("There are two chairs.");

        let (status, body) = call(
            router(Some(host), MockModelHost::new()),
            "/image",
            serde_json::json!({
                "data": { "data": "iVBORw==", "mime_type": "image/png", "query": "How many chairs?" }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "result": "There are two chairs." }));
    }

    #[tokio::test]
    async fn test_multi_megabyte_image_reaches_model() {
        use base64::Engine as _;
        let host = MockModelHost::new().with_response("A blank frame.");
        let photo = vec![0u8; 3 * 1024 * 1024];
        let encoded = base64::engine::general_purpose::STANDARD.encode(&photo);

        let (status, body) = call(
            router(Some(host.clone()), MockModelHost::new()),
            "/image",
            serde_json::json!({
                "data": { "data": encoded, "mime_type": "image/jpeg", "query": "What is this?" }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "result": "A blank frame." }));
        assert_eq!(host.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_null_fields_reach_model() {
        let host = MockModelHost::new().with_response("Nothing to see.");

        let (status, _) = call(
            router(Some(host.clone()), MockModelHost::new()),
            "/image",
            serde_json::json!({
                "data": { "data": null, "mime_type": null, "query": "Anything?" }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(host.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_internal() {
        let (status, body) = call(
            router(None, MockModelHost::new()),
            "/image",
            serde_json::json!({ "data": { "data": "", "mime_type": "image/png" } }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["status"], "INTERNAL");
    }

    #[tokio::test]
    async fn test_bad_video_url_is_invalid_argument() {
        let (status, body) = call(
            router(None, MockModelHost::new()),
            "/video",
            serde_json::json!({ "data": { "data": "https://host/no-bucket-segment", "mime_type": "video/mp4" } }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["status"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_unparsable_model_output_is_internal() {
        let video_host = MockModelHost::new().with_response("not json at all");

        let (status, body) = call(
            router(None, video_host),
            "/video",
            serde_json::json!({
                "data": { "data": "https://host/v0/b/b/o/v.mp4", "mime_type": "video/mp4" }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Response parse error"));
    }

    #[tokio::test]
    async fn test_missing_envelope_is_invalid_argument() {
        let (status, body) = call(
            router(None, MockModelHost::new()),
            "/image",
            serde_json::json!({ "mime_type": "image/png" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["status"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(None, MockModelHost::new())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
