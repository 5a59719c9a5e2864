//! HTTP front-end
//!
//! `GET /` serves the chat page and `POST /chat` forwards a message and an
//! optional data-URL image to the model. The endpoint always answers with a
//! JSON body: model failures are folded into the response text by the façade,
//! and anything that goes wrong while reading the request is reported as
//! `{"success": false, "error": ...}`.

use crate::ai::GenerativeModel;
use crate::facade;
use crate::models::{ChatRequest, ChatResponse};
use crate::upload;
use crate::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    model: Arc<dyn GenerativeModel>,
}

impl AppState {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }
}

/// `/chat` bodies carry whole photos as base64, so the default 2 MB body cap
/// is lifted.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/chat", post(chat))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// Bind `host:port` and serve until the process is stopped.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Json<ChatResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected /chat body: {}", rejection.body_text());
            return Json(ChatResponse::failed(rejection.body_text()));
        }
    };

    let image = match request.image_data_url().map(upload::decode_data_url) {
        Some(Ok(image)) => Some(image),
        Some(Err(e)) => {
            warn!("Failed to decode uploaded image: {}", e);
            return Json(ChatResponse::failed(e.to_string()));
        }
        None => None,
    };

    info!(
        "Chat request (message chars: {}, image: {})",
        request.message.len(),
        image.is_some()
    );

    let response = facade::get_response(state.model.as_ref(), &request.message, image).await;
    Json(ChatResponse::ok(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ContentRequest, MockModelClient};
    use crate::upload::{sample_png, UploadedImage};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use base64::Engine as _;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn app(model: &MockModelClient) -> Router {
        router(AppState::new(Arc::new(model.clone())))
    }

    async fn post_chat(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
        post_chat_as(app, "application/json", body).await
    }

    async fn post_chat_as(
        app: Router,
        content_type: &str,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header(header::CONTENT_TYPE, content_type)
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
    async fn test_message_returns_model_reply() {
        let model = MockModelClient::new().with_response("Hello back".to_string());

        let (status, body) = post_chat(app(&model), r#"{"message": "hello"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({ "success": true, "response": "Hello back" })
        );
        assert_eq!(
            model.requests(),
            vec![ContentRequest::Text("hello".to_string())]
        );
    }

    #[tokio::test]
    async fn test_image_is_decoded_and_forwarded() {
        let model = MockModelClient::new().with_response("A red square".to_string());
        let png = sample_png();
        let body = serde_json::json!({
            "message": "what is it?",
            "image": format!(
                "data:image/png;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(&png)
            ),
        });

        let (_, reply) = post_chat(app(&model), &body.to_string()).await;

        assert_eq!(reply["success"], true);
        assert_eq!(
            model.requests(),
            vec![ContentRequest::TextAndImage(
                "what is it?".to_string(),
                UploadedImage::from_bytes(png).unwrap()
            )]
        );
    }

    #[tokio::test]
    async fn test_malformed_base64_reports_failure() {
        let model = MockModelClient::new();

        let (status, body) = post_chat(
            app(&model),
            r#"{"message": "hi", "image": "data:image/png;base64,@@@"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("Base64"));
        assert!(body.get("response").is_none());
        assert_eq!(model.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_message_is_empty_prompt() {
        let model = MockModelClient::new().with_response("ok".to_string());

        let (_, body) = post_chat(app(&model), "{}").await;

        assert_eq!(body["success"], true);
        assert_eq!(model.requests(), vec![ContentRequest::Text(String::new())]);
    }

    #[tokio::test]
    async fn test_model_failure_is_still_success() {
        let model = MockModelClient::new().failing_with("invalid API key".to_string());

        let (_, body) = post_chat(app(&model), r#"{"message": "hello"}"#).await;

        assert_eq!(body["success"], true);
        let text = body["response"].as_str().unwrap();
        assert!(text.starts_with(facade::ERROR_PREFIX));
        assert!(text.contains("invalid API key"));
    }

    #[tokio::test]
    async fn test_invalid_json_reports_failure_as_json() {
        let model = MockModelClient::new();

        let (status, body) = post_chat(app(&model), "{not json").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    async fn assert_rejected(content_type: &str, body: &str) {
        let model = MockModelClient::new();

        let (status, reply) = post_chat_as(app(&model), content_type, body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["success"], false);
        assert!(reply["error"].is_string());
        assert!(reply.get("response").is_none());
        assert_eq!(model.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_content_type_reports_failure() {
        assert_rejected("text/plain", r#"{"message": "hello"}"#).await;
    }

    #[tokio::test]
    async fn test_array_body_reports_failure() {
        assert_rejected("application/json", "[1]").await;
    }

    #[tokio::test]
    async fn test_non_string_image_reports_failure() {
        assert_rejected("application/json", r#"{"image": 5}"#).await;
    }

    /// Noise PNG that does not compress, so its data URL is well over 2 MB.
    fn large_png() -> Vec<u8> {
        let mut seed: u32 = 0x2545_F491;
        let img = image::RgbImage::from_fn(900, 900, |_, _| {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let [r, g, b, _] = seed.to_le_bytes();
            image::Rgb([r, g, b])
        });
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_large_photo_upload_reaches_model() {
        let model = MockModelClient::new().with_response("Static noise".to_string());
        let data_url = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(large_png())
        );
        assert!(data_url.len() > 2 * 1024 * 1024);
        let body = serde_json::json!({ "message": "what is this?", "image": data_url });

        let (status, reply) = post_chat(app(&model), &body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            reply,
            serde_json::json!({ "success": true, "response": "Static noise" })
        );
        assert_eq!(model.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_index_serves_html() {
        let model = MockModelClient::new();
        let response = app(&model)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("/chat"));
    }
}
