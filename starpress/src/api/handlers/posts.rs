use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;

use crate::{
    AppState,
    api::models::posts::{CreatePostRequest, ForwardedPost},
    errors::{Error, Result},
};

/// Header carrying the server-held write credential to the backend.
const API_KEY_HEADER: &str = "X-API-Key";

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    summary = "Create post",
    description = "Validates the payload and forwards it to the content service with the server-held credential attached. \
                   The backend's JSON response is returned verbatim on success.",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post accepted by the content service"),
        (status = 400, description = "Missing title or content"),
        (status = 500, description = "Gateway misconfigured or backend unreachable")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_post(State(state): State<AppState>, Json(request): Json<CreatePostRequest>) -> Result<(StatusCode, Json<Value>)> {
    // Validation happens before anything touches the network
    if request.title.trim().is_empty() || request.content.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Title and content are required".to_string(),
        });
    }

    // The write credential is held server-side only; without it there is
    // nothing useful to forward
    let Some(api_key) = state.config.backend.api_key.as_deref() else {
        return Err(Error::Configuration {
            message: "backend api_key is not set".to_string(),
        });
    };

    let url = state.config.backend.url.join("/api/posts").map_err(|e| Error::Internal {
        operation: format!("build backend URL: {e}"),
    })?;

    let response = state
        .http
        .post(url)
        .header(API_KEY_HEADER, api_key)
        .json(&ForwardedPost {
            title: &request.title,
            content: &request.content,
            is_draft: request.is_draft,
        })
        .send()
        .await
        .map_err(|e| Error::Internal {
            operation: format!("forward post to backend: {e}"),
        })?;

    let status = response.status();
    if !status.is_success() {
        // Read the backend's error body best-effort, for the logs only
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), body = %body, "Content service rejected post");

        let status_text = status.canonical_reason().unwrap_or("unknown status");
        return Err(Error::Backend {
            status: status.as_u16(),
            message: format!("Failed to submit post: {status_text}"),
        });
    }

    let body: Value = response.json().await.map_err(|e| Error::Internal {
        operation: format!("decode backend response: {e}"),
    })?;

    Ok((StatusCode::OK, Json(body)))
}
