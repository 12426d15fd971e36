//! API request models for the write proxy.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Incoming post-creation payload.
///
/// Fields default when absent so that "missing" and "empty" take the same
/// validation path in the handler. Wire names are camelCase to match the
/// editor front end.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    /// Serialized document produced by the editor
    #[serde(default)]
    pub content: String,
    /// Whether the post should be held as a draft rather than published
    #[serde(default, rename = "isDraft")]
    pub is_draft: bool,
}

/// Body forwarded to the content service.
///
/// The write credential travels in the `X-API-Key` header, never in this body.
#[derive(Debug, Serialize)]
pub struct ForwardedPost<'a> {
    pub title: &'a str,
    pub content: &'a str,
    #[serde(rename = "isDraft")]
    pub is_draft: bool,
}
