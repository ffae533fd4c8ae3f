//! Data Transfer Objects - request/response types for the API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Query string of the list endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostListQuery {
    /// Raw page token; anything that is not a positive integer is clamped.
    pub page: Option<String>,
}

/// Comment form payload. Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentRequest {
    pub name: String,
    pub email: String,
    pub body: String,
}

/// Share-by-email form payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SharePostRequest {
    pub name: String,
    pub email: String,
    pub to: String,
    pub comments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// A post as shown in lists and on its own page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub author: String,
    pub body: String,
    pub publish: String,
    pub url: String,
    pub tags: Vec<TagResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: String,
    pub name: String,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Context of the list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub page: PageResponse,
    /// Page token as sent by the client.
    pub page_token: Option<String>,
    pub tag: Option<TagResponse>,
}

/// Field errors of a rejected form.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Context of the post detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
    /// The comment created by this request, if any.
    pub new_comment: Option<CommentResponse>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub comment_errors: FieldErrors,
    pub similar_posts: Vec<PostResponse>,
}

/// Context of the share endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    pub post: PostResponse,
    pub sent: bool,
    pub receiver: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: FieldErrors,
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
    pub timestamp: String,
}
