//! Domain to wire conversions for the rendering contexts.

use inkwell_core::domain::{Comment, Post, Tag};
use inkwell_core::forms::FormErrors;
use inkwell_core::pagination::Page;
use inkwell_shared::dto::{CommentResponse, FieldErrors, PageResponse, PostResponse, TagResponse};

/// Prefix under which the blog routes are mounted.
pub const API_PREFIX: &str = "/api";

pub fn tag(tag: &Tag) -> TagResponse {
    TagResponse {
        id: tag.id.to_string(),
        name: tag.name.clone(),
        slug: tag.slug.clone(),
    }
}

pub fn post(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        title: post.title.clone(),
        slug: post.slug.clone(),
        author: post.author.clone(),
        body: post.body.clone(),
        publish: post.publish.to_rfc3339(),
        url: format!("{API_PREFIX}{}", post.absolute_path()),
        tags: post.tags.iter().map(tag).collect(),
    }
}

pub fn posts(posts: &[Post]) -> Vec<PostResponse> {
    posts.iter().map(post).collect()
}

pub fn comment(comment: &Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id.to_string(),
        name: comment.name.clone(),
        body: comment.body.clone(),
        created_at: comment.created_at.to_rfc3339(),
    }
}

pub fn page(page: &Page) -> PageResponse {
    PageResponse {
        number: page.number,
        num_pages: page.num_pages,
        count: page.count,
        has_previous: page.has_previous(),
        has_next: page.has_next(),
    }
}

pub fn field_errors(errors: Option<&FormErrors>) -> FieldErrors {
    errors
        .map(|errors| {
            errors
                .iter()
                .map(|(field, messages)| (field.to_string(), messages.to_vec()))
                .collect()
        })
        .unwrap_or_default()
}
