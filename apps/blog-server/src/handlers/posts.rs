//! Post list and post detail handlers.

use actix_web::{HttpResponse, web};

use inkwell_core::domain::PublishedFilter;
use inkwell_core::forms::CommentForm;
use inkwell_core::service::{PostDetail, PostListPage, Submission};
use inkwell_shared::dto::{CommentRequest, PostDetailResponse, PostListQuery, PostListResponse};

use super::context;
use crate::middleware::error::AppResult;
use crate::state::AppState;

type DatePath = web::Path<(i32, u32, u32, String)>;

fn list_response(list: PostListPage) -> PostListResponse {
    PostListResponse {
        posts: context::posts(&list.posts),
        page: context::page(&list.page),
        page_token: list.page_token,
        tag: list.tag.as_ref().map(context::tag),
    }
}

fn detail_response(detail: PostDetail) -> PostDetailResponse {
    PostDetailResponse {
        post: context::post(&detail.post),
        comments: detail.comments.iter().map(context::comment).collect(),
        new_comment: match &detail.comment {
            Submission::Accepted(comment) => Some(context::comment(comment)),
            _ => None,
        },
        comment_errors: context::field_errors(detail.comment.errors()),
        similar_posts: context::posts(&detail.similar_posts),
    }
}

/// GET /api/posts?page=N
pub async fn post_list(
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let list = state
        .blog
        .list_posts(None, query.page.as_deref(), &PublishedFilter::current())
        .await?;

    Ok(HttpResponse::Ok().json(list_response(list)))
}

/// GET /api/tags/{tag_slug}/posts?page=N
pub async fn post_list_by_tag(
    state: web::Data<AppState>,
    tag_slug: web::Path<String>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let list = state
        .blog
        .list_posts(
            Some(tag_slug.as_str()),
            query.page.as_deref(),
            &PublishedFilter::current(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(list_response(list)))
}

/// GET /api/posts/{year}/{month}/{day}/{slug}
pub async fn post_detail(state: web::Data<AppState>, path: DatePath) -> AppResult<HttpResponse> {
    let (year, month, day, slug) = path.into_inner();
    let detail = state
        .blog
        .post_detail((year, month, day), &slug, None, &PublishedFilter::current())
        .await?;

    Ok(HttpResponse::Ok().json(detail_response(detail)))
}

/// POST /api/posts/{year}/{month}/{day}/{slug}
///
/// An invalid comment still renders the post, with `comment_errors` filled in.
pub async fn add_comment(
    state: web::Data<AppState>,
    path: DatePath,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let (year, month, day, slug) = path.into_inner();
    let req = body.into_inner();
    let form = CommentForm::new(&req.name, &req.email, &req.body);

    let detail = state
        .blog
        .post_detail(
            (year, month, day),
            &slug,
            Some(form),
            &PublishedFilter::current(),
        )
        .await?;

    let status = match detail.comment {
        Submission::Accepted(_) => actix_web::http::StatusCode::CREATED,
        _ => actix_web::http::StatusCode::OK,
    };

    Ok(HttpResponse::build(status).json(detail_response(detail)))
}
