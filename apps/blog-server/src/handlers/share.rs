//! Share-by-email handlers.

use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;

use inkwell_core::domain::PublishedFilter;
use inkwell_core::forms::EmailPostForm;
use inkwell_core::service::ShareOutcome;
use inkwell_shared::dto::{SharePostRequest, ShareResponse};

use super::context::{self, API_PREFIX};
use crate::middleware::error::AppResult;
use crate::observability::RequestId;
use crate::state::AppState;

fn share_response(outcome: ShareOutcome) -> ShareResponse {
    ShareResponse {
        post: context::post(&outcome.post),
        sent: outcome.sent,
        receiver: outcome.receiver,
        errors: context::field_errors(outcome.errors.as_ref()),
    }
}

/// Absolute URL of the API root, as seen by the client.
fn base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}{}", info.scheme(), info.host(), API_PREFIX)
}

/// GET /api/posts/{post_id}/share
pub async fn share_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .blog
        .share_post(
            post_id.into_inner(),
            None,
            &base_url(&req),
            &PublishedFilter::current(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(share_response(outcome)))
}

/// POST /api/posts/{post_id}/share
pub async fn share_post(
    state: web::Data<AppState>,
    req: HttpRequest,
    request_id: RequestId,
    post_id: web::Path<Uuid>,
    body: web::Json<SharePostRequest>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    let payload = body.into_inner();
    let form = EmailPostForm::new(&payload.name, &payload.email, &payload.to, &payload.comments);

    let outcome = state
        .blog
        .share_post(post_id, Some(form), &base_url(&req), &PublishedFilter::current())
        .await?;

    tracing::info!(
        request_id = %request_id.as_str(),
        post_id = %post_id,
        sent = outcome.sent,
        "Share form processed"
    );

    Ok(HttpResponse::Ok().json(share_response(outcome)))
}
