use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::{App, http::StatusCode, test, web};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use inkwell_core::domain::{Post, PostStatus, Tag};
use inkwell_core::ports::{BaseRepository, CommentRepository, MailError, Mailer, OutgoingMail};
use inkwell_core::service::BlogSettings;
use inkwell_infra::{InMemoryBlogStore, InMemoryMailer};
use inkwell_shared::dto::{
    CommentRequest, HealthResponse, PostDetailResponse, PostListResponse, SharePostRequest,
    ShareResponse,
};

use super::configure_routes;
use crate::observability::RequestIdMiddleware;
use crate::state::AppState;

struct Fixture {
    store: Arc<InMemoryBlogStore>,
    mailer: Arc<InMemoryMailer>,
    x: Post,
    y: Post,
    z: Post,
    draft: Post,
}

fn post(slug: &str, (y, m, d): (i32, u32, u32), tags: Vec<Tag>) -> Post {
    Post::new(
        slug.replace('-', " "),
        slug.to_string(),
        "admin".to_string(),
        format!("Body of {slug}"),
    )
    .published_at(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    .with_tags(tags)
}

/// X {python, django}, Y {python}, Z {django, python} newer than Y,
/// plus an untagged post and a draft.
async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryBlogStore::new());
    let python = store
        .create(Tag::new("Python".to_string(), "python".to_string()))
        .await
        .unwrap();
    let django = store
        .create(Tag::new("Django".to_string(), "django".to_string()))
        .await
        .unwrap();

    let x = post("post-x", (2024, 1, 5), vec![python.clone(), django.clone()]);
    let y = post("post-y", (2024, 2, 10), vec![python.clone()]);
    let z = post("post-z", (2024, 3, 15), vec![django.clone(), python.clone()]);
    let untagged = post("untagged", (2024, 4, 20), vec![]);
    let mut draft = post("draft", (2024, 5, 1), vec![python.clone()]);
    draft.status = PostStatus::Draft;

    for p in [&x, &y, &z, &untagged, &draft] {
        store.insert_post(p.clone()).await;
    }

    Fixture {
        store,
        mailer: Arc::new(InMemoryMailer::new()),
        x,
        y,
        z,
        draft,
    }
}

macro_rules! app {
    ($fixture:expr) => {
        app!($fixture, $fixture.mailer.clone())
    };
    ($fixture:expr, $mailer:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new(AppState::in_memory(
                    $fixture.store.clone(),
                    $mailer,
                    BlogSettings::default(),
                )))
                .configure(configure_routes),
        )
        .await
    };
}

/// Relay that is always down; counts delivery attempts.
#[derive(Default)]
struct BrokenRelay {
    attempts: AtomicUsize,
}

#[async_trait]
impl Mailer for BrokenRelay {
    async fn send(&self, _mail: OutgoingMail) -> Result<(), MailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(MailError::Transport("connection refused".to_string()))
    }
}

#[actix_rt::test]
async fn test_health_reports_memory_storage_and_request_id() {
    let f = fixture().await;
    let app = app!(f);

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header(("X-Request-ID", "req-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-123");
    let body: HealthResponse = test::read_body_json(resp).await;
    assert_eq!(body.status, "ok");
    assert_eq!(body.storage, "memory");
}

#[actix_rt::test]
async fn test_list_pages_newest_first() {
    let f = fixture().await;
    let app = app!(f);

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let body: PostListResponse = test::call_and_read_body_json(&app, req).await;

    let slugs: Vec<&str> = body.posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["untagged", "post-z", "post-y"]);
    assert_eq!(body.page.number, 1);
    assert_eq!(body.page.num_pages, 2);
    assert_eq!(body.page.count, 4);
    assert!(body.page.has_next);
}

#[actix_rt::test]
async fn test_list_non_integer_page_is_first_page() {
    let f = fixture().await;
    let app = app!(f);

    let req = test::TestRequest::get().uri("/api/posts?page=abc").to_request();
    let body: PostListResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.page.number, 1);
    assert_eq!(body.page_token.as_deref(), Some("abc"));
    assert_eq!(body.posts.len(), 3);
}

#[actix_rt::test]
async fn test_list_page_past_the_end_is_last_page() {
    let f = fixture().await;
    let app = app!(f);

    let req = test::TestRequest::get().uri("/api/posts?page=99").to_request();
    let body: PostListResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.page.number, 2);
    assert_eq!(body.posts.len(), 1);
    assert_eq!(body.posts[0].slug, "post-x");
}

#[actix_rt::test]
async fn test_list_by_tag() {
    let f = fixture().await;
    let app = app!(f);

    let req = test::TestRequest::get()
        .uri("/api/tags/django/posts")
        .to_request();
    let body: PostListResponse = test::call_and_read_body_json(&app, req).await;

    let slugs: Vec<&str> = body.posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["post-z", "post-x"]);
    assert_eq!(body.tag.unwrap().slug, "django");
}

#[actix_rt::test]
async fn test_list_by_unknown_tag_is_not_found() {
    let f = fixture().await;
    let app = app!(f);

    let req = test::TestRequest::get()
        .uri("/api/tags/haskell/posts")
        .insert_header(("X-Request-ID", "req-404"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["detail"], "Tag 'haskell' not found");
    assert_eq!(body["request_id"], "req-404");
}

#[actix_rt::test]
async fn test_detail_ranks_similar_posts() {
    let f = fixture().await;
    let app = app!(f);

    let req = test::TestRequest::get()
        .uri("/api/posts/2024/01/05/post-x")
        .to_request();
    let body: PostDetailResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.post.id, f.x.id.to_string());
    let similar: Vec<String> = body.similar_posts.iter().map(|p| p.id.clone()).collect();
    assert_eq!(similar, vec![f.z.id.to_string(), f.y.id.to_string()]);
    assert!(body.comments.is_empty());
    assert!(body.new_comment.is_none());
}

#[actix_rt::test]
async fn test_detail_wrong_date_or_draft_is_not_found() {
    let f = fixture().await;
    let app = app!(f);

    for uri in [
        "/api/posts/2024/01/06/post-x",
        "/api/posts/2024/02/30/post-x",
        "/api/posts/2024/05/01/draft",
        "/api/posts/262143/12/31/post-x",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_rt::test]
async fn test_comment_without_body_is_rejected() {
    let f = fixture().await;
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri("/api/posts/2024/01/05/post-x")
        .set_json(serde_json::json!({ "name": "Ana", "email": "ana@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: PostDetailResponse = test::read_body_json(resp).await;
    assert!(body.new_comment.is_none());
    assert_eq!(body.comment_errors["body"], vec!["This field is required."]);
    assert_eq!(body.similar_posts.len(), 2);

    let stored = f.store.find_active_by_post(f.x.id).await.unwrap();
    assert!(stored.is_empty());
}

#[actix_rt::test]
async fn test_valid_comment_is_created() {
    let f = fixture().await;
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri("/api/posts/2024/01/05/post-x")
        .set_json(CommentRequest {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            body: "Lovely write-up".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: PostDetailResponse = test::read_body_json(resp).await;
    let created = body.new_comment.unwrap();
    assert_eq!(created.body, "Lovely write-up");
    assert_eq!(body.comments.len(), 1);
    assert_eq!(body.comments[0].id, created.id);
    assert!(body.comment_errors.is_empty());
}

#[actix_rt::test]
async fn test_share_sends_exactly_one_mail() {
    let f = fixture().await;
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/share", f.y.id))
        .set_json(SharePostRequest {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            to: "bo@example.org".to_string(),
            comments: "Thought of you".to_string(),
        })
        .to_request();
    let body: ShareResponse = test::call_and_read_body_json(&app, req).await;

    assert!(body.sent);
    assert_eq!(body.receiver, "bo@example.org");

    let sent = f.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["bo@example.org".to_string()]);
    assert_eq!(sent[0].from, "admin@myblog.com");
    assert!(sent[0].subject.contains("Ana (ana@example.com) recommends you reading"));
    assert!(sent[0].body.contains("/api/posts/2024/02/10/post-y"));
    assert!(sent[0].body.ends_with("Ana's comments: Thought of you"));
}

#[actix_rt::test]
async fn test_invalid_share_sends_nothing() {
    let f = fixture().await;
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/share", f.y.id))
        .set_json(serde_json::json!({ "name": "Ana", "email": "ana@example.com", "to": "nobody" }))
        .to_request();
    let body: ShareResponse = test::call_and_read_body_json(&app, req).await;

    assert!(!body.sent);
    assert_eq!(body.receiver, "");
    assert_eq!(body.errors["to"], vec!["Enter a valid email address."]);
    assert!(f.mailer.sent().await.is_empty());
}

#[actix_rt::test]
async fn test_share_form_and_hidden_posts() {
    let f = fixture().await;
    let app = app!(f);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}/share", f.x.id))
        .to_request();
    let body: ShareResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!body.sent);
    assert!(body.errors.is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}/share", f.draft.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_malformed_json_is_bad_request() {
    let f = fixture().await;
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/share", f.y.id))
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
    assert!(body["request_id"].is_string());
    assert!(f.mailer.sent().await.is_empty());
}

#[actix_rt::test]
async fn test_mail_failure_is_internal_error() {
    let f = fixture().await;
    let relay = Arc::new(BrokenRelay::default());
    let app = app!(f, relay.clone());

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/share", f.y.id))
        .insert_header(("X-Request-ID", "req-500"))
        .set_json(SharePostRequest {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            to: "bo@example.org".to_string(),
            comments: String::new(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 500);
    assert_eq!(body["title"], "Internal Server Error");
    assert_eq!(body["request_id"], "req-500");
    assert!(body.get("detail").is_none());

    assert_eq!(relay.attempts.load(Ordering::SeqCst), 1);
    assert!(f.mailer.sent().await.is_empty());
}
