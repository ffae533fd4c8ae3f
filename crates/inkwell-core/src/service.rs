//! Blog use cases: list, detail (with comments) and share-by-email.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Comment, Post, PublishedFilter, Tag};
use crate::error::DomainError;
use crate::forms::{CommentForm, EmailPostForm, FormErrors};
use crate::pagination::{DEFAULT_PAGE_SIZE, Page, Paginator};
use crate::ports::{CommentRepository, Mailer, OutgoingMail, PostRepository, TagRepository};
use crate::similar::SimilarPostsRanker;

/// Sender address used when none is configured.
pub const DEFAULT_MAIL_FROM: &str = "admin@myblog.com";

/// Service settings.
#[derive(Debug, Clone)]
pub struct BlogSettings {
    pub posts_per_page: u64,
    pub mail_from: String,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self {
            posts_per_page: DEFAULT_PAGE_SIZE,
            mail_from: DEFAULT_MAIL_FROM.to_string(),
        }
    }
}

/// One page of the post list.
#[derive(Debug, Clone)]
pub struct PostListPage {
    pub posts: Vec<Post>,
    pub page: Page,
    pub tag: Option<Tag>,
    /// The page token as received, before clamping.
    pub page_token: Option<String>,
}

/// Outcome of a submitted form.
#[derive(Debug, Clone)]
pub enum Submission<T> {
    /// No form was submitted (plain read).
    NotSubmitted,
    Accepted(T),
    Rejected(FormErrors),
}

impl<T> Submission<T> {
    pub fn errors(&self) -> Option<&FormErrors> {
        match self {
            Submission::Rejected(errors) => Some(errors),
            _ => None,
        }
    }
}

/// A post with everything its page shows.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub comment: Submission<Comment>,
    pub similar_posts: Vec<Post>,
}

/// Result of the share-by-email flow.
#[derive(Debug, Clone)]
pub struct ShareOutcome {
    pub post: Post,
    pub sent: bool,
    /// Recipient address when the mail was sent, empty otherwise.
    pub receiver: String,
    pub errors: Option<FormErrors>,
}

/// Orchestrates the blog flows over the repository and mail ports.
pub struct BlogService {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    comments: Arc<dyn CommentRepository>,
    mailer: Arc<dyn Mailer>,
    ranker: SimilarPostsRanker,
    settings: BlogSettings,
}

impl BlogService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        tags: Arc<dyn TagRepository>,
        comments: Arc<dyn CommentRepository>,
        mailer: Arc<dyn Mailer>,
        settings: BlogSettings,
    ) -> Self {
        Self {
            posts,
            tags,
            comments,
            mailer,
            ranker: SimilarPostsRanker::default(),
            settings,
        }
    }

    /// List visible posts, newest first, optionally restricted to a tag.
    pub async fn list_posts(
        &self,
        tag_slug: Option<&str>,
        page_token: Option<&str>,
        filter: &PublishedFilter,
    ) -> Result<PostListPage, DomainError> {
        let tag = match tag_slug {
            Some(slug) => Some(
                self.tags
                    .find_by_slug(slug)
                    .await?
                    .ok_or_else(|| DomainError::not_found("Tag", slug))?,
            ),
            None => None,
        };
        let tag_id = tag.as_ref().map(|t| t.id);

        let count = self.posts.count_published(tag_id, filter).await?;
        let page = Paginator::new(count, self.settings.posts_per_page).page(page_token);
        let posts = self
            .posts
            .list_published(tag_id, filter, page.offset(), page.per_page)
            .await?;

        tracing::debug!(
            tag = ?tag_slug,
            page = page.number,
            num_pages = page.num_pages,
            returned = posts.len(),
            "Listed posts"
        );

        Ok(PostListPage {
            posts,
            page,
            tag,
            page_token: page_token.map(str::to_string),
        })
    }

    /// Show a post by publish date and slug, optionally adding a comment.
    ///
    /// An invalid comment is reported in the result, not as an error.
    pub async fn post_detail(
        &self,
        (year, month, day): (i32, u32, u32),
        slug: &str,
        comment_form: Option<CommentForm>,
        filter: &PublishedFilter,
    ) -> Result<PostDetail, DomainError> {
        let not_found = || DomainError::not_found("Post", format!("{year}/{month}/{day}/{slug}"));

        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(not_found)?;
        let post = self
            .posts
            .find_published_by_date_and_slug(date, slug, filter)
            .await?
            .ok_or_else(not_found)?;

        let comment = match comment_form {
            None => Submission::NotSubmitted,
            Some(form) => match form.validate() {
                Ok(()) => {
                    let comment = Comment::new(post.id, form.name, form.email, form.body);
                    let saved = self.comments.create(comment).await?;
                    tracing::info!(post_id = %post.id, comment_id = %saved.id, "Comment added");
                    Submission::Accepted(saved)
                }
                Err(errors) => {
                    tracing::debug!(post_id = %post.id, fields = ?errors.fields().collect::<Vec<_>>(), "Comment rejected");
                    Submission::Rejected(errors)
                }
            },
        };

        let comments = self.comments.find_active_by_post(post.id).await?;
        let similar_posts = self
            .ranker
            .rank_similar(&post, self.posts.as_ref(), filter)
            .await?;

        Ok(PostDetail {
            post,
            comments,
            comment,
            similar_posts,
        })
    }

    /// Resolve a post for sharing and, if a form is given, email it.
    ///
    /// `base_url` is prepended to the post's path to form the link in the mail.
    pub async fn share_post(
        &self,
        post_id: Uuid,
        form: Option<EmailPostForm>,
        base_url: &str,
        filter: &PublishedFilter,
    ) -> Result<ShareOutcome, DomainError> {
        let post = self
            .posts
            .find_published_by_id(post_id, filter)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;

        let Some(form) = form else {
            return Ok(ShareOutcome {
                post,
                sent: false,
                receiver: String::new(),
                errors: None,
            });
        };

        if let Err(errors) = form.validate() {
            return Ok(ShareOutcome {
                post,
                sent: false,
                receiver: String::new(),
                errors: Some(errors),
            });
        }

        let post_url = format!("{}{}", base_url.trim_end_matches('/'), post.absolute_path());
        let mail = recommendation_mail(&post, &post_url, &form, &self.settings.mail_from);
        self.mailer.send(mail).await?;

        tracing::info!(post_id = %post.id, "Post recommendation sent");

        Ok(ShareOutcome {
            post,
            sent: true,
            receiver: form.to,
            errors: None,
        })
    }
}

fn recommendation_mail(post: &Post, post_url: &str, form: &EmailPostForm, from: &str) -> OutgoingMail {
    OutgoingMail {
        subject: format!(
            "{} ({}) recommends you reading \"{}\"",
            form.name, form.email, post.title
        ),
        body: format!(
            "Read \"{}\" at {}\n\n{}'s comments: {}",
            post.title, post_url, form.name, form.comments
        ),
        from: from.to_string(),
        to: vec![form.to.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_recommendation_mail_format() {
        let publish = Utc.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap();
        let post = Post::new(
            "Rust in Production".to_string(),
            "rust-in-production".to_string(),
            "admin".to_string(),
            String::new(),
        )
        .published_at(publish);

        let form = EmailPostForm::new("Ana", "ana@example.com", "bo@example.org", "Worth it");
        let mail = recommendation_mail(
            &post,
            "https://blog.test/api/posts/2024/01/05/rust-in-production",
            &form,
            DEFAULT_MAIL_FROM,
        );

        assert_eq!(
            mail.subject,
            "Ana (ana@example.com) recommends you reading \"Rust in Production\""
        );
        assert_eq!(
            mail.body,
            "Read \"Rust in Production\" at https://blog.test/api/posts/2024/01/05/rust-in-production\n\nAna's comments: Worth it"
        );
        assert_eq!(mail.from, "admin@myblog.com");
        assert_eq!(mail.to, vec!["bo@example.org".to_string()]);
    }
}
