use std::collections::HashSet;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Tag;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

/// Post entity - a blog article with its tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub author: String,
    pub body: String,
    pub status: PostStatus,
    pub publish: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<Tag>,
}

impl Post {
    /// Create a new draft post with no tags, scheduled for now.
    pub fn new(title: String, slug: String, author: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            slug,
            author,
            body,
            status: PostStatus::Draft,
            publish: now,
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
        }
    }

    pub fn published_at(mut self, publish: DateTime<Utc>) -> Self {
        self.status = PostStatus::Published;
        self.publish = publish;
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    /// Distinct ids of the tags attached to this post.
    pub fn tag_ids(&self) -> HashSet<Uuid> {
        self.tags.iter().map(|t| t.id).collect()
    }

    /// Canonical path of the post, derived from its publish date and slug.
    pub fn absolute_path(&self) -> String {
        format!(
            "/posts/{}/{:02}/{:02}/{}",
            self.publish.year(),
            self.publish.month(),
            self.publish.day(),
            self.slug
        )
    }
}

/// Visibility predicate for readers.
///
/// A post is visible when its status is `Published` and its publish time is
/// not after `now`. Every read query takes one of these explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishedFilter {
    pub now: DateTime<Utc>,
}

impl PublishedFilter {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Filter evaluated against the wall clock.
    pub fn current() -> Self {
        Self::at(Utc::now())
    }

    pub fn matches(&self, post: &Post) -> bool {
        post.status == PostStatus::Published && post.publish <= self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn post() -> Post {
        Post::new(
            "Who was Django Reinhardt?".to_string(),
            "who-was-django-reinhardt".to_string(),
            "admin".to_string(),
            "Body".to_string(),
        )
    }

    #[test]
    fn test_absolute_path_pads_month_and_day() {
        let publish = Utc.with_ymd_and_hms(2024, 3, 7, 10, 0, 0).unwrap();
        let post = post().published_at(publish);
        assert_eq!(
            post.absolute_path(),
            "/posts/2024/03/07/who-was-django-reinhardt"
        );
    }

    #[test]
    fn test_published_filter() {
        let now = Utc::now();
        let filter = PublishedFilter::at(now);

        assert!(!filter.matches(&post()), "drafts are never visible");
        assert!(filter.matches(&post().published_at(now)));
        assert!(filter.matches(&post().published_at(now - Duration::days(1))));
        assert!(
            !filter.matches(&post().published_at(now + Duration::minutes(5))),
            "scheduled posts stay hidden until their publish time"
        );
    }

    #[test]
    fn test_tag_ids_are_distinct() {
        let tag = Tag::new("Python".to_string(), "python".to_string());
        let post = post().with_tags(vec![tag.clone(), tag.clone()]);
        assert_eq!(post.tag_ids().len(), 1);
    }
}
