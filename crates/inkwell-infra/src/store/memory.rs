//! In-memory blog store - used when no database is configured.
//!
//! Implements every repository port over plain vectors guarded by async
//! `RwLock`s. Data is lost on process restart.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkwell_core::domain::{Comment, Post, PublishedFilter, Tag};
use inkwell_core::error::RepoError;
use inkwell_core::ports::{BaseRepository, CommentRepository, PostRepository, TagRepository};

/// In-memory posts, tags and comments.
#[derive(Default)]
pub struct InMemoryBlogStore {
    posts: RwLock<Vec<Post>>,
    tags: RwLock<Vec<Tag>>,
    comments: RwLock<Vec<Comment>>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a post (matched by id). A tag is attached at most once.
    pub async fn insert_post(&self, mut post: Post) {
        let mut seen = std::collections::HashSet::new();
        post.tags.retain(|tag| seen.insert(tag.id));

        let mut posts = self.posts.write().await;
        match posts.iter_mut().find(|p| p.id == post.id) {
            Some(existing) => *existing = post,
            None => posts.push(post),
        }
    }

    /// Visible posts matching `predicate`, newest first.
    async fn select_published<F>(&self, filter: &PublishedFilter, predicate: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        let posts = self.posts.read().await;
        let mut selected: Vec<Post> = posts
            .iter()
            .filter(|p| filter.matches(p) && predicate(p))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.publish.cmp(&a.publish));
        selected
    }
}

fn has_tag(post: &Post, tag_id: Option<Uuid>) -> bool {
    tag_id.is_none_or(|id| post.tags.iter().any(|t| t.id == id))
}

#[async_trait]
impl PostRepository for InMemoryBlogStore {
    async fn find_published_by_id(
        &self,
        id: Uuid,
        filter: &PublishedFilter,
    ) -> Result<Option<Post>, RepoError> {
        Ok(self
            .select_published(filter, |p| p.id == id)
            .await
            .into_iter()
            .next())
    }

    async fn find_published_by_date_and_slug(
        &self,
        date: NaiveDate,
        slug: &str,
        filter: &PublishedFilter,
    ) -> Result<Option<Post>, RepoError> {
        Ok(self
            .select_published(filter, |p| {
                p.slug == slug && p.publish.date_naive() == date
            })
            .await
            .into_iter()
            .next())
    }

    async fn count_published(
        &self,
        tag_id: Option<Uuid>,
        filter: &PublishedFilter,
    ) -> Result<u64, RepoError> {
        let posts = self.select_published(filter, |p| has_tag(p, tag_id)).await;
        Ok(posts.len() as u64)
    }

    async fn list_published(
        &self,
        tag_id: Option<Uuid>,
        filter: &PublishedFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let posts = self.select_published(filter, |p| has_tag(p, tag_id)).await;
        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_published_sharing_tags(
        &self,
        tag_ids: &[Uuid],
        exclude_id: Uuid,
        filter: &PublishedFilter,
    ) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .select_published(filter, |p| {
                p.id != exclude_id && p.tags.iter().any(|t| tag_ids.contains(&t.id))
            })
            .await)
    }
}

#[async_trait]
impl BaseRepository<Tag, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, RepoError> {
        let tags = self.tags.read().await;
        Ok(tags.iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, tag: Tag) -> Result<Tag, RepoError> {
        let mut tags = self.tags.write().await;
        if tags.iter().any(|t| t.id == tag.id || t.slug == tag.slug) {
            return Err(RepoError::Constraint(format!(
                "tag slug '{}' already exists",
                tag.slug
            )));
        }
        tags.push(tag.clone());
        Ok(tag)
    }
}

#[async_trait]
impl TagRepository for InMemoryBlogStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let tags = self.tags.read().await;
        Ok(tags.iter().find(|t| t.slug == slug).cloned())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let comments = self.comments.read().await;
        Ok(comments.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, comment: Comment) -> Result<Comment, RepoError> {
        if !self.posts.read().await.iter().any(|p| p.id == comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        self.comments.write().await.push(comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl CommentRepository for InMemoryBlogStore {
    async fn find_active_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let comments = self.comments.read().await;
        let mut active: Vec<Comment> = comments
            .iter()
            .filter(|c| c.post_id == post_id && c.active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(active)
    }
}
