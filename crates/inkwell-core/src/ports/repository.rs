use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Comment, Post, PublishedFilter, Tag};
use crate::error::RepoError;

/// Generic repository trait for entities that are looked up and created.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity and return it as stored.
    async fn create(&self, entity: T) -> Result<T, RepoError>;
}

/// Read-side access to posts. Every query is scoped by a [`PublishedFilter`].
///
/// Posts are returned with their tags loaded.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a visible post by id.
    async fn find_published_by_id(
        &self,
        id: Uuid,
        filter: &PublishedFilter,
    ) -> Result<Option<Post>, RepoError>;

    /// Find a visible post by slug, published on the given (UTC) day.
    async fn find_published_by_date_and_slug(
        &self,
        date: NaiveDate,
        slug: &str,
        filter: &PublishedFilter,
    ) -> Result<Option<Post>, RepoError>;

    /// Count visible posts, optionally restricted to those carrying `tag_id`.
    async fn count_published(
        &self,
        tag_id: Option<Uuid>,
        filter: &PublishedFilter,
    ) -> Result<u64, RepoError>;

    /// One window of visible posts, newest first.
    async fn list_published(
        &self,
        tag_id: Option<Uuid>,
        filter: &PublishedFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;

    /// Visible posts carrying at least one of `tag_ids`, excluding `exclude_id`.
    async fn find_published_sharing_tags(
        &self,
        tag_ids: &[Uuid],
        exclude_id: Uuid,
        filter: &PublishedFilter,
    ) -> Result<Vec<Post>, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Active comments of a post, oldest first.
    async fn find_active_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}
