//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sea_orm::sea_query::{Query, SimpleExpr};
use sea_orm::{
    ColumnTrait, EntityTrait, LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Select,
};
use uuid::Uuid;

use inkwell_core::domain::{Comment, Post, PublishedFilter, Tag};
use inkwell_core::error::RepoError;
use inkwell_core::ports::{CommentRepository, PostRepository, TagRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Posts visible under `filter`.
fn published(filter: &PublishedFilter) -> Select<PostEntity> {
    PostEntity::find()
        .filter(post::Column::Status.eq(post::Status::Published))
        .filter(post::Column::Publish.lte(filter.now))
}

/// Posts carrying at least one of `tag_ids`.
fn tagged_with(tag_ids: &[Uuid]) -> SimpleExpr {
    post::Column::Id.in_subquery(
        Query::select()
            .column(post_tag::Column::PostId)
            .from(PostTagEntity)
            .and_where(post_tag::Column::TagId.is_in(tag_ids.iter().copied()))
            .to_owned(),
    )
}

impl PostgresPostRepository {
    /// Attach tags to fetched posts, preserving their order.
    async fn with_tags(&self, posts: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        let tags = posts
            .load_many_to_many(TagEntity, PostTagEntity, self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(posts
            .into_iter()
            .zip(tags)
            .map(|(post, tags)| post.into_domain(tags))
            .collect())
    }

    async fn first_with_tags(&self, post: Option<post::Model>) -> Result<Option<Post>, RepoError> {
        match post {
            Some(post) => Ok(self.with_tags(vec![post]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_published_by_id(
        &self,
        id: Uuid,
        filter: &PublishedFilter,
    ) -> Result<Option<Post>, RepoError> {
        let result = published(filter)
            .filter(post::Column::Id.eq(id))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        self.first_with_tags(result).await
    }

    async fn find_published_by_date_and_slug(
        &self,
        date: NaiveDate,
        slug: &str,
        filter: &PublishedFilter,
    ) -> Result<Option<Post>, RepoError> {
        let day_start = date.and_time(NaiveTime::MIN).and_utc();

        tracing::debug!(%date, slug, "Finding post by date and slug");

        let mut query = published(filter)
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Publish.gte(day_start));
        // The last representable day has no successor; it is open-ended.
        if let Some(next_day) = date.succ_opt() {
            query = query.filter(post::Column::Publish.lt(next_day.and_time(NaiveTime::MIN).and_utc()));
        }

        let result = query
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        self.first_with_tags(result).await
    }

    async fn count_published(
        &self,
        tag_id: Option<Uuid>,
        filter: &PublishedFilter,
    ) -> Result<u64, RepoError> {
        let mut query = published(filter);
        if let Some(tag_id) = tag_id {
            query = query.filter(tagged_with(&[tag_id]));
        }

        query.count(self.db.as_ref()).await.map_err(map_db_err)
    }

    async fn list_published(
        &self,
        tag_id: Option<Uuid>,
        filter: &PublishedFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let mut query = published(filter);
        if let Some(tag_id) = tag_id {
            query = query.filter(tagged_with(&[tag_id]));
        }

        let posts = query
            .order_by_desc(post::Column::Publish)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        self.with_tags(posts).await
    }

    async fn find_published_sharing_tags(
        &self,
        tag_ids: &[Uuid],
        exclude_id: Uuid,
        filter: &PublishedFilter,
    ) -> Result<Vec<Post>, RepoError> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let posts = published(filter)
            .filter(post::Column::Id.ne(exclude_id))
            .filter(tagged_with(tag_ids))
            .order_by_desc(post::Column::Publish)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        self.with_tags(posts).await
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_active_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Active.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
