//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;

use inkwell_core::domain::PostStatus;

/// Stored publication state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Status {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
}

impl From<Status> for PostStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Draft => PostStatus::Draft,
            Status::Published => PostStatus::Published,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub author: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub status: Status,
    pub publish: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::post_tag::Entity")]
    PostTag,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::post_tag::Relation::Post.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain post, attaching its loaded tags.
    pub fn into_domain(self, tags: Vec<super::tag::Model>) -> inkwell_core::domain::Post {
        let mut tags: Vec<inkwell_core::domain::Tag> = tags.into_iter().map(Into::into).collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        inkwell_core::domain::Post {
            id: self.id,
            title: self.title,
            slug: self.slug,
            author: self.author,
            body: self.body,
            status: self.status.into(),
            publish: self.publish.into(),
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
            tags,
        }
    }
}
