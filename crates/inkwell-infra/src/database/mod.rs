//! Database connection management and SeaORM repositories.

mod connections;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use connections::DatabaseConnections;

#[cfg(feature = "postgres")]
pub use postgres_repo::{PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository};
