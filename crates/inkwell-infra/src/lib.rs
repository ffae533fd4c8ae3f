//! # Inkwell Infrastructure
//!
//! Concrete implementations of the ports defined in `inkwell-core`.
//! This crate contains the database repositories, the in-memory store and
//! the mail transports.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No database, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM

pub mod database;
pub mod mail;
pub mod store;

// Re-exports - In-Memory
pub use mail::{ConsoleMailer, HttpMailer, HttpMailerConfig, InMemoryMailer};
pub use store::InMemoryBlogStore;

// Re-exports - Postgres
#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConnections, PostgresCommentRepository, PostgresPostRepository,
    PostgresTagRepository,
};
