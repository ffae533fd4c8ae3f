//! Blog stores that need no database.

mod memory;

pub use memory::InMemoryBlogStore;
