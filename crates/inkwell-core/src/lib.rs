//! # Inkwell Core
//!
//! The domain layer of the Inkwell blog.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, ports, similar-post ranking, pagination, forms and the blog service.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod service;
pub mod similar;

pub use error::DomainError;
pub use service::BlogService;
