//! Mailer implementations - HTTP relay, console and in-memory outbox.

mod console;
mod http;
mod memory;

pub use self::console::ConsoleMailer;
pub use self::http::{HttpMailer, HttpMailerConfig};
pub use self::memory::InMemoryMailer;
