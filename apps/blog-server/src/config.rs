//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use inkwell_core::pagination::DEFAULT_PAGE_SIZE;
use inkwell_core::service::{BlogSettings, DEFAULT_MAIL_FROM};
use inkwell_infra::HttpMailerConfig;
use inkwell_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub blog: BlogSettings,
    /// HTTP mail relay; `None` logs mail instead of sending it.
    pub mail_relay: Option<HttpMailerConfig>,
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 20),
            min_connections: parsed("DB_MIN_CONNECTIONS", 2),
            connect_timeout: Duration::from_secs(parsed("DB_CONNECT_TIMEOUT_SECS", 10)),
        });

        let mail_relay = env::var("MAIL_API_URL").ok().map(|url| HttpMailerConfig {
            url,
            api_key: env::var("MAIL_API_KEY").ok(),
            timeout: Duration::from_secs(parsed("MAIL_TIMEOUT_SECS", 10)),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080),
            database,
            blog: BlogSettings {
                posts_per_page: parsed("POSTS_PER_PAGE", DEFAULT_PAGE_SIZE),
                mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| DEFAULT_MAIL_FROM.to_string()),
            },
            mail_relay,
        }
    }
}
