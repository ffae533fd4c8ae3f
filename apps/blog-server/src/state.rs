//! Application state - shared across all handlers.

use std::sync::Arc;

use inkwell_core::BlogService;
use inkwell_core::ports::Mailer;
use inkwell_core::service::BlogSettings;
use inkwell_infra::{ConsoleMailer, HttpMailer, InMemoryBlogStore};

#[cfg(feature = "postgres")]
use inkwell_infra::{
    DatabaseConnections, PostgresCommentRepository, PostgresPostRepository,
    PostgresTagRepository,
};

use crate::config::AppConfig;

/// Backing storage, reported by the health check.
#[derive(Clone)]
pub enum Storage {
    Memory,
    #[cfg(feature = "postgres")]
    Postgres(DatabaseConnections),
}

impl Storage {
    pub fn name(&self) -> &'static str {
        match self {
            Storage::Memory => "memory",
            #[cfg(feature = "postgres")]
            Storage::Postgres(_) => "postgres",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<BlogService>,
    pub storage: Storage,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let mailer = build_mailer(config);

        if let Some(state) = Self::connect_postgres(config, mailer.clone()).await {
            return state;
        }

        let state = Self::in_memory(Arc::new(InMemoryBlogStore::new()), mailer, config.blog.clone());
        tracing::info!("Application state initialized (memory)");
        state
    }

    #[cfg(feature = "postgres")]
    async fn connect_postgres(config: &AppConfig, mailer: Arc<dyn Mailer>) -> Option<Self> {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return None;
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => {
                let blog = BlogService::new(
                    Arc::new(PostgresPostRepository::new(connections.main.clone())),
                    Arc::new(PostgresTagRepository::new(connections.main.clone())),
                    Arc::new(PostgresCommentRepository::new(connections.main.clone())),
                    mailer,
                    config.blog.clone(),
                );
                tracing::info!("Application state initialized (postgres)");
                Some(Self {
                    blog: Arc::new(blog),
                    storage: Storage::Postgres(connections),
                })
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                None
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect_postgres(_config: &AppConfig, _mailer: Arc<dyn Mailer>) -> Option<Self> {
        tracing::info!("Running without postgres feature - using in-memory store");
        None
    }

    /// State over an in-memory store.
    pub fn in_memory(
        store: Arc<InMemoryBlogStore>,
        mailer: Arc<dyn Mailer>,
        settings: BlogSettings,
    ) -> Self {
        let blog = BlogService::new(store.clone(), store.clone(), store, mailer, settings);
        Self {
            blog: Arc::new(blog),
            storage: Storage::Memory,
        }
    }
}

fn build_mailer(config: &AppConfig) -> Arc<dyn Mailer> {
    match &config.mail_relay {
        Some(relay) => match HttpMailer::new(relay.clone()) {
            Ok(mailer) => {
                tracing::info!(url = %relay.url, "Mail relay configured");
                Arc::new(mailer)
            }
            Err(e) => {
                tracing::error!(error = %e, "Mail relay unusable, logging mail instead");
                Arc::new(ConsoleMailer)
            }
        },
        None => {
            tracing::warn!("MAIL_API_URL not set. Outgoing mail is only logged.");
            Arc::new(ConsoleMailer)
        }
    }
}
