#[cfg(feature = "postgres")]
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// Configuration for the blog database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

/// Pooled connection to the blog database.
///
/// # Example
/// ```ignore
/// let db = DatabaseConnections::init(&config).await?;
/// let posts = PostgresPostRepository::new(db.main.clone());
/// ```
#[cfg(feature = "postgres")]
#[derive(Clone)]
pub struct DatabaseConnections {
    pub main: Arc<DbConn>,
}

#[cfg(feature = "postgres")]
impl DatabaseConnections {
    /// Open the connection pool.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout)
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(true)
            .to_owned();

        let main = Database::connect(opts).await?;
        tracing::info!(
            max_connections = config.max_connections,
            "Database connected"
        );

        Ok(Self {
            main: Arc::new(main),
        })
    }

    /// Whether the database currently answers.
    pub async fn is_healthy(&self) -> bool {
        match self.main.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database ping failed");
                false
            }
        }
    }
}
