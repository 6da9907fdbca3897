use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use tracing::{error, info};

#[derive(Clone)]
pub struct DatabaseManager {
    pub pool: SqlitePool,
}

impl DatabaseManager {
    pub async fn new(database_url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
            info!("Creating database {}", database_url);
            Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePool::connect(database_url).await?;

        Ok(Self { pool })
    }

    /// Connects to the configured database, falling back to an in-memory
    /// store when it is unreachable so the process keeps serving traffic.
    pub async fn new_or_degraded(database_url: &str) -> Result<Self> {
        match Self::new(database_url).await {
            Ok(manager) => Ok(manager),
            Err(e) => {
                error!(
                    "Failed to open database {}: {} - continuing with in-memory storage, data will not persist",
                    database_url, e
                );
                Self::new("sqlite::memory:").await
            }
        }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
