use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub telegram_id: String,
    pub full_name: String,
    pub is_active: bool,
}

impl Admin {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        telegram_id: &str,
        full_name: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query("INSERT INTO admins (telegram_id, full_name, is_active) VALUES (?, ?, 1)")
            .bind(telegram_id)
            .bind(full_name)
            .execute(pool)
            .await?;

        Self::find_by_telegram_id(pool, telegram_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_telegram_id(
        pool: &sqlx::SqlitePool,
        telegram_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            "SELECT id, telegram_id, full_name, is_active FROM admins WHERE telegram_id = ?",
        )
        .bind(telegram_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_all(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Admin>("SELECT id, telegram_id, full_name, is_active FROM admins")
            .fetch_all(pool)
            .await
    }

    /// Provisions the bootstrap reviewer account if it is not present yet.
    pub async fn ensure_default(
        pool: &sqlx::SqlitePool,
        telegram_id: &str,
    ) -> Result<Self, sqlx::Error> {
        if let Some(existing) = Self::find_by_telegram_id(pool, telegram_id).await? {
            return Ok(existing);
        }

        info!("Creating default admin with telegram id {}", telegram_id);
        Self::create(pool, telegram_id, "Admin").await
    }
}
