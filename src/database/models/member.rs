use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle states of a membership payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "approved" => Some(PaymentStatus::Approved),
            "rejected" => Some(PaymentStatus::Rejected),
            "expired" => Some(PaymentStatus::Expired),
            _ => None,
        }
    }

    /// Status label shown to members.
    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "⏳ Ko'rib chiqilmoqda",
            PaymentStatus::Approved => "✅ Tasdiqlangan",
            PaymentStatus::Rejected => "❌ Rad etilgan",
            PaymentStatus::Expired => "⌛️ Muddati tugagan",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub telegram_id: String,
    pub full_name: String,
    pub phone_number: String,
    pub join_date: String,
    pub payment_status: String,
    pub payment_proof: Option<String>,
    pub payment_expiry_date: Option<String>,
    pub is_active: bool,
}

const MEMBER_COLUMNS: &str = "id, telegram_id, full_name, phone_number, join_date, payment_status, payment_proof, payment_expiry_date, is_active";

impl Member {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        telegram_id: &str,
        full_name: &str,
        phone_number: &str,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO members (telegram_id, full_name, phone_number, join_date, payment_status, is_active)
            VALUES (?, ?, ?, ?, 'pending', 0)
            "#,
        )
        .bind(telegram_id)
        .bind(full_name)
        .bind(phone_number)
        .bind(&now)
        .execute(pool)
        .await?;

        Self::find_by_telegram_id(pool, telegram_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_telegram_id(
        pool: &sqlx::SqlitePool,
        telegram_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE telegram_id = ?"
        ))
        .bind(telegram_id)
        .fetch_optional(pool)
        .await
    }

    /// Most recently joined members first.
    pub async fn list_all(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members ORDER BY join_date DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn list_by_status(
        pool: &sqlx::SqlitePool,
        status: PaymentStatus,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE payment_status = ? ORDER BY join_date DESC"
        ))
        .bind(status.as_str())
        .fetch_all(pool)
        .await
    }

    /// Active approved members whose expiry falls on `today + days`,
    /// compared by calendar date with the time of day ignored.
    pub async fn list_expiring_in_days(
        pool: &sqlx::SqlitePool,
        today: NaiveDate,
        days: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let target = today + chrono::Duration::days(days);
        let candidates = Self::list_active_with_expiry(pool).await?;

        Ok(candidates
            .into_iter()
            .filter(|m| {
                m.status() == PaymentStatus::Approved
                    && m.expiry_datetime().map(|dt| dt.date_naive()) == Some(target)
            })
            .collect())
    }

    /// Active members carrying an expiry timestamp, regardless of status.
    pub async fn list_active_with_expiry(
        pool: &sqlx::SqlitePool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE is_active = 1 AND payment_expiry_date IS NOT NULL"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn set_payment_proof(
        pool: &sqlx::SqlitePool,
        id: i64,
        proof_path: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query("UPDATE members SET payment_status = 'pending', payment_proof = ? WHERE id = ?")
            .bind(proof_path)
            .bind(id)
            .execute(pool)
            .await?;

        Self::find_by_id(pool, id).await
    }

    pub async fn set_approved(
        pool: &sqlx::SqlitePool,
        id: i64,
        expiry: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query(
            "UPDATE members SET payment_status = 'approved', is_active = 1, payment_expiry_date = ? WHERE id = ?",
        )
        .bind(expiry.to_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, id).await
    }

    pub async fn set_rejected(
        pool: &sqlx::SqlitePool,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query("UPDATE members SET payment_status = 'rejected' WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Self::find_by_id(pool, id).await
    }

    pub async fn set_inactive(
        pool: &sqlx::SqlitePool,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query("UPDATE members SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Self::find_by_id(pool, id).await
    }

    pub async fn set_expired(
        pool: &sqlx::SqlitePool,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query("UPDATE members SET payment_status = 'expired', is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &sqlx::SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub fn status(&self) -> PaymentStatus {
        PaymentStatus::parse(&self.payment_status).unwrap_or(PaymentStatus::Pending)
    }

    pub fn expiry_datetime(&self) -> Option<DateTime<Utc>> {
        self.payment_expiry_date
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn join_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.join_date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
