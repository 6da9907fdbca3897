use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Identifiers of the editable bot messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateKey {
    Start,
    BeforePayment,
    AboutBot,
    Contact,
    Approved,
}

impl TemplateKey {
    pub const ALL: [TemplateKey; 5] = [
        TemplateKey::Start,
        TemplateKey::BeforePayment,
        TemplateKey::AboutBot,
        TemplateKey::Contact,
        TemplateKey::Approved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKey::Start => "startMessage",
            TemplateKey::BeforePayment => "beforePaymentMessage",
            TemplateKey::AboutBot => "aboutBotMessage",
            TemplateKey::Contact => "contactMessage",
            TemplateKey::Approved => "approvedMessage",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "startMessage" => Some(TemplateKey::Start),
            "beforePaymentMessage" => Some(TemplateKey::BeforePayment),
            "aboutBotMessage" => Some(TemplateKey::AboutBot),
            "contactMessage" => Some(TemplateKey::Contact),
            "approvedMessage" => Some(TemplateKey::Approved),
            _ => None,
        }
    }

    /// Human-readable label shown in the admin template editor.
    pub fn display_name(&self) -> &'static str {
        match self {
            TemplateKey::Start => "Kirish xabari",
            TemplateKey::BeforePayment => "To'lov qilish yo'riqnomasi",
            TemplateKey::AboutBot => "Bot haqida ma'lumot",
            TemplateKey::Contact => "Aloqa ma'lumotlari",
            TemplateKey::Approved => "Tasdiqlash xabari",
        }
    }

    pub fn default_value(&self) -> &'static str {
        match self {
            TemplateKey::Start => {
                "Assalomu alaykum! To'lov nazoratchi botga xush kelibsiz.\n\nIltimos, ro'yxatdan o'tish uchun ism va familiyangizni kiriting."
            }
            TemplateKey::BeforePayment => {
                "To'lovni amalga oshirish uchun quyidagi hisob raqamga mablag' o'tkazing va to'lov chekini rasm shaklida yuboring."
            }
            TemplateKey::AboutBot => {
                "Bu bot guruh a'zoliklarini nazorat qilish uchun yaratilgan. A'zolik muddati 1 oy davom etadi va to'lov o'z vaqtida amalga oshirilishi kerak."
            }
            TemplateKey::Contact => "Savollar va takliflar uchun: @admin_username bilan bog'laning.",
            TemplateKey::Approved => {
                "To'lovingiz tasdiqlandi! Siz guruhga qo'shildingiz. A'zolik muddati bir oyga uzaytirildi."
            }
        }
    }
}

impl std::fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TextTemplate {
    pub id: i64,
    pub key: String,
    pub value: String,
}

impl TextTemplate {
    pub async fn get(
        pool: &sqlx::SqlitePool,
        key: TemplateKey,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TextTemplate>("SELECT id, key, value FROM texts WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(pool)
            .await
    }

    pub async fn set(
        pool: &sqlx::SqlitePool,
        key: TemplateKey,
        value: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO texts (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key.as_str())
        .bind(value)
        .execute(pool)
        .await?;

        Self::get(pool, key).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn list_all(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TextTemplate>("SELECT id, key, value FROM texts ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Current value for the key, or its built-in default when unset.
    pub async fn resolve(pool: &sqlx::SqlitePool, key: TemplateKey) -> Result<String, sqlx::Error> {
        Ok(Self::get(pool, key)
            .await?
            .map(|t| t.value)
            .unwrap_or_else(|| key.default_value().to_string()))
    }

    /// Inserts default values for any template key missing from storage.
    pub async fn seed_defaults(pool: &sqlx::SqlitePool) -> Result<(), sqlx::Error> {
        for key in TemplateKey::ALL {
            if Self::get(pool, key).await?.is_none() {
                sqlx::query("INSERT INTO texts (key, value) VALUES (?, ?)")
                    .bind(key.as_str())
                    .bind(key.default_value())
                    .execute(pool)
                    .await?;
            }
        }
        Ok(())
    }
}
