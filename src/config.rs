use anyhow::{anyhow, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    /// Managed Telegram group. Group operations are disabled when unset.
    pub group_id: Option<i64>,
    /// Bootstrap admin account created on startup when missing.
    pub default_admin_id: Option<String>,
    pub uploads_dir: String,
    /// Monthly fee in so'm, used for the revenue projection.
    pub membership_fee: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/membership.db".to_string());
        let database_url = if database_url.trim().is_empty() {
            "sqlite:./data/membership.db".to_string()
        } else {
            database_url
        };

        let port_str = env::var("HTTP_PORT").unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let group_id = match env::var("TELEGRAM_GROUP_ID") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| anyhow!("Invalid TELEGRAM_GROUP_ID"))?,
            ),
            _ => None,
        };

        let default_admin_id = env::var("DEFAULT_ADMIN_TELEGRAM_ID")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads".to_string());
        let uploads_dir = if uploads_dir.trim().is_empty() {
            "./uploads".to_string()
        } else {
            uploads_dir
        };

        let fee_str = env::var("MEMBERSHIP_FEE").unwrap_or_else(|_| "50000".to_string());
        let membership_fee = fee_str
            .trim()
            .parse::<i64>()
            .map_err(|_| anyhow!("Invalid MEMBERSHIP_FEE"))?;

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            http_port,
            group_id,
            default_admin_id,
            uploads_dir,
            membership_fee,
        })
    }
}
