use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::InputFile;

use crate::bot::keyboards;

/// Interactive controls attached to an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controls {
    /// Member reply keyboard. The payment button only appears when the
    /// member currently owes a payment.
    MemberMenu { show_payment: bool },
    /// Single payment button, attached to reminder messages.
    PaymentButton,
    /// Inline approve/reject pair attached to a forwarded payment proof.
    ApproveReject { member_id: i64 },
}

/// Outbound messaging seam. The production implementation talks to the
/// Telegram Bot API; tests record calls instead.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(
        &self,
        recipient: &str,
        body: &str,
        controls: Option<Controls>,
    ) -> Result<()>;

    async fn send_photo(
        &self,
        recipient: &str,
        blob_path: &str,
        caption: &str,
        controls: Option<Controls>,
    ) -> Result<()>;

    async fn remove_from_group(&self, telegram_id: &str) -> Result<()>;

    async fn reinstate_in_group(&self, telegram_id: &str) -> Result<()>;

    async fn create_invite_link(&self) -> Result<String>;
}

pub struct TelegramNotifier {
    bot: Bot,
    group_id: Option<ChatId>,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, group_id: Option<i64>) -> Self {
        Self {
            bot,
            group_id: group_id.map(ChatId),
        }
    }

    fn group(&self) -> Result<ChatId> {
        self.group_id
            .ok_or_else(|| anyhow!("TELEGRAM_GROUP_ID is not configured"))
    }

    fn parse_chat(recipient: &str) -> Result<ChatId> {
        recipient
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| anyhow!("Invalid telegram id '{}'", recipient))
    }

    fn parse_user(telegram_id: &str) -> Result<UserId> {
        telegram_id
            .parse::<u64>()
            .map(UserId)
            .map_err(|_| anyhow!("Invalid telegram id '{}'", telegram_id))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(
        &self,
        recipient: &str,
        body: &str,
        controls: Option<Controls>,
    ) -> Result<()> {
        let chat = Self::parse_chat(recipient)?;
        let request = self.bot.send_message(chat, body);
        match controls {
            Some(c) => request.reply_markup(keyboards::markup_for(&c)).await,
            None => request.await,
        }
        .with_context(|| format!("Failed to send message to {}", recipient))?;
        Ok(())
    }

    async fn send_photo(
        &self,
        recipient: &str,
        blob_path: &str,
        caption: &str,
        controls: Option<Controls>,
    ) -> Result<()> {
        let chat = Self::parse_chat(recipient)?;
        let photo = InputFile::file(PathBuf::from(blob_path));
        let request = self.bot.send_photo(chat, photo).caption(caption.to_string());
        match controls {
            Some(c) => request.reply_markup(keyboards::markup_for(&c)).await,
            None => request.await,
        }
        .with_context(|| format!("Failed to send photo to {}", recipient))?;
        Ok(())
    }

    async fn remove_from_group(&self, telegram_id: &str) -> Result<()> {
        let group = self.group()?;
        let user = Self::parse_user(telegram_id)?;
        self.bot
            .ban_chat_member(group, user)
            .await
            .with_context(|| format!("Failed to remove {} from group", telegram_id))?;
        Ok(())
    }

    async fn reinstate_in_group(&self, telegram_id: &str) -> Result<()> {
        let group = self.group()?;
        let user = Self::parse_user(telegram_id)?;
        self.bot
            .unban_chat_member(group, user)
            .await
            .with_context(|| format!("Failed to reinstate {} in group", telegram_id))?;
        Ok(())
    }

    async fn create_invite_link(&self) -> Result<String> {
        let group = self.group()?;
        let link = self
            .bot
            .export_chat_invite_link(group)
            .await
            .context("Failed to create group invite link")?;
        Ok(link)
    }
}
