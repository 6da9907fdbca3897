use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::bot::actions::AdminAction;
use crate::bot::admin;
use crate::bot::handlers::BotContext;
use crate::services::workflow::WorkflowError;
use crate::utils::logging::log_admin_action;

pub async fn callback_handler(bot: Bot, q: CallbackQuery, ctx: Arc<BotContext>) -> ResponseResult<()> {
    let telegram_id = q.from.id.0.to_string();

    let data = match q.data.clone() {
        Some(data) => data,
        None => {
            bot.answer_callback_query(q.id).await?;
            return Ok(());
        }
    };

    // Decision buttons that were already consumed stay on the message but
    // do nothing beyond an acknowledgement.
    if data == "approved" || data == "rejected" {
        bot.answer_callback_query(q.id)
            .text("Bu to'lov allaqachon ko'rib chiqilgan.")
            .await?;
        return Ok(());
    }

    let is_admin = admin::is_admin(&ctx.db.pool, &telegram_id)
        .await
        .unwrap_or(false);
    if !is_admin {
        bot.answer_callback_query(q.id)
            .text("Bu amal faqat adminlar uchun.")
            .show_alert(true)
            .await?;
        return Ok(());
    }

    let action = match AdminAction::parse(&data) {
        Some(action) => action,
        None => {
            bot.answer_callback_query(q.id)
                .text("Noma'lum buyruq.")
                .await?;
            return Ok(());
        }
    };

    log_admin_action("callback", &telegram_id, Some(&data));
    let chat = q.message.as_ref().map(|m| m.chat.id);

    match action {
        AdminAction::Pending => {
            bot.answer_callback_query(q.id).await?;
            if let Some(chat) = chat {
                if let Err(e) = admin::send_pending(&bot, chat, &ctx.db.pool).await {
                    tracing::error!("Failed to list pending payments: {}", e);
                }
            }
        }
        AdminAction::Users => {
            bot.answer_callback_query(q.id).await?;
            if let Some(chat) = chat {
                if let Err(e) = admin::send_users(&bot, chat, &ctx.db.pool).await {
                    tracing::error!("Failed to list members: {}", e);
                }
            }
        }
        AdminAction::Expiring => {
            bot.answer_callback_query(q.id).await?;
            if let Some(chat) = chat {
                if let Err(e) = admin::send_expiring(&bot, chat, &ctx.db.pool).await {
                    tracing::error!("Failed to list expiring members: {}", e);
                }
            }
        }
        AdminAction::Texts => {
            bot.answer_callback_query(q.id).await?;
            if let Some(chat) = chat {
                if let Err(e) = admin::send_templates(&bot, chat).await {
                    tracing::error!("Failed to list templates: {}", e);
                }
            }
        }
        AdminAction::EditText(key) => {
            bot.answer_callback_query(q.id).await?;
            if let Some(chat) = chat {
                if let Err(e) =
                    admin::prompt_template_value(&bot, chat, &ctx.db.pool, &ctx.pending, key).await
                {
                    tracing::error!("Failed to prompt template edit: {}", e);
                }
            }
        }
        AdminAction::Approve(member_id) => handle_approve(&bot, q, member_id, &ctx).await?,
        AdminAction::Reject(member_id) => {
            bot.answer_callback_query(q.id.clone()).await?;
            if let Some(chat) = chat {
                if let Err(e) =
                    admin::prompt_rejection_reason(&bot, chat, &ctx.pending, member_id).await
                {
                    tracing::error!("Failed to prompt rejection reason: {}", e);
                }
            }
            mark_decided(&bot, &q, "❌ Rad etilgan", "rejected").await;
        }
    }

    Ok(())
}

async fn handle_approve(
    bot: &Bot,
    q: CallbackQuery,
    member_id: i64,
    ctx: &BotContext,
) -> ResponseResult<()> {
    match ctx.workflow.approve(member_id, Utc::now()).await {
        Ok(member) => {
            bot.answer_callback_query(q.id.clone())
                .text(format!("✅ {} tasdiqlandi.", member.full_name))
                .await?;
            mark_decided(bot, &q, "✅ Tasdiqlangan", "approved").await;
        }
        Err(WorkflowError::MemberNotFound(_)) => {
            bot.answer_callback_query(q.id)
                .text("A'zo topilmadi.")
                .show_alert(true)
                .await?;
        }
        Err(e) => {
            tracing::error!("Failed to approve member {}: {}", member_id, e);
            bot.answer_callback_query(q.id)
                .text("Xatolik yuz berdi, qaytadan urinib ko'ring.")
                .show_alert(true)
                .await?;
        }
    }
    Ok(())
}

/// Swaps the approve/reject pair for a single inert status button so the
/// same proof cannot be decided twice from a stale message.
async fn mark_decided(bot: &Bot, q: &CallbackQuery, label: &str, data: &str) {
    let message = match q.message.as_ref() {
        Some(message) => message,
        None => return,
    };

    let keyboard =
        InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(label, data)]]);
    if let Err(e) = bot
        .edit_message_reply_markup(message.chat.id, message.id)
        .reply_markup(keyboard)
        .await
    {
        tracing::warn!("Failed to update decision buttons: {}", e);
    }
}
