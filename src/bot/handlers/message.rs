use std::path::Path;
use std::sync::Arc;

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::PhotoSize;
use uuid::Uuid;

use crate::bot::handlers::BotContext;
use crate::bot::keyboards::{
    BTN_ABOUT, BTN_ADMIN_PANEL, BTN_ADMIN_STATS, BTN_ADMIN_TEXTS, BTN_CONTACT, BTN_MAKE_PAYMENT,
    BTN_PAYMENT_STATUS,
};
use crate::bot::replies::PendingAction;
use crate::bot::{admin, Command};
use crate::database::models::{TemplateKey, TextTemplate};
use crate::services::registration::ProofGate;
use crate::services::workflow::WorkflowError;
use crate::utils::logging::{log_admin_action, log_member_event};
use crate::utils::validation::{validate_rejection_reason, validate_template_value};

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<BotContext>,
) -> ResponseResult<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let user = match msg.from() {
        Some(user) => user,
        None => return Ok(()),
    };
    let telegram_id = user.id.0.to_string();

    match cmd {
        Command::Start => {
            let admin = admin::is_admin(&ctx.db.pool, &telegram_id)
                .await
                .unwrap_or(false);
            if admin {
                log_admin_action("start", &telegram_id, None);
                let greeting = match TextTemplate::resolve(&ctx.db.pool, TemplateKey::Start).await
                {
                    Ok(text) => format!("{}\n\n🔐 Admin rejimi yoqilgan.", text),
                    Err(e) => {
                        tracing::error!("Failed to load start template: {}", e);
                        "Xush kelibsiz, admin!".to_string()
                    }
                };
                bot.send_message(msg.chat.id, greeting)
                    .reply_markup(crate::bot::keyboards::admin_menu())
                    .await?;
                if let Err(e) = admin::send_panel(&bot, msg.chat.id, &ctx.db.pool).await {
                    tracing::error!("Failed to send admin panel: {}", e);
                }
            } else if let Err(e) = ctx.flow.start(&telegram_id).await {
                tracing::error!("Failed to start registration for {}: {}", telegram_id, e);
            }
        }
    }
    Ok(())
}

pub async fn message_handler(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> ResponseResult<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let user = match msg.from() {
        Some(user) => user,
        None => return Ok(()),
    };
    let telegram_id = user.id.0.to_string();

    // Force-reply answers to a pending admin prompt take priority.
    if let (Some(reply), Some(text)) = (msg.reply_to_message(), msg.text()) {
        if let Some(action) = ctx.pending.take(msg.chat.id.0, reply.id.0).await {
            return handle_pending_reply(bot, &msg, action, text, &ctx).await;
        }
    }

    let is_admin = admin::is_admin(&ctx.db.pool, &telegram_id)
        .await
        .unwrap_or(false);

    if is_admin {
        if let Some(text) = msg.text() {
            let result = match text {
                BTN_ADMIN_PANEL => admin::send_panel(&bot, msg.chat.id, &ctx.db.pool).await,
                BTN_ADMIN_TEXTS => admin::send_templates(&bot, msg.chat.id).await,
                BTN_ADMIN_STATS => {
                    admin::send_stats(&bot, msg.chat.id, &ctx.db.pool, ctx.membership_fee).await
                }
                _ => Ok(()),
            };
            if let Err(e) = result {
                tracing::error!("Admin view failed for {}: {}", telegram_id, e);
            }
        }
        return Ok(());
    }

    if let Some(photos) = msg.photo() {
        return handle_photo(bot, &msg, photos, &telegram_id, &ctx).await;
    }

    if let Some(text) = msg.text() {
        let result = match text {
            BTN_PAYMENT_STATUS => ctx.flow.show_status(&telegram_id).await,
            BTN_MAKE_PAYMENT => ctx.flow.begin_payment(&telegram_id).await,
            BTN_ABOUT => ctx.flow.show_about(&telegram_id).await,
            BTN_CONTACT => ctx.flow.show_contact(&telegram_id).await,
            other => ctx.flow.handle_text(&telegram_id, other).await,
        };
        if let Err(e) = result {
            tracing::error!("Member flow failed for {}: {}", telegram_id, e);
        }
    }

    Ok(())
}

async fn handle_pending_reply(
    bot: Bot,
    msg: &Message,
    action: PendingAction,
    text: &str,
    ctx: &BotContext,
) -> ResponseResult<()> {
    match action {
        PendingAction::RejectionReason { member_id } => {
            let reason = match validate_rejection_reason(text) {
                Ok(reason) => reason,
                Err(_) => {
                    if let Err(e) = admin::prompt_rejection_reason(
                        &bot,
                        msg.chat.id,
                        &ctx.pending,
                        member_id,
                    )
                    .await
                    {
                        tracing::error!("Failed to re-prompt rejection reason: {}", e);
                    }
                    return Ok(());
                }
            };

            match ctx.workflow.reject(member_id, &reason).await {
                Ok(member) => {
                    bot.send_message(
                        msg.chat.id,
                        format!(
                            "❌ {} uchun to'lov rad etildi va a'zoga xabar yuborildi.",
                            member.full_name
                        ),
                    )
                    .await?;
                }
                Err(WorkflowError::MemberNotFound(_)) => {
                    bot.send_message(msg.chat.id, "A'zo topilmadi.").await?;
                }
                Err(e) => {
                    tracing::error!("Failed to reject member {}: {}", member_id, e);
                    bot.send_message(msg.chat.id, "Xatolik yuz berdi, qaytadan urinib ko'ring.")
                        .await?;
                }
            }
        }
        PendingAction::TemplateValue { key } => {
            let value = match validate_template_value(text) {
                Ok(value) => value,
                Err(_) => {
                    bot.send_message(msg.chat.id, "Matn bo'sh bo'lishi mumkin emas.")
                        .await?;
                    return Ok(());
                }
            };

            match TextTemplate::set(&ctx.db.pool, key, &value).await {
                Ok(_) => {
                    bot.send_message(
                        msg.chat.id,
                        format!("✅ \"{}\" xabari yangilandi.", key.display_name()),
                    )
                    .await?;
                }
                Err(e) => {
                    tracing::error!("Failed to update template {}: {}", key, e);
                    bot.send_message(msg.chat.id, "Xatolik yuz berdi, qaytadan urinib ko'ring.")
                        .await?;
                }
            }
        }
    }
    Ok(())
}

async fn handle_photo(
    bot: Bot,
    msg: &Message,
    photos: &[PhotoSize],
    telegram_id: &str,
    ctx: &BotContext,
) -> ResponseResult<()> {
    let gate = match ctx.flow.proof_gate(telegram_id).await {
        Ok(gate) => gate,
        Err(e) => {
            tracing::error!("Proof gate failed for {}: {}", telegram_id, e);
            return Ok(());
        }
    };

    match gate {
        ProofGate::NotRegistered => {
            bot.send_message(
                msg.chat.id,
                "Avval ro'yxatdan o'ting. Buning uchun /start buyrug'ini yuboring.",
            )
            .await?;
        }
        ProofGate::NotExpected => {
            log_member_event("photo_ignored", telegram_id, None);
        }
        ProofGate::Accepted => {
            // Telegram orders sizes ascending, the last one is the original.
            let photo = match photos.last() {
                Some(photo) => photo,
                None => return Ok(()),
            };
            match store_proof_photo(&bot, photo, &ctx.uploads_dir, telegram_id).await {
                Ok(stored_path) => {
                    if let Err(e) = ctx.flow.handle_photo(telegram_id, &stored_path).await {
                        tracing::error!("Failed to record proof for {}: {}", telegram_id, e);
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to download proof from {}: {}", telegram_id, e);
                    bot.send_message(
                        msg.chat.id,
                        "Rasmni qabul qilib bo'lmadi. Iltimos, qaytadan yuboring.",
                    )
                    .await?;
                }
            }
        }
    }
    Ok(())
}

async fn store_proof_photo(
    bot: &Bot,
    photo: &PhotoSize,
    uploads_dir: &str,
    telegram_id: &str,
) -> anyhow::Result<String> {
    tokio::fs::create_dir_all(uploads_dir).await?;

    let filename = format!("payment_{}_{}.jpg", telegram_id, Uuid::new_v4());
    let path = Path::new(uploads_dir).join(filename);

    let file = bot.get_file(photo.file.id.clone()).await?;
    let mut dst = tokio::fs::File::create(&path).await?;
    bot.download_file(&file.path, &mut dst).await?;

    Ok(path.to_string_lossy().into_owned())
}
