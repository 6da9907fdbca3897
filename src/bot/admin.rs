use anyhow::Result;
use chrono::Utc;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{ForceReply, InputFile};

use crate::bot::keyboards;
use crate::bot::replies::{PendingAction, PendingReplies};
use crate::database::models::{Admin, Member, PaymentStatus, TemplateKey, TextTemplate};
use crate::utils::datetime::{days_until, format_date};

pub async fn is_admin(pool: &sqlx::SqlitePool, telegram_id: &str) -> Result<bool, sqlx::Error> {
    Ok(Admin::find_by_telegram_id(pool, telegram_id)
        .await?
        .map(|a| a.is_active)
        .unwrap_or(false))
}

/// Members whose proof photo is waiting for a decision.
async fn pending_reviews(pool: &sqlx::SqlitePool) -> Result<Vec<Member>, sqlx::Error> {
    let members = Member::list_by_status(pool, PaymentStatus::Pending).await?;
    Ok(members
        .into_iter()
        .filter(|m| m.payment_proof.is_some())
        .collect())
}

/// Aggregate member counts shown on the admin panel.
pub struct SummaryCounts {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub expiring_soon: usize,
}

pub async fn summary_counts(pool: &sqlx::SqlitePool) -> Result<SummaryCounts, sqlx::Error> {
    let members = Member::list_all(pool).await?;
    let today = Utc::now().date_naive();

    let mut counts = SummaryCounts {
        total: members.len(),
        active: 0,
        pending: 0,
        approved: 0,
        rejected: 0,
        expiring_soon: 0,
    };

    for member in &members {
        if member.is_active {
            counts.active += 1;
        }
        match member.status() {
            PaymentStatus::Pending if member.payment_proof.is_some() => counts.pending += 1,
            PaymentStatus::Approved => counts.approved += 1,
            PaymentStatus::Rejected => counts.rejected += 1,
            _ => {}
        }
        if member.is_active && member.status() == PaymentStatus::Approved {
            if let Some(expiry) = member.expiry_datetime() {
                let days = (expiry.date_naive() - today).num_days();
                if (0..=3).contains(&days) {
                    counts.expiring_soon += 1;
                }
            }
        }
    }

    Ok(counts)
}

/// Overview counts plus the inline panel keyboard.
pub async fn send_panel(bot: &Bot, chat: ChatId, pool: &sqlx::SqlitePool) -> Result<()> {
    let counts = summary_counts(pool).await?;

    let body = format!(
        "🔐 Admin Panel\n\n👥 Jami a'zolar: {}\n⏳ Kutilayotgan to'lovlar: {}\n✅ Tasdiqlanganlar: {}\n❌ Rad etilganlar: {}\n⚠️ Yaqin 3 kunda muddati tugaydiganlar: {}",
        counts.total, counts.pending, counts.approved, counts.rejected, counts.expiring_soon
    );
    bot.send_message(chat, body)
        .reply_markup(keyboards::admin_panel())
        .await?;
    Ok(())
}

/// Re-sends each waiting proof photo with its approve/reject buttons.
pub async fn send_pending(bot: &Bot, chat: ChatId, pool: &sqlx::SqlitePool) -> Result<()> {
    let members = pending_reviews(pool).await?;
    if members.is_empty() {
        bot.send_message(chat, "Kutilayotgan to'lovlar yo'q.").await?;
        return Ok(());
    }

    for member in members {
        let caption = format!(
            "👤 {}\n📞 {}\n🆔 {}",
            member.full_name, member.phone_number, member.telegram_id
        );
        let keyboard = keyboards::approve_reject(member.id);

        let photo_sent = match member.payment_proof.as_deref().filter(|p| Path::new(p).is_file())
        {
            Some(proof) => bot
                .send_photo(chat, InputFile::file(proof.to_string()))
                .caption(caption.clone())
                .reply_markup(keyboard.clone())
                .await
                .is_ok(),
            None => false,
        };

        if !photo_sent {
            bot.send_message(chat, caption).reply_markup(keyboard).await?;
        }
    }
    Ok(())
}

/// Most recent members, capped at ten so the message stays readable.
pub async fn send_users(bot: &Bot, chat: ChatId, pool: &sqlx::SqlitePool) -> Result<()> {
    let members = Member::list_all(pool).await?;
    if members.is_empty() {
        bot.send_message(chat, "Hozircha a'zolar yo'q.").await?;
        return Ok(());
    }

    let total = members.len();
    let shown = total.min(10);
    let mut body = format!("👥 A'zolar ro'yxati ({} / {}):\n", shown, total);
    for (i, member) in members.iter().take(10).enumerate() {
        body.push_str(&format!(
            "\n{}. {} — {}\n   Holati: {}",
            i + 1,
            member.full_name,
            member.phone_number,
            member.status().display_name()
        ));
        if let Some(expiry) = member.expiry_datetime() {
            body.push_str(&format!(", muddati: {}", format_date(&expiry)));
        }
    }

    bot.send_message(chat, body).await?;
    Ok(())
}

/// Approved members whose expiry falls within the next three days.
pub async fn send_expiring(bot: &Bot, chat: ChatId, pool: &sqlx::SqlitePool) -> Result<()> {
    let now = Utc::now();
    let today = now.date_naive();

    let mut expiring: Vec<Member> = Member::list_active_with_expiry(pool)
        .await?
        .into_iter()
        .filter(|m| {
            m.status() == PaymentStatus::Approved
                && m.expiry_datetime()
                    .map(|dt| {
                        let days = (dt.date_naive() - today).num_days();
                        (0..=3).contains(&days)
                    })
                    .unwrap_or(false)
        })
        .collect();
    expiring.sort_by_key(|m| m.expiry_datetime());

    if expiring.is_empty() {
        bot.send_message(chat, "Yaqin 3 kunda muddati tugaydigan a'zolar yo'q.")
            .await?;
        return Ok(());
    }

    let mut body = "⚠️ Muddati tugayotgan a'zolar:\n".to_string();
    for member in &expiring {
        if let Some(expiry) = member.expiry_datetime() {
            body.push_str(&format!(
                "\n• {} — {} ({} kun qoldi)",
                member.full_name,
                format_date(&expiry),
                days_until(expiry, now).max(0)
            ));
        }
    }

    bot.send_message(chat, body).await?;
    Ok(())
}

pub async fn send_stats(
    bot: &Bot,
    chat: ChatId,
    pool: &sqlx::SqlitePool,
    membership_fee: i64,
) -> Result<()> {
    let counts = summary_counts(pool).await?;
    let monthly_revenue = counts.active as i64 * membership_fee;

    let body = format!(
        "📊 Statistika\n\n👥 Jami a'zolar: {}\n🟢 Faol a'zolar: {}\n⏳ Kutilayotgan to'lovlar: {}\n✅ Tasdiqlanganlar: {}\n❌ Rad etilganlar: {}\n⚠️ Yaqin 3 kunda muddati tugaydiganlar: {}\n💰 Oylik daromad: {} so'm",
        counts.total,
        counts.active,
        counts.pending,
        counts.approved,
        counts.rejected,
        counts.expiring_soon,
        monthly_revenue
    );
    bot.send_message(chat, body).await?;
    Ok(())
}

pub async fn send_templates(bot: &Bot, chat: ChatId) -> Result<()> {
    bot.send_message(chat, "📝 Qaysi xabar matnini tahrirlamoqchisiz?")
        .reply_markup(keyboards::template_list())
        .await?;
    Ok(())
}

/// Force-reply prompt for a rejection reason. The prompt's message id is
/// registered so the admin's answer can be routed back to the member.
pub async fn prompt_rejection_reason(
    bot: &Bot,
    chat: ChatId,
    pending: &PendingReplies,
    member_id: i64,
) -> Result<()> {
    let prompt = bot
        .send_message(chat, "Rad etish sababini shu xabarga javob sifatida yuboring:")
        .reply_markup(ForceReply::new())
        .await?;
    pending
        .register(chat.0, prompt.id.0, PendingAction::RejectionReason { member_id })
        .await;
    Ok(())
}

/// Force-reply prompt showing the current template text before editing.
pub async fn prompt_template_value(
    bot: &Bot,
    chat: ChatId,
    pool: &sqlx::SqlitePool,
    pending: &PendingReplies,
    key: TemplateKey,
) -> Result<()> {
    let current = TextTemplate::resolve(pool, key).await?;
    let prompt = bot
        .send_message(
            chat,
            format!(
                "✏️ {}\n\nJoriy matn:\n{}\n\nYangi matnni shu xabarga javob sifatida yuboring.",
                key.display_name(),
                current
            ),
        )
        .reply_markup(ForceReply::new())
        .await?;
    pending
        .register(chat.0, prompt.id.0, PendingAction::TemplateValue { key })
        .await;
    Ok(())
}
