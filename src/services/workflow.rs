use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::database::models::{Member, TemplateKey, TextTemplate};
use crate::services::notifier::{Controls, Notifier};
use crate::utils::datetime::one_month_from;
use crate::utils::logging::{log_admin_action, log_notification_failure};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Member {0} not found")]
    MemberNotFound(i64),
    #[error("Rejection reason cannot be empty")]
    EmptyReason,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Reviewer decisions over payment proofs and membership lifecycle.
///
/// Storage updates are authoritative; everything Telegram-side (group
/// membership changes, invite links, member notifications) is best effort
/// and never fails the decision.
pub struct ApprovalWorkflow {
    pool: sqlx::SqlitePool,
    notifier: Arc<dyn Notifier>,
}

impl ApprovalWorkflow {
    pub fn new(pool: sqlx::SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    /// Approves the member's payment: one month of membership from `now`,
    /// reinstated in the group, fresh invite link in the confirmation.
    pub async fn approve(
        &self,
        member_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Member, WorkflowError> {
        let member = Member::find_by_id(&self.pool, member_id)
            .await?
            .ok_or(WorkflowError::MemberNotFound(member_id))?;

        let expiry = one_month_from(now);
        let updated = Member::set_approved(&self.pool, member.id, expiry)
            .await?
            .ok_or(WorkflowError::MemberNotFound(member_id))?;
        log_admin_action("approve", "workflow", Some(&format!("member #{}", member.id)));

        if let Err(e) = self.notifier.reinstate_in_group(&member.telegram_id).await {
            log_notification_failure("reinstate", &member.telegram_id, &e.to_string());
        }

        let mut body = TextTemplate::resolve(&self.pool, TemplateKey::Approved).await?;
        match self.notifier.create_invite_link().await {
            Ok(link) => {
                body.push_str("\n\nGuruhga qo'shilish havolasi: ");
                body.push_str(&link);
            }
            Err(e) => log_notification_failure("invite_link", &member.telegram_id, &e.to_string()),
        }

        if let Err(e) = self
            .notifier
            .send_text(
                &member.telegram_id,
                &body,
                Some(Controls::MemberMenu { show_payment: false }),
            )
            .await
        {
            log_notification_failure("approval", &member.telegram_id, &e.to_string());
        }

        Ok(updated)
    }

    /// Rejects the member's payment. Membership flags and expiry keep their
    /// previous values so a still-active member stays in the group until
    /// the expiry sweep catches up.
    pub async fn reject(&self, member_id: i64, reason: &str) -> Result<Member, WorkflowError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::EmptyReason);
        }

        let member = Member::find_by_id(&self.pool, member_id)
            .await?
            .ok_or(WorkflowError::MemberNotFound(member_id))?;

        let updated = Member::set_rejected(&self.pool, member.id)
            .await?
            .ok_or(WorkflowError::MemberNotFound(member_id))?;
        log_admin_action("reject", "workflow", Some(&format!("member #{}", member.id)));

        let body = format!(
            "❌ To'lovingiz rad etildi.\n\nSabab: {}\n\nIltimos, to'lovni qayta amalga oshirib, chekni rasm shaklida yuboring.",
            reason
        );
        if let Err(e) = self
            .notifier
            .send_text(
                &member.telegram_id,
                &body,
                Some(Controls::MemberMenu { show_payment: true }),
            )
            .await
        {
            log_notification_failure("rejection", &member.telegram_id, &e.to_string());
        }

        Ok(updated)
    }

    /// Deactivates the member and removes them from the group. Their record
    /// and payment history stay behind.
    pub async fn remove(
        &self,
        member_id: i64,
        reason: Option<&str>,
    ) -> Result<Member, WorkflowError> {
        let member = Member::find_by_id(&self.pool, member_id)
            .await?
            .ok_or(WorkflowError::MemberNotFound(member_id))?;

        let updated = Member::set_inactive(&self.pool, member.id)
            .await?
            .ok_or(WorkflowError::MemberNotFound(member_id))?;
        log_admin_action("remove", "workflow", Some(&format!("member #{}", member.id)));

        if let Err(e) = self.notifier.remove_from_group(&member.telegram_id).await {
            log_notification_failure("group_remove", &member.telegram_id, &e.to_string());
        }

        let mut body = "Siz guruhdan chiqarildingiz.".to_string();
        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            body.push_str("\nSabab: ");
            body.push_str(reason);
        }
        if let Err(e) = self.notifier.send_text(&member.telegram_id, &body, None).await {
            log_notification_failure("removal", &member.telegram_id, &e.to_string());
        }

        Ok(updated)
    }

    /// Marks the membership expired, removes the member from the group and
    /// invites them to pay again.
    pub async fn expire(&self, member_id: i64) -> Result<Member, WorkflowError> {
        let member = Member::find_by_id(&self.pool, member_id)
            .await?
            .ok_or(WorkflowError::MemberNotFound(member_id))?;

        let updated = Member::set_expired(&self.pool, member.id)
            .await?
            .ok_or(WorkflowError::MemberNotFound(member_id))?;
        log_admin_action("expire", "scheduler", Some(&format!("member #{}", member.id)));

        if let Err(e) = self.notifier.remove_from_group(&member.telegram_id).await {
            log_notification_failure("group_remove", &member.telegram_id, &e.to_string());
        }

        let body = "⌛️ A'zolik muddatingiz tugadi va siz guruhdan chiqarildingiz.\n\nGuruhga qaytish uchun to'lovni qayta amalga oshiring.";
        if let Err(e) = self
            .notifier
            .send_text(
                &member.telegram_id,
                body,
                Some(Controls::PaymentButton),
            )
            .await
        {
            log_notification_failure("expiry", &member.telegram_id, &e.to_string());
        }

        Ok(updated)
    }
}
