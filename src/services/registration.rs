use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::database::models::{Admin, Member, PaymentStatus, TemplateKey, TextTemplate};
use crate::services::notifier::{Controls, Notifier};
use crate::services::session::{Session, SessionState, SessionStore};
use crate::utils::datetime::{days_until, format_date};
use crate::utils::logging::{log_member_event, log_notification_failure, log_validation_error};
use crate::utils::validation::{validate_full_name, validate_phone_number};

/// Days before expiry at which the payment button reappears.
pub const PAYMENT_DUE_WINDOW_DAYS: i64 = 3;

/// Whether a member should be offered the payment button right now.
pub fn needs_payment(member: &Member, now: DateTime<Utc>) -> bool {
    match member.status() {
        PaymentStatus::Expired | PaymentStatus::Rejected => true,
        _ => match member.expiry_datetime() {
            Some(expiry) => days_until(expiry, now) <= PAYMENT_DUE_WINDOW_DAYS,
            None => true,
        },
    }
}

/// Outcome of offering an incoming photo to the registration flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofGate {
    /// Sender has no member record yet.
    NotRegistered,
    /// Sender is registered but no payment proof is expected from them.
    NotExpected,
    /// Photo should be stored and forwarded for review.
    Accepted,
}

/// Drives the member-facing conversation: registration, menu replies and
/// payment proof intake. Holds no Telegram types so it can run against a
/// recording notifier in tests.
pub struct RegistrationFlow {
    pool: sqlx::SqlitePool,
    sessions: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
}

impl RegistrationFlow {
    pub fn new(
        pool: sqlx::SqlitePool,
        sessions: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            pool,
            sessions,
            notifier,
        }
    }

    async fn member_controls(&self, member: &Member) -> Controls {
        Controls::MemberMenu {
            show_payment: needs_payment(member, Utc::now()),
        }
    }

    /// `/start` for a non-admin chat. Members with a live record get their
    /// status and menu back; rejected and expired members restart the
    /// registration conversation, as do newcomers.
    pub async fn start(&self, telegram_id: &str) -> Result<()> {
        match Member::find_by_telegram_id(&self.pool, telegram_id).await? {
            Some(member) => match member.status() {
                PaymentStatus::Pending | PaymentStatus::Approved => {
                    log_member_event("start", telegram_id, Some("already registered"));
                    self.show_status(telegram_id).await
                }
                PaymentStatus::Rejected | PaymentStatus::Expired => {
                    log_member_event("start", telegram_id, Some("re-registration"));
                    self.begin_registration(telegram_id).await
                }
            },
            None => {
                log_member_event("start", telegram_id, Some("new registration"));
                self.begin_registration(telegram_id).await
            }
        }
    }

    async fn begin_registration(&self, telegram_id: &str) -> Result<()> {
        let greeting = TextTemplate::resolve(&self.pool, TemplateKey::Start).await?;
        self.notifier.send_text(telegram_id, &greeting, None).await?;
        self.sessions.set(telegram_id, Session::waiting_name()).await;
        Ok(())
    }

    /// Free-form text that did not match any menu button. Advances the
    /// registration conversation; outside of it the text is ignored.
    pub async fn handle_text(&self, telegram_id: &str, text: &str) -> Result<()> {
        let session = self.sessions.get(telegram_id).await.unwrap_or_default();

        match session.state {
            SessionState::WaitingName => self.receive_name(telegram_id, text).await,
            SessionState::WaitingPhone => {
                let full_name = match session.full_name {
                    Some(name) => name,
                    None => {
                        // Session lost its name somehow, restart the step.
                        self.sessions.set(telegram_id, Session::waiting_name()).await;
                        self.notifier
                            .send_text(
                                telegram_id,
                                "Iltimos, ism va familiyangizni qaytadan kiriting.",
                                None,
                            )
                            .await?;
                        return Ok(());
                    }
                };
                self.receive_phone(telegram_id, &full_name, text).await
            }
            SessionState::WaitingPayment => Ok(()),
            SessionState::Idle => {
                // Registered members chatting outside the conversation are
                // left alone; strangers get the registration greeting.
                if Member::find_by_telegram_id(&self.pool, telegram_id)
                    .await?
                    .is_none()
                {
                    self.start(telegram_id).await
                } else {
                    Ok(())
                }
            }
        }
    }

    async fn receive_name(&self, telegram_id: &str, text: &str) -> Result<()> {
        match validate_full_name(text) {
            Ok(full_name) => {
                self.sessions
                    .set(telegram_id, Session::waiting_phone(full_name))
                    .await;
                self.notifier
                    .send_text(
                        telegram_id,
                        "Rahmat! Endi telefon raqamingizni kiriting (masalan: +998901234567).",
                        None,
                    )
                    .await?;
            }
            Err(e) => {
                log_validation_error("full_name", text, &e.to_string(), telegram_id);
                self.notifier
                    .send_text(
                        telegram_id,
                        "Ism noto'g'ri kiritildi. Iltimos, ism va familiyangizni to'liq kiriting.",
                        None,
                    )
                    .await?;
            }
        }
        Ok(())
    }

    async fn receive_phone(&self, telegram_id: &str, full_name: &str, text: &str) -> Result<()> {
        let phone = match validate_phone_number(text) {
            Ok(phone) => phone,
            Err(e) => {
                log_validation_error("phone_number", text, &e.to_string(), telegram_id);
                self.notifier
                    .send_text(
                        telegram_id,
                        "Telefon raqami noto'g'ri. Iltimos, raqamni +998901234567 ko'rinishida kiriting.",
                        None,
                    )
                    .await?;
                return Ok(());
            }
        };

        let member = Member::create(&self.pool, telegram_id, full_name, &phone).await?;
        log_member_event(
            "registered",
            telegram_id,
            Some(&format!("member #{}", member.id)),
        );

        let instructions = TextTemplate::resolve(&self.pool, TemplateKey::BeforePayment).await?;
        self.notifier
            .send_text(telegram_id, &instructions, None)
            .await?;
        self.sessions
            .set(telegram_id, Session::waiting_payment())
            .await;
        Ok(())
    }

    /// Member pressed the payment button: re-send the payment instructions
    /// and start expecting a proof photo. Members whose membership still has
    /// more than three days to run are turned away.
    pub async fn begin_payment(&self, telegram_id: &str) -> Result<()> {
        let member = match Member::find_by_telegram_id(&self.pool, telegram_id).await? {
            Some(member) => member,
            None => return self.prompt_registration(telegram_id).await,
        };

        if !needs_payment(&member, Utc::now()) {
            let body = match member.expiry_datetime() {
                Some(expiry) => format!(
                    "A'zoligingiz {} gacha amal qiladi. To'lov muddati yaqinlashganda qayta to'lash mumkin bo'ladi.",
                    format_date(&expiry)
                ),
                None => "Hozircha to'lov talab qilinmaydi.".to_string(),
            };
            self.notifier
                .send_text(
                    telegram_id,
                    &body,
                    Some(Controls::MemberMenu { show_payment: false }),
                )
                .await?;
            return Ok(());
        }

        let instructions = TextTemplate::resolve(&self.pool, TemplateKey::BeforePayment).await?;
        self.notifier
            .send_text(telegram_id, &instructions, None)
            .await?;
        self.sessions
            .set(telegram_id, Session::waiting_payment())
            .await;
        Ok(())
    }

    pub async fn show_status(&self, telegram_id: &str) -> Result<()> {
        let member = match Member::find_by_telegram_id(&self.pool, telegram_id).await? {
            Some(member) => member,
            None => return self.prompt_registration(telegram_id).await,
        };

        let status = member.status();

        // Registered but never submitted a proof: nothing to report yet,
        // repeat the payment instructions instead.
        if status == PaymentStatus::Pending && member.payment_proof.is_none() {
            let instructions =
                TextTemplate::resolve(&self.pool, TemplateKey::BeforePayment).await?;
            let body = format!("Siz hali to'lov qilmagansiz.\n\n{}", instructions);
            let controls = self.member_controls(&member).await;
            self.notifier
                .send_text(telegram_id, &body, Some(controls))
                .await?;
            return Ok(());
        }

        let mut body = format!("To'lov holati: {}", status.display_name());
        if let Some(expiry) = member.expiry_datetime() {
            let days = days_until(expiry, Utc::now());
            body.push_str(&format!(
                "\nAmal qilish muddati: {}",
                format_date(&expiry)
            ));
            if days > 0 {
                body.push_str(&format!("\nQolgan kunlar: {}", days));
            }
        }
        if status == PaymentStatus::Rejected {
            body.push_str(
                "\n\nIltimos, to'lovni qayta amalga oshirib, chekni rasm shaklida yuboring.",
            );
        }

        let controls = self.member_controls(&member).await;
        self.notifier
            .send_text(telegram_id, &body, Some(controls))
            .await?;
        Ok(())
    }

    pub async fn show_about(&self, telegram_id: &str) -> Result<()> {
        self.send_template(telegram_id, TemplateKey::AboutBot).await
    }

    pub async fn show_contact(&self, telegram_id: &str) -> Result<()> {
        self.send_template(telegram_id, TemplateKey::Contact).await
    }

    async fn send_template(&self, telegram_id: &str, key: TemplateKey) -> Result<()> {
        let body = TextTemplate::resolve(&self.pool, key).await?;
        let controls = match Member::find_by_telegram_id(&self.pool, telegram_id).await? {
            Some(member) => Some(self.member_controls(&member).await),
            None => None,
        };
        self.notifier.send_text(telegram_id, &body, controls).await?;
        Ok(())
    }

    async fn prompt_registration(&self, telegram_id: &str) -> Result<()> {
        self.notifier
            .send_text(
                telegram_id,
                "Avval ro'yxatdan o'ting. Buning uchun /start buyrug'ini yuboring.",
                None,
            )
            .await?;
        Ok(())
    }

    /// Decides whether an incoming photo from this chat is a payment proof.
    /// Rejected members may resubmit without pressing the payment button.
    pub async fn proof_gate(&self, telegram_id: &str) -> Result<ProofGate> {
        let member = match Member::find_by_telegram_id(&self.pool, telegram_id).await? {
            Some(member) => member,
            None => return Ok(ProofGate::NotRegistered),
        };

        let session = self.sessions.get(telegram_id).await.unwrap_or_default();
        if session.state == SessionState::WaitingPayment
            || member.status() == PaymentStatus::Rejected
        {
            Ok(ProofGate::Accepted)
        } else {
            Ok(ProofGate::NotExpected)
        }
    }

    /// Records a stored proof photo and forwards it to every active admin
    /// for review. Admin delivery is best effort; a failed photo send falls
    /// back to a text notification.
    pub async fn handle_photo(&self, telegram_id: &str, stored_path: &str) -> Result<()> {
        let member = match Member::find_by_telegram_id(&self.pool, telegram_id).await? {
            Some(member) => member,
            None => return self.prompt_registration(telegram_id).await,
        };

        Member::set_payment_proof(&self.pool, member.id, stored_path).await?;
        self.sessions.clear(telegram_id).await;
        log_member_event(
            "payment_proof",
            telegram_id,
            Some(&format!("member #{}", member.id)),
        );

        self.notifier
            .send_text(
                telegram_id,
                "To'lov chekingiz qabul qilindi. Administrator tekshirgach sizga xabar beramiz.",
                Some(Controls::MemberMenu { show_payment: false }),
            )
            .await?;

        let caption = format!(
            "🆕 Yangi to'lov cheki\n\n👤 {}\n📞 {}\n🆔 {}",
            member.full_name, member.phone_number, member.telegram_id
        );
        let controls = Controls::ApproveReject {
            member_id: member.id,
        };

        for admin in Admin::list_all(&self.pool).await? {
            if !admin.is_active {
                continue;
            }
            if let Err(e) = self
                .notifier
                .send_photo(&admin.telegram_id, stored_path, &caption, Some(controls))
                .await
            {
                log_notification_failure("payment_proof_photo", &admin.telegram_id, &e.to_string());
                if let Err(e) = self
                    .notifier
                    .send_text(&admin.telegram_id, &caption, Some(controls))
                    .await
                {
                    log_notification_failure(
                        "payment_proof_text",
                        &admin.telegram_id,
                        &e.to_string(),
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn member_with(status: &str, expiry: Option<String>) -> Member {
        Member {
            id: 1,
            telegram_id: "100".to_string(),
            full_name: "Test".to_string(),
            phone_number: "+998901234567".to_string(),
            join_date: Utc::now().to_rfc3339(),
            payment_status: status.to_string(),
            payment_proof: None,
            payment_expiry_date: expiry,
            is_active: true,
        }
    }

    #[test]
    fn test_needs_payment_for_expired_and_rejected() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let far = (now + Duration::days(20)).to_rfc3339();

        assert!(needs_payment(&member_with("expired", Some(far.clone())), now));
        assert!(needs_payment(&member_with("rejected", Some(far)), now));
    }

    #[test]
    fn test_needs_payment_without_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        assert!(needs_payment(&member_with("pending", None), now));
    }

    #[test]
    fn test_needs_payment_window() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();

        let inside = (now + Duration::days(3)).to_rfc3339();
        assert!(needs_payment(&member_with("approved", Some(inside)), now));

        let outside = (now + Duration::days(3) + Duration::seconds(1)).to_rfc3339();
        assert!(!needs_payment(&member_with("approved", Some(outside)), now));
    }
}
