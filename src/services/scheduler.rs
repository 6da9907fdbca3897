use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::database::connection::DatabaseManager;
use crate::database::models::{Member, PaymentStatus};
use crate::services::notifier::{Controls, Notifier};
use crate::services::workflow::ApprovalWorkflow;
use crate::utils::datetime::format_date;
use crate::utils::logging::{log_notification_failure, log_sweep_result, log_system_event};

/// Runs the reminder and expiry sweeps on a fixed UTC schedule.
///
/// Reminders go out three times a day so members in any timezone get one
/// at a reasonable hour. A per-minute safety sweep re-runs both checks in
/// case the process was down at the scheduled time. Sweeps are idempotent
/// over state transitions, so repeated runs only repeat notifications.
pub struct SchedulerService {
    db: Arc<DatabaseManager>,
    notifier: Arc<dyn Notifier>,
    workflow: Arc<ApprovalWorkflow>,
    scheduler: JobScheduler,
}

impl SchedulerService {
    pub async fn new(
        db: Arc<DatabaseManager>,
        notifier: Arc<dyn Notifier>,
        workflow: Arc<ApprovalWorkflow>,
    ) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            db,
            notifier,
            workflow,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<()> {
        self.add_reminder_job("0 0 9,15,21 * * *").await?;
        self.add_expiry_job("0 59 23 * * *").await?;
        self.add_safety_job("0 * * * * *").await?;

        self.scheduler.start().await?;
        log_system_event(
            "scheduler_started",
            Some("reminders at 09/15/21 UTC, expiry at 23:59 UTC"),
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    async fn add_reminder_job(&mut self, cron: &str) -> Result<()> {
        let db = self.db.clone();
        let notifier = self.notifier.clone();

        let job = Job::new_async(cron, move |_uuid, _l| {
            let db = db.clone();
            let notifier = notifier.clone();
            Box::pin(async move {
                if let Err(e) = run_reminder_sweep(&db.pool, notifier.as_ref(), Utc::now()).await {
                    tracing::error!("Reminder sweep failed: {}", e);
                }
            })
        })?;

        self.scheduler.add(job).await?;
        Ok(())
    }

    async fn add_expiry_job(&mut self, cron: &str) -> Result<()> {
        let db = self.db.clone();
        let workflow = self.workflow.clone();

        let job = Job::new_async(cron, move |_uuid, _l| {
            let db = db.clone();
            let workflow = workflow.clone();
            Box::pin(async move {
                if let Err(e) = run_expiry_sweep(&db.pool, &workflow, Utc::now()).await {
                    tracing::error!("Expiry sweep failed: {}", e);
                }
            })
        })?;

        self.scheduler.add(job).await?;
        Ok(())
    }

    async fn add_safety_job(&mut self, cron: &str) -> Result<()> {
        let db = self.db.clone();
        let notifier = self.notifier.clone();
        let workflow = self.workflow.clone();

        let job = Job::new_async(cron, move |_uuid, _l| {
            let db = db.clone();
            let notifier = notifier.clone();
            let workflow = workflow.clone();
            Box::pin(async move {
                let now = Utc::now();
                if let Err(e) = run_expiry_sweep(&db.pool, &workflow, now).await {
                    tracing::error!("Safety expiry sweep failed: {}", e);
                }
                if let Err(e) = run_reminder_sweep(&db.pool, notifier.as_ref(), now).await {
                    tracing::error!("Safety reminder sweep failed: {}", e);
                }
            })
        })?;

        self.scheduler.add(job).await?;
        Ok(())
    }
}

fn reminder_message(days_left: i64, expiry: &DateTime<Utc>) -> String {
    let date = format_date(expiry);
    match days_left {
        0 => format!(
            "❗️ A'zolik muddatingiz bugun ({}) tugaydi!\n\nGuruhda qolish uchun to'lovni hoziroq amalga oshiring.",
            date
        ),
        1 => format!(
            "⚠️ A'zolik muddatingiz tugashiga 1 kun qoldi ({}).\n\nIltimos, to'lovni o'z vaqtida amalga oshiring.",
            date
        ),
        n => format!(
            "⏰ Eslatma: a'zolik muddatingiz tugashiga {} kun qoldi ({}).\n\nIltimos, to'lovni o'z vaqtida amalga oshiring.",
            n, date
        ),
    }
}

/// Sends graded payment reminders to approved members whose expiry date is
/// 3, 2, 1 or 0 calendar days away. Matching is by date, so each scheduled
/// run of a day produces the same reminder again.
pub async fn run_reminder_sweep(
    pool: &sqlx::SqlitePool,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Result<usize> {
    let today = now.date_naive();
    let candidates = Member::list_active_with_expiry(pool).await?;

    let mut matched = 0;
    let mut notified = 0;
    for member in candidates {
        if member.status() != PaymentStatus::Approved {
            continue;
        }
        let expiry = match member.expiry_datetime() {
            Some(expiry) => expiry,
            None => continue,
        };

        let days_left = (expiry.date_naive() - today).num_days();
        if !(0..=3).contains(&days_left) {
            continue;
        }
        matched += 1;

        let body = reminder_message(days_left, &expiry);
        match notifier
            .send_text(&member.telegram_id, &body, Some(Controls::PaymentButton))
            .await
        {
            Ok(()) => notified += 1,
            Err(e) => log_notification_failure("reminder", &member.telegram_id, &e.to_string()),
        }
    }

    log_sweep_result("reminder", matched, notified);
    Ok(notified)
}

/// Expires every active membership whose expiry timestamp has passed.
/// Comparison is on the full timestamp, not the calendar date.
pub async fn run_expiry_sweep(
    pool: &sqlx::SqlitePool,
    workflow: &ApprovalWorkflow,
    now: DateTime<Utc>,
) -> Result<usize> {
    let candidates = Member::list_active_with_expiry(pool).await?;

    let mut expired = 0;
    for member in candidates {
        let is_past = member
            .expiry_datetime()
            .map(|expiry| expiry <= now)
            .unwrap_or(false);
        if !is_past {
            continue;
        }

        match workflow.expire(member.id).await {
            Ok(_) => expired += 1,
            Err(e) => tracing::error!("Failed to expire member {}: {}", member.id, e),
        }
    }

    log_sweep_result("expiry", expired, expired);
    Ok(expired)
}
