mod common;

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use common::{setup_test_db, GroupAction, RecordingNotifier, SentMessage};
use membership_bot::database::models::{Member, PaymentStatus};
use membership_bot::services::notifier::Controls;
use membership_bot::services::workflow::{ApprovalWorkflow, WorkflowError};

fn build_workflow(pool: &sqlx::SqlitePool) -> (ApprovalWorkflow, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let workflow = ApprovalWorkflow::new(pool.clone(), notifier.clone());
    (workflow, notifier)
}

#[tokio::test]
async fn test_approve_grants_one_month() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let (workflow, notifier) = build_workflow(&db.pool);

    let member = Member::create(&db.pool, "100", "Ali Valiyev", "+998901234567").await?;
    Member::set_payment_proof(&db.pool, member.id, "./uploads/proof.jpg").await?;

    let now = Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap();
    let updated = workflow.approve(member.id, now).await?;

    assert_eq!(updated.status(), PaymentStatus::Approved);
    assert!(updated.is_active);
    assert_eq!(
        updated.expiry_datetime().unwrap(),
        Utc.with_ymd_and_hms(2025, 7, 15, 9, 0, 0).unwrap()
    );

    assert_eq!(
        notifier.group_actions(),
        vec![GroupAction::Reinstated("100".to_string())]
    );

    let texts = notifier.texts_to("100");
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Guruhga qo'shilish havolasi: https://t.me/+test-invite"));

    Ok(())
}

#[tokio::test]
async fn test_reapproval_resets_expiry() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let (workflow, _notifier) = build_workflow(&db.pool);

    let member = Member::create(&db.pool, "100", "Ali Valiyev", "+998901234567").await?;

    let first = Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap();
    workflow.approve(member.id, first).await?;

    // A renewal payment approved later starts a fresh month from that moment
    let second = Utc.with_ymd_and_hms(2025, 7, 10, 9, 0, 0).unwrap();
    let updated = workflow.approve(member.id, second).await?;

    assert_eq!(
        updated.expiry_datetime().unwrap(),
        Utc.with_ymd_and_hms(2025, 8, 10, 9, 0, 0).unwrap()
    );

    Ok(())
}

#[tokio::test]
async fn test_approve_unknown_member() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let (workflow, notifier) = build_workflow(&db.pool);

    let result = workflow.approve(999, Utc::now()).await;
    assert!(matches!(result, Err(WorkflowError::MemberNotFound(999))));
    assert!(notifier.messages().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_reject_keeps_membership_until_expiry() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let (workflow, notifier) = build_workflow(&db.pool);

    let member = Member::create(&db.pool, "100", "Ali Valiyev", "+998901234567").await?;
    let expiry = Utc::now() + Duration::days(20);
    Member::set_approved(&db.pool, member.id, expiry).await?;

    let updated = workflow.reject(member.id, "Chek o'qilmaydi").await?;

    // Status flips but the paid-for period is not cut short
    assert_eq!(updated.status(), PaymentStatus::Rejected);
    assert!(updated.is_active);
    assert!(updated.payment_expiry_date.is_some());
    assert!(notifier.group_actions().is_empty());

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    if let SentMessage::Text { body, controls, .. } = &messages[0] {
        assert!(body.contains("rad etildi"));
        assert!(body.contains("Sabab: Chek o'qilmaydi"));
        assert_eq!(*controls, Some(Controls::MemberMenu { show_payment: true }));
    } else {
        unreachable!("rejection is sent as text");
    }

    Ok(())
}

#[tokio::test]
async fn test_reject_requires_reason() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let (workflow, notifier) = build_workflow(&db.pool);

    let member = Member::create(&db.pool, "100", "Ali Valiyev", "+998901234567").await?;

    assert!(matches!(
        workflow.reject(member.id, "").await,
        Err(WorkflowError::EmptyReason)
    ));
    assert!(matches!(
        workflow.reject(member.id, "   ").await,
        Err(WorkflowError::EmptyReason)
    ));

    let stored = Member::find_by_id(&db.pool, member.id).await?.unwrap();
    assert_eq!(stored.status(), PaymentStatus::Pending);
    assert!(notifier.messages().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_remove_with_reason() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let (workflow, notifier) = build_workflow(&db.pool);

    let member = Member::create(&db.pool, "100", "Ali Valiyev", "+998901234567").await?;
    Member::set_approved(&db.pool, member.id, Utc::now() + Duration::days(20)).await?;

    let updated = workflow.remove(member.id, Some("Qoidabuzarlik")).await?;

    assert!(!updated.is_active);
    assert_eq!(updated.status(), PaymentStatus::Approved);
    assert_eq!(
        notifier.group_actions(),
        vec![GroupAction::Removed("100".to_string())]
    );

    let texts = notifier.texts_to("100");
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("guruhdan chiqarildingiz"));
    assert!(texts[0].contains("Sabab: Qoidabuzarlik"));

    Ok(())
}

#[tokio::test]
async fn test_remove_without_reason() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let (workflow, notifier) = build_workflow(&db.pool);

    let member = Member::create(&db.pool, "100", "Ali Valiyev", "+998901234567").await?;
    workflow.remove(member.id, None).await?;

    let texts = notifier.texts_to("100");
    assert_eq!(texts, vec!["Siz guruhdan chiqarildingiz.".to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_expire_deactivates_and_invites_repayment() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let (workflow, notifier) = build_workflow(&db.pool);

    let member = Member::create(&db.pool, "100", "Ali Valiyev", "+998901234567").await?;
    Member::set_approved(&db.pool, member.id, Utc::now() - Duration::hours(1)).await?;

    let updated = workflow.expire(member.id).await?;

    assert_eq!(updated.status(), PaymentStatus::Expired);
    assert!(!updated.is_active);
    assert_eq!(
        notifier.group_actions(),
        vec![GroupAction::Removed("100".to_string())]
    );

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    if let SentMessage::Text { body, controls, .. } = &messages[0] {
        assert!(body.contains("muddatingiz tugadi"));
        assert_eq!(*controls, Some(Controls::PaymentButton));
    } else {
        unreachable!("expiry notice is sent as text");
    }

    Ok(())
}
