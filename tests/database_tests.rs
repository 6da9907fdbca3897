mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use common::setup_test_db;
use membership_bot::database::models::{Admin, Member, PaymentStatus, TemplateKey, TextTemplate};

#[tokio::test]
async fn test_member_creation_and_retrieval() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let member = Member::create(&db.pool, "100200300", "Ali Valiyev", "+998901234567").await?;
    assert_eq!(member.telegram_id, "100200300");
    assert_eq!(member.full_name, "Ali Valiyev");
    assert_eq!(member.phone_number, "+998901234567");
    assert_eq!(member.status(), PaymentStatus::Pending);
    assert!(!member.is_active);
    assert!(member.payment_proof.is_none());
    assert!(member.payment_expiry_date.is_none());

    let found = Member::find_by_telegram_id(&db.pool, "100200300").await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().id, member.id);

    let by_id = Member::find_by_id(&db.pool, member.id).await?;
    assert_eq!(by_id.unwrap().telegram_id, "100200300");

    Ok(())
}

#[tokio::test]
async fn test_member_not_found() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    assert!(Member::find_by_telegram_id(&db.pool, "999").await?.is_none());
    assert!(Member::find_by_id(&db.pool, 999).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_member_telegram_id_is_unique() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    Member::create(&db.pool, "100", "First", "+998901234567").await?;
    let duplicate = Member::create(&db.pool, "100", "Second", "+998907654321").await;
    assert!(duplicate.is_err());

    Ok(())
}

#[tokio::test]
async fn test_payment_lifecycle() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let member = Member::create(&db.pool, "100", "Ali Valiyev", "+998901234567").await?;

    // Proof submitted
    let member = Member::set_payment_proof(&db.pool, member.id, "./uploads/proof.jpg")
        .await?
        .unwrap();
    assert_eq!(member.status(), PaymentStatus::Pending);
    assert_eq!(member.payment_proof.as_deref(), Some("./uploads/proof.jpg"));

    // Approved for a month
    let expiry = Utc::now() + Duration::days(30);
    let member = Member::set_approved(&db.pool, member.id, expiry)
        .await?
        .unwrap();
    assert_eq!(member.status(), PaymentStatus::Approved);
    assert!(member.is_active);
    assert_eq!(
        member.expiry_datetime().unwrap().timestamp(),
        expiry.timestamp()
    );

    // Rejection only flips the status, membership flags stay
    let member = Member::set_rejected(&db.pool, member.id).await?.unwrap();
    assert_eq!(member.status(), PaymentStatus::Rejected);
    assert!(member.is_active);
    assert!(member.payment_expiry_date.is_some());

    // Expiry deactivates
    let member = Member::set_expired(&db.pool, member.id).await?.unwrap();
    assert_eq!(member.status(), PaymentStatus::Expired);
    assert!(!member.is_active);

    Ok(())
}

#[tokio::test]
async fn test_set_inactive_keeps_status() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let member = Member::create(&db.pool, "100", "Ali Valiyev", "+998901234567").await?;
    Member::set_approved(&db.pool, member.id, Utc::now() + Duration::days(30)).await?;

    let member = Member::set_inactive(&db.pool, member.id).await?.unwrap();
    assert!(!member.is_active);
    assert_eq!(member.status(), PaymentStatus::Approved);

    Ok(())
}

#[tokio::test]
async fn test_list_by_status() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let pending = Member::create(&db.pool, "1", "Pending One", "+998901234567").await?;
    let approved = Member::create(&db.pool, "2", "Approved One", "+998901234568").await?;
    Member::set_approved(&db.pool, approved.id, Utc::now() + Duration::days(30)).await?;

    let pending_list = Member::list_by_status(&db.pool, PaymentStatus::Pending).await?;
    assert_eq!(pending_list.len(), 1);
    assert_eq!(pending_list[0].id, pending.id);

    let approved_list = Member::list_by_status(&db.pool, PaymentStatus::Approved).await?;
    assert_eq!(approved_list.len(), 1);
    assert_eq!(approved_list[0].id, approved.id);

    assert!(Member::list_by_status(&db.pool, PaymentStatus::Expired)
        .await?
        .is_empty());

    Ok(())
}

#[tokio::test]
async fn test_list_expiring_in_days_matches_calendar_date() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let now = Utc::now();

    let in_two = Member::create(&db.pool, "1", "Two Days", "+998901234567").await?;
    Member::set_approved(&db.pool, in_two.id, now + Duration::days(2)).await?;

    let in_five = Member::create(&db.pool, "2", "Five Days", "+998901234568").await?;
    Member::set_approved(&db.pool, in_five.id, now + Duration::days(5)).await?;

    // Holds an expiry date but is pending again after a resubmission
    let resubmitted = Member::create(&db.pool, "3", "Resubmitted", "+998901234569").await?;
    Member::set_approved(&db.pool, resubmitted.id, now + Duration::days(2)).await?;
    Member::set_payment_proof(&db.pool, resubmitted.id, "./uploads/new.jpg").await?;

    let expiring = Member::list_expiring_in_days(&db.pool, now.date_naive(), 2).await?;
    assert_eq!(expiring.len(), 1);
    assert_eq!(expiring[0].id, in_two.id);

    Ok(())
}

#[tokio::test]
async fn test_list_active_with_expiry_skips_inactive() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let now = Utc::now();

    let active = Member::create(&db.pool, "1", "Active", "+998901234567").await?;
    Member::set_approved(&db.pool, active.id, now + Duration::days(10)).await?;

    let removed = Member::create(&db.pool, "2", "Removed", "+998901234568").await?;
    Member::set_approved(&db.pool, removed.id, now + Duration::days(10)).await?;
    Member::set_inactive(&db.pool, removed.id).await?;

    // Registered but never approved, no expiry at all
    Member::create(&db.pool, "3", "Fresh", "+998901234569").await?;

    let candidates = Member::list_active_with_expiry(&db.pool).await?;
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, active.id);

    Ok(())
}

#[tokio::test]
async fn test_member_delete() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let member = Member::create(&db.pool, "100", "Ali Valiyev", "+998901234567").await?;

    assert!(Member::delete(&db.pool, member.id).await?);
    assert!(Member::find_by_id(&db.pool, member.id).await?.is_none());
    assert!(!Member::delete(&db.pool, member.id).await?);

    Ok(())
}

#[tokio::test]
async fn test_admin_ensure_default_is_idempotent() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let first = Admin::ensure_default(&db.pool, "555").await?;
    assert_eq!(first.telegram_id, "555");
    assert!(first.is_active);

    let second = Admin::ensure_default(&db.pool, "555").await?;
    assert_eq!(second.id, first.id);

    let all = Admin::list_all(&db.pool).await?;
    assert_eq!(all.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_template_resolve_falls_back_to_default() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    // Nothing stored yet
    let resolved = TextTemplate::resolve(&db.pool, TemplateKey::Start).await?;
    assert_eq!(resolved, TemplateKey::Start.default_value());

    let stored = TextTemplate::set(&db.pool, TemplateKey::Start, "Salom!").await?;
    assert_eq!(stored.key, "startMessage");
    assert_eq!(stored.value, "Salom!");

    let resolved = TextTemplate::resolve(&db.pool, TemplateKey::Start).await?;
    assert_eq!(resolved, "Salom!");

    Ok(())
}

#[tokio::test]
async fn test_template_seed_defaults_preserves_edits() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    TextTemplate::seed_defaults(&db.pool).await?;
    let templates = TextTemplate::list_all(&db.pool).await?;
    assert_eq!(templates.len(), TemplateKey::ALL.len());

    TextTemplate::set(&db.pool, TemplateKey::Contact, "Yangi aloqa matni").await?;
    TextTemplate::seed_defaults(&db.pool).await?;

    let resolved = TextTemplate::resolve(&db.pool, TemplateKey::Contact).await?;
    assert_eq!(resolved, "Yangi aloqa matni");
    assert_eq!(
        TextTemplate::list_all(&db.pool).await?.len(),
        TemplateKey::ALL.len()
    );

    Ok(())
}
