// File: warden-core/tests/repository_tests.rs
//
// These run against a real Postgres: `cargo test -- --ignored` with
// TEST_DATABASE_URL pointing at a disposable database.

use chrono::{Duration, Utc};
use warden_common::models::{ClassificationResult, Category, GroupInfo, HistoryRecord, Rating, SuspiciousMessage};
use warden_common::traits::repository_traits::{
    GroupContextRepository, HistoryRepository, SuspiciousMessageRepository, UserRepository,
};
use warden_core::repositories::{
    PostgresGroupRepository, PostgresHistoryRepository, PostgresSuspiciousMessageRepository,
    PostgresUserRepository,
};
use warden_core::test_utils::helpers::*;
use warden_core::Error;

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_history_repository_window_and_prune() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = PostgresHistoryRepository::new(db.pool().clone());
    let now = Utc::now();

    for i in 0..12 {
        let msg = group_message(1, -10, &format!("m{i}"), now - Duration::seconds(120 - i * 5));
        let stored = repo.append(&HistoryRecord::from_message(&msg)).await?;
        assert!(stored.record_id > 0);
    }
    let stale = group_message(1, -10, "stale", now - Duration::minutes(30));
    repo.append(&HistoryRecord::from_message(&stale)).await?;

    let window = repo.recent_window(1, -10, 10, Duration::minutes(5), now).await?;
    assert_eq!(window.len(), 10);
    assert_eq!(window[0].text, "m2");
    assert_eq!(window[9].text, "m11");

    let removed = repo.prune(1, -10, 5).await?;
    assert_eq!(removed, 8);
    let window = repo.recent_window(1, -10, 10, Duration::minutes(5), now).await?;
    assert_eq!(window.len(), 5);

    let other = group_message(2, -10, "other", now);
    repo.append(&HistoryRecord::from_message(&other)).await?;
    repo.append(&HistoryRecord::from_message(&other)).await?;
    assert_eq!(repo.prune_all(1).await?, 5);

    Ok(())
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_history_repository_huge_age_reads_whole_window() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = PostgresHistoryRepository::new(db.pool().clone());
    let now = Utc::now();

    let old = group_message(3, -11, "last year", now - Duration::days(365));
    repo.append(&HistoryRecord::from_message(&old)).await?;
    repo.append(&HistoryRecord::from_message(&group_message(3, -11, "now", now))).await?;

    let window = repo.recent_window(3, -11, 10, Duration::MAX, now).await?;
    assert_eq!(window.len(), 2);
    assert_eq!(window[0].text, "last year");

    Ok(())
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_group_repository_upsert() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = PostgresGroupRepository::new(db.pool().clone());

    assert!(repo.get_group(-55).await?.is_none());

    let mut info = GroupInfo::new(-55, "Gophers", "Go only.", Some(9));
    repo.upsert_group(&info).await?;
    info.rules_text = "Go only. No ads.".to_string();
    repo.upsert_group(&info).await?;

    let stored = repo.get_group(-55).await?.expect("group should exist");
    assert_eq!(stored.rules_text, "Go only. No ads.");

    let ctx = repo.get_context(-55, "Unknown Group", "none").await?.expect("context");
    assert_eq!(ctx.title, "Gophers");

    Ok(())
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_user_repository_upsert_refreshes_name() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = PostgresUserRepository::new(db.pool().clone());

    let created = repo.upsert_user(77, "Ali").await?;
    assert_eq!(created.first_name, "Ali");
    let updated = repo.upsert_user(77, "Alireza").await?;
    assert_eq!(updated.first_name, "Alireza");
    assert_eq!(updated.created_at, created.created_at);

    let fetched = repo.get_user(77).await?.expect("user should exist");
    assert_eq!(fetched.first_name, "Alireza");

    Ok(())
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_suspicious_message_log() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = PostgresSuspiciousMessageRepository::new(db.pool().clone());

    let msg = group_message(5, -20, "buy followers", Utc::now());
    let classification = ClassificationResult {
        category: Category::Advertisement,
        confidence: Rating::High,
        severity: Rating::Medium,
        evidence: Some("buy followers".to_string()),
        reasoning: None,
        repetition: Default::default(),
    };
    repo.record(&SuspiciousMessage::new(&msg, &classification)).await?;

    let listed = repo.list_for_user(5, 10).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].category, "ADVERTISEMENT");
    assert!(repo.list_for_user(6, 10).await?.is_empty());

    Ok(())
}
