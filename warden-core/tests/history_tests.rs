// File: warden-core/tests/history_tests.rs

use std::sync::Arc;

use chrono::{Duration, Utc};
use warden_common::models::HistoryRecord;
use warden_common::traits::repository_traits::HistoryRepository;
use warden_core::test_utils::helpers::group_message;
use warden_core::InMemoryHistoryStore;

const USER: i64 = 7;
const GROUP: i64 = -1001;

#[tokio::test]
async fn window_is_capped_at_ten_and_oldest_first() {
    let store = InMemoryHistoryStore::default();
    let now = Utc::now();

    // 15 messages, one every 10 seconds, all within the last 5 minutes
    for i in 0..15 {
        let at = now - Duration::seconds(150 - i * 10);
        let msg = group_message(USER, GROUP, &format!("message {i}"), at);
        store.append(&HistoryRecord::from_message(&msg)).await.unwrap();
    }

    let window = store
        .recent_window(USER, GROUP, 10, Duration::minutes(5), now)
        .await
        .unwrap();

    assert_eq!(window.len(), 10);
    assert_eq!(window.first().unwrap().text, "message 5");
    assert_eq!(window.last().unwrap().text, "message 14");
    assert!(window
        .windows(2)
        .all(|w| w[0].message_created_at <= w[1].message_created_at));
}

#[tokio::test]
async fn window_excludes_messages_older_than_five_minutes() {
    let store = InMemoryHistoryStore::default();
    let now = Utc::now();

    for (text, age) in [("old", 600), ("borderline", 301), ("recent", 120), ("fresh", 5)] {
        let msg = group_message(USER, GROUP, text, now - Duration::seconds(age));
        store.append(&HistoryRecord::from_message(&msg)).await.unwrap();
    }

    let window = store
        .recent_window(USER, GROUP, 10, Duration::minutes(5), now)
        .await
        .unwrap();
    let texts: Vec<_> = window.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["recent", "fresh"]);

    // stored records are still there; only the read is windowed
    assert_eq!(store.count(USER, GROUP), 4);
}

#[tokio::test]
async fn reads_are_idempotent_without_appends() {
    let store = InMemoryHistoryStore::default();
    let now = Utc::now();
    for i in 0..3 {
        let msg = group_message(USER, GROUP, &format!("hi {i}"), now - Duration::seconds(30 - i));
        store.append(&HistoryRecord::from_message(&msg)).await.unwrap();
    }

    let first = store.recent_window(USER, GROUP, 10, Duration::minutes(5), now).await.unwrap();
    let second = store.recent_window(USER, GROUP, 10, Duration::minutes(5), now).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn windows_are_isolated_per_user_and_group() {
    let store = InMemoryHistoryStore::default();
    let now = Utc::now();

    store.append(&HistoryRecord::from_message(&group_message(USER, GROUP, "mine", now))).await.unwrap();
    store.append(&HistoryRecord::from_message(&group_message(USER + 1, GROUP, "neighbour", now))).await.unwrap();
    store.append(&HistoryRecord::from_message(&group_message(USER, GROUP - 1, "elsewhere", now))).await.unwrap();

    let window = store.recent_window(USER, GROUP, 10, Duration::minutes(5), now).await.unwrap();
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].text, "mine");
}

#[tokio::test]
async fn prune_keeps_the_most_recent_records() {
    let store = InMemoryHistoryStore::default();
    let now = Utc::now();
    for i in 0..60 {
        let msg = group_message(USER, GROUP, &format!("m{i}"), now - Duration::seconds(60 - i));
        store.append(&HistoryRecord::from_message(&msg)).await.unwrap();
    }

    let removed = store.prune(USER, GROUP, 50).await.unwrap();
    assert_eq!(removed, 10);
    assert_eq!(store.count(USER, GROUP), 50);

    let window = store.recent_window(USER, GROUP, 10, Duration::minutes(5), now).await.unwrap();
    assert_eq!(window.last().unwrap().text, "m59");

    // nothing left to remove
    assert_eq!(store.prune(USER, GROUP, 50).await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_for_one_pair_are_all_kept() {
    let store = Arc::new(InMemoryHistoryStore::default());
    let now = Utc::now();

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let msg = group_message(USER, GROUP, &format!("burst {i}"), now);
            store.append(&HistoryRecord::from_message(&msg)).await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    assert_eq!(store.count(USER, GROUP), 20);
    let window = store.recent_window(USER, GROUP, 50, Duration::minutes(5), now).await.unwrap();
    assert!(window.windows(2).all(|w| w[0].record_id < w[1].record_id));
}
