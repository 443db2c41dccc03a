//! Check-in orchestration integration tests
//!
//! Drives `CheckinService` end to end with a scripted scorer:
//! - Anomaly flagging against a tight baseline
//! - Bounded baseline window
//! - Scope isolation
//! - SQLite persistence across reopen

mod common;

use std::sync::Arc;

use common::{handle, raw, reject_inserts, ScriptedScorer};
use tempfile::TempDir;
use wellshift::{CheckinError, CheckinService, CheckinStore, SupportMessage, TimelineOrder};

fn service(scorer: ScriptedScorer) -> CheckinService {
    CheckinService::new(handle(scorer), CheckinStore::open_in_memory().unwrap())
}

#[tokio::test]
async fn test_low_outlier_after_tight_baseline_is_flagged() {
    let service = service(ScriptedScorer::new(vec![
        raw("positive", 0.8),
        raw("positive", 0.75),
        raw("positive", 0.82),
        raw("positive", 0.79),
        raw("negative", 0.95),
    ]));

    let texts = [
        "Great run this morning",
        "Productive day at work",
        "Dinner with friends",
        "Slept well, feeling good",
        "Everything feels hopeless today",
    ];

    let mut outcomes = Vec::new();
    for text in texts {
        outcomes.push(service.submit(None, text).await.unwrap());
    }

    for outcome in &outcomes[..4] {
        assert!(!outcome.entry.anomaly_flag);
        assert_eq!(outcome.message, SupportMessage::Positive);
    }

    let last = &outcomes[4];
    assert!((last.entry.sentiment_score - 0.05).abs() < 1e-9);
    assert!(last.entry.anomaly_flag);
    assert_eq!(last.message, SupportMessage::SignificantChange);
    assert_eq!(last.verdict.baseline_size, 4);
    assert!((last.verdict.lower_bound.unwrap() - 0.7425).abs() < 1e-9);

    let timeline = service.timeline(None, TimelineOrder::Asc, None).await.unwrap();
    assert_eq!(timeline.len(), 5);
    assert_eq!(timeline[4].user_text, "Everything feels hopeless today");
    assert!(timeline[4].anomaly_flag);
}

#[tokio::test]
async fn test_anomaly_overrides_positive_bucket() {
    // Flat baseline at 0.95: 0.9 is still "positive" but below the fence
    let service = service(ScriptedScorer::positive(&[0.95, 0.95, 0.95, 0.95, 0.9]));

    let mut last = None;
    for i in 0..5 {
        last = Some(service.submit(None, &format!("entry {i}")).await.unwrap());
    }

    let last = last.unwrap();
    assert!(last.entry.anomaly_flag);
    assert_eq!(last.message, SupportMessage::SignificantChange);
}

#[tokio::test]
async fn test_low_score_without_baseline_gets_low_mood_message() {
    let service = service(ScriptedScorer::new(vec![raw("negative", 0.9)]));

    let outcome = service.submit(None, "Rough start").await.unwrap();
    assert!(!outcome.entry.anomaly_flag);
    assert_eq!(outcome.message, SupportMessage::LowMood);
    assert_eq!(outcome.verdict.lower_bound, None);
}

#[tokio::test]
async fn test_baseline_window_limits_history() {
    // Old, spread-out entries followed by a tight recent run at 0.8
    let script = [0.1, 0.9, 0.1, 0.9, 0.8, 0.8, 0.8, 0.8, 0.7];

    let narrow = service(ScriptedScorer::positive(&script)).with_baseline_window(4);
    let wide = service(ScriptedScorer::positive(&script));

    let mut narrow_last = None;
    let mut wide_last = None;
    for i in 0..script.len() {
        narrow_last = Some(narrow.submit(None, &format!("n{i}")).await.unwrap());
        wide_last = Some(wide.submit(None, &format!("w{i}")).await.unwrap());
    }

    // Recent window is all 0.8, so 0.7 falls below the fence
    assert!(narrow_last.unwrap().entry.anomaly_flag);
    // Full history (lower bound 0.325) absorbs the dip
    assert!(!wide_last.unwrap().entry.anomaly_flag);
}

#[tokio::test]
async fn test_scopes_keep_separate_baselines() {
    let service = service(ScriptedScorer::positive(&[0.9, 0.9, 0.9, 0.9, 0.1]));

    for i in 0..4 {
        service.submit(Some("alice"), &format!("alice {i}")).await.unwrap();
    }
    let bob = service.submit(Some("bob"), "first entry for bob").await.unwrap();

    assert!(!bob.entry.anomaly_flag);
    assert_eq!(bob.entry.scope, "bob");
    assert_eq!(bob.message, SupportMessage::LowMood);

    let alice = service.timeline(Some("alice"), TimelineOrder::Asc, None).await.unwrap();
    assert_eq!(alice.len(), 4);
    let bob = service.timeline(Some("bob"), TimelineOrder::Asc, None).await.unwrap();
    assert_eq!(bob.len(), 1);
    assert!(service.timeline(None, TimelineOrder::Asc, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_scorer_failure_still_records_entry() {
    // Script runs dry after one output; the second call fails
    let service = service(ScriptedScorer::positive(&[0.9]));

    service.submit(None, "first").await.unwrap();
    let second = service.submit(None, "second").await.unwrap();

    assert_eq!(second.entry.sentiment_score, 0.5);
    assert_eq!(second.entry.intensity, 0.0);
    assert_eq!(second.message, SupportMessage::Steady);
    assert_eq!(service.timeline(None, TimelineOrder::Asc, None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("checkins.db");

    {
        let store = CheckinStore::open(&db_path).unwrap();
        let service = CheckinService::new(
            handle(ScriptedScorer::positive(&[0.8, 0.75, 0.82, 0.79])),
            store,
        );
        for i in 0..4 {
            service.submit(None, &format!("day {i}")).await.unwrap();
        }
    }

    let store = CheckinStore::open(&db_path).unwrap();
    let service = CheckinService::new(
        handle(ScriptedScorer::new(vec![raw("negative", 0.95)])),
        store,
    );

    let outcome = service.submit(None, "day 4").await.unwrap();
    assert!(outcome.entry.anomaly_flag);

    let newest_first = service.timeline(None, TimelineOrder::Desc, Some(2)).await.unwrap();
    let texts: Vec<_> = newest_first.iter().map(|e| e.user_text.as_str()).collect();
    assert_eq!(texts, ["day 4", "day 3"]);
}

#[tokio::test]
async fn test_failed_append_commits_nothing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("checkins.db");

    let service = CheckinService::new(
        handle(ScriptedScorer::positive(&[0.8, 0.9])),
        CheckinStore::open(&db_path).unwrap(),
    );
    service.submit(None, "before the disk filled").await.unwrap();

    reject_inserts(&db_path);

    let err = service.submit(None, "after the disk filled").await.unwrap_err();
    assert!(matches!(err, CheckinError::Database(_)));

    let timeline = service.timeline(None, TimelineOrder::Asc, None).await.unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].user_text, "before the disk filled");
}

#[tokio::test]
async fn test_concurrent_checkins_are_all_recorded() {
    let scores = vec![0.7; 16];
    let service = Arc::new(service(ScriptedScorer::positive(&scores)));

    let mut tasks = Vec::new();
    for i in 0..16 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move {
            service.submit(None, &format!("concurrent {i}")).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let timeline = service.timeline(None, TimelineOrder::Asc, None).await.unwrap();
    assert_eq!(timeline.len(), 16);
    assert!(timeline.iter().all(|e| !e.anomaly_flag));
}
