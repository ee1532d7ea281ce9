//! Concurrent access and eviction tests for LocalRepository.

mod support;

use std::sync::Arc;
use std::time::Duration;

use attention_rust::db::{AttentionRepository, IdleTimeout, LocalRepository};
use attention_rust::models::{CalibrationRecord, UserId};
use attention_rust::services::detect_attention;
use attention_rust::vision::FixedLandmarkProvider;

use support::{at, attentive_face, frame};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts_create_one_record_per_user() {
    let repo = LocalRepository::new();
    let mut handles = Vec::new();
    for i in 0..64 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            let user = UserId::new(format!("user-{}", i % 8));
            repo.record_or_insert(&user, at(0));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(repo.users_tracked(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_detections_keep_per_user_windows_consistent() {
    let repo = LocalRepository::new();
    let provider = Arc::new(FixedLandmarkProvider::new(attentive_face()));
    let frame = Arc::new(frame(128));

    let mut tasks = Vec::new();
    for i in 0..40 {
        let repo = repo.clone();
        let provider = Arc::clone(&provider);
        let frame = Arc::clone(&frame);
        tasks.push(tokio::spawn(async move {
            let user = UserId::new(format!("user-{}", i % 4));
            detect_attention(&repo, provider.as_ref(), &user, &frame, at(i))
                .await
                .unwrap()
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(repo.users_tracked(), 4);
    for id in repo.user_ids() {
        let handle = repo.record(&id).unwrap();
        let record = handle.lock();
        // ten frames per user, exactly filling the measurement window
        assert_eq!(record.classifier.measurements().len(), 10);
        assert_eq!(record.classifier.classifications().len(), 10);
        assert!(repo.calibration(&id).is_some());
    }
}

#[test]
fn test_concurrent_calibrations_store_exactly_one() {
    let repo = LocalRepository::new();
    let user = UserId::new("u1");
    let stored: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = &repo;
                let user = &user;
                scope.spawn(move || {
                    repo.insert_calibration_if_absent(
                        user,
                        CalibrationRecord {
                            brightness_baseline: f64::from(i),
                            contrast_baseline: 1.0,
                            captured_at: at(i64::from(i)),
                        },
                    )
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum()
    });
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn test_idle_users_evicted_after_ttl() {
    let repo = LocalRepository::with_eviction(IdleTimeout::new(Duration::from_secs(30)));
    let provider = FixedLandmarkProvider::new(attentive_face());
    let frame = frame(128);

    let idle = UserId::new("idle");
    let busy = UserId::new("busy");
    detect_attention(&repo, &provider, &idle, &frame, at(0)).await.unwrap();
    detect_attention(&repo, &provider, &busy, &frame, at(0)).await.unwrap();
    detect_attention(&repo, &provider, &busy, &frame, at(25_000)).await.unwrap();

    assert_eq!(repo.evict_idle(at(40_000)), 1);
    assert!(repo.record(&idle).is_none());
    assert!(repo.record(&busy).is_some());
    // calibration survives eviction
    assert!(repo.calibration(&idle).is_some());
}

#[tokio::test]
async fn test_evicted_user_starts_fresh() {
    let repo = LocalRepository::with_eviction(IdleTimeout::new(Duration::from_secs(1)));
    let provider = FixedLandmarkProvider::new(attentive_face());
    let frame = frame(128);
    let user = UserId::new("u1");

    detect_attention(&repo, &provider, &user, &frame, at(0)).await.unwrap();
    repo.evict_idle(at(10_000));

    let report = detect_attention(&repo, &provider, &user, &frame, at(10_000))
        .await
        .unwrap();
    assert_eq!(report.attention.state_since, at(10_000));
    let handle = repo.record(&user).unwrap();
    assert_eq!(handle.lock().classifier.measurements().len(), 1);
}
