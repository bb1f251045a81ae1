use std::sync::Arc;
use std::time::{Duration, Instant};

use bot_detection_service::core::{ClientIdentity, TrafficConfig, TrafficTracker};

use crate::test_utils::random_ip;

fn tracker() -> TrafficTracker {
    TrafficTracker::new(TrafficConfig::default())
}

#[test]
fn test_ten_requests_are_fine_eleventh_is_excessive() {
    let tracker = tracker();
    let ip = ClientIdentity::new("1.2.3.4");
    let start = Instant::now();

    // 15 calls spread over 5 seconds
    let results: Vec<bool> = (0..15)
        .map(|i| tracker.record(&ip, start + Duration::from_millis(i * 333)))
        .collect();

    assert!(results[..10].iter().all(|excessive| !excessive));
    assert!(results[10..].iter().all(|excessive| *excessive));
}

#[test]
fn test_signal_resets_after_window_elapses() {
    let tracker = tracker();
    let ip = ClientIdentity::new("1.2.3.4");
    let start = Instant::now();

    for _ in 0..11 {
        tracker.record(&ip, start);
    }
    assert!(tracker.record(&ip, start + Duration::from_secs(1)));
    assert!(!tracker.record(&ip, start + Duration::from_secs(32)));
}

#[test]
fn test_window_slides_rather_than_resets() {
    let tracker = tracker();
    let ip = ClientIdentity::new("1.2.3.4");
    let start = Instant::now();

    for i in 0..10 {
        tracker.record(&ip, start + Duration::from_secs(i * 3));
    }
    // At t=31 the request at t=0 has left the window, leaving nine plus this one.
    assert!(!tracker.record(&ip, start + Duration::from_secs(31)));
    // At t=32 nothing else has expired: eleven in the window.
    assert!(tracker.record(&ip, start + Duration::from_secs(32)));
}

#[test]
fn test_threshold_and_window_are_injectable() {
    let tracker = TrafficTracker::new(TrafficConfig {
        request_threshold: 2,
        window: Duration::from_secs(1),
        ..TrafficConfig::default()
    });
    let ip = ClientIdentity::new("1.2.3.4");
    let start = Instant::now();

    assert!(!tracker.record(&ip, start));
    assert!(!tracker.record(&ip, start));
    assert!(tracker.record(&ip, start));
    assert!(!tracker.record(&ip, start + Duration::from_millis(1500)));
}

#[test]
fn test_tracked_identities_stay_bounded() {
    let tracker = TrafficTracker::new(TrafficConfig {
        max_tracked_clients: 50,
        ..TrafficConfig::default()
    });
    let now = Instant::now();

    for i in 0..500u32 {
        let ip = ClientIdentity::new(&format!("10.0.{}.{}", i / 256, i % 256));
        tracker.record(&ip, now + Duration::from_millis(u64::from(i)));
    }
    assert!(tracker.len() <= 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_records_for_one_identity_count_exactly() {
    let tracker = Arc::new(TrafficTracker::new(TrafficConfig {
        request_threshold: 100,
        ..TrafficConfig::default()
    }));
    let ip = ClientIdentity::new(&random_ip());
    let now = Instant::now();

    let tasks = (0..400).map(|_| {
        let tracker = Arc::clone(&tracker);
        let ip = ip.clone();
        tokio::spawn(async move { tracker.record(&ip, now) })
    });
    let results = futures::future::join_all(tasks).await;

    let excessive = results
        .into_iter()
        .map(|r| r.expect("task panicked"))
        .filter(|excessive| *excessive)
        .count();
    assert_eq!(excessive, 300);
    assert_eq!(tracker.window_len(&ip), 400);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_identities_do_not_interfere() {
    let tracker = Arc::new(tracker());
    let now = Instant::now();

    let tasks = (0..64u8).map(|i| {
        let tracker = Arc::clone(&tracker);
        tokio::spawn(async move {
            let ip = ClientIdentity::new(&format!("192.0.2.{}", i));
            (0..10).map(|_| tracker.record(&ip, now)).any(|excessive| excessive)
        })
    });

    for result in futures::future::join_all(tasks).await {
        assert!(!result.expect("task panicked"));
    }
    assert_eq!(tracker.len(), 64);
}
