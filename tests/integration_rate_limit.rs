use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use submission_gateway::services::rate_limiter::RateLimiter;
use tokio::sync::Barrier;
use tokio::time::Instant;

mod common;

#[tokio::test]
async fn test_second_submission_within_window_is_rejected() {
    let app = common::TestApp::spawn().await;

    let (status, _) = app.post("/api/contact", "203.0.113.1", common::valid_submission()).await;
    assert_eq!(status, 200);

    let (status, body) = app.post("/api/contact", "203.0.113.1", common::valid_submission()).await;
    assert_eq!(status, 429);
    assert_eq!(body, json!({ "ok": false, "error": "Please wait before submitting again." }));

    // The window is shared between both forms.
    let (status, _) = app.post("/api/dataroom", "203.0.113.1", common::valid_submission()).await;
    assert_eq!(status, 429);

    assert_eq!(app.transport.sent().len(), 1);
}

#[tokio::test]
async fn test_rate_limit_isolation() {
    let app = common::TestApp::spawn().await;

    let (status, _) = app.post("/api/contact", "203.0.113.2", common::valid_submission()).await;
    assert_eq!(status, 200);
    let (status, _) = app.post("/api/contact", "203.0.113.2", common::valid_submission()).await;
    assert_eq!(status, 429, "first client should now be blocked");

    let (status, _) = app.post("/api/contact", "203.0.113.3", common::valid_submission()).await;
    assert_eq!(status, 200, "second client should be unaffected");
}

#[tokio::test]
async fn test_spam_and_invalid_submissions_consume_the_window() {
    let app = common::TestApp::spawn().await;

    let (status, _) = app.post("/api/contact", "203.0.113.4", json!({ "honey": "bot" })).await;
    assert_eq!(status, 200);
    let (status, _) = app.post("/api/contact", "203.0.113.4", common::valid_submission()).await;
    assert_eq!(status, 429);

    let (status, _) = app.post("/api/contact", "203.0.113.5", json!({})).await;
    assert_eq!(status, 400);
    let (status, _) = app.post("/api/contact", "203.0.113.5", common::valid_submission()).await;
    assert_eq!(status, 429);
}

#[tokio::test]
async fn test_fallback_to_peer_ip() {
    let app = common::TestApp::spawn().await;

    let send = || {
        app.client.post(format!("{}/api/dataroom", app.server_url)).json(&common::valid_submission()).send()
    };

    assert_eq!(send().await.unwrap().status().as_u16(), 200);
    assert_eq!(send().await.unwrap().status().as_u16(), 429, "peer address should be rate limited");
}

#[tokio::test]
async fn test_concurrent_submissions_from_one_client() {
    let app = common::TestApp::spawn().await;

    let tasks = (0..10).map(|_| app.post("/api/contact", "203.0.113.6", common::valid_submission()));
    let statuses: Vec<u16> = join_all(tasks).await.into_iter().map(|(status, _)| status).collect();

    assert_eq!(statuses.iter().filter(|&&s| s == 200).count(), 1);
    assert_eq!(statuses.iter().filter(|&&s| s == 429).count(), 9);
    assert_eq!(app.transport.sent().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admits_race_on_one_identity() {
    let limiter = RateLimiter::new(Duration::from_secs(30));
    let barrier = Arc::new(Barrier::new(8));
    let now = Instant::now();

    let tasks = (0..8).map(|_| {
        let limiter = limiter.clone();
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            limiter.admit("shared-identity", now)
        })
    });

    let admitted = join_all(tasks).await.into_iter().filter(|r| *r.as_ref().unwrap()).count();
    assert_eq!(admitted, 1);
}

#[tokio::test(start_paused = true)]
async fn test_window_expires_at_exactly_thirty_seconds() {
    let limiter = RateLimiter::new(Duration::from_millis(30_000));

    assert!(limiter.admit("203.0.113.7", Instant::now()));

    tokio::time::advance(Duration::from_millis(29_999)).await;
    assert!(!limiter.admit("203.0.113.7", Instant::now()));

    tokio::time::advance(Duration::from_millis(1)).await;
    assert!(limiter.admit("203.0.113.7", Instant::now()));
}
