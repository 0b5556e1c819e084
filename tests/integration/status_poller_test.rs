// Integration Tests: Status Poller
//
// The poller against a scripted status source under paused time, and the
// HTTP status source against a mock server.

use async_trait::async_trait;
use donation_checkout::client::{
    HttpStatusSource, PollOutcome, StatusPoller, StatusSource, DEFAULT_INTERVAL,
    DEFAULT_MAX_DURATION, MIN_INTERVAL,
};
use donation_checkout::core::{AppError, Result};
use donation_checkout::donations::PaymentStatus;
use mockito::Matcher;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Plays back a script of answers; the last one repeats forever
struct ScriptedSource {
    script: Mutex<VecDeque<Option<PaymentStatus>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    /// `None` entries answer with an error
    fn new(script: Vec<Option<PaymentStatus>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            script: Mutex::new(script.into()),
            calls: calls.clone(),
        };
        (source, calls)
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch_status(&self, _order_id: &str) -> Result<PaymentStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut script = self.script.lock().unwrap();
        let next = if script.len() > 1 {
            script.pop_front().flatten()
        } else {
            script.front().copied().flatten()
        };
        next.ok_or_else(|| AppError::internal("status source unavailable"))
    }
}

#[tokio::test(start_paused = true)]
async fn test_stops_at_first_final_status() {
    let (source, calls) = ScriptedSource::new(vec![
        Some(PaymentStatus::Pending),
        Some(PaymentStatus::Pending),
        Some(PaymentStatus::Success),
    ]);
    let poller = StatusPoller::new(source);
    let started = Instant::now();

    let outcome = poller.poll("DONATION-1-1").await;

    assert_eq!(outcome, PollOutcome::Completed(PaymentStatus::Success));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(started.elapsed(), DEFAULT_INTERVAL * 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_is_final() {
    let (source, _) = ScriptedSource::new(vec![Some(PaymentStatus::Failed)]);
    let outcome = StatusPoller::new(source).poll("DONATION-1-2").await;
    assert_eq!(outcome, PollOutcome::Completed(PaymentStatus::Failed));
}

#[tokio::test(start_paused = true)]
async fn test_times_out_with_last_seen_status() {
    let (source, calls) = ScriptedSource::new(vec![Some(PaymentStatus::Pending)]);
    let poller = StatusPoller::new(source);
    let started = Instant::now();

    let outcome = poller.poll("DONATION-1-3").await;

    assert_eq!(
        outcome,
        PollOutcome::TimedOut {
            last_seen: Some(PaymentStatus::Pending)
        }
    );
    assert!(started.elapsed() > DEFAULT_MAX_DURATION);
    assert!(started.elapsed() <= DEFAULT_MAX_DURATION + DEFAULT_INTERVAL);

    // One check per interval across the whole window, the first immediate
    let expected = (DEFAULT_MAX_DURATION.as_secs() / DEFAULT_INTERVAL.as_secs()) as usize;
    let made = calls.load(Ordering::SeqCst);
    assert!(made == expected || made == expected + 1, "made {} checks", made);
}

#[tokio::test(start_paused = true)]
async fn test_errors_do_not_stop_polling() {
    let (source, calls) = ScriptedSource::new(vec![None, None, Some(PaymentStatus::Expired)]);
    let poller = StatusPoller::new(source).with_interval(Duration::from_secs(1));

    let outcome = poller.poll("DONATION-1-4").await;

    assert_eq!(outcome, PollOutcome::Completed(PaymentStatus::Expired));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_times_out_without_any_reading() {
    let (source, _) = ScriptedSource::new(vec![None]);
    let poller = StatusPoller::new(source)
        .with_interval(Duration::from_secs(1))
        .with_max_duration(Duration::from_secs(10));

    assert_eq!(
        poller.poll("DONATION-1-5").await,
        PollOutcome::TimedOut { last_seen: None }
    );
}

#[tokio::test]
async fn test_http_source_reads_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/payment")
        .match_query(Matcher::UrlEncoded(
            "order_id".into(),
            "DONATION-2-1".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true,"orderId":"DONATION-2-1","status":"challenge","amount":100000}"#)
        .create_async()
        .await;

    let source = HttpStatusSource::new(format!("{}/", server.url()), Duration::from_secs(5)).unwrap();
    let status = source.fetch_status("DONATION-2-1").await.unwrap();

    assert_eq!(status, PaymentStatus::Challenge);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_source_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/payment")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"success":false,"error":"Donation not found","order_id":"DONATION-0-0"}"#)
        .create_async()
        .await;

    let source = HttpStatusSource::new(server.url(), Duration::from_secs(5)).unwrap();
    let err = source.fetch_status("DONATION-0-0").await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_http_source_unreadable_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/payment")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"paid"}"#)
        .create_async()
        .await;

    let source = HttpStatusSource::new(server.url(), Duration::from_secs(5)).unwrap();
    assert!(source.fetch_status("DONATION-2-2").await.is_err());
}

#[tokio::test]
async fn test_poll_over_http() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/payment")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"success"}"#)
        .create_async()
        .await;

    let source = HttpStatusSource::new(server.url(), Duration::from_secs(5)).unwrap();
    let poller = StatusPoller::new(source)
        .with_interval(Duration::from_millis(10))
        .with_max_duration(Duration::from_secs(5));

    assert_eq!(
        poller.poll("DONATION-2-3").await,
        PollOutcome::Completed(PaymentStatus::Success)
    );
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_is_raised_to_minimum() {
    let (source, calls) = ScriptedSource::new(vec![
        Some(PaymentStatus::Pending),
        Some(PaymentStatus::Success),
    ]);
    let poller = StatusPoller::new(source).with_interval(Duration::ZERO);
    let started = Instant::now();

    let outcome = poller.poll("DONATION-1-6").await;

    assert_eq!(outcome, PollOutcome::Completed(PaymentStatus::Success));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(started.elapsed(), MIN_INTERVAL);
}
