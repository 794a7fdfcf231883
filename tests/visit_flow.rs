//! Integration tests for the full visit-tracking flow.
//!
//! Everything here goes through the public API: a tracker wired with the
//! crate's traits, recording fakes owned by the test, and for the HTTP
//! reporter a real local socket.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use visit_tracker::{
    HttpReporter, MemoryConsentGate, Notification, Notifier, Result, SaveOutcome, TabEvent, TabId,
    VisitReport, VisitReporter, VisitTracker,
};

// ============================================================================
// Fakes
// ============================================================================

/// Reporter that records calls and replies from a queue of outcomes,
/// repeating the last outcome once the queue is exhausted.
#[derive(Default)]
struct FakeCompanion {
    replies: Mutex<VecDeque<Result<SaveOutcome>>>,
    calls: Mutex<Vec<VisitReport>>,
}

impl FakeCompanion {
    fn saving(category: &str) -> Self {
        let companion = Self::default();
        companion.push_saved(category);
        companion
    }

    fn push_saved(&self, category: &str) {
        self.replies.lock().push_back(Ok(SaveOutcome {
            saved: true,
            category: Some(category.to_string()),
        }));
    }

    fn push_failure(&self) {
        self.replies
            .lock()
            .push_back(Err(visit_tracker::Error::transport("refused")));
    }

    fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl VisitReporter for FakeCompanion {
    async fn report(&self, report: &VisitReport) -> Result<SaveOutcome> {
        self.calls.lock().push(report.clone());
        let mut replies = self.replies.lock();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            match replies.front() {
                Some(Ok(outcome)) => Ok(outcome.clone()),
                Some(Err(_)) | None => Err(visit_tracker::Error::transport("refused")),
            }
        }
    }
}

#[derive(Default)]
struct ShownNotifications {
    shown: Mutex<Vec<Notification>>,
}

impl Notifier for ShownNotifications {
    fn notify(&self, notification: &Notification) {
        self.shown.lock().push(notification.clone());
    }
}

fn wired(
    consent: MemoryConsentGate,
    companion: FakeCompanion,
) -> (VisitTracker, Arc<FakeCompanion>, Arc<ShownNotifications>) {
    let companion = Arc::new(companion);
    let notifier = Arc::new(ShownNotifications::default());
    let tracker = VisitTracker::new(
        Arc::new(consent),
        Arc::clone(&companion) as Arc<dyn VisitReporter>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );
    (tracker, companion, notifier)
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[tokio::test]
async fn end_to_end_visit_dedup_and_reuse() {
    let (tracker, companion, notifier) =
        wired(MemoryConsentGate::granted(), FakeCompanion::saving("tech"));
    let tab = TabId::new(5);
    let url = "https://example.com/a";

    // Tab 5 finishes loading: exactly one report with url/title/timestamp.
    tracker.on_navigation_complete(tab, url, "Example A").await;
    {
        let calls = companion.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, url);
        assert_eq!(calls[0].title, "Example A");
        assert!(chrono::DateTime::parse_from_rfc3339(&calls[0].timestamp).is_ok());
    }

    // Companion saved it as "tech": one notification naming the category.
    {
        let shown = notifier.shown.lock();
        assert_eq!(shown.len(), 1);
        assert!(shown[0].message.contains("tech"));
    }

    // Reloading the identical URL in the same tab: zero additional reports.
    tracker.on_navigation_complete(tab, url, "Example A").await;
    tracker.on_navigation_complete(tab, url, "Example A").await;
    assert_eq!(companion.call_count(), 1);

    // Tab 5 closes, then the browser reuses ID 5: treated as fresh.
    tracker.on_tab_closed(tab);
    tracker.on_navigation_complete(tab, url, "Example A").await;
    assert_eq!(companion.call_count(), 2);
}

#[tokio::test]
async fn consent_gating_blocks_all_reports() {
    let (tracker, companion, _) =
        wired(MemoryConsentGate::new(), FakeCompanion::saving("tech"));

    for tab in 1..=10u32 {
        tracker
            .on_event(TabEvent::NavigationComplete {
                tab_id: TabId::new(tab),
                url: format!("https://example.com/{tab}"),
                title: "Page".into(),
            })
            .await;
    }
    assert_eq!(companion.call_count(), 0);
}

#[tokio::test]
async fn failed_report_is_retryable_through_public_api() {
    let companion = FakeCompanion::default();
    companion.push_failure();
    companion.push_saved("docs");

    let (tracker, companion, notifier) = wired(MemoryConsentGate::granted(), companion);
    let tab = TabId::new(1);
    let url = "https://example.com/retry";

    tracker.on_navigation_complete(tab, url, "Retry").await;
    assert!(!tracker.is_marked(tab, url));
    assert!(notifier.shown.lock().is_empty());

    tracker.on_navigation_complete(tab, url, "Retry").await;
    assert_eq!(companion.call_count(), 2);
    assert_eq!(notifier.shown.lock().len(), 1);
}

// ============================================================================
// HTTP reporter against a real socket
// ============================================================================

/// Accepts one HTTP request, captures its body, responds with `response`.
async fn serve_once(listener: TcpListener, response: &'static str) -> String {
    let (mut stream, _) = listener.accept().await.unwrap();

    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let (header_end, body_len) = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before request completed");
        buf.extend_from_slice(&chunk[..n]);

        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            break (pos + 4, body_len);
        }
    };

    while buf.len() < header_end + body_len {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before body completed");
        buf.extend_from_slice(&chunk[..n]);
    }

    let reply = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.len(),
        response
    );
    stream.write_all(reply.as_bytes()).await.unwrap();
    stream.shutdown().await.unwrap();

    String::from_utf8_lossy(&buf[header_end..header_end + body_len]).into_owned()
}

#[tokio::test]
async fn http_reporter_posts_json_and_parses_outcome() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve_once(listener, r#"{"saved": true, "category": "tech"}"#));

    let reporter = HttpReporter::builder()
        .endpoint(format!("http://{addr}/api/add-url"))
        .build()
        .unwrap();

    let report = VisitReport::new("https://example.com/a", "Example");
    let outcome = reporter.report(&report).await.unwrap();
    assert!(outcome.saved);
    assert_eq!(outcome.saved_category(), Some("tech"));

    let body = server.await.unwrap();
    let sent: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(sent["url"], "https://example.com/a");
    assert_eq!(sent["title"], "Example");
    assert!(sent["timestamp"].is_string());
}

#[tokio::test]
async fn http_reporter_maps_refused_connection_to_transport() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let reporter = HttpReporter::builder()
        .endpoint(format!("http://{addr}/api/add-url"))
        .build()
        .unwrap();

    let err = reporter
        .report(&VisitReport::new("https://example.com/a", "Example"))
        .await
        .unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn http_reporter_maps_malformed_body_to_transport() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve_once(listener, "not json at all"));

    let reporter = HttpReporter::builder()
        .endpoint(format!("http://{addr}/api/add-url"))
        .build()
        .unwrap();

    let err = reporter
        .report(&VisitReport::new("https://example.com/a", "Example"))
        .await
        .unwrap_err();
    assert!(err.is_transport());

    server.await.unwrap();
}

// ============================================================================
// Property: reports ≡ distinct first-sightings
// ============================================================================

mod properties {
    use super::*;

    use proptest::prelude::*;
    use std::collections::{HashMap, HashSet};

    /// A compact, model-checkable event script.
    #[derive(Debug, Clone)]
    enum Step {
        Nav(u32, u8),
        Activate(u32),
        Close(u32),
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0..4u32, 0..3u8).prop_map(|(tab, url)| Step::Nav(tab, url)),
            (0..4u32).prop_map(Step::Activate),
            (0..4u32).prop_map(Step::Close),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// With consent granted and a companion that always saves, the
        /// number of outbound reports equals the number of navigations that
        /// were a first sighting of their (tab, URL) pair, under any event
        /// interleaving.
        #[test]
        fn reports_match_model(steps in proptest::collection::vec(step_strategy(), 0..40)) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            rt.block_on(async {
                let (tracker, companion, _) = wired(
                    MemoryConsentGate::granted(),
                    FakeCompanion::saving("tech"),
                );

                let mut model: HashMap<u32, HashSet<u8>> = HashMap::new();
                let mut expected_reports = 0usize;

                for step in &steps {
                    match *step {
                        Step::Nav(tab, url) => {
                            if model.entry(tab).or_default().insert(url) {
                                expected_reports += 1;
                            }
                            tracker
                                .on_navigation_complete(
                                    TabId::new(tab),
                                    &format!("https://example.com/{url}"),
                                    "Page",
                                )
                                .await;
                        }
                        Step::Activate(tab) => tracker.on_tab_activated(TabId::new(tab)),
                        Step::Close(tab) => {
                            model.remove(&tab);
                            tracker.on_tab_closed(TabId::new(tab));
                        }
                    }
                }

                prop_assert_eq!(companion.call_count(), expected_reports);
                prop_assert_eq!(
                    tracker.marked_count(),
                    model.values().map(HashSet::len).sum::<usize>()
                );
                Ok(())
            })?;
        }
    }
}
