// Integration tests for the search session lifecycle
//
// These drive a SearchSession through the fake transport, answering
// requests by hand so that ordering between overlapping requests is
// controlled by the test.

use std::sync::Arc;
use std::time::Duration;

use discovery::testing::{FakeTransport, FakeTransportBuilder, FakeTransportController, page_of};
use discovery::{Error, SearchSession, SessionConfig, SessionEvent, SessionPhase};
use serde_json::json;

const WAIT: Duration = Duration::from_secs(2);

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::DEBUG).try_init();
}

fn new_session() -> (Arc<SearchSession<FakeTransport>>, FakeTransportController) {
	init_tracing();
	let (transport, controller) = FakeTransportBuilder::new().build();
	(Arc::new(SearchSession::new(transport, SessionConfig::default())), controller)
}

#[tokio::test]
async fn test_newer_search_wins_over_stale_response() {
	let (session, controller) = new_session();
	let mut events = session.subscribe();

	let first = tokio::spawn({
		let session = Arc::clone(&session);
		async move { session.search("a").await }
	});
	assert!(controller.wait_for_requests(1, WAIT).await);

	let second = tokio::spawn({
		let session = Arc::clone(&session);
		async move { session.search("b").await }
	});
	assert!(controller.wait_for_requests(2, WAIT).await);

	// Answer the newer request first, then the stale one
	assert!(controller.respond(1, json!({"total": 1, "results": [{"data": {"q": "b"}}]})));
	let _ = controller.respond(0, json!({"total": 9, "results": [{"data": {"q": "a"}}]}));

	let first = first.await.unwrap();
	let second = second.await.unwrap();

	assert!(matches!(first, Err(Error::Cancelled)));
	assert!(second.is_ok());
	assert_eq!(session.query().free_text, "b");
	assert_eq!(session.total_count(), 1);
	assert_eq!(session.results(), vec![json!({"q": "b"})]);
	assert_eq!(events.drain(), vec![SessionEvent::Searched]);
}

#[tokio::test]
async fn test_superseded_request_is_aborted_at_transport() {
	let (session, controller) = new_session();

	let first = tokio::spawn({
		let session = Arc::clone(&session);
		async move { session.search("slow").await }
	});
	assert!(controller.wait_for_requests(1, WAIT).await);

	controller.enqueue(page_of(0, 3, 3));
	session.search("fast").await.unwrap();

	assert!(matches!(first.await.unwrap(), Err(Error::Cancelled)));
	assert!(controller.is_abandoned(0));
	assert!(!controller.respond(0, page_of(0, 20, 100)));
	assert_eq!(session.total_count(), 3);
}

#[tokio::test]
async fn test_accumulates_across_pages() {
	let (session, controller) = new_session();
	let mut events = session.subscribe();

	controller.enqueue(page_of(0, 20, 45));
	session.search("physics").await.unwrap();
	assert_eq!(session.results().len(), 20);
	assert_eq!(session.latest_page_count(), 20);
	assert_eq!(session.latest_results(), session.results());

	controller.enqueue(page_of(20, 20, 45));
	session.load_next_page().await.unwrap();
	assert_eq!(session.results().len(), 40);
	assert_eq!(session.page(), 1);
	assert!(session.has_next_page());

	controller.enqueue(page_of(40, 5, 45));
	session.load_next_page().await.unwrap();
	assert_eq!(session.results().len(), 45);
	assert_eq!(session.page(), 2);
	assert_eq!(session.latest_page_count(), 5);
	assert_eq!(session.latest_results().first().map(|r| r["id"].clone()), Some(json!(40)));
	assert!(!session.has_next_page());

	assert_eq!(events.drain(), vec![SessionEvent::Searched, SessionEvent::PageLoaded, SessionEvent::PageLoaded]);

	let indexes: Vec<u32> = controller.sent().iter().map(|s| s.body.page_index).collect();
	assert_eq!(indexes, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_failed_next_page_leaves_state_untouched() {
	let (session, controller) = new_session();

	controller.enqueue(page_of(0, 20, 45));
	session.search("chemistry").await.unwrap();
	let before = session.snapshot();
	let results_before = session.results();

	let mut events = session.subscribe();
	controller.enqueue_error("502 Bad Gateway");
	let err = session.load_next_page().await.unwrap_err();

	assert!(matches!(err, Error::Transport(_)));
	assert_eq!(session.snapshot(), before);
	assert_eq!(session.results(), results_before);
	assert_eq!(events.drain(), vec![SessionEvent::Failed]);
}

#[tokio::test]
async fn test_malformed_response_reports_failure() {
	let (session, controller) = new_session();
	let failed = session.wait_for_event(|e| *e == SessionEvent::Failed);

	controller.enqueue(json!({"hits": [], "count": 0}));
	let err = session.search("x").await.unwrap_err();

	assert!(matches!(err, Error::MalformedResponse(_)));
	assert_eq!(failed.await.unwrap(), SessionEvent::Failed);
}

#[tokio::test]
async fn test_cancel_discards_in_flight_response() {
	let (session, controller) = new_session();
	let mut events = session.subscribe();

	let task = tokio::spawn({
		let session = Arc::clone(&session);
		async move { session.search("history").await }
	});
	assert!(controller.wait_for_requests(1, WAIT).await);
	assert_eq!(session.phase(), SessionPhase::Searching);

	session.cancel();
	let _ = controller.respond(0, page_of(0, 20, 45));

	assert!(matches!(task.await.unwrap(), Err(Error::Cancelled)));
	assert_eq!(session.phase(), SessionPhase::Idle);
	assert_eq!(session.total_count(), 0);
	assert!(session.results().is_empty());
	assert!(events.drain().is_empty());
}

#[tokio::test]
async fn test_next_page_supersedes_search() {
	let (session, controller) = new_session();

	controller.enqueue(page_of(0, 20, 45));
	session.search("math").await.unwrap();

	let paging = tokio::spawn({
		let session = Arc::clone(&session);
		async move { session.load_next_page().await }
	});
	assert!(controller.wait_for_requests(2, WAIT).await);
	assert_eq!(session.phase(), SessionPhase::Paging);

	controller.enqueue(page_of(0, 10, 10));
	session.search("art").await.unwrap();
	let _ = controller.respond(1, page_of(20, 20, 45));

	assert!(matches!(paging.await.unwrap(), Err(Error::Cancelled)));
	assert_eq!(session.page(), 0);
	assert_eq!(session.total_count(), 10);
	assert_eq!(session.results().len(), 10);
}

#[tokio::test]
async fn test_next_page_past_end_still_dispatches() {
	let (session, controller) = new_session();

	controller.enqueue(page_of(0, 15, 15));
	session.search("tiny").await.unwrap();
	assert!(!session.has_next_page());

	controller.enqueue(json!({"total": 15, "results": []}));
	session.load_next_page().await.unwrap();

	assert_eq!(controller.request_count(), 2);
	assert_eq!(session.page(), 1);
	assert_eq!(session.results().len(), 15);
	assert_eq!(session.latest_page_count(), 0);
	assert!(session.latest_results().is_empty());
}

#[tokio::test]
async fn test_dropped_call_releases_request_slot() {
	let (session, controller) = new_session();

	let search = session.search("abandoned");
	let timed_out = tokio::time::timeout(Duration::from_millis(20), search).await;
	assert!(timed_out.is_err());

	assert_eq!(session.phase(), SessionPhase::Idle);
	assert!(controller.is_abandoned(0));
}

#[tokio::test]
async fn test_filters_reach_the_wire() {
	let (session, controller) = new_session();

	controller.enqueue(page_of(0, 1, 1));
	session.search("intro   to  rust org:MITx lang:en org:HarvardX").await.unwrap();

	let sent = controller.sent();
	let body = serde_json::to_value(&sent[0].body).unwrap();
	assert_eq!(sent[0].endpoint, "/search/course_discovery/");
	assert_eq!(
		body,
		json!({
			"search_string": "intro to rust",
			"page_size": 20,
			"page_index": 0,
			"org": "HarvardX",
			"lang": "en"
		})
	);
}
