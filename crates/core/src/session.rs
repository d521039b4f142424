//! Search session state machine.
//!
//! A [`SearchSession`] coordinates one user's search and pagination:
//!
//! ```text
//!            search()                    load_next_page()
//!   Idle ──────────────> Searching     Idle ──────────────> Paging
//!    ^                      │           ^                     │
//!    └──── searched/failed ─┘           └─ pageLoaded/failed ─┘
//! ```
//!
//! Every transition first cancels the in-flight request, so at most one
//! request is outstanding. Responses are applied only while their ordinal
//! still owns the request slot; anything older is dropped without touching
//! state or emitting an event.
//!
//! State sits behind a [`parking_lot::Mutex`] that is never held across an
//! `.await`, so methods take `&self` and two calls may overlap (the later one
//! wins).

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::SessionConfig;
use crate::dispatcher::{PageRequest, Pending, RequestKind, RequestSlot, ResultPage};
use crate::error::{Error, Result};
use crate::events::{EventBus, EventStream, SessionEvent};
use crate::query::Query;
use crate::transport::Transport;

/// Coarse lifecycle phase derived from the request slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
	Idle,
	Searching,
	Paging,
}

/// Point-in-time copy of the session's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
	pub query: Query,
	pub page: u32,
	pub page_size: u32,
	pub total_count: u64,
	pub latest_page_count: usize,
	pub accumulated_count: usize,
	pub has_next_page: bool,
	pub phase: SessionPhase,
}

#[derive(Debug, Default)]
struct SessionState {
	query: Query,
	page: u32,
	total_count: u64,
	latest_page_count: usize,
	accumulated: Vec<Value>,
	slot: RequestSlot,
}

impl SessionState {
	fn reset(&mut self) {
		self.page = 0;
		self.total_count = 0;
		self.latest_page_count = 0;
		self.accumulated.clear();
	}

	fn has_next_page(&self, page_size: u32) -> bool {
		let shown = (u64::from(self.page) + 1).saturating_mul(u64::from(page_size));
		self.total_count > shown
	}

	fn phase(&self) -> SessionPhase {
		match self.slot.in_flight() {
			None => SessionPhase::Idle,
			Some(RequestKind::Search) => SessionPhase::Searching,
			Some(RequestKind::NextPage) => SessionPhase::Paging,
		}
	}

	fn apply(&mut self, kind: RequestKind, page_index: u32, result: ResultPage) -> SessionEvent {
		self.total_count = result.total;
		self.latest_page_count = result.items.len();
		match kind {
			RequestKind::Search => {
				self.accumulated = result.items;
				SessionEvent::Searched
			}
			RequestKind::NextPage => {
				self.accumulated.extend(result.items);
				self.page = page_index;
				SessionEvent::PageLoaded
			}
		}
	}
}

/// Releases the request slot if the owning call is dropped before completing.
struct InFlightGuard<'a> {
	state: &'a Mutex<SessionState>,
	ordinal: u64,
	armed: bool,
}

impl InFlightGuard<'_> {
	fn disarm(mut self) {
		self.armed = false;
	}
}

impl Drop for InFlightGuard<'_> {
	fn drop(&mut self) {
		if self.armed && self.state.lock().slot.finish(self.ordinal) {
			trace!(target = "discovery.session", ordinal = self.ordinal, "request abandoned by caller");
		}
	}
}

/// Stateful coordinator of one search UI's queries and pages.
///
/// # Example
///
/// ```ignore
/// let session = SearchSession::new(transport, SessionConfig::default());
/// let mut events = session.subscribe();
///
/// session.search("rust org:MITx").await?;
/// while session.has_next_page() {
///     session.load_next_page().await?;
/// }
/// println!("{} of {}", session.results().len(), session.total_count());
/// ```
pub struct SearchSession<T: Transport> {
	transport: T,
	config: SessionConfig,
	state: Mutex<SessionState>,
	events: EventBus<SessionEvent>,
}

impl<T: Transport> SearchSession<T> {
	pub fn new(transport: T, config: SessionConfig) -> Self {
		Self {
			transport,
			config,
			state: Mutex::new(SessionState::default()),
			events: EventBus::default(),
		}
	}

	/// Starts a new search, discarding all previous results.
	///
	/// The reset (page, counts, results) happens immediately, before the
	/// request resolves, and stays in effect if the request fails.
	///
	/// # Errors
	///
	/// - [`Error::Cancelled`] if a later call superseded this one; nothing was emitted
	/// - [`Error::Transport`] / [`Error::MalformedResponse`] after emitting `failed`
	pub async fn search(&self, raw_query: &str) -> Result<()> {
		let query = Query::parse(raw_query);
		let (pending, page_index) = {
			let mut state = self.state.lock();
			state.slot.cancel();
			state.reset();
			state.query = query;
			self.start(&mut state, RequestKind::Search, 0)
		};
		self.finish(pending, RequestKind::Search, page_index).await
	}

	/// Requests the page after the last loaded one for the current query.
	///
	/// Issued even when [`has_next_page`](Self::has_next_page) is `false`;
	/// gating is up to the caller.
	///
	/// # Errors
	///
	/// As for [`search`](Self::search). A failure leaves page, counts and
	/// results exactly as they were.
	pub async fn load_next_page(&self) -> Result<()> {
		let (pending, page_index) = {
			let mut state = self.state.lock();
			let next = state.page.saturating_add(1);
			self.start(&mut state, RequestKind::NextPage, next)
		};
		self.finish(pending, RequestKind::NextPage, page_index).await
	}

	/// Cancels any in-flight request and zeroes page, counts and results.
	///
	/// Emits nothing. The query is kept so observers can still display it.
	pub fn cancel(&self) {
		let mut state = self.state.lock();
		if state.slot.cancel() {
			debug!(target = "discovery.session", "search cancelled");
		}
		state.reset();
	}

	fn start(&self, state: &mut SessionState, kind: RequestKind, page_index: u32) -> (Pending, u32) {
		let request = PageRequest {
			query: state.query.clone(),
			page_size: self.config.page_size(),
			page_index,
		};
		let response = self.transport.send_paginated_query(self.config.endpoint(), request.to_body());
		let pending = state.slot.begin(kind, response);
		debug!(
			target = "discovery.session",
			ordinal = pending.ordinal(),
			kind = ?kind,
			page_index,
			query = %request.query,
			"dispatching request"
		);
		(pending, page_index)
	}

	async fn finish(&self, pending: Pending, kind: RequestKind, page_index: u32) -> Result<()> {
		let ordinal = pending.ordinal();
		let guard = InFlightGuard {
			state: &self.state,
			ordinal,
			armed: true,
		};
		let outcome = pending.resolve().await;
		guard.disarm();

		let (event, result) = {
			let mut state = self.state.lock();
			if !state.slot.finish(ordinal) {
				trace!(target = "discovery.session", ordinal, "discarding superseded response");
				return Err(Error::Cancelled);
			}
			match outcome {
				Ok(page) => {
					let event = state.apply(kind, page_index, page);
					debug!(
						target = "discovery.session",
						ordinal,
						total = state.total_count,
						received = state.latest_page_count,
						held = state.accumulated.len(),
						"response applied"
					);
					(event, Ok(()))
				}
				Err(Error::Cancelled) => return Err(Error::Cancelled),
				Err(err) => {
					warn!(target = "discovery.session", ordinal, kind = ?kind, error = %err, "request failed");
					(SessionEvent::Failed, Err(err))
				}
			}
		};

		self.events.emit(event);
		result
	}

	/// `true` while results beyond the current page remain on the server.
	pub fn has_next_page(&self) -> bool {
		self.state.lock().has_next_page(self.config.page_size())
	}

	/// Results delivered by the most recent successful request.
	pub fn latest_results(&self) -> Vec<Value> {
		let state = self.state.lock();
		let start = state.accumulated.len().saturating_sub(state.latest_page_count);
		state.accumulated[start..].to_vec()
	}

	/// All results held for the current query, in arrival order.
	pub fn results(&self) -> Vec<Value> {
		self.state.lock().accumulated.clone()
	}

	pub fn query(&self) -> Query {
		self.state.lock().query.clone()
	}

	pub fn page(&self) -> u32 {
		self.state.lock().page
	}

	pub fn page_size(&self) -> u32 {
		self.config.page_size()
	}

	pub fn total_count(&self) -> u64 {
		self.state.lock().total_count
	}

	pub fn latest_page_count(&self) -> usize {
		self.state.lock().latest_page_count
	}

	pub fn phase(&self) -> SessionPhase {
		self.state.lock().phase()
	}

	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	pub fn snapshot(&self) -> SessionSnapshot {
		let state = self.state.lock();
		SessionSnapshot {
			query: state.query.clone(),
			page: state.page,
			page_size: self.config.page_size(),
			total_count: state.total_count,
			latest_page_count: state.latest_page_count,
			accumulated_count: state.accumulated.len(),
			has_next_page: state.has_next_page(self.config.page_size()),
			phase: state.phase(),
		}
	}

	/// Subscribes to notifications emitted from now on.
	pub fn subscribe(&self) -> EventStream<SessionEvent> {
		self.events.subscribe()
	}

	/// Resolves with the next emitted event matching `predicate`.
	///
	/// Register before triggering the transition you are waiting for.
	pub fn wait_for_event<F>(&self, predicate: F) -> impl Future<Output = Result<SessionEvent>> + use<F, T>
	where
		F: Fn(&SessionEvent) -> bool + Send + Sync + 'static,
	{
		crate::events::wait(self.events.register_waiter(predicate))
	}
}

impl<T: Transport> std::fmt::Debug for SearchSession<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SearchSession").field("config", &self.config).field("state", &self.snapshot()).finish()
	}
}
