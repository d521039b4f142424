//! Single-slot request dispatch with ordinal correlation.
//!
//! Every request a session starts goes through a [`RequestSlot`]:
//!
//! 1. [`RequestSlot::begin`] cancels the current occupant (if any), assigns the
//!    next ordinal and stores a cancellation sender in the slot
//! 2. The caller awaits [`Pending::resolve`], which races the transport future
//!    against the cancellation receiver
//! 3. On resolution the caller asks [`RequestSlot::finish`] whether its ordinal
//!    still owns the slot; only then may the response touch session state
//!
//! Step 3 matters because cancellation is only advisory to the transport: a
//! response can be fully received before the cancel signal is observed.

use discovery_protocol::{ResponseEnvelope, SearchRequestBody};
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{Error, Result};
use crate::query::Query;
use crate::transport::TransportFuture;

/// What a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
	/// First page of a new query
	Search,
	/// Following page of the current query
	NextPage,
}

/// Parameters of one paginated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
	pub query: Query,
	pub page_size: u32,
	pub page_index: u32,
}

impl PageRequest {
	/// Builds the wire body for this request.
	pub fn to_body(&self) -> SearchRequestBody {
		let body = SearchRequestBody::new(
			self.query.free_text.clone(),
			self.page_size,
			self.page_index,
			self.query.filters.iter().map(|(k, v)| (k.clone(), v.clone())),
		);
		if body.filters.len() != self.query.filters.len() {
			debug!(target = "discovery.dispatch", query = %self.query, "reserved filter names dropped from request body");
		}
		body
	}
}

/// One decoded page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
	pub items: Vec<Value>,
	pub total: u64,
}

impl ResultPage {
	/// Decodes the `{ results, total }` envelope of a raw response.
	///
	/// # Errors
	///
	/// [`Error::MalformedResponse`] when either field is missing or mistyped.
	pub fn from_response(raw: Value) -> Result<Self> {
		let envelope = ResponseEnvelope::from_value(raw).map_err(|e| Error::MalformedResponse(e.to_string()))?;
		Ok(Self {
			total: envelope.total,
			items: envelope.into_records(),
		})
	}
}

/// Occupant of the request slot.
#[derive(Debug)]
struct InFlight {
	ordinal: u64,
	kind: RequestKind,
	cancel_tx: oneshot::Sender<()>,
}

/// Holds at most one in-flight request and hands out ordinals.
#[derive(Debug, Default)]
pub struct RequestSlot {
	last_ordinal: u64,
	current: Option<InFlight>,
}

impl RequestSlot {
	pub fn new() -> Self {
		Self::default()
	}

	/// Cancels any occupant and registers a new request around `response`.
	pub fn begin(&mut self, kind: RequestKind, response: TransportFuture) -> Pending {
		self.cancel();

		self.last_ordinal += 1;
		let ordinal = self.last_ordinal;
		let (cancel_tx, cancel_rx) = oneshot::channel();
		self.current = Some(InFlight { ordinal, kind, cancel_tx });

		Pending {
			ordinal,
			cancel_rx,
			response,
		}
	}

	/// Signals cancellation to the occupant, returning `true` if there was one.
	///
	/// Does not wait for the occupant to observe the signal.
	pub fn cancel(&mut self) -> bool {
		match self.current.take() {
			Some(in_flight) => {
				debug!(target = "discovery.dispatch", ordinal = in_flight.ordinal, kind = ?in_flight.kind, "cancelling in-flight request");
				let _ = in_flight.cancel_tx.send(());
				true
			}
			None => false,
		}
	}

	/// Releases the slot if `ordinal` still owns it.
	///
	/// Returns `false` when a newer request (or `cancel`) has taken over, in
	/// which case the caller must discard its response.
	pub fn finish(&mut self, ordinal: u64) -> bool {
		if self.owns(ordinal) {
			self.current = None;
			true
		} else {
			false
		}
	}

	pub fn owns(&self, ordinal: u64) -> bool {
		self.current.as_ref().is_some_and(|f| f.ordinal == ordinal)
	}

	/// Kind of the current occupant, if any.
	pub fn in_flight(&self) -> Option<RequestKind> {
		self.current.as_ref().map(|f| f.kind)
	}

	pub fn last_ordinal(&self) -> u64 {
		self.last_ordinal
	}
}

/// A started request awaiting its response.
#[must_use = "a pending request does nothing unless resolved"]
pub struct Pending {
	ordinal: u64,
	cancel_rx: oneshot::Receiver<()>,
	response: TransportFuture,
}

impl Pending {
	pub fn ordinal(&self) -> u64 {
		self.ordinal
	}

	/// Awaits the response, or [`Error::Cancelled`] once the slot is taken over.
	///
	/// The transport future is dropped on cancellation, which aborts it.
	pub async fn resolve(self) -> Result<ResultPage> {
		let Pending { cancel_rx, response, .. } = self;

		tokio::select! {
			biased;
			_ = cancel_rx => Err(Error::Cancelled),
			raw = response => ResultPage::from_response(raw?),
		}
	}
}

impl std::fmt::Debug for Pending {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Pending").field("ordinal", &self.ordinal).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures_util::FutureExt;
	use serde_json::json;

	fn ready(value: Value) -> TransportFuture {
		async move { Ok::<_, Error>(value) }.boxed()
	}

	fn never() -> TransportFuture {
		futures_util::future::pending::<Result<Value>>().boxed()
	}

	#[test]
	fn ordinals_increase() {
		let mut slot = RequestSlot::new();
		let first = slot.begin(RequestKind::Search, never());
		let second = slot.begin(RequestKind::NextPage, never());

		assert_eq!(first.ordinal(), 1);
		assert_eq!(second.ordinal(), 2);
		assert_eq!(slot.last_ordinal(), 2);
		assert_eq!(slot.in_flight(), Some(RequestKind::NextPage));
	}

	#[test]
	fn finish_only_for_owner() {
		let mut slot = RequestSlot::new();
		let first = slot.begin(RequestKind::Search, never());
		let second = slot.begin(RequestKind::Search, never());

		assert!(!slot.finish(first.ordinal()));
		assert!(slot.owns(second.ordinal()));
		assert!(slot.finish(second.ordinal()));
		assert!(slot.in_flight().is_none());
		assert!(!slot.finish(second.ordinal()));
	}

	#[test]
	fn cancel_empties_slot() {
		let mut slot = RequestSlot::new();
		assert!(!slot.cancel());
		let _pending = slot.begin(RequestKind::Search, never());
		assert!(slot.cancel());
		assert!(slot.in_flight().is_none());
		assert!(!slot.cancel());
	}

	#[tokio::test]
	async fn superseded_request_resolves_cancelled() {
		let mut slot = RequestSlot::new();
		let first = slot.begin(RequestKind::Search, never());
		let _second = slot.begin(RequestKind::Search, never());

		let result = first.resolve().await;
		assert!(matches!(result, Err(Error::Cancelled)));
	}

	#[tokio::test]
	async fn resolves_decoded_page() {
		let mut slot = RequestSlot::new();
		let pending = slot.begin(
			RequestKind::Search,
			ready(json!({"total": 3, "results": [{"data": {"id": 1}}, {"data": {"id": 2}}]})),
		);

		let page = pending.resolve().await.unwrap();
		assert_eq!(page.total, 3);
		assert_eq!(page.items, vec![json!({"id": 1}), json!({"id": 2})]);
	}

	#[tokio::test]
	async fn malformed_envelope_is_reported() {
		let mut slot = RequestSlot::new();
		let pending = slot.begin(RequestKind::Search, ready(json!({"hits": []})));

		let result = pending.resolve().await;
		assert!(matches!(result, Err(Error::MalformedResponse(_))));
	}

	#[tokio::test]
	async fn transport_error_passes_through() {
		let mut slot = RequestSlot::new();
		let pending = slot.begin(RequestKind::NextPage, async { Err::<Value, _>(Error::Transport("503".into())) }.boxed());

		let result = pending.resolve().await;
		assert!(matches!(result, Err(Error::Transport(msg)) if msg == "503"));
	}

	#[test]
	fn request_body_uses_query() {
		let request = PageRequest {
			query: Query::parse("intro org:MITx page_index:9"),
			page_size: 20,
			page_index: 2,
		};

		let body = request.to_body();
		assert_eq!(body.search_string, "intro");
		assert_eq!(body.page_index, 2);
		assert_eq!(body.filters.len(), 1);
		assert_eq!(body.filters["org"], "MITx");
	}
}
