//! In-memory transport for exercising sessions without a search service.
//!
//! # Example
//!
//! ```ignore
//! let (transport, controller) = FakeTransportBuilder::new().build();
//! let session = Arc::new(SearchSession::new(transport, SessionConfig::default()));
//!
//! let task = tokio::spawn({
//!     let session = Arc::clone(&session);
//!     async move { session.search("rust").await }
//! });
//!
//! controller.wait_for_requests(1, Duration::from_secs(1)).await;
//! controller.respond(0, page_of(0, 20, 45));
//! task.await??;
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use discovery_protocol::SearchRequestBody;
use futures_util::FutureExt;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportFuture};

/// A request captured by the fake transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentQuery {
	pub endpoint: String,
	pub body: SearchRequestBody,
}

#[derive(Default)]
struct FakeState {
	sent: Vec<SentQuery>,
	waiting: Vec<Option<oneshot::Sender<Result<Value>>>>,
	queued: VecDeque<Result<Value>>,
}

/// Builder for creating fake transport instances.
#[derive(Default)]
pub struct FakeTransportBuilder {
	queued: VecDeque<Result<Value>>,
}

impl FakeTransportBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues a response consumed by the next request, in order.
	pub fn respond_with(mut self, response: Value) -> Self {
		self.queued.push_back(Ok(response));
		self
	}

	/// Build the fake transport and the controller driving it.
	pub fn build(self) -> (FakeTransport, FakeTransportController) {
		let state = Arc::new(Mutex::new(FakeState {
			queued: self.queued,
			..FakeState::default()
		}));

		(
			FakeTransport { state: Arc::clone(&state) },
			FakeTransportController { state },
		)
	}
}

/// Transport half handed to the session.
///
/// A request is answered immediately from the queue when one is queued;
/// otherwise it stays pending until the controller answers it by number.
pub struct FakeTransport {
	state: Arc<Mutex<FakeState>>,
}

impl Transport for FakeTransport {
	fn send_paginated_query(&self, endpoint: &str, body: SearchRequestBody) -> TransportFuture {
		let mut state = self.state.lock();
		state.sent.push(SentQuery {
			endpoint: endpoint.to_string(),
			body,
		});

		if let Some(response) = state.queued.pop_front() {
			state.waiting.push(None);
			return async move { response }.boxed();
		}

		let (tx, rx) = oneshot::channel();
		state.waiting.push(Some(tx));
		async move {
			match rx.await {
				Ok(response) => response,
				Err(_) => Err(Error::ChannelClosed),
			}
		}
		.boxed()
	}
}

/// Controller for answering requests and inspecting what was sent.
#[derive(Clone)]
pub struct FakeTransportController {
	state: Arc<Mutex<FakeState>>,
}

impl FakeTransportController {
	/// Queues a response for the next request that arrives.
	pub fn enqueue(&self, response: Value) {
		self.state.lock().queued.push_back(Ok(response));
	}

	/// Queues a transport failure for the next request that arrives.
	pub fn enqueue_error(&self, message: &str) {
		self.state.lock().queued.push_back(Err(Error::Transport(message.to_string())));
	}

	/// Answers pending request `index` (zero-based, in send order).
	///
	/// Returns `false` if the request was already answered, never sent, or
	/// abandoned by the session.
	pub fn respond(&self, index: usize, response: Value) -> bool {
		self.complete(index, Ok(response))
	}

	/// Fails pending request `index` with a transport error.
	pub fn fail(&self, index: usize, message: &str) -> bool {
		self.complete(index, Err(Error::Transport(message.to_string())))
	}

	fn complete(&self, index: usize, response: Result<Value>) -> bool {
		let tx = self.state.lock().waiting.get_mut(index).and_then(Option::take);
		match tx {
			Some(tx) => tx.send(response).is_ok(),
			None => false,
		}
	}

	/// `true` once the session dropped the future for pending request `index`.
	pub fn is_abandoned(&self, index: usize) -> bool {
		self.state
			.lock()
			.waiting
			.get(index)
			.and_then(Option::as_ref)
			.is_some_and(oneshot::Sender::is_closed)
	}

	pub fn request_count(&self) -> usize {
		self.state.lock().sent.len()
	}

	pub fn sent(&self) -> Vec<SentQuery> {
		self.state.lock().sent.clone()
	}

	/// Waits until at least `count` requests were sent, up to `limit`.
	pub async fn wait_for_requests(&self, count: usize, limit: Duration) -> bool {
		let poll = async {
			while self.request_count() < count {
				tokio::time::sleep(Duration::from_millis(1)).await;
			}
		};
		tokio::time::timeout(limit, poll).await.is_ok()
	}
}

/// Builds a response envelope holding `count` records numbered from `start`.
///
/// Records are wrapped as `{ "data": { "id": n } }`, the way the service sends them.
pub fn page_of(start: u64, count: u64, total: u64) -> Value {
	let results: Vec<Value> = (start..start + count).map(|id| json!({ "data": { "id": id } })).collect();
	json!({ "total": total, "results": results })
}
