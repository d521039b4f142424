//! Session notifications.
//!
//! A session announces every applied state change through an [`EventBus`]:
//!
//! - [`EventBus::subscribe`] returns an [`EventStream`] receiving all later events
//! - [`EventBus::register_waiter`] returns a one-shot receiver for the first
//!   event matching a predicate
//!
//! Events carry no payload. Observers re-read session state after receiving one.

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, oneshot};

use crate::error::{Error, Result};

/// Notification emitted by a [`SearchSession`](crate::SearchSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionEvent {
	/// A new search completed and replaced the accumulated results
	Searched,
	/// A further page completed and was appended
	PageLoaded,
	/// A search or page load failed; state holds whatever was there before
	Failed,
}

impl SessionEvent {
	pub fn as_str(self) -> &'static str {
		match self {
			SessionEvent::Searched => "searched",
			SessionEvent::PageLoaded => "pageLoaded",
			SessionEvent::Failed => "failed",
		}
	}
}

impl fmt::Display for SessionEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

struct WaiterEntry<E> {
	predicate: Box<dyn Fn(&E) -> bool + Send + Sync>,
	complete_tx: oneshot::Sender<E>,
}

/// Broadcast channel plus predicate-based one-shot waiters.
///
/// Waiters are served before broadcast subscribers on every [`emit`](Self::emit),
/// so a waiter never misses its event to subscriber lag.
pub struct EventBus<E: Clone + Send + 'static> {
	tx: broadcast::Sender<E>,
	waiters: Mutex<Vec<WaiterEntry<E>>>,
}

impl<E: Clone + Send + 'static> EventBus<E> {
	/// Creates a bus whose broadcast channel holds `capacity` events.
	pub fn new(capacity: usize) -> Self {
		let (tx, _) = broadcast::channel(capacity);
		Self {
			tx,
			waiters: Mutex::new(Vec::new()),
		}
	}

	/// Delivers `event` to matching waiters, then to all subscribers.
	pub fn emit(&self, event: E) {
		{
			let mut waiters = self.waiters.lock();
			let mut i = 0;
			while i < waiters.len() {
				if (waiters[i].predicate)(&event) {
					let entry = waiters.swap_remove(i);
					let _ = entry.complete_tx.send(event.clone());
				} else {
					i += 1;
				}
			}
		}
		let _ = self.tx.send(event);
	}

	/// Subscribes to all events emitted from now on.
	pub fn subscribe(&self) -> EventStream<E> {
		EventStream::new(self.tx.subscribe())
	}

	/// Registers a waiter completed by the first event matching `predicate`.
	pub fn register_waiter<F>(&self, predicate: F) -> oneshot::Receiver<E>
	where
		F: Fn(&E) -> bool + Send + Sync + 'static,
	{
		let (complete_tx, complete_rx) = oneshot::channel();
		self.waiters.lock().push(WaiterEntry {
			predicate: Box::new(predicate),
			complete_tx,
		});
		complete_rx
	}

	pub fn subscriber_count(&self) -> usize {
		self.tx.receiver_count()
	}

	pub fn waiter_count(&self) -> usize {
		self.waiters.lock().len()
	}
}

impl<E: Clone + Send + 'static> Default for EventBus<E> {
	fn default() -> Self {
		Self::new(64)
	}
}

/// Broadcast receiver that skips over lag instead of failing.
pub struct EventStream<E: Clone + Send + 'static> {
	rx: broadcast::Receiver<E>,
}

impl<E: Clone + Send + 'static> EventStream<E> {
	fn new(rx: broadcast::Receiver<E>) -> Self {
		Self { rx }
	}

	/// Receives the next event, or `None` once the bus is dropped.
	pub async fn recv(&mut self) -> Option<E> {
		loop {
			match self.rx.recv().await {
				Ok(event) => return Some(event),
				Err(broadcast::error::RecvError::Lagged(n)) => {
					tracing::warn!(target = "discovery.events", dropped = n, "event stream lagged, dropped events");
				}
				Err(broadcast::error::RecvError::Closed) => return None,
			}
		}
	}

	/// Returns an already-emitted event without waiting.
	pub fn try_recv(&mut self) -> Option<E> {
		loop {
			match self.rx.try_recv() {
				Ok(event) => return Some(event),
				Err(broadcast::error::TryRecvError::Lagged(n)) => {
					tracing::warn!(target = "discovery.events", dropped = n, "event stream lagged, dropped events");
				}
				Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => return None,
			}
		}
	}

	/// Drains every event emitted so far.
	pub fn drain(&mut self) -> Vec<E> {
		std::iter::from_fn(|| self.try_recv()).collect()
	}
}

/// Awaits a waiter registered with [`EventBus::register_waiter`].
///
/// # Errors
///
/// [`Error::ChannelClosed`] when the bus is dropped first.
pub async fn wait(rx: oneshot::Receiver<SessionEvent>) -> Result<SessionEvent> {
	rx.await.map_err(|_| Error::ChannelClosed)
}
