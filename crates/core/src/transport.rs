//! Transport seam between a session and the search service.
//!
//! The session never talks to the network itself. It hands a
//! [`SearchRequestBody`] to a [`Transport`] and awaits the returned future.
//! Dropping that future is the abort signal: implementations backed by an
//! HTTP client stop the request when it is dropped mid-flight.

use std::sync::Arc;

use discovery_protocol::SearchRequestBody;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::error::Result;

/// Future resolving to the raw JSON response of one paginated query.
pub type TransportFuture = BoxFuture<'static, Result<Value>>;

/// Sends paginated queries to a search service.
///
/// Implementations must not block in [`send_paginated_query`]; any I/O
/// belongs inside the returned future, which is only polled by the session.
/// Failures resolve to [`Error::Transport`].
///
/// [`send_paginated_query`]: Transport::send_paginated_query
/// [`Error::Transport`]: crate::Error::Transport
pub trait Transport: Send + Sync {
	/// Starts a query against `endpoint` with the given body.
	fn send_paginated_query(&self, endpoint: &str, body: SearchRequestBody) -> TransportFuture;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
	fn send_paginated_query(&self, endpoint: &str, body: SearchRequestBody) -> TransportFuture {
		(**self).send_paginated_query(endpoint, body)
	}
}

impl<T: Transport + ?Sized> Transport for Box<T> {
	fn send_paginated_query(&self, endpoint: &str, body: SearchRequestBody) -> TransportFuture {
		(**self).send_paginated_query(endpoint, body)
	}
}
