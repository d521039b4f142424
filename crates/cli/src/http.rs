//! HTTP transport posting form-encoded queries with reqwest.
//!
//! Cancellation is by drop: when the session abandons a request, the
//! boxed future is dropped and reqwest aborts the connection.

use std::time::Duration;

use discovery::protocol::SearchRequestBody;
use discovery::{Error, Transport, TransportFuture};
use futures::FutureExt;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// [`Transport`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: reqwest::Client,
	base_url: Url,
}

impl HttpTransport {
	pub fn new(base_url: Url, timeout: Duration) -> crate::error::Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.user_agent(concat!("discover/", env!("CARGO_PKG_VERSION")))
			.build()
			.map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))?;
		Ok(Self { client, base_url })
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}
}

impl Transport for HttpTransport {
	fn send_paginated_query(&self, endpoint: &str, body: SearchRequestBody) -> TransportFuture {
		post(self.client.clone(), self.base_url.join(endpoint), body).boxed()
	}
}

async fn post(client: reqwest::Client, url: Result<Url, url::ParseError>, body: SearchRequestBody) -> discovery::Result<Value> {
	let url = url.map_err(|e| Error::Transport(format!("invalid endpoint: {e}")))?;
	debug!(target = "discover.http", %url, page_index = body.page_index, "POST");

	let response = client.post(url).form(&body).send().await.map_err(describe)?;
	let status = response.status();
	if !status.is_success() {
		return Err(Error::Transport(format!("server responded {status}")));
	}

	response.json::<Value>().await.map_err(|e| Error::MalformedResponse(e.to_string()))
}

fn describe(err: reqwest::Error) -> Error {
	if err.is_timeout() {
		Error::Transport(format!("request timed out: {err}"))
	} else if err.is_connect() {
		Error::Transport(format!("connection failed: {err}"))
	} else {
		Error::Transport(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn unreachable_host_is_transport_error() {
		let transport = HttpTransport::new(Url::parse("http://127.0.0.1:9").unwrap(), Duration::from_secs(2)).unwrap();
		let body = SearchRequestBody::new("x", 20, 0, std::iter::empty());

		let result = transport.send_paginated_query("/search/course_discovery/", body).await;
		assert!(matches!(result, Err(Error::Transport(_))));
	}

	#[test]
	fn endpoint_joins_base() {
		let transport = HttpTransport::new(Url::parse("https://courses.example.org/lms/").unwrap(), Duration::from_secs(1)).unwrap();
		assert_eq!(transport.base_url().join("search/").unwrap().as_str(), "https://courses.example.org/lms/search/");
	}
}
