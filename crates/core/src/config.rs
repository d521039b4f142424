//! Session configuration.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Endpoint the course discovery service answers on.
pub const DEFAULT_ENDPOINT: &str = "/search/course_discovery/";

/// Results requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = NonZeroU32::new(20).unwrap();

/// Fixed parameters of a [`SearchSession`](crate::SearchSession).
///
/// Both values are set once at construction; the session never changes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
	endpoint: String,
	page_size: NonZeroU32,
}

impl SessionConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the endpoint passed to the transport with every request.
	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = endpoint.into();
		self
	}

	/// Sets the page size.
	///
	/// # Errors
	///
	/// [`Error::InvalidConfig`] when `page_size` is zero.
	pub fn with_page_size(mut self, page_size: u32) -> Result<Self> {
		self.page_size = NonZeroU32::new(page_size).ok_or_else(|| Error::InvalidConfig("page size must be greater than zero".to_string()))?;
		Ok(self)
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub fn page_size(&self) -> u32 {
		self.page_size.get()
	}
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			endpoint: DEFAULT_ENDPOINT.to_string(),
			page_size: DEFAULT_PAGE_SIZE,
		}
	}
}
