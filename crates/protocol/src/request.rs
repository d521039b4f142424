//! Request body posted to the search endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field carrying the free-text part of the query.
pub const SEARCH_STRING_FIELD: &str = "search_string";
/// Field carrying the requested page size.
pub const PAGE_SIZE_FIELD: &str = "page_size";
/// Field carrying the zero-based page index.
pub const PAGE_INDEX_FIELD: &str = "page_index";

/// Returns `true` for field names owned by the request itself.
///
/// Filters with these names never reach the wire.
pub fn is_reserved_field(name: &str) -> bool {
	matches!(name, SEARCH_STRING_FIELD | PAGE_SIZE_FIELD | PAGE_INDEX_FIELD)
}

/// Body of a single paginated query.
///
/// Serializes flat, with filters inlined next to the fixed fields:
/// ```json
/// {
///   "search_string": "rust async",
///   "page_size": 20,
///   "page_index": 0,
///   "org": "MITx"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequestBody {
	pub search_string: String,
	pub page_size: u32,
	pub page_index: u32,
	#[serde(flatten)]
	pub filters: BTreeMap<String, String>,
}

impl SearchRequestBody {
	/// Builds a body, dropping filters that collide with reserved fields.
	pub fn new<I>(search_string: impl Into<String>, page_size: u32, page_index: u32, filters: I) -> Self
	where
		I: IntoIterator<Item = (String, String)>,
	{
		Self {
			search_string: search_string.into(),
			page_size,
			page_index,
			filters: filters.into_iter().filter(|(key, _)| !is_reserved_field(key)).collect(),
		}
	}
}
