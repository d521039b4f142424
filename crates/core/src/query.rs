//! Query-token parsing.
//!
//! A raw query is split on whitespace. Tokens of the form `key:value` (with
//! the colon after at least one character) become filters; every other token
//! is kept, in order, as free text.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured form of a raw query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
	pub free_text: String,
	pub filters: BTreeMap<String, String>,
}

impl Query {
	/// Parses a raw query into free text and `key:value` filters.
	///
	/// Only the first `:` separates key from value, so `time:10:30` yields
	/// the filter `time = "10:30"`. A leading colon does not make a filter.
	/// Later duplicates of a key overwrite earlier ones.
	///
	/// # Example
	///
	/// ```ignore
	/// let query = Query::parse("foo bar org:MITx");
	/// assert_eq!(query.free_text, "foo bar");
	/// assert_eq!(query.filters["org"], "MITx");
	/// ```
	pub fn parse(raw: &str) -> Self {
		let mut words = Vec::new();
		let mut filters = BTreeMap::new();

		for token in raw.split_whitespace() {
			match token.split_once(':') {
				Some((key, value)) if !key.is_empty() => {
					filters.insert(key.to_string(), value.to_string());
				}
				_ => words.push(token),
			}
		}

		Self {
			free_text: words.join(" "),
			filters,
		}
	}

	/// Returns `true` when the query has neither free text nor filters.
	pub fn is_empty(&self) -> bool {
		self.free_text.is_empty() && self.filters.is_empty()
	}

	pub fn filter(&self, key: &str) -> Option<&str> {
		self.filters.get(key).map(String::as_str)
	}
}

/// Renders the query back into raw form, filters in key order.
impl fmt::Display for Query {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut first = true;
		if !self.free_text.is_empty() {
			f.write_str(&self.free_text)?;
			first = false;
		}
		for (key, value) in &self.filters {
			if !first {
				f.write_str(" ")?;
			}
			write!(f, "{key}:{value}")?;
			first = false;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_free_text_and_filters() {
		let query = Query::parse("foo bar key:val");
		assert_eq!(query.free_text, "foo bar");
		assert_eq!(query.filters.len(), 1);
		assert_eq!(query.filter("key"), Some("val"));
	}

	#[test]
	fn leading_colon_is_free_text() {
		let query = Query::parse(":leading bar");
		assert_eq!(query.free_text, ":leading bar");
		assert!(query.filters.is_empty());
	}

	#[test]
	fn last_duplicate_wins() {
		let query = Query::parse("a:1 a:2");
		assert_eq!(query.free_text, "");
		assert_eq!(query.filter("a"), Some("2"));
		assert_eq!(query.filters.len(), 1);
	}

	#[test]
	fn value_keeps_later_colons() {
		let query = Query::parse("start:10:30 talk");
		assert_eq!(query.filter("start"), Some("10:30"));
		assert_eq!(query.free_text, "talk");
	}

	#[test]
	fn empty_value_is_still_a_filter() {
		let query = Query::parse("org: physics");
		assert_eq!(query.filter("org"), Some(""));
		assert_eq!(query.free_text, "physics");
	}

	#[test]
	fn whitespace_runs_collapse() {
		let query = Query::parse("  intro \t to\n  rust  ");
		assert_eq!(query.free_text, "intro to rust");
	}

	#[test]
	fn blank_input_is_empty() {
		assert!(Query::parse("").is_empty());
		assert!(Query::parse("   ").is_empty());
		assert!(!Query::parse("x").is_empty());
	}

	#[test]
	fn display_renders_filters_in_key_order() {
		let query = Query::parse("lang:en intro org:MITx");
		assert_eq!(query.to_string(), "intro lang:en org:MITx");
		assert_eq!(Query::parse("org:MITx").to_string(), "org:MITx");
	}
}
