//! Response envelope returned by the search endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Member wrapping the payload of each hit.
pub const RECORD_DATA_FIELD: &str = "data";

/// One page of results as sent by the service.
///
/// ```json
/// {
///   "total": 45,
///   "results": [
///     { "data": { "course": "course-v1:MITx+6.00x", "content": { ... } } },
///     ...
///   ]
/// }
/// ```
///
/// Fields other than `results` and `total` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
	pub results: Vec<Value>,
	pub total: u64,
}

impl ResponseEnvelope {
	/// Decodes an envelope from a raw JSON response.
	///
	/// Fails when `results` is missing or not an array, or when `total` is
	/// missing or not a non-negative integer.
	pub fn from_value(value: Value) -> serde_json::Result<Self> {
		serde_json::from_value(value)
	}

	/// Consumes the envelope, returning its records with the `data` wrapper removed.
	pub fn into_records(self) -> Vec<Value> {
		self.results.into_iter().map(unwrap_record).collect()
	}
}

/// Returns the `data` member of a hit, or the hit itself when it has none.
pub fn unwrap_record(mut record: Value) -> Value {
	if let Value::Object(map) = &mut record {
		if let Some(data) = map.remove(RECORD_DATA_FIELD) {
			return data;
		}
	}
	record
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn decodes_results_and_total() {
		let envelope = ResponseEnvelope::from_value(json!({
			"total": 45,
			"max_score": 1.5,
			"results": [{"data": {"id": 1}}, {"data": {"id": 2}}]
		}))
		.unwrap();

		assert_eq!(envelope.total, 45);
		assert_eq!(envelope.into_records(), vec![json!({"id": 1}), json!({"id": 2})]);
	}

	#[test]
	fn records_without_data_are_kept() {
		assert_eq!(unwrap_record(json!({"id": 7})), json!({"id": 7}));
		assert_eq!(unwrap_record(json!("plain")), json!("plain"));
	}

	#[test]
	fn rejects_missing_fields() {
		assert!(ResponseEnvelope::from_value(json!({"results": []})).is_err());
		assert!(ResponseEnvelope::from_value(json!({"total": 3})).is_err());
		assert!(ResponseEnvelope::from_value(json!({"results": {}, "total": 3})).is_err());
		assert!(ResponseEnvelope::from_value(json!({"results": [], "total": -1})).is_err());
	}
}
