use discovery::Query;
use tracing::debug;

use crate::output::{CommandInputs, OutputFormat, ParseData, ResultBuilder, print_result};

pub fn execute(raw: &str, format: OutputFormat) {
	let query = Query::parse(raw);
	debug!(target = "discover.parse", filters = query.filters.len(), "parsed query");

	let result = ResultBuilder::new("parse")
		.inputs(CommandInputs {
			query: Some(raw.to_string()),
			..Default::default()
		})
		.data(ParseData {
			normalized: query.to_string(),
			query,
		})
		.build();

	print_result(&result, format);
}
