use std::fmt;

use clap::ValueEnum;

/// How a command result is written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// TOON envelope (compact, default)
	#[default]
	Toon,
	/// Pretty-printed JSON envelope
	Json,
	/// Single-line JSON envelope
	Ndjson,
	/// Plain text for terminals
	Text,
}

impl OutputFormat {
	/// `false` for [`OutputFormat::Text`], which is meant for people, not parsers.
	pub fn is_structured(self) -> bool {
		!matches!(self, OutputFormat::Text)
	}
}

impl fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.to_possible_value() {
			Some(value) => f.write_str(value.get_name()),
			None => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn names_match_flag_values() {
		assert_eq!(OutputFormat::from_str("NDJSON", true), Ok(OutputFormat::Ndjson));
		assert!(OutputFormat::from_str("yaml", true).is_err());
		assert_eq!(OutputFormat::Ndjson.to_string(), "ndjson");
		assert!(OutputFormat::Json.is_structured());
		assert!(!OutputFormat::Text.is_structured());
	}
}
