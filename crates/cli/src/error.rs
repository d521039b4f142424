use std::path::PathBuf;

use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("config error: {}", path.display())]
	Config {
		path: PathBuf,
		#[source]
		source: anyhow::Error,
	},

	#[error(transparent)]
	Search(#[from] discovery::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl CliError {
	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let (code, message, details) = match self {
			CliError::InvalidInput(msg) => (ErrorCode::InvalidInput, msg.clone(), None),
			CliError::Config { path, source } => (
				ErrorCode::ConfigError,
				format!("Config file {} rejected: {source:#}", path.display()),
				Some(serde_json::json!({ "path": path })),
			),
			CliError::Search(err) => {
				let code = match err {
					discovery::Error::Transport(_) | discovery::Error::ChannelClosed => ErrorCode::TransportError,
					discovery::Error::MalformedResponse(_) | discovery::Error::Json(_) => ErrorCode::MalformedResponse,
					discovery::Error::Cancelled => ErrorCode::Cancelled,
					discovery::Error::InvalidConfig(_) => ErrorCode::InvalidInput,
				};
				(code, err.to_string(), None)
			}
			CliError::Io(err) => (ErrorCode::IoError, err.to_string(), None),
			CliError::Json(err) => (ErrorCode::InternalError, format!("JSON error: {err}"), None),
			CliError::Anyhow(err) => (ErrorCode::InternalError, format!("{err:#}"), None),
		};

		CommandError { code, message, details }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn search_errors_map_to_codes() {
		let err = CliError::from(discovery::Error::Transport("connection refused".into()));
		assert_eq!(err.to_command_error().code, ErrorCode::TransportError);

		let err = CliError::from(discovery::Error::MalformedResponse("missing field `total`".into()));
		let command_error = err.to_command_error();
		assert_eq!(command_error.code, ErrorCode::MalformedResponse);
		assert!(command_error.message.contains("total"));

		let err = CliError::from(discovery::Error::InvalidConfig("page size must be greater than zero".into()));
		assert_eq!(err.to_command_error().code, ErrorCode::InvalidInput);
	}

	#[test]
	fn config_error_carries_path() {
		let err = CliError::Config {
			path: PathBuf::from("/tmp/discover.json"),
			source: anyhow::anyhow!("expected value at line 1"),
		};
		let command_error = err.to_command_error();
		assert_eq!(command_error.code, ErrorCode::ConfigError);
		assert_eq!(command_error.details.unwrap()["path"], "/tmp/discover.json");
	}
}
