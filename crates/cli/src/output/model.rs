use std::path::PathBuf;

use discovery::{Query, SessionSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current schema version for command output.
pub const SCHEMA_VERSION: u32 = 1;

/// The result envelope returned by all commands.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub schema_version: Option<u32>,
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub inputs: Option<CommandInputs>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u64>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub diagnostics: Vec<Diagnostic>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub config: Option<EffectiveConfig>,
}

/// Inputs used for a command execution.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommandInputs {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub query: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pages: Option<u32>,
	#[serde(skip_serializing_if = "std::ops::Not::not", default)]
	pub all: bool,
}

/// Error information for failed commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Value>,
}

/// Standardized error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	TransportError,
	MalformedResponse,
	Cancelled,
	ConfigError,
	InvalidInput,
	IoError,
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::TransportError => write!(f, "TRANSPORT_ERROR"),
			ErrorCode::MalformedResponse => write!(f, "MALFORMED_RESPONSE"),
			ErrorCode::Cancelled => write!(f, "CANCELLED"),
			ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::IoError => write!(f, "IO_ERROR"),
			ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
		}
	}
}

/// Diagnostic message attached to a command result.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
	pub level: DiagnosticLevel,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
	Info,
	Warning,
	Error,
}

/// Effective configuration used for command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
	pub base_url: String,
	pub endpoint: String,
	pub page_size: u32,
	pub timeout_ms: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub config_path: Option<PathBuf>,
}

/// Result data for the parse command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseData {
	pub query: Query,
	pub normalized: String,
}

/// Result data for the search command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
	pub session: SessionSnapshot,
	pub pages_loaded: u32,
	pub interrupted: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub results: Option<Vec<Value>>,
}

/// A command result with no payload data.
pub type EmptyResult = CommandResult<()>;
