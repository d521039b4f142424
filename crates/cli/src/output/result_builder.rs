use std::io::{self, Write};
use std::time::Instant;

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use crate::output::format::OutputFormat;
use crate::output::model::{CommandError, CommandInputs, CommandResult, Diagnostic, DiagnosticLevel, EffectiveConfig, ErrorCode, SCHEMA_VERSION};

/// Builder for constructing command results.
pub struct ResultBuilder<T: Serialize> {
	command: String,
	inputs: Option<CommandInputs>,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
	diagnostics: Vec<Diagnostic>,
	config: Option<EffectiveConfig>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			inputs: None,
			data: None,
			error: None,
			start_time: Instant::now(),
			diagnostics: Vec::new(),
			config: None,
		}
	}

	/// Backdates the duration measurement to `start`.
	pub fn started_at(mut self, start: Instant) -> Self {
		self.start_time = start;
		self
	}

	pub fn inputs(mut self, inputs: CommandInputs) -> Self {
		self.inputs = Some(inputs);
		self
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	pub fn error_code(self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error(CommandError {
			code,
			message: message.into(),
			details: None,
		})
	}

	pub fn diagnostic(mut self, level: DiagnosticLevel, message: impl Into<String>) -> Self {
		self.diagnostics.push(Diagnostic {
			level,
			message: message.into(),
			source: None,
		});
		self
	}

	pub fn diagnostic_with_source(mut self, level: DiagnosticLevel, message: impl Into<String>, source: impl Into<String>) -> Self {
		self.diagnostics.push(Diagnostic {
			level,
			message: message.into(),
			source: Some(source.into()),
		});
		self
	}

	pub fn config(mut self, config: EffectiveConfig) -> Self {
		self.config = Some(config);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();

		CommandResult {
			schema_version: Some(SCHEMA_VERSION),
			ok,
			command: self.command,
			inputs: self.inputs,
			data: self.data,
			error: self.error,
			duration_ms: Some(self.start_time.elapsed().as_millis() as u64),
			diagnostics: self.diagnostics,
			config: self.config,
		}
	}
}

/// Print a command result to stdout in the specified format.
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	let mut stdout = io::stdout().lock();
	if let Err(err) = write_result(&mut stdout, result, format) {
		tracing::debug!(target = "discover.output", error = %err, "stdout write failed");
	}
}

/// Renders `result` into `out`. Serialization failures surface as
/// [`io::ErrorKind::InvalidData`].
pub fn write_result<T: Serialize>(out: &mut impl Write, result: &CommandResult<T>, format: OutputFormat) -> io::Result<()> {
	match format {
		OutputFormat::Toon => writeln!(out, "{}", toon::encode(&to_value(result)?, None)),
		OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(result).map_err(io::Error::from)?),
		OutputFormat::Ndjson => writeln!(out, "{}", serde_json::to_string(result).map_err(io::Error::from)?),
		OutputFormat::Text => write_text(out, result),
	}
}

fn to_value<T: Serialize>(value: &T) -> io::Result<Value> {
	serde_json::to_value(value).map_err(io::Error::from)
}

/// One `key: value` line per top-level data field; nested values stay compact JSON.
fn write_text<T: Serialize>(out: &mut impl Write, result: &CommandResult<T>) -> io::Result<()> {
	match (&result.data, &result.error) {
		(Some(data), None) => match to_value(data)? {
			Value::Object(fields) => {
				for (key, value) in fields {
					match value {
						Value::String(s) => writeln!(out, "{}: {s}", key.bold())?,
						other => writeln!(out, "{}: {other}", key.bold())?,
					}
				}
			}
			other => writeln!(out, "{other}")?,
		},
		(_, Some(error)) => writeln!(out, "{} [{}]: {}", "Error".red().bold(), error.code, error.message)?,
		(None, None) => {}
	}

	for diag in &result.diagnostics {
		let level = match diag.level {
			DiagnosticLevel::Info => "info".cyan(),
			DiagnosticLevel::Warning => "warning".yellow(),
			DiagnosticLevel::Error => "error".red(),
		};
		match &diag.source {
			Some(source) => writeln!(out, "[{level}:{source}] {}", diag.message)?,
			None => writeln!(out, "[{level}] {}", diag.message)?,
		}
	}

	if let Some(duration_ms) = result.duration_ms {
		writeln!(out, "{}", format!("{} in {duration_ms}ms", result.command).dimmed())?;
	}
	Ok(())
}

/// Print an error to stderr in human-readable format.
pub fn print_error_stderr(error: &CommandError) {
	eprintln!("{} [{}]: {}", "Error".red().bold(), error.code, error.message);
}
