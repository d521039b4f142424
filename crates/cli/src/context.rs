//! Command context shared by all commands.

use std::path::PathBuf;

use crate::config::{Overrides, Settings};
use crate::error::Result;
use crate::output::OutputFormat;

pub struct CommandContext {
	overrides: Overrides,
	format: OutputFormat,
}

impl CommandContext {
	pub fn new(format: OutputFormat, config_path: Option<PathBuf>, base_url: Option<String>, page_size: Option<u32>) -> Self {
		Self {
			overrides: Overrides {
				config_path,
				base_url,
				page_size,
			},
			format,
		}
	}

	pub fn format(&self) -> OutputFormat {
		self.format
	}

	/// Resolves settings on demand so commands that need none never read config.
	pub fn settings(&self) -> Result<Settings> {
		Settings::resolve(&self.overrides)
	}
}
