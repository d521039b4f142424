//! Configuration file and effective settings.
//!
//! Settings resolve with precedence: command-line flag, then the JSON config
//! file (`~/.config/discover/config.json` unless `--config` is given), then
//! built-in defaults. A missing default config file is not an error; a
//! missing explicit one is.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use discovery::{DEFAULT_ENDPOINT, SessionConfig};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CliError, Result};
use crate::output::EffectiveConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const CONFIG_DIR: &str = "discover";
const CONFIG_FILE: &str = "config.json";

/// On-disk config file format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub endpoint: Option<String>,
	#[serde(default)]
	pub page_size: Option<u32>,
	#[serde(default)]
	pub timeout_ms: Option<u64>,
}

impl ConfigFile {
	/// Default config location under the user config directory.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
	}

	pub fn load(path: &Path) -> anyhow::Result<Self> {
		let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
		serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
	}
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
	pub config_path: Option<PathBuf>,
	pub base_url: Option<String>,
	pub page_size: Option<u32>,
}

/// Fully resolved settings for a command run.
#[derive(Debug, Clone)]
pub struct Settings {
	pub base_url: Url,
	pub session: SessionConfig,
	pub timeout: Duration,
	pub config_path: Option<PathBuf>,
}

impl Settings {
	/// Resolves settings from `overrides`, the config file, and defaults.
	pub fn resolve(overrides: &Overrides) -> Result<Self> {
		let (file, config_path) = match &overrides.config_path {
			Some(path) => {
				let file = ConfigFile::load(path).map_err(|source| CliError::Config { path: path.clone(), source })?;
				(file, Some(path.clone()))
			}
			None => match ConfigFile::default_path().filter(|p| p.is_file()) {
				Some(path) => {
					let file = ConfigFile::load(&path).map_err(|source| CliError::Config { path: path.clone(), source })?;
					(file, Some(path))
				}
				None => (ConfigFile::default(), None),
			},
		};

		Self::merge(overrides, file, config_path)
	}

	fn merge(overrides: &Overrides, file: ConfigFile, config_path: Option<PathBuf>) -> Result<Self> {
		let base_url = overrides.base_url.clone().or(file.base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
		let base_url = Url::parse(&base_url).map_err(|e| CliError::InvalidInput(format!("invalid base URL '{base_url}': {e}")))?;

		let mut session = SessionConfig::new().with_endpoint(file.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()));
		if let Some(page_size) = overrides.page_size.or(file.page_size) {
			session = session.with_page_size(page_size)?;
		}

		Ok(Self {
			base_url,
			session,
			timeout: Duration::from_millis(file.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)),
			config_path,
		})
	}

	pub fn effective(&self) -> EffectiveConfig {
		EffectiveConfig {
			base_url: self.base_url.to_string(),
			endpoint: self.session.endpoint().to_string(),
			page_size: self.session.page_size(),
			timeout_ms: self.timeout.as_millis() as u64,
			config_path: self.config_path.clone(),
		}
	}
}
