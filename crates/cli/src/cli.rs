use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

const STYLES: Styles = Styles::styled()
	.header(AnsiColor::Yellow.on_default().bold())
	.usage(AnsiColor::Yellow.on_default().bold())
	.literal(AnsiColor::Blue.on_default().bold())
	.placeholder(AnsiColor::Blue.on_default())
	.error(AnsiColor::Red.on_default().bold());

#[derive(Parser, Debug)]
#[command(name = "discover")]
#[command(about = "Course discovery search from the command line")]
#[command(version)]
#[command(styles = STYLES)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short, long, global = true, value_enum, default_value = "toon")]
	pub format: OutputFormat,

	/// Config file (defaults to the user config directory)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Base URL of the search service
	#[arg(long, global = true, value_name = "URL")]
	pub base_url: Option<String>,

	/// Results requested per page
	#[arg(long, global = true, value_name = "N")]
	pub page_size: Option<u32>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Show how a query splits into free text and filters
	Parse {
		/// Raw query, e.g. "intro rust org:MITx"
		query: String,
	},

	/// Run a search and optionally load further pages
	#[command(alias = "s")]
	Search {
		/// Raw query, e.g. "intro rust org:MITx"
		query: String,

		/// Further pages to load after the first
		#[arg(short, long, default_value = "0")]
		pages: u32,

		/// Keep loading pages while the service reports more
		#[arg(long, conflicts_with = "pages")]
		all: bool,

		/// Include the loaded result records in the output
		#[arg(long)]
		results: bool,
	},

	/// Show the effective configuration
	Config,
}

impl Commands {
	/// Name reported in the output envelope.
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Parse { .. } => "parse",
			Commands::Search { .. } => "search",
			Commands::Config => "config",
		}
	}
}
