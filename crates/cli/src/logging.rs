//! Diagnostics go to stderr so stdout only ever carries the result envelope.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
fn default_directives(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "error",
		1 => "warn,discovery_cli=info,discovery=debug",
		2 => "info,discovery_cli=debug,discovery=trace",
		_ => "trace",
	}
}

pub fn init_logging(verbosity: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbosity > 1)
		.compact()
		.init();
}
