use clap::Parser;
use discovery_cli::cli::Cli;
use discovery_cli::context::CommandContext;
use discovery_cli::output::{ResultBuilder, print_error_stderr, print_result};
use discovery_cli::{commands, logging};
use tracing::error;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;
	let command_name = cli.command.name();
	let ctx = CommandContext::new(format, cli.config, cli.base_url, cli.page_size);

	if let Err(err) = commands::dispatch(cli.command, &ctx).await {
		error!(target = "discover", error = %err, "command failed");
		let command_error = err.to_command_error();
		if format.is_structured() {
			print_result(&ResultBuilder::<()>::new(command_name).error(command_error).build(), format);
		} else {
			print_error_stderr(&command_error);
		}
		std::process::exit(1);
	}
}
