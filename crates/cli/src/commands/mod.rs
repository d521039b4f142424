mod config;
mod parse;
mod search;

use crate::cli::Commands;
use crate::context::CommandContext;
use crate::error::Result;

pub use search::SearchOptions;

pub async fn dispatch(command: Commands, ctx: &CommandContext) -> Result<()> {
	match command {
		Commands::Parse { query } => parse::execute(&query, ctx.format()),
		Commands::Search { query, pages, all, results } => {
			let options = SearchOptions {
				pages,
				all,
				include_results: results,
			};
			search::execute(&query, options, ctx).await?
		}
		Commands::Config => config::execute(ctx)?,
	}

	Ok(())
}
