//! `discover search`: one search plus optional further pages.

use std::time::Instant;

use discovery::SearchSession;
use tracing::{debug, info, warn};

use crate::context::CommandContext;
use crate::error::Result;
use crate::http::HttpTransport;
use crate::output::{CommandInputs, DiagnosticLevel, ResultBuilder, SearchData, print_result};

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
	/// Further pages to load after the first.
	pub pages: u32,
	/// Load until the service reports no more results.
	pub all: bool,
	pub include_results: bool,
}

impl SearchOptions {
	fn wants_more(&self, loaded: u32, has_next_page: bool) -> bool {
		has_next_page && (self.all || loaded < self.pages)
	}
}

/// How the paging loop ended.
#[derive(Debug, Default)]
struct Progress {
	further_pages: u32,
	page_error: Option<discovery::Error>,
}

pub async fn execute(raw: &str, options: SearchOptions, ctx: &CommandContext) -> Result<()> {
	let start = Instant::now();
	let settings = ctx.settings()?;
	let transport = HttpTransport::new(settings.base_url.clone(), settings.timeout)?;
	let session = SearchSession::new(transport, settings.session.clone());
	let mut events = session.subscribe();

	info!(target = "discover.search", query = raw, base_url = %settings.base_url, "searching");

	let mut progress = Progress::default();
	let interrupted = tokio::select! {
		outcome = drive(&session, raw, options, &mut progress) => {
			outcome?;
			false
		}
		_ = tokio::signal::ctrl_c() => {
			session.cancel();
			warn!(target = "discover.search", "interrupted, request cancelled");
			true
		}
	};

	for event in events.drain() {
		debug!(target = "discover.search", %event, "session event");
	}

	let mut builder = ResultBuilder::new("search")
		.started_at(start)
		.inputs(CommandInputs {
			query: Some(raw.to_string()),
			pages: (!options.all).then_some(options.pages),
			all: options.all,
		})
		.config(settings.effective());

	if interrupted {
		builder = builder.diagnostic(DiagnosticLevel::Warning, "interrupted; loaded results were discarded");
	}
	if let Some(err) = &progress.page_error {
		builder = builder.diagnostic_with_source(
			DiagnosticLevel::Warning,
			format!("stopped paging: {err}"),
			"loadNextPage",
		);
	}

	let data = SearchData {
		session: session.snapshot(),
		pages_loaded: if interrupted { 0 } else { 1 + progress.further_pages },
		interrupted,
		results: options.include_results.then(|| session.results()),
	};

	print_result(&builder.data(data).build(), ctx.format());
	Ok(())
}

/// Runs the first search, then pages while `options` asks for more.
///
/// A failed first search is an error. A failed later page stops paging and
/// is recorded in `progress`; the pages already held stay valid.
async fn drive(session: &SearchSession<HttpTransport>, raw: &str, options: SearchOptions, progress: &mut Progress) -> Result<()> {
	session.search(raw).await?;
	debug!(
		target = "discover.search",
		total = session.total_count(),
		received = session.latest_page_count(),
		"first page loaded"
	);

	while options.wants_more(progress.further_pages, session.has_next_page()) {
		match session.load_next_page().await {
			Ok(()) => progress.further_pages += 1,
			Err(err) => {
				warn!(target = "discover.search", page = session.page() + 1, error = %err, "next page failed");
				progress.page_error = Some(err);
				break;
			}
		}
	}

	Ok(())
}
