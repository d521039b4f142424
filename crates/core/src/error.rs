// Error types for discovery sessions

use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a search session
#[derive(Debug, Error)]
pub enum Error {
	/// Request was superseded by a newer one or by `cancel()`
	///
	/// Never user-visible: the session absorbs it without emitting an event
	/// and without touching its state.
	#[error("Request cancelled: superseded by a newer request")]
	Cancelled,

	/// Transport-level failure (network, non-success status, server error)
	#[error("Transport error: {0}")]
	Transport(String),

	/// Response did not match the `{ results, total }` envelope
	///
	/// Propagated exactly like [`Error::Transport`].
	#[error("Malformed response: {0}")]
	MalformedResponse(String),

	/// Session configuration was rejected
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	/// JSON serialization/deserialization error
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// Channel closed unexpectedly
	#[error("Channel closed unexpectedly")]
	ChannelClosed,
}

impl Error {
	/// Returns `true` when the request was superseded rather than failed.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Error::Cancelled)
	}

	/// Returns `true` for errors that surface as a `failed` notification.
	pub fn is_failure(&self) -> bool {
		matches!(self, Error::Transport(_) | Error::MalformedResponse(_) | Error::Json(_) | Error::ChannelClosed)
	}
}
