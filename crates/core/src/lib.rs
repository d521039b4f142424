// discovery: search-session manager for paginated search services
//
// The transport is supplied by the caller; this crate owns query parsing,
// request cancellation and pagination bookkeeping.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod query;
pub mod session;
pub mod testing;
pub mod transport;

pub use config::{DEFAULT_ENDPOINT, DEFAULT_PAGE_SIZE, SessionConfig};
pub use dispatcher::{PageRequest, RequestKind, ResultPage};
pub use error::{Error, Result};
pub use events::{EventStream, SessionEvent};
pub use query::Query;
pub use session::{SearchSession, SessionPhase, SessionSnapshot};
pub use transport::{Transport, TransportFuture};

pub use discovery_protocol as protocol;
