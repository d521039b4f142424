//! Wire types for the paginated search service.
//!
//! This crate contains the serde-serializable shapes exchanged with the
//! search endpoint: the request body posted for every page and the response
//! envelope that comes back.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * Minimal: Only the fields the session depends on are modelled
//! * Stable: Changes only when the service's wire format changes
//!
//! Session semantics (cancellation, pagination bookkeeping) are built on top
//! of these types in `discovery-rs`.

pub mod envelope;
pub mod request;

pub use envelope::*;
pub use request::*;
