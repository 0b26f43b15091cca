//! Port contracts for pull request and issue lookups.
//!
//! Ports define infrastructure-agnostic interfaces used by issue services.

pub mod source_host;

pub use source_host::{SourceHost, SourceHostError, SourceHostResult};
