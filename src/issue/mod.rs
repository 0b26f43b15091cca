//! Pull-request-to-issue resolution.
//!
//! A merged pull request is tied to the issue its body names with a closing
//! keyword (`fixes #12`) or a progress keyword (`working on #12`). The module
//! follows hexagonal architecture:
//!
//! - Domain types and keyword scanning in [`domain`]
//! - The source-host contract in [`ports`]
//! - GitHub and in-memory hosts in [`adapters`]
//! - Resolution orchestration in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
