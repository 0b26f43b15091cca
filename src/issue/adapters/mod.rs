//! Adapter implementations of the source-host port.

pub mod github;
pub mod memory;

pub use github::{GITHUB_API_URL, GitHubSourceHost};
pub use memory::InMemorySourceHost;
