//! Upgrade and build registries.
//!
//! Both registries hand out registry-unique revision numbers and answer the
//! lookups client installers use to discover newer versions. The next-gen
//! registry allocates a revision when an upgrade is inserted; the legacy
//! registry records CI builds and receives revisions administratively.
//!
//! - Domain types in [`domain`]
//! - The transactional store contract in [`ports`]
//! - In-memory and `PostgreSQL` stores in [`adapters`]
//! - Allocation and registry services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
