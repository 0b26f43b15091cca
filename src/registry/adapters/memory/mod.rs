//! In-memory adapter for registry persistence.

mod store;

pub use store::InMemoryRegistryStore;
