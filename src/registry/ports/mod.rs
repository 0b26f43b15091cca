//! Port contracts for registry persistence.
//!
//! Every registry operation runs as one unit of work: a closure handed a
//! [`RegistryTransaction`] that commits when the closure succeeds and rolls
//! back otherwise.

pub mod store;

pub use store::{
    RecordLookup, RegistryError, RegistryResult, RegistryStore, RegistryTransaction,
};
