//! Application services for the upgrade and build registries.

mod allocator;
mod builds;
mod registry;
mod upgrades;

pub use allocator::RevisionAllocator;
pub use registry::{BuildRegistry, Registry, UpgradeRegistry};
