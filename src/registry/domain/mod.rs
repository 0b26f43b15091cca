//! Domain model for the upgrade and build registries.

mod build;
mod error;
mod ids;
mod query;
mod record;
mod upgrade;

pub use build::{BuildDraft, BuildOutcome, BuildRecord, NewBuild, PersistedBuildData};
pub use error::RecordStateError;
pub use ids::{RecordId, Revision};
pub use query::{ListQuery, most_recent_first};
pub use record::{Administrative, AssignableRevision, AtInsert, RegistryRecord, RevisionPolicy};
pub use upgrade::{NewUpgrade, PersistedUpgradeData, UpgradeDraft, UpgradeRecord};
