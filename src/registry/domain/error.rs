//! Errors raised by record state transitions.

use super::{RecordId, Revision};
use thiserror::Error;

/// A mutation was rejected because of the record's current state.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RecordStateError {
    /// The build already has a recorded result.
    #[error("build {0} has already finished")]
    BuildAlreadyFinished(RecordId),

    /// The record already carries a different revision.
    #[error("record {id} already has revision {revision}")]
    RevisionAlreadyAssigned {
        /// Record that was targeted.
        id: RecordId,
        /// Revision the record already carries.
        revision: Revision,
    },
}
