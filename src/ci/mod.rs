//! Starting release jobs on the CI server.
//!
//! - The trigger contract in [`ports`]
//! - The Jenkins adapter in [`jenkins`]

pub mod jenkins;
pub mod ports;

pub use jenkins::JenkinsTrigger;
pub use ports::{
    CLASSIC_RELEASE_JOB, CiTrigger, CiTriggerError, NEXT_GEN_RELEASE_JOB, ReleaseJob,
};

#[cfg(test)]
mod tests;
