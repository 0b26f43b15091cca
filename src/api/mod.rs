//! Framework-agnostic handlers for the public operations.
//!
//! A hosting layer maps each handler onto a route:
//!
//! - [`NextGenApi`] serves `/api/nextgen/*`
//! - [`LegacyApi`] serves `/api/oldapsim/*`
//! - [`WebhookIntake`] serves both `webhook` routes
//!
//! Every failure is reported as an [`ApiError`] whose [`ErrorKind`] decides
//! the response status.

mod error;
mod files;
mod legacy;
mod nextgen;
mod webhook;

pub use error::{ApiError, ApiResult, ErrorKind};
pub use files::{PublishedDirectory, PublishedFiles};
pub use legacy::LegacyApi;
pub use nextgen::NextGenApi;
pub use webhook::{IgnoreReason, WebhookIntake, WebhookOutcome};

#[cfg(test)]
mod tests;
