//! APSIM builds: release registry and revision resolution.
//!
//! This crate tracks released builds of the APSIM modelling framework. It
//! hands every accepted change a registry-unique revision number, answers
//! the queries client installers use to discover newer versions, and ties
//! merged pull requests to the issues they resolve.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, APIs, etc.)
//!
//! # Modules
//!
//! - [`registry`]: Upgrade and build registries with revision allocation
//! - [`issue`]: Pull-request-to-issue resolution
//! - [`release`]: Version strings, installer names and download links
//! - [`ci`]: Release job triggering
//! - [`api`]: Framework-agnostic operation handlers
//! - [`config`]: Environment configuration

pub mod api;
pub mod ci;
pub mod config;
pub mod issue;
pub mod registry;
pub mod release;

#[cfg(test)]
mod test_support;
