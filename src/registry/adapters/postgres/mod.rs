//! `PostgreSQL` adapters for registry persistence.

mod models;
mod schema;
mod store;

pub use store::{PgRecord, PostgresRegistryStore, RegistryPgPool};
