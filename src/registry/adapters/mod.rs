//! Adapter implementations of the registry store port.

pub mod memory;
pub mod postgres;
