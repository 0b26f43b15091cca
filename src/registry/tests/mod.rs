//! Unit tests for the registries.
