//! Unit tests for CI triggering.
