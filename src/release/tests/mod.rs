//! Unit tests for release formatting.
