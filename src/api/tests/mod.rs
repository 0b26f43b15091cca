//! Unit tests for the operation handlers.

mod nextgen_tests;
