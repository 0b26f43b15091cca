//! Unit tests for issue resolution.

mod github_tests;
