//! Application services for pull-request-to-issue resolution.

mod resolver;

pub use resolver::IssueResolver;
