//! Domain model for pull-request-to-issue resolution.

mod error;
mod ids;
mod keyword;
mod metadata;

pub use error::IssueDomainError;
pub use ids::{IssueNumber, PullRequestNumber, RepositoryFullName};
pub use keyword::{
    CLOSING_KEYWORDS, IssueRelation, KeywordMatch, KeywordResolver, PROGRESS_KEYWORDS,
};
pub use metadata::{IssueMetadata, PullRequestDetails, PullRequestMetadata};
