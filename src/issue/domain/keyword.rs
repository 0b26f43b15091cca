//! Closing-keyword scanning over pull request bodies.
//!
//! A pull request body may mention several issues. By convention the first
//! keyword reference in the text is authoritative: `fixes #12, also working
//! on #9` resolves issue 12, while `working on #9, fixes #12` only records
//! progress on issue 9.

use super::IssueNumber;
use regex::Regex;
use std::sync::LazyLock;

/// Keywords that close the referenced issue when the pull request merges.
pub const CLOSING_KEYWORDS: &[&str] = &[
    "close", "closes", "closed", "fix", "fixes", "fixed", "resolve", "resolves", "resolved",
];

/// Keywords that only record progress towards the referenced issue.
pub const PROGRESS_KEYWORDS: &[&str] = &["working on"];

#[expect(
    clippy::expect_used,
    reason = "the standard keyword set is fixed and escaped, so the pattern always compiles"
)]
static STANDARD_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    build_pattern(CLOSING_KEYWORDS, PROGRESS_KEYWORDS).expect("standard keyword pattern")
});

/// How a pull request relates to the issue it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueRelation {
    /// The pull request resolves the issue.
    Resolves,
    /// The pull request works towards the issue without closing it.
    WorkingOn,
}

/// The earliest keyword reference found in a body of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordMatch {
    issue: IssueNumber,
    relation: IssueRelation,
    offset: usize,
}

impl KeywordMatch {
    /// Returns the referenced issue.
    #[must_use]
    pub const fn issue(&self) -> IssueNumber {
        self.issue
    }

    /// Returns the relation implied by the matched keyword.
    #[must_use]
    pub const fn relation(&self) -> IssueRelation {
        self.relation
    }

    /// Returns `true` when a closing keyword matched.
    #[must_use]
    pub const fn resolves(&self) -> bool {
        matches!(self.relation, IssueRelation::Resolves)
    }

    /// Byte offset of the keyword within the scanned text.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

/// Scans free text for `<keyword> #<digits>` issue references.
///
/// Matching is case-insensitive and any amount of whitespace may separate
/// the keyword from the reference. Keywords may end a longer word, so
/// `hotfix #12` resolves issue 12.
///
/// # Examples
///
///     use apsim_builds::issue::domain::KeywordResolver;
///
///     let resolver = KeywordResolver::default();
///     let found = resolver.resolve("Fixes #12, also working on #9").expect("match");
///     assert_eq!(found.issue().value(), 12);
///     assert!(found.resolves());
///     assert!(resolver.resolve("see #5 for context").is_none());
#[derive(Debug, Clone)]
pub struct KeywordResolver {
    pattern: Option<Regex>,
}

impl KeywordResolver {
    /// Creates a resolver over custom keyword sets.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`regex::Error`] if the combined pattern
    /// exceeds the regex engine's size limits.
    pub fn with_keywords(closing: &[&str], progress: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: build_pattern(closing, progress)?,
        })
    }

    /// Finds the earliest keyword reference in `body`.
    ///
    /// References whose digits do not fit an issue number are skipped.
    #[must_use]
    pub fn resolve(&self, body: &str) -> Option<KeywordMatch> {
        let pattern = self.pattern.as_ref()?;
        pattern.captures_iter(body).find_map(|captures| {
            let whole = captures.get(0)?;
            let issue = captures.name("issue")?.as_str().parse::<u32>().ok()?;
            let relation = if captures.name("closing").is_some() {
                IssueRelation::Resolves
            } else {
                IssueRelation::WorkingOn
            };
            Some(KeywordMatch {
                issue: IssueNumber::new(issue),
                relation,
                offset: whole.start(),
            })
        })
    }
}

impl Default for KeywordResolver {
    fn default() -> Self {
        Self {
            pattern: STANDARD_PATTERN.clone(),
        }
    }
}

/// Builds one alternation so the leftmost match across every keyword wins.
///
/// Returns `None` when both keyword sets are empty.
fn build_pattern(closing: &[&str], progress: &[&str]) -> Result<Option<Regex>, regex::Error> {
    let groups = [("closing", closing), ("progress", progress)]
        .into_iter()
        .filter_map(|(name, keywords)| {
            let alternatives = keywords
                .iter()
                .map(|keyword| keyword_pattern(keyword))
                .filter(|pattern| !pattern.is_empty())
                .collect::<Vec<_>>();
            (!alternatives.is_empty())
                .then(|| format!("(?P<{name}>{})", alternatives.join("|")))
        })
        .collect::<Vec<_>>();

    if groups.is_empty() {
        return Ok(None);
    }

    Regex::new(&format!(
        r"(?i)(?:{})\s+#(?P<issue>\d+)",
        groups.join("|")
    ))
    .map(Some)
}

fn keyword_pattern(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}
