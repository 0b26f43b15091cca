//! Tests for decoding GitHub REST payloads.

use crate::issue::adapters::github::{issue_metadata, pull_request_details};
use crate::issue::domain::{IssueNumber, PullRequestNumber};
use crate::issue::ports::SourceHostError;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn issue_records_rest_url() {
    let payload = json!({
        "number": 8100,
        "title": "Soil water overflows",
        "url": "https://api.github.com/repos/APSIMInitiative/ApsimX/issues/8100",
        "html_url": "https://github.com/APSIMInitiative/ApsimX/issues/8100"
    })
    .to_string();

    let issue = issue_metadata(IssueNumber::new(8100), payload.as_bytes()).expect("issue");

    assert_eq!(issue.number(), IssueNumber::new(8100));
    assert_eq!(issue.title(), "Soil water overflows");
    assert_eq!(
        issue.url(),
        "https://api.github.com/repos/APSIMInitiative/ApsimX/issues/8100"
    );
}

#[rstest]
fn pull_request_without_body_reads_as_empty() {
    let payload = json!({
        "title": "Tidy up",
        "body": null,
        "user": { "login": "hol430" }
    })
    .to_string();

    let details =
        pull_request_details(PullRequestNumber::new(7), payload.as_bytes()).expect("details");

    assert_eq!(details.number, PullRequestNumber::new(7));
    assert_eq!(details.body, "");
    assert_eq!(details.author, "hol430");
}

#[rstest]
#[case(b"not json".as_slice())]
#[case(br#"{"title": "no url"}"#.as_slice())]
fn malformed_issue_payload_is_reported(#[case] payload: &[u8]) {
    let result = issue_metadata(IssueNumber::new(1), payload);

    assert!(matches!(result, Err(SourceHostError::Malformed(_))));
}
