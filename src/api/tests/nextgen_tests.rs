//! Tests for the next-gen operation handlers.

use std::sync::Arc;

use super::fixtures::{MockHost, published_files, seeded_host};
use crate::api::{ErrorKind, NextGenApi};
use crate::issue::{
    adapters::InMemorySourceHost,
    domain::{PullRequestNumber, RepositoryFullName},
    ports::{SourceHost, SourceHostError},
    services::IssueResolver,
};
use crate::registry::{
    adapters::memory::InMemoryRegistryStore,
    domain::{Revision, UpgradeRecord},
    services::UpgradeRegistry,
};
use crate::release::Release;
use crate::test_support::TickingClock;
use rstest::{fixture, rstest};
use tempfile::TempDir;

type Store = InMemoryRegistryStore<UpgradeRecord>;

struct Harness<H: SourceHost> {
    api: NextGenApi<Store, H, TickingClock>,
    store: Arc<Store>,
    _published: TempDir,
}

fn harness_with<H: SourceHost>(host: H) -> Harness<H> {
    let store = Arc::new(Store::new());
    let registry = UpgradeRegistry::new(Arc::clone(&store), Arc::new(TickingClock::default()));
    let (files, published) = published_files(&["apsim-1.deb", "apsim-1.exe"], &[100]);
    Harness {
        api: NextGenApi::new(registry, IssueResolver::new(Arc::new(host)), files),
        store,
        _published: published,
    }
}

#[fixture]
fn harness() -> Harness<InMemorySourceHost> {
    harness_with(seeded_host(&RepositoryFullName::apsim_next_gen()))
}

async fn add(harness: &Harness<InMemorySourceHost>, pull_requests: &[u32]) {
    for pull_request in pull_requests {
        harness
            .api
            .add_build(PullRequestNumber::new(*pull_request))
            .await
            .expect("add build");
    }
}

fn revisions(releases: &[Release]) -> Vec<u32> {
    releases.iter().map(|release| release.revision.value()).collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_build_publishes_referenced_issue(harness: Harness<InMemorySourceHost>) {
    let upgrade = harness
        .api
        .add_build(PullRequestNumber::new(100))
        .await
        .expect("add build");

    assert_eq!(upgrade.revision(), Revision::new(1));
    assert_eq!(upgrade.issue_number().value(), 12);
    assert_eq!(upgrade.pull_request_number().value(), 100);
    assert_eq!(upgrade.issue_title(), "Issue 12");
    assert_eq!(
        upgrade.issue_url(),
        "https://github.com/APSIMInitiative/ApsimX/issues/12"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_build_accepts_progress_reference(harness: Harness<InMemorySourceHost>) {
    let upgrade = harness
        .api
        .add_build(PullRequestNumber::new(101))
        .await
        .expect("add build");

    assert_eq!(upgrade.issue_number().value(), 12);
}

#[rstest]
#[case(102, ErrorKind::Invalid)]
#[case(103, ErrorKind::NotFound)]
#[case(999, ErrorKind::NotFound)]
#[tokio::test(flavor = "multi_thread")]
async fn add_build_rejects_unresolvable_pull_request(
    harness: Harness<InMemorySourceHost>,
    #[case] pull_request: u32,
    #[case] expected: ErrorKind,
) {
    let err = harness
        .api
        .add_build(PullRequestNumber::new(pull_request))
        .await
        .expect_err("add build should fail");

    assert_eq!(err.kind(), expected);
    assert_eq!(harness.store.record_count().expect("count"), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn add_build_upstream_failure_writes_nothing() {
    let mut host = MockHost::new();
    host.expect_pull_request().returning(|_, _| {
        Err(SourceHostError::upstream(std::io::Error::other(
            "connection reset",
        )))
    });
    host.expect_issue().never();
    let harness = harness_with(host);

    let err = harness
        .api
        .add_build(PullRequestNumber::new(100))
        .await
        .expect_err("add build should fail");

    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
    assert_eq!(harness.store.record_count().expect("count"), 0);
}

#[rstest]
#[case(-1, -1, vec![3, 2, 1])]
#[case(2, -1, vec![3, 2])]
#[case(0, -1, vec![3, 2, 1])]
#[case(-1, 1, vec![3, 2])]
#[case(1, 1, vec![3])]
#[case(-1, 3, vec![])]
#[case(-1, i64::MAX, vec![])]
#[tokio::test(flavor = "multi_thread")]
async fn list_releases_filters_then_truncates(
    harness: Harness<InMemorySourceHost>,
    #[case] limit: i64,
    #[case] min_revision: i64,
    #[case] expected: Vec<u32>,
) {
    add(&harness, &[100, 101, 100]).await;

    let releases = harness
        .api
        .list_releases(limit, min_revision)
        .await
        .expect("list releases");

    assert_eq!(revisions(&releases), expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_releases_formats_links(harness: Harness<InMemorySourceHost>) {
    add(&harness, &[100]).await;

    let releases = harness.api.list_releases(-1, -1).await.expect("list releases");
    let release = releases.first().expect("one release");

    assert_eq!(release.version, "2024.03.1.0");
    assert_eq!(release.title, "Issue 12");
    assert_eq!(
        release.download_link_debian,
        "https://builds.apsim.info/api/nextgen/download/1/Linux"
    );
    assert_eq!(
        release.download_link_mac_os,
        "https://builds.apsim.info/api/nextgen/download/1/MacOS"
    );
    assert_eq!(
        release.info_url,
        "https://github.com/APSIMInitiative/ApsimX/issues/12"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn next_version_follows_latest_release(harness: Harness<InMemorySourceHost>) {
    assert_eq!(
        harness.api.next_version().await.expect("next version"),
        Revision::new(1)
    );

    add(&harness, &[100, 101]).await;

    assert_eq!(
        harness.api.next_version().await.expect("next version"),
        Revision::new(3)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn release_upgrade_marks_latest_duplicate(harness: Harness<InMemorySourceHost>) {
    add(&harness, &[100, 100]).await;

    let released = harness
        .api
        .release_upgrade(PullRequestNumber::new(100))
        .await
        .expect("release upgrade");
    let earlier = harness
        .api
        .registry()
        .find_by_revision(Revision::new(1))
        .await
        .expect("earlier upgrade");

    assert_eq!(released.revision(), Revision::new(2));
    assert!(released.is_released());
    assert!(!earlier.is_released());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn release_upgrade_reports_unknown_pull_request(harness: Harness<InMemorySourceHost>) {
    let err = harness
        .api
        .release_upgrade(PullRequestNumber::new(100))
        .await
        .expect_err("release should fail");

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[rstest]
#[case("Linux", "apsim-1.deb")]
#[case("windows", "apsim-1.exe")]
fn installer_location_finds_published_installer(
    harness: Harness<InMemorySourceHost>,
    #[case] platform: &str,
    #[case] file_name: &str,
) {
    let path = harness
        .api
        .installer_location(Revision::new(1), platform)
        .expect("installer location");

    assert_eq!(path.file_name(), Some(file_name));
    assert!(path.is_file());
}

#[rstest]
#[case(1, "MacOS", ErrorKind::NotFound)]
#[case(2, "Linux", ErrorKind::NotFound)]
#[case(1, "BeOS", ErrorKind::Invalid)]
fn installer_location_rejects_unavailable_installer(
    harness: Harness<InMemorySourceHost>,
    #[case] revision: u32,
    #[case] platform: &str,
    #[case] expected: ErrorKind,
) {
    let err = harness
        .api
        .installer_location(Revision::new(revision), platform)
        .expect_err("lookup should fail");

    assert_eq!(err.kind(), expected);
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[case(Some("2024.03.1.0"))]
#[case(Some("1"))]
#[tokio::test(flavor = "multi_thread")]
async fn documentation_location_resolves_pull_request_site(
    harness: Harness<InMemorySourceHost>,
    #[case] version: Option<&str>,
) {
    add(&harness, &[100]).await;

    let path = harness
        .api
        .documentation_location(version)
        .await
        .expect("documentation location");

    assert!(path.ends_with("100/index.html"));
}

#[rstest]
#[case(Some("2024.03.7.0"), ErrorKind::NotFound)]
#[case(Some("latest"), ErrorKind::Invalid)]
#[case(None, ErrorKind::NotFound)]
#[tokio::test(flavor = "multi_thread")]
async fn documentation_location_rejects_unknown_version(
    harness: Harness<InMemorySourceHost>,
    #[case] version: Option<&str>,
    #[case] expected: ErrorKind,
) {
    add(&harness, &[100, 101]).await;

    let err = harness
        .api
        .documentation_location(version)
        .await
        .expect_err("lookup should fail");

    assert_eq!(err.kind(), expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn documentation_location_on_empty_registry_is_not_found(
    harness: Harness<InMemorySourceHost>,
) {
    let err = harness
        .api
        .documentation_location(None)
        .await
        .expect_err("lookup should fail");

    assert_eq!(err.kind(), ErrorKind::NotFound);
}
