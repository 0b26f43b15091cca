//! Next-gen upgrade registry tests against `PostgreSQL`.

use crate::postgres::helpers::{PostgresCluster, postgres_cluster, setup_store, test_runtime};
use apsim_builds::issue::domain::{IssueNumber, PullRequestNumber};
use apsim_builds::registry::{
    adapters::postgres::PostgresRegistryStore,
    domain::{ListQuery, NewUpgrade, Revision, UpgradeRecord},
    services::{RevisionAllocator, UpgradeRegistry},
};
use mockable::DefaultClock;
use rstest::rstest;
use std::collections::BTreeSet;
use std::sync::Arc;

type PgUpgradeRegistry = UpgradeRegistry<PostgresRegistryStore<UpgradeRecord>, DefaultClock>;

fn registry(store: Arc<PostgresRegistryStore<UpgradeRecord>>) -> PgUpgradeRegistry {
    UpgradeRegistry::new(store, Arc::new(DefaultClock))
        .with_allocator(RevisionAllocator::new(64))
}

fn request(pull_request: u32) -> NewUpgrade {
    NewUpgrade::new(
        IssueNumber::new(pull_request + 1000),
        PullRequestNumber::new(pull_request),
        format!("Issue for #{pull_request}"),
    )
}

#[rstest]
#[ignore = "starts an embedded PostgreSQL cluster"]
fn insert_allocates_revisions_and_lists_most_recent_first(postgres_cluster: PostgresCluster) {
    let (_guard, store) = setup_store(postgres_cluster, "upgrades_list").expect("store setup");
    let registry = registry(store);
    let rt = test_runtime().expect("tokio runtime");

    let ids: Vec<_> = [10, 11, 12]
        .into_iter()
        .map(|pull_request| {
            rt.block_on(registry.insert(request(pull_request)))
                .expect("insert upgrade")
        })
        .map(|record| (record.id(), record.revision()))
        .collect();

    let revisions: Vec<Revision> = ids.iter().map(|(_, revision)| *revision).collect();
    assert_eq!(
        revisions,
        vec![Revision::new(1), Revision::new(2), Revision::new(3)]
    );

    let listed = rt
        .block_on(registry.list(ListQuery::new().after_revision(Revision::new(1))))
        .expect("list upgrades");
    let listed_ids: Vec<_> = listed.iter().map(UpgradeRecord::id).collect();
    let expected: Vec<_> = ids.iter().rev().take(2).map(|(id, _)| *id).collect();
    assert_eq!(listed_ids, expected);

    assert_eq!(
        rt.block_on(registry.next_revision()).expect("next revision"),
        Revision::new(4)
    );
}

#[rstest]
#[ignore = "starts an embedded PostgreSQL cluster"]
fn concurrent_inserts_receive_contiguous_revisions(postgres_cluster: PostgresCluster) {
    let (_guard, store) = setup_store(postgres_cluster, "upgrades_concurrent").expect("store setup");
    let registry = registry(store);
    let rt = test_runtime().expect("tokio runtime");

    for pull_request in 1..=4 {
        rt.block_on(registry.insert(request(pull_request)))
            .expect("seed upgrade");
    }

    let revisions: BTreeSet<u32> = rt.block_on(async {
        let handles: Vec<_> = (100..116)
            .map(|pull_request| {
                let worker = registry.clone();
                tokio::spawn(async move { worker.insert(request(pull_request)).await })
            })
            .collect();

        let mut revisions = BTreeSet::new();
        for handle in handles {
            let record = handle
                .await
                .expect("task completes")
                .expect("concurrent insert");
            revisions.insert(record.revision().value());
        }
        revisions
    });

    assert_eq!(revisions, (5..=20).collect::<BTreeSet<u32>>());
}

#[rstest]
#[ignore = "starts an embedded PostgreSQL cluster"]
fn mark_released_updates_latest_duplicate_only(postgres_cluster: PostgresCluster) {
    let (_guard, store) = setup_store(postgres_cluster, "upgrades_release").expect("store setup");
    let registry = registry(store);
    let rt = test_runtime().expect("tokio runtime");

    let first = rt
        .block_on(registry.insert(request(42)))
        .expect("first upgrade");
    let second = rt
        .block_on(registry.insert(request(42)))
        .expect("second upgrade");

    let released = rt
        .block_on(registry.mark_released(PullRequestNumber::new(42)))
        .expect("mark released");
    let untouched = rt
        .block_on(registry.find_by_id(first.id()))
        .expect("first upgrade");

    assert_eq!(released.id(), second.id());
    assert!(released.is_released());
    assert!(!untouched.is_released());
}

#[rstest]
#[ignore = "starts an embedded PostgreSQL cluster"]
fn find_by_revision_reports_missing_revision(postgres_cluster: PostgresCluster) {
    let (_guard, store) = setup_store(postgres_cluster, "upgrades_lookup").expect("store setup");
    let registry = registry(store);
    let rt = test_runtime().expect("tokio runtime");

    let inserted = rt
        .block_on(registry.insert(request(7)))
        .expect("insert upgrade");

    let found = rt
        .block_on(registry.find_by_revision(inserted.revision()))
        .expect("lookup");
    let missing = rt.block_on(registry.find_by_revision(Revision::new(99)));

    assert_eq!(found.id(), inserted.id());
    assert_eq!(found.issue_title(), "Issue for #7");
    assert!(missing.is_err());
}
