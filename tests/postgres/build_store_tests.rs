//! Legacy build registry tests against `PostgreSQL`.

use crate::postgres::helpers::{PostgresCluster, postgres_cluster, setup_store, test_runtime};
use apsim_builds::issue::domain::{IssueNumber, PullRequestNumber};
use apsim_builds::registry::{
    adapters::postgres::PostgresRegistryStore,
    domain::{BuildOutcome, BuildRecord, NewBuild, Revision},
    ports::RegistryError,
    services::BuildRegistry,
};
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;

type PgBuildRegistry = BuildRegistry<PostgresRegistryStore<BuildRecord>, DefaultClock>;

fn registry(store: Arc<PostgresRegistryStore<BuildRecord>>) -> PgBuildRegistry {
    BuildRegistry::new(store, Arc::new(DefaultClock))
}

fn build(pull_request: u32) -> NewBuild {
    NewBuild {
        author: "hol430".to_owned(),
        title: format!("Issue for #{pull_request}"),
        bug_id: IssueNumber::new(pull_request + 1000),
        jenkins_id: pull_request * 10,
        pull_request_id: Some(PullRequestNumber::new(pull_request)),
    }
}

#[rstest]
#[ignore = "starts an embedded PostgreSQL cluster"]
fn set_revision_conflict_leaves_holder_unchanged(postgres_cluster: PostgresCluster) {
    let (_guard, store) = setup_store(postgres_cluster, "builds_conflict").expect("store setup");
    let registry = registry(store);
    let rt = test_runtime().expect("tokio runtime");

    let holder = rt.block_on(registry.insert(build(1))).expect("first build");
    let other = rt.block_on(registry.insert(build(2))).expect("second build");
    assert_eq!(
        rt.block_on(registry.latest_revision()).expect("latest revision"),
        Revision::ZERO
    );

    rt.block_on(registry.set_revision(PullRequestNumber::new(1), Revision::new(500)))
        .expect("assign revision");
    let again = rt
        .block_on(registry.set_revision(PullRequestNumber::new(1), Revision::new(500)))
        .expect("same assignment is idempotent");
    let conflict =
        rt.block_on(registry.set_revision(PullRequestNumber::new(2), Revision::new(500)));

    assert_eq!(again.id(), holder.id());
    assert!(matches!(
        conflict,
        Err(RegistryError::RevisionTaken { holder: id, .. }) if id == holder.id()
    ));
    let unchanged = rt
        .block_on(registry.find_by_id(other.id()))
        .expect("second build");
    assert_eq!(unchanged.revision(), None);
    assert_eq!(
        rt.block_on(registry.latest_revision()).expect("latest revision"),
        Revision::new(500)
    );
}

#[rstest]
#[ignore = "starts an embedded PostgreSQL cluster"]
fn released_builds_keep_passed_builds_with_revisions(postgres_cluster: PostgresCluster) {
    let (_guard, store) = setup_store(postgres_cluster, "builds_released").expect("store setup");
    let registry = registry(store);
    let rt = test_runtime().expect("tokio runtime");

    for (pull_request, passed) in [(1, true), (2, false), (3, true), (4, true)] {
        let record = rt
            .block_on(registry.insert(build(pull_request)))
            .expect("insert build");
        rt.block_on(registry.record_result(record.id(), passed))
            .expect("record result");
        if pull_request != 4 {
            rt.block_on(registry.set_revision(
                PullRequestNumber::new(pull_request),
                Revision::new(pull_request + 100),
            ))
            .expect("assign revision");
        }
    }

    let released = rt
        .block_on(registry.released_builds(0))
        .expect("released builds");

    let revisions: Vec<Option<Revision>> = released.iter().map(BuildRecord::revision).collect();
    assert_eq!(
        revisions,
        vec![Some(Revision::new(103)), Some(Revision::new(101))]
    );
    assert!(
        released
            .iter()
            .all(|record| record.outcome() == BuildOutcome::Passed && record.finish_time().is_some())
    );
}

#[rstest]
#[ignore = "starts an embedded PostgreSQL cluster"]
fn record_result_rejects_second_result(postgres_cluster: PostgresCluster) {
    let (_guard, store) = setup_store(postgres_cluster, "builds_result").expect("store setup");
    let registry = registry(store);
    let rt = test_runtime().expect("tokio runtime");

    let record = rt.block_on(registry.insert(build(9))).expect("insert build");
    rt.block_on(registry.record_result(record.id(), false))
        .expect("first result");
    let diffs = rt
        .block_on(registry.set_num_diffs(record.id(), 12))
        .expect("set diffs");
    let second = rt.block_on(registry.record_result(record.id(), true));

    assert_eq!(diffs.num_diffs(), Some(12));
    assert_eq!(diffs.outcome(), BuildOutcome::Failed);
    assert!(matches!(second, Err(RegistryError::State(_))));
}
