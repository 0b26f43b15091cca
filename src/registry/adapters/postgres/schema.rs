//! Diesel schema for registry persistence.

diesel::table! {
    /// Next-gen upgrade records.
    apsimx_upgrades (id) {
        /// Store-assigned identifier.
        id -> Int8,
        /// Resolved issue number.
        issue_number -> Int8,
        /// Merged pull request number.
        pull_request_number -> Int8,
        /// Issue title at release time.
        issue_title -> Text,
        /// Public issue URL.
        issue_url -> Text,
        /// Creation or release timestamp.
        release_date -> Timestamptz,
        /// Allocated revision; unique.
        revision -> Int8,
        /// Whether the upgrade has been marked released.
        released -> Bool,
    }
}

diesel::table! {
    /// Legacy CI build records.
    oldapsim_builds (id) {
        /// Store-assigned identifier.
        id -> Int8,
        /// Pull request author.
        author -> Text,
        /// Issue title.
        title -> Text,
        /// Referenced issue number.
        bug_id -> Int8,
        /// Tri-state build result; null while running.
        pass -> Nullable<Bool>,
        /// CI start timestamp.
        start_time -> Timestamptz,
        /// CI finish timestamp.
        finish_time -> Nullable<Timestamptz>,
        /// Regression diff count.
        num_diffs -> Nullable<Int8>,
        /// Administratively assigned revision; unique when present.
        revision_number -> Nullable<Int8>,
        /// CI job number.
        jenkins_id -> Int8,
        /// Pull request under test.
        pull_request_id -> Nullable<Int8>,
    }
}
