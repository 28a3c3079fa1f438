//! End-to-end runs against a local upstream repository

mod common;

use common::{icon, FakeEmbedder, FakeRasterizer, RecordingStore, Upstream};
use git2::{Oid, Repository};
use iconsync_core::{FileChange, IconConvention, RevisionId};
use iconsync_db::IconSyncDb;
use iconsync_index::{
    BatchIndexer, DiffClassifier, GitRepoSync, PipelineError, RepoSync, RetryPolicy, RunOutcome,
    StateCommit, SyncPipeline,
};
use std::time::Duration;
use tempfile::TempDir;

// ── fixtures ─────────────────────────────────────────────────────────────────
//
// File contents are distinct words so that rename detection only ever pairs
// files whose contents are identical.

struct Harness {
    upstream: Upstream,
    _state: TempDir,
    db: IconSyncDb,
    sync: GitRepoSync,
}

impl Harness {
    fn new() -> Self {
        Self::cloning_from(Upstream::url)
    }

    /// Clones through the pack negotiation path, so the working copy only
    /// receives objects reachable from the default branch
    fn over_file_url() -> Self {
        Self::cloning_from(Upstream::file_url)
    }

    fn cloning_from(url: fn(&Upstream) -> String) -> Self {
        let upstream = Upstream::new();
        let state = TempDir::new().unwrap();
        let db = IconSyncDb::open(state.path().join("db")).unwrap();
        let sync = GitRepoSync::new(url(&upstream), state.path().join("work")).with_depth(None);
        Self {
            upstream,
            _state: state,
            db,
            sync,
        }
    }

    fn stored_revision(&self) -> Option<RevisionId> {
        self.db.tracker("search").read().unwrap()
    }

    fn run_with(
        &self,
        store: &RecordingStore,
        commit: StateCommit,
    ) -> Result<RunOutcome, PipelineError> {
        let (raster, embed) = (FakeRasterizer, FakeEmbedder::default());
        let indexer = BatchIndexer::new(self.sync.workdir(), &raster, &embed, store)
            .with_retry(RetryPolicy::new(Duration::ZERO));

        SyncPipeline::new(&self.sync, &self.db, "search")
            .with_state_commit(commit)
            .run(|paths| indexer.run(paths, 2))
    }

    fn run(&self, store: &RecordingStore) -> Result<RunOutcome, PipelineError> {
        self.run_with(store, StateCommit::BeforeIndexing)
    }
}

fn seed(upstream: &Upstream) -> String {
    upstream.write(&icon("Add", 20, "filled"), "alpha");
    upstream.write(&icon("Add", 20, "regular"), "bravo");
    upstream.write(&icon("Arrow", 20, "regular"), "charlie");
    upstream.write(&icon("Arrow", 24, "regular"), "delta");
    upstream.write("README.md", "echo");
    upstream.commit("initial icons")
}

// ── first run ────────────────────────────────────────────────────────────────

#[test]
fn test_first_run_indexes_all_matching_icons() {
    let h = Harness::new();
    let head = seed(&h.upstream);
    let store = RecordingStore::default();

    let outcome = h.run(&store).unwrap();

    assert_eq!(outcome.old_revision, None);
    assert_eq!(outcome.new_revision.as_str(), head);
    assert_eq!(
        outcome.changes,
        vec![
            FileChange::Added { new_path: icon("Add", 20, "filled") },
            FileChange::Added { new_path: icon("Add", 20, "regular") },
            FileChange::Added { new_path: icon("Arrow", 20, "regular") },
        ]
    );
    assert_eq!(store.batch_sizes(), vec![2, 1]);
    assert_eq!(h.stored_revision().unwrap().as_str(), head);
    assert_eq!(h.db.run_count(), 1);
}

// ── incremental runs ─────────────────────────────────────────────────────────

#[test]
fn test_second_run_classifies_changes() {
    let h = Harness::new();
    let first = seed(&h.upstream);
    h.run(&RecordingStore::default()).unwrap();

    h.upstream.write(&icon("Add", 20, "filled"), "foxtrot");
    h.upstream.remove(&icon("Add", 20, "regular"));
    h.upstream.rename(&icon("Arrow", 20, "regular"), &icon("Arrow Right", 20, "regular"));
    h.upstream.write(&icon("Star", 20, "filled"), "golf");
    h.upstream.write(&icon("Star", 24, "filled"), "hotel");
    let second = h.upstream.commit("update icons");

    let store = RecordingStore::default();
    let outcome = h.run(&store).unwrap();

    assert_eq!(outcome.old_revision.as_ref().map(|r| r.as_str()), Some(first.as_str()));
    assert_eq!(outcome.new_revision.as_str(), second);

    let mut deletes = outcome.partition.deletes.clone();
    deletes.sort();
    assert_eq!(deletes, vec![icon("Add", 20, "regular"), icon("Arrow", 20, "regular")]);

    let mut adds = outcome.partition.adds_or_mods.clone();
    adds.sort();
    assert_eq!(
        adds,
        vec![
            icon("Add", 20, "filled"),
            icon("Arrow Right", 20, "regular"),
            icon("Star", 20, "filled"),
        ]
    );

    assert!(outcome.changes.contains(&FileChange::Renamed {
        old_path: icon("Arrow", 20, "regular"),
        new_path: icon("Arrow Right", 20, "regular"),
    }));
    assert_eq!(store.documents().len(), 3);
    assert_eq!(h.stored_revision().unwrap().as_str(), second);
}

#[test]
fn test_unchanged_upstream_exits_without_upload() {
    let h = Harness::new();
    let head = seed(&h.upstream);
    h.run(&RecordingStore::default()).unwrap();

    let store = RecordingStore::default();
    let outcome = h.run(&store).unwrap();

    assert!(outcome.changes.is_empty());
    assert_eq!(outcome.stats, None);
    assert!(store.batches.borrow().is_empty());
    assert_eq!(h.stored_revision().unwrap().as_str(), head);
}

#[test]
fn test_non_icon_changes_do_not_upload() {
    let h = Harness::new();
    seed(&h.upstream);
    h.run(&RecordingStore::default()).unwrap();

    h.upstream.write("README.md", "india");
    h.upstream.write(&icon("Arrow", 24, "regular"), "juliett");
    let head = h.upstream.commit("docs and other sizes");

    let store = RecordingStore::default();
    let outcome = h.run(&store).unwrap();

    assert!(outcome.changes.is_empty());
    assert!(store.batches.borrow().is_empty());
    assert_eq!(h.stored_revision().unwrap().as_str(), head);
}

// ── old revision missing from the clone ──────────────────────────────────────

fn has_commit(workdir: &std::path::Path, sha: &str) -> bool {
    let repo = Repository::open(workdir).unwrap();
    let found = repo.find_commit(Oid::from_str(sha).unwrap()).is_ok();
    found
}

#[test]
fn test_ensure_revision_fetches_commit_left_out_of_clone() {
    let h = Harness::over_file_url();
    let old = seed(&h.upstream);
    h.upstream.keep(&old, "refs/keep/old");
    h.upstream.write(&icon("Add", 20, "filled"), "foxtrot");
    h.upstream.commit_rewritten("squash history");

    let new = h.sync.sync().unwrap();
    assert!(!has_commit(h.sync.workdir(), &old));

    let old = RevisionId::new(&old).unwrap();
    h.sync.ensure_revision(&old).unwrap();
    assert!(has_commit(h.sync.workdir(), old.as_str()));

    let changes = DiffClassifier::new(h.sync.workdir(), IconConvention::default())
        .diff(&old, &new)
        .unwrap();
    assert_eq!(
        changes,
        vec![FileChange::Modified { new_path: icon("Add", 20, "filled") }]
    );
}

#[test]
fn test_second_run_after_history_rewrite_fetches_old_revision() {
    let h = Harness::over_file_url();
    let first = seed(&h.upstream);
    h.upstream.keep(&first, "refs/keep/old");
    h.run(&RecordingStore::default()).unwrap();

    h.upstream.write(&icon("Arrow", 20, "regular"), "golf");
    let second = h.upstream.commit_rewritten("squash history");

    let store = RecordingStore::default();
    let outcome = h.run(&store).unwrap();

    assert_eq!(outcome.old_revision.as_ref().map(|r| r.as_str()), Some(first.as_str()));
    assert_eq!(
        outcome.changes,
        vec![FileChange::Modified { new_path: icon("Arrow", 20, "regular") }]
    );
    assert_eq!(store.uploaded_names(), vec!["Arrow"]);
    assert_eq!(h.stored_revision().unwrap().as_str(), second);
}

#[test]
fn test_unknown_old_revision_is_fatal() {
    let h = Harness::over_file_url();
    seed(&h.upstream);
    h.sync.sync().unwrap();

    let missing = RevisionId::new("0123456789abcdef0123456789abcdef01234567").unwrap();
    let err = h.sync.ensure_revision(&missing).unwrap_err();

    assert!(matches!(err, iconsync_index::SyncError::Fetch { .. }));
}

// ── sync state timing ────────────────────────────────────────────────────────

#[test]
fn test_failed_upload_still_advances_state_by_default() {
    let h = Harness::new();
    let head = seed(&h.upstream);

    let err = h.run(&RecordingStore::failing_on(0)).unwrap_err();

    assert!(matches!(err, PipelineError::Upload(_)));
    // The next run will consider these icons processed
    assert_eq!(h.stored_revision().unwrap().as_str(), head);
    assert_eq!(h.db.run_count(), 0);
}

#[test]
fn test_commit_after_indexing_keeps_state_on_failure() {
    let h = Harness::new();
    let head = seed(&h.upstream);

    let err = h
        .run_with(&RecordingStore::failing_on(1), StateCommit::AfterIndexing)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Upload(_)));
    assert_eq!(h.stored_revision(), None);

    h.run_with(&RecordingStore::default(), StateCommit::AfterIndexing)
        .unwrap();
    assert_eq!(h.stored_revision().unwrap().as_str(), head);
}

#[test]
fn test_unreachable_upstream_is_fatal_and_keeps_state() {
    let state = TempDir::new().unwrap();
    let db = IconSyncDb::open(state.path().join("db")).unwrap();
    let sync = GitRepoSync::new(
        state.path().join("no-such-repo").to_string_lossy().into_owned(),
        state.path().join("work"),
    )
    .with_depth(None);

    let mut called = false;
    let err = SyncPipeline::new(&sync, &db, "search")
        .run(|_| {
            called = true;
            Ok(Default::default())
        })
        .unwrap_err();

    assert!(matches!(err, PipelineError::Sync(_)));
    assert!(!called);
    assert_eq!(db.tracker("search").read().unwrap(), None);
}

// ── diff classifier against real history ─────────────────────────────────────

#[test]
fn test_diff_all_ignores_non_matching_files() {
    let h = Harness::new();
    seed(&h.upstream);
    h.sync.sync().unwrap();

    let changes = DiffClassifier::new(h.sync.workdir(), IconConvention::default())
        .diff_all()
        .unwrap();

    assert_eq!(changes.len(), 3);
    assert!(changes
        .iter()
        .all(|c| c.new_path().is_some_and(|p| p.contains("_20_"))));
}

#[test]
fn test_diff_same_revision_is_empty() {
    let h = Harness::new();
    let head = seed(&h.upstream);
    h.sync.sync().unwrap();

    let rev = RevisionId::new(&head).unwrap();
    let changes = DiffClassifier::new(h.sync.workdir(), IconConvention::default())
        .diff(&rev, &rev)
        .unwrap();
    assert!(changes.is_empty());
}

#[test]
fn test_rename_to_other_size_drops_old_path() {
    let h = Harness::new();
    let first = seed(&h.upstream);
    h.upstream.rename(&icon("Add", 20, "regular"), &icon("Add", 16, "regular"));
    let second = h.upstream.commit("move add to 16");
    h.sync.sync().unwrap();

    let changes = DiffClassifier::new(h.sync.workdir(), IconConvention::default())
        .diff(&RevisionId::new(&first).unwrap(), &RevisionId::new(&second).unwrap())
        .unwrap();

    // The 20px document is stale now, but the rename is filtered on its new path
    assert!(changes.is_empty());
}
