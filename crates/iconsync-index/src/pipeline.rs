//! One synchronization run, from stored revision to uploaded documents

use chrono::Utc;
use iconsync_core::{sanitize_key, FileChange, IconConvention, RevisionId};
use iconsync_db::{IconSyncDb, RunRecord};

use crate::diff::DiffClassifier;
use crate::error::{PipelineError, UploadError};
use crate::normalize::{partition, Partition};
use crate::repo::RepoSync;
use crate::stats::IndexStats;

/// When the new revision is written to the sync state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateCommit {
    /// Right after the diff is computed, before anything is uploaded.
    /// A run that later fails is not retried by the next run.
    #[default]
    BeforeIndexing,

    /// Only after the upload step returned successfully
    AfterIndexing,
}

/// What a run saw and did
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub old_revision: Option<RevisionId>,
    pub new_revision: RevisionId,
    pub changes: Vec<FileChange>,
    pub partition: Partition,

    /// `None` when there was nothing to upload
    pub stats: Option<IndexStats>,
}

/// Drives one run for one sync target:
/// read state → sync repo → diff → store state → partition → upload.
pub struct SyncPipeline<'a> {
    repo: &'a dyn RepoSync,
    db: &'a IconSyncDb,
    target: String,
    convention: IconConvention,
    state_commit: StateCommit,
}

impl<'a> SyncPipeline<'a> {
    pub fn new(repo: &'a dyn RepoSync, db: &'a IconSyncDb, target: &str) -> Self {
        Self {
            repo,
            db,
            target: target.to_string(),
            convention: IconConvention::default(),
            state_commit: StateCommit::default(),
        }
    }

    pub fn with_convention(mut self, convention: IconConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn with_state_commit(mut self, state_commit: StateCommit) -> Self {
        self.state_commit = state_commit;
        self
    }

    /// Runs the pipeline, handing the paths to (re)index to `upload`.
    ///
    /// `upload` is not called when no icon needs indexing.
    pub fn run<F>(&self, upload: F) -> Result<RunOutcome, PipelineError>
    where
        F: FnOnce(&[String]) -> Result<IndexStats, UploadError>,
    {
        let started_at = Utc::now().timestamp();
        let tracker = self.db.tracker(&self.target);

        let old_revision = tracker.read().map_err(PipelineError::State)?;
        match &old_revision {
            Some(rev) => log::info!("Last processed revision: {}", rev),
            None => log::info!("Last processed revision: none"),
        }

        let new_revision = self.repo.sync()?;
        log::info!("New HEAD revision: {}", new_revision);

        let classifier = DiffClassifier::new(self.repo.workdir(), self.convention.clone());
        let changes = match &old_revision {
            None => {
                log::info!("No previous revision found. Treating all icons as new.");
                classifier.diff_all()?
            }
            Some(old) if *old == new_revision => {
                log::info!("Already at {}, no changes", new_revision.short());
                Vec::new()
            }
            Some(old) => {
                self.repo.ensure_revision(old)?;
                classifier.diff(old, &new_revision)?
            }
        };

        if self.state_commit == StateCommit::BeforeIndexing {
            tracker.write(&new_revision).map_err(PipelineError::State)?;
        }

        let partition = partition(&changes);
        report_deletes(&partition.deletes);

        let stats = if partition.adds_or_mods.is_empty() {
            log::info!("✅ No icons to index");
            None
        } else {
            let stats = upload(&partition.adds_or_mods)?;
            log::info!("✅ {}", stats);
            Some(stats)
        };

        if self.state_commit == StateCommit::AfterIndexing {
            tracker.write(&new_revision).map_err(PipelineError::State)?;
        }

        let outcome = RunOutcome {
            old_revision,
            new_revision,
            changes,
            partition,
            stats,
        };
        self.db
            .record_run(&self.run_record(&outcome, started_at))
            .map_err(PipelineError::State)?;

        Ok(outcome)
    }

    fn run_record(&self, outcome: &RunOutcome, started_at: i64) -> RunRecord {
        let stats = outcome.stats.clone().unwrap_or_default();
        RunRecord {
            target: self.target.clone(),
            old_revision: outcome.old_revision.as_ref().map(|r| r.to_string()),
            new_revision: outcome.new_revision.to_string(),
            started_at,
            finished_at: Utc::now().timestamp(),
            changes: outcome.changes.len(),
            deletes: outcome.partition.deletes.len(),
            adds_or_mods: outcome.partition.adds_or_mods.len(),
            indexed: stats.indexed,
            failed: stats.failed,
        }
    }
}

/// Removal from the index is not automated; list what is now stale.
fn report_deletes(deletes: &[String]) {
    if deletes.is_empty() {
        return;
    }
    log::info!("🗑  {} icons removed upstream, their documents are stale:", deletes.len());
    for path in deletes {
        log::info!("   • {} ({})", sanitize_key(path), path);
    }
}
