//! Database operations and management

use anyhow::{Context, Result};
use iconsync_core::RevisionId;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;

use crate::tracker::CommitTracker;

/// Summary of one completed sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Sync target the run belonged to (e.g. "search", "training")
    pub target: String,

    /// Revision stored before the run, `None` on a first run
    pub old_revision: Option<String>,

    /// Revision the run synchronized to
    pub new_revision: String,

    /// Unix timestamps of run start and finish
    pub started_at: i64,
    pub finished_at: i64,

    /// Number of classified file changes
    pub changes: usize,

    /// Paths whose documents should be removed (reported, not sent)
    pub deletes: usize,

    /// Paths that were sent to the indexer
    pub adds_or_mods: usize,

    /// Icons uploaded successfully
    pub indexed: usize,

    /// Icons dropped because of per-icon failures
    pub failed: usize,
}

/// Main structure managing the database
pub struct IconSyncDb {
    /// Tree storing the last processed revision (key: target name)
    sync_state: sled::Tree,

    /// Tree storing run history (key: big-endian run id)
    runs: sled::Tree,

    /// Sled database instance
    db: Db,
}

impl IconSyncDb {
    /// Opens or creates a new database at the specified location
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", path.as_ref()))?;

        let sync_state = db
            .open_tree("sync_state")
            .context("Failed to open sync_state tree")?;

        let runs = db.open_tree("runs").context("Failed to open runs tree")?;

        Ok(Self {
            sync_state,
            runs,
            db,
        })
    }

    /// Returns the revision tracker for one sync target
    pub fn tracker(&self, target: &str) -> CommitTracker {
        CommitTracker::new(self.sync_state.clone(), target)
    }

    /// Lists every target with its stored revision, sorted by target name
    pub fn tracked_revisions(&self) -> Result<Vec<(String, RevisionId)>> {
        let mut results = Vec::new();

        for item in self.sync_state.iter() {
            let (key, value) = item.context("Failed to read from database")?;
            let target = String::from_utf8_lossy(&key).into_owned();
            let raw = String::from_utf8_lossy(&value);
            match RevisionId::new(raw) {
                Ok(rev) => results.push((target, rev)),
                Err(_) => log::warn!("Ignoring empty revision stored for target {}", target),
            }
        }

        Ok(results)
    }

    /// Appends a run to the history and returns its id
    pub fn record_run(&self, record: &RunRecord) -> Result<u64> {
        let id = self.db.generate_id().context("Failed to allocate run id")?;
        let value = bincode::serialize(record).context("Failed to serialize RunRecord")?;

        self.runs
            .insert(id.to_be_bytes(), value)
            .context("Failed to store run record")?;
        self.flush()?;

        Ok(id)
    }

    /// Returns up to `limit` runs, most recent first
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>> {
        let mut results = Vec::new();

        for item in self.runs.iter().rev().take(limit) {
            let (_, value) = item.context("Failed to read from database")?;
            let record: RunRecord =
                bincode::deserialize(&value).context("Failed to deserialize RunRecord")?;
            results.push(record);
        }

        Ok(results)
    }

    /// Returns the number of recorded runs
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Flushes all pending operations to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush().context("Failed to flush database")?;
        Ok(())
    }
}
