//! Last-processed revision tracking

use anyhow::{Context, Result};
use iconsync_core::RevisionId;

/// Persists the last upstream revision a sync target has processed.
///
/// One tracker exists per target; a run reads it once at the start and
/// writes it once. Concurrent runs against the same database are not
/// supported.
#[derive(Clone)]
pub struct CommitTracker {
    tree: sled::Tree,
    target: String,
}

impl CommitTracker {
    pub(crate) fn new(tree: sled::Tree, target: &str) -> Self {
        Self {
            tree,
            target: target.to_string(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the stored revision, or `None` if this target never ran.
    /// A blank stored value also counts as "never ran".
    pub fn read(&self) -> Result<Option<RevisionId>> {
        let value = self
            .tree
            .get(self.target.as_bytes())
            .with_context(|| format!("Failed to read last revision for {}", self.target))?;

        Ok(value.and_then(|bytes| RevisionId::new(String::from_utf8_lossy(&bytes)).ok()))
    }

    /// Replaces the stored revision and flushes it to disk
    pub fn write(&self, rev: &RevisionId) -> Result<()> {
        self.tree
            .insert(self.target.as_bytes(), rev.as_str().as_bytes())
            .with_context(|| format!("Failed to store last revision for {}", self.target))?;
        self.tree.flush().context("Failed to flush sync state")?;

        log::debug!("Stored revision {} for target {}", rev.short(), self.target);
        Ok(())
    }
}
