//! Output formatting structures for CLI display

use iconsync_db::RunRecord;
use tabled::Tabled;

use crate::helpers::{format_elapsed, format_timestamp, short_sha};

/// Table row for displaying one recorded run
#[derive(Tabled)]
pub struct RunRow {
    #[tabled(rename = "Started")]
    pub started: String,
    #[tabled(rename = "Target")]
    pub target: String,
    #[tabled(rename = "Revisions")]
    pub revisions: String,
    #[tabled(rename = "Changes")]
    pub changes: usize,
    #[tabled(rename = "Stale")]
    pub deletes: usize,
    #[tabled(rename = "Uploaded")]
    pub indexed: usize,
    #[tabled(rename = "Failed")]
    pub failed: usize,
    #[tabled(rename = "Took")]
    pub took: String,
}

impl From<&RunRecord> for RunRow {
    fn from(run: &RunRecord) -> Self {
        let from = run.old_revision.as_deref().map(short_sha).unwrap_or("-");
        Self {
            started: format_timestamp(run.started_at),
            target: run.target.clone(),
            revisions: format!("{} → {}", from, short_sha(&run.new_revision)),
            changes: run.changes,
            deletes: run.deletes,
            indexed: run.indexed,
            failed: run.failed,
            took: format_elapsed(run.started_at, run.finished_at),
        }
    }
}
