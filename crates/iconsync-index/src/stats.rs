//! Statistics for batch uploads

use std::time::Duration;

use crate::formatting::{format_duration, format_number};

/// Outcome of one batch upload run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Chunks the input was split into
    pub chunks: usize,

    /// Upload calls actually issued (chunks with no documents are skipped)
    pub uploads: usize,

    /// Icons sent to the store
    pub indexed: usize,

    /// Icons dropped because reading, rasterizing or embedding failed
    pub failed: usize,

    pub elapsed_time: Duration,
}

impl std::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} ({} uploaded) | Icons: {} indexed, {} failed | Time: {}",
            format_number(self.chunks),
            format_number(self.uploads),
            format_number(self.indexed),
            format_number(self.failed),
            format_duration(self.elapsed_time)
        )
    }
}
