//! Splits classified changes into removals and uploads

use iconsync_core::FileChange;

/// Result of [`partition`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Paths whose documents are now stale
    pub deletes: Vec<String>,

    /// Paths that need to be (re)indexed
    pub adds_or_mods: Vec<String>,
}

impl Partition {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.adds_or_mods.is_empty()
    }
}

/// Stable partition of `changes`.
///
/// A rename contributes its old path to `deletes` and its new path to
/// `adds_or_mods`; relative input order is kept within each list.
pub fn partition(changes: &[FileChange]) -> Partition {
    let mut result = Partition::default();

    for change in changes {
        match change {
            FileChange::Renamed { old_path, new_path } => {
                result.deletes.push(old_path.clone());
                result.adds_or_mods.push(new_path.clone());
            }
            FileChange::Deleted { old_path } => result.deletes.push(old_path.clone()),
            FileChange::Added { new_path } | FileChange::Modified { new_path } => {
                result.adds_or_mods.push(new_path.clone())
            }
        }
    }

    result
}
