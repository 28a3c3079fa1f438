//! Change detection between two revisions of the icon repository

use git2::{Delta, DiffFindOptions, DiffOptions, Oid, Repository, Tree};
use iconsync_core::{FileChange, IconConvention, RevisionId};
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Lists icon changes in the working copy, filtered by the naming convention
#[derive(Debug, Clone)]
pub struct DiffClassifier {
    repo_path: PathBuf,
    convention: IconConvention,
}

impl DiffClassifier {
    pub fn new(repo_path: impl Into<PathBuf>, convention: IconConvention) -> Self {
        Self {
            repo_path: repo_path.into(),
            convention,
        }
    }

    /// Treats every matching icon in the working copy as added.
    ///
    /// Used on a first run. Directory traversal order is filesystem
    /// dependent, so the result is sorted by path.
    pub fn diff_all(&self) -> Result<Vec<FileChange>, SyncError> {
        let root = self.repo_path.join(&self.convention.asset_root);
        let mut paths = Vec::new();
        self.collect_icons(&root, &mut paths)?;
        paths.sort();

        log::info!("Found {} icons in {:?}", paths.len(), root);
        Ok(paths
            .into_iter()
            .map(|new_path| FileChange::Added { new_path })
            .collect())
    }

    fn collect_icons(&self, dir: &Path, out: &mut Vec<String>) -> Result<(), SyncError> {
        let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| io_err(dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;

            if file_type.is_dir() {
                self.collect_icons(&path, out)?;
            } else if file_type.is_file() {
                let Ok(relative) = path.strip_prefix(&self.repo_path) else {
                    continue;
                };
                let relative = repo_relative(relative);
                if self.convention.matches(&relative) {
                    out.push(relative);
                }
            }
        }

        Ok(())
    }

    /// Lists icon changes from `old` to `new`, in the diff's own order.
    ///
    /// Both revisions must be present in the working copy.
    pub fn diff(&self, old: &RevisionId, new: &RevisionId) -> Result<Vec<FileChange>, SyncError> {
        if old == new {
            log::info!("Revision {} unchanged, nothing to diff", old.short());
            return Ok(Vec::new());
        }

        let diff_err = |source| SyncError::Diff {
            old: old.to_string(),
            new: new.to_string(),
            source,
        };

        let repo = Repository::open(&self.repo_path)?;
        let old_tree = commit_tree(&repo, old).map_err(diff_err)?;
        let new_tree = commit_tree(&repo, new).map_err(diff_err)?;

        let mut options = DiffOptions::new();
        options.pathspec(self.convention.asset_root.as_str());

        let mut diff = repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut options))
            .map_err(diff_err)?;

        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find)).map_err(diff_err)?;

        let changes: Vec<FileChange> = diff
            .deltas()
            .filter_map(|delta| {
                self.classify(delta.status(), delta.old_file().path(), delta.new_file().path())
            })
            .collect();

        log::info!(
            "{} icon changes between {} and {}",
            changes.len(),
            old.short(),
            new.short()
        );
        Ok(changes)
    }

    /// Maps one diff entry to a [`FileChange`], or `None` if it is not an icon.
    ///
    /// Renames are filtered on their new path only: a rename from a matching
    /// path to a non-matching one is dropped, old path included.
    pub fn classify(
        &self,
        status: Delta,
        old_file: Option<&Path>,
        new_file: Option<&Path>,
    ) -> Option<FileChange> {
        let old_path = old_file.map(repo_relative);
        let new_path = new_file.map(repo_relative);

        let change = match status {
            Delta::Added => FileChange::Added { new_path: new_path? },
            Delta::Modified | Delta::Typechange => FileChange::Modified { new_path: new_path? },
            Delta::Deleted => FileChange::Deleted { old_path: old_path? },
            Delta::Renamed => FileChange::Renamed {
                old_path: old_path?,
                new_path: new_path?,
            },
            other => {
                log::debug!("Ignoring {:?} delta for {:?}", other, new_path.or(old_path));
                return None;
            }
        };

        let filtered_path = match &change {
            FileChange::Deleted { old_path } => old_path,
            FileChange::Added { new_path }
            | FileChange::Modified { new_path }
            | FileChange::Renamed { new_path, .. } => new_path,
        };

        let in_assets = filtered_path
            .strip_prefix(&self.convention.asset_root)
            .is_some_and(|rest| rest.starts_with('/'));

        (in_assets && self.convention.matches(filtered_path)).then_some(change)
    }
}

fn commit_tree<'r>(repo: &'r Repository, rev: &RevisionId) -> Result<Tree<'r>, git2::Error> {
    let oid = Oid::from_str(rev.as_str())?;
    repo.find_commit(oid)?.tree()
}

/// Repository-relative path with `/` separators
fn repo_relative(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
