//! Working copy management for the upstream icon repository

use git2::build::RepoBuilder;
use git2::{FetchOptions, Oid, Repository};
use iconsync_core::RevisionId;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Upstream repository the icons live in
pub const DEFAULT_REPO_URL: &str = "https://github.com/microsoft/fluentui-system-icons.git";

/// Provides a fresh local working copy of the upstream repository
pub trait RepoSync {
    /// Replaces the working copy with the upstream head and returns its revision
    fn sync(&self) -> Result<RevisionId, SyncError>;

    /// Makes `rev`'s objects available locally so it can be diffed against
    fn ensure_revision(&self, rev: &RevisionId) -> Result<(), SyncError>;

    /// Root of the working copy
    fn workdir(&self) -> &Path;
}

/// [`RepoSync`] backed by a libgit2 clone
#[derive(Debug, Clone)]
pub struct GitRepoSync {
    url: String,
    workdir: PathBuf,

    /// History depth to fetch; `None` fetches everything
    depth: Option<i32>,
}

impl GitRepoSync {
    /// Creates a shallow (depth 1) syncer for `url` cloning into `workdir`
    pub fn new(url: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            workdir: workdir.into(),
            depth: Some(1),
        }
    }

    pub fn with_depth(mut self, depth: Option<i32>) -> Self {
        self.depth = depth;
        self
    }

    fn fetch_options(&self) -> FetchOptions<'static> {
        let mut options = FetchOptions::new();
        if let Some(depth) = self.depth {
            options.depth(depth);
        }
        options
    }

    fn clear_workdir(&self) -> Result<(), SyncError> {
        if self.workdir.exists() {
            log::debug!("Removing previous working copy at {:?}", self.workdir);
            std::fs::remove_dir_all(&self.workdir).map_err(|e| io_err(&self.workdir, e))?;
        }
        if let Some(parent) = self.workdir.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        Ok(())
    }
}

impl RepoSync for GitRepoSync {
    fn sync(&self) -> Result<RevisionId, SyncError> {
        self.clear_workdir()?;

        match self.depth {
            Some(depth) => log::info!("Cloning {} (depth {}) ...", self.url, depth),
            None => log::info!("Cloning {} ...", self.url),
        }

        let repo = RepoBuilder::new()
            .fetch_options(self.fetch_options())
            .clone(&self.url, &self.workdir)
            .map_err(|source| SyncError::Clone {
                url: self.url.clone(),
                source,
            })?;

        let head = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(SyncError::Resolve)?;

        Ok(RevisionId::new(head.id().to_string())?)
    }

    fn ensure_revision(&self, rev: &RevisionId) -> Result<(), SyncError> {
        let repo = Repository::open(&self.workdir)?;
        let fetch_err = |source| SyncError::Fetch {
            revision: rev.to_string(),
            source,
        };

        let oid = Oid::from_str(rev.as_str()).map_err(fetch_err)?;
        if repo.find_commit(oid).is_ok() {
            log::debug!("Revision {} already present locally", rev.short());
            return Ok(());
        }

        log::info!("Fetching {}", rev.short());
        let mut remote = repo.find_remote("origin").map_err(fetch_err)?;
        remote
            .fetch(&[rev.as_str()], Some(&mut self.fetch_options()), None)
            .map_err(fetch_err)?;

        repo.find_commit(oid).map_err(fetch_err)?;
        Ok(())
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }
}
