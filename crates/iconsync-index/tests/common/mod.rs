//! Shared fixtures: in-memory collaborators and a local upstream repository
#![allow(dead_code)]

use git2::{Commit, IndexAddOption, Oid, Repository, Signature, Tree};
use iconsync_core::IndexDocument;
use iconsync_index::{DocumentStore, Embedder, RasterizeError, Rasterizer, ServiceError, UploadError};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

// ── collaborators ────────────────────────────────────────────────────────────

/// Passes bytes through; SVGs starting with `corrupt` fail
pub struct FakeRasterizer;

impl Rasterizer for FakeRasterizer {
    fn rasterize(&self, svg: &[u8]) -> Result<Vec<u8>, RasterizeError> {
        if svg.starts_with(b"corrupt") {
            return Err(RasterizeError::Empty("fake-rasterizer".to_string()));
        }
        Ok(svg.to_vec())
    }
}

/// Vector is `[byte length, 1.0]`; images starting with `throttled` are
/// always rate limited
#[derive(Default)]
pub struct FakeEmbedder {
    pub calls: Cell<usize>,
}

impl Embedder for FakeEmbedder {
    fn embed(&self, image: &[u8]) -> Result<Vec<f32>, ServiceError> {
        self.calls.set(self.calls.get() + 1);
        if image.starts_with(b"throttled") {
            return Err(ServiceError::Status {
                code: 429,
                body: "Too Many Requests".to_string(),
            });
        }
        Ok(vec![image.len() as f32, 1.0])
    }
}

/// Records every upsert; optionally fails the n-th call (0-based)
#[derive(Default)]
pub struct RecordingStore {
    pub batches: RefCell<Vec<Vec<IndexDocument>>>,
    pub fail_on_call: Option<usize>,
}

impl RecordingStore {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.borrow().iter().map(Vec::len).collect()
    }

    /// Store contents after applying every upsert in order
    pub fn documents(&self) -> HashMap<String, IndexDocument> {
        let mut docs = HashMap::new();
        for batch in self.batches.borrow().iter() {
            for doc in batch {
                docs.insert(doc.id.clone(), doc.clone());
            }
        }
        docs
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.batches
            .borrow()
            .iter()
            .flatten()
            .map(|d| d.name.clone())
            .collect()
    }
}

impl DocumentStore for RecordingStore {
    fn upsert(&self, documents: &[IndexDocument]) -> Result<(), UploadError> {
        if self.fail_on_call == Some(self.batches.borrow().len()) {
            return Err(UploadError::Batch {
                items: documents.len(),
                source: ServiceError::Transport("connection reset".to_string()),
            });
        }
        self.batches.borrow_mut().push(documents.to_vec());
        Ok(())
    }
}

// ── files ────────────────────────────────────────────────────────────────────

/// Icon path following the upstream layout
pub fn icon(name: &str, size: u32, variant: &str) -> String {
    let slug = name.to_ascii_lowercase().replace(' ', "_");
    format!("assets/{name}/SVG/ic_fluent_{slug}_{size}_{variant}.svg")
}

pub fn write_file(root: &Path, path: &str, contents: &str) {
    let full = root.join(path);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(full, contents).unwrap();
}

// ── upstream repository ──────────────────────────────────────────────────────

/// A local git repository standing in for the upstream icon repository
pub struct Upstream {
    pub dir: TempDir,
    pub repo: Repository,
}

impl Upstream {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self { dir, repo }
    }

    pub fn url(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    /// `file://` URL; libgit2 then negotiates a pack like with a remote
    /// server instead of copying the whole object database
    pub fn file_url(&self) -> String {
        format!("file://{}", self.dir.path().display())
    }

    pub fn write(&self, path: &str, contents: &str) {
        write_file(self.dir.path(), path, contents);
    }

    pub fn remove(&self, path: &str) {
        std::fs::remove_file(self.dir.path().join(path)).unwrap();
    }

    pub fn rename(&self, from: &str, to: &str) {
        let target = self.dir.path().join(to);
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::rename(self.dir.path().join(from), target).unwrap();
    }

    /// Stages every change in the work tree and commits it, returning the SHA
    pub fn commit(&self, message: &str) -> String {
        let tree = self.stage_all();
        let sig = Signature::now("Icon Bot", "bot@example.com").unwrap();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
            .to_string()
    }

    /// Commits the work tree as a new root commit and force-moves the current
    /// branch onto it, like a squashed force-push. Earlier commits stay in
    /// the repository but are no longer reachable from the branch.
    pub fn commit_rewritten(&self, message: &str) -> String {
        let tree = self.stage_all();
        let sig = Signature::now("Icon Bot", "bot@example.com").unwrap();
        let oid = self.repo.commit(None, &sig, &sig, message, &tree, &[]).unwrap();

        let branch = self.repo.head().unwrap().name().unwrap().to_string();
        self.repo.reference(&branch, oid, true, message).unwrap();
        oid.to_string()
    }

    /// Points `name` (e.g. `refs/keep/old`) at `sha`
    pub fn keep(&self, sha: &str, name: &str) {
        self.repo
            .reference(name, Oid::from_str(sha).unwrap(), true, "keep")
            .unwrap();
    }

    fn stage_all(&self) -> Tree<'_> {
        let mut index = self.repo.index().unwrap();
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None).unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        self.repo.find_tree(tree_id).unwrap()
    }
}
