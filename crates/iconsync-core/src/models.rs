//! Core data models for icon synchronization

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Suffix marking the filled variant of an icon
pub const FILLED_SUFFIX: &str = "_filled.svg";

/// Identifier of a point in the upstream repository's history (a commit SHA)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionId(String);

impl RevisionId {
    /// Creates a revision id from a raw string, trimming surrounding whitespace
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyRevision);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, for log lines
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of change a diff reported for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

/// A single classified file change.
///
/// Paths are repository-relative and always use `/` as separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Added { new_path: String },
    Modified { new_path: String },
    Deleted { old_path: String },
    Renamed { old_path: String, new_path: String },
}

impl FileChange {
    pub fn status(&self) -> ChangeStatus {
        match self {
            FileChange::Added { .. } => ChangeStatus::Added,
            FileChange::Modified { .. } => ChangeStatus::Modified,
            FileChange::Deleted { .. } => ChangeStatus::Deleted,
            FileChange::Renamed { .. } => ChangeStatus::Renamed,
        }
    }

    /// Path the file had before the change, if it existed before
    pub fn old_path(&self) -> Option<&str> {
        match self {
            FileChange::Deleted { old_path } | FileChange::Renamed { old_path, .. } => {
                Some(old_path)
            }
            _ => None,
        }
    }

    /// Path the file has after the change, if it still exists
    pub fn new_path(&self) -> Option<&str> {
        match self {
            FileChange::Added { new_path }
            | FileChange::Modified { new_path }
            | FileChange::Renamed { new_path, .. } => Some(new_path),
            FileChange::Deleted { .. } => None,
        }
    }
}

/// Icon style variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Filled,
    Outline,
}

impl Variant {
    /// `filled` when the path carries the filled marker, `outline` otherwise
    pub fn from_path(path: &str) -> Self {
        if path.ends_with(FILLED_SUFFIX) {
            Variant::Filled
        } else {
            Variant::Outline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Filled => "filled",
            Variant::Outline => "outline",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An icon file in the asset tree
///
/// Example: `assets/Add Circle/SVG/ic_fluent_add_circle_20_filled.svg`
/// has name `Add Circle` and variant `filled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconAsset {
    pub path: String,
    pub name: String,
    pub variant: Variant,
}

impl IconAsset {
    pub fn from_path(path: &str) -> Result<Self, CoreError> {
        let name = path
            .split('/')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| CoreError::MissingIconName(path.to_string()))?;

        Ok(Self {
            path: path.to_string(),
            name: name.to_string(),
            variant: Variant::from_path(path),
        })
    }

    /// Document key for this icon
    pub fn key(&self) -> String {
        sanitize_key(&self.path)
    }

    /// Training tag name, `<name>-<variant>`
    pub fn tag_name(&self) -> String {
        format!("{}-{}", self.name, self.variant)
    }
}

/// Document stored in the vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub id: String,
    pub name: String,
    pub variant: Variant,
    pub url: String,
    pub vector: Vec<f32>,
}

impl IndexDocument {
    /// Builds the document for `asset`, with its URL rooted at `url_base`
    pub fn new(asset: &IconAsset, url_base: &str, vector: Vec<f32>) -> Self {
        Self {
            id: asset.key(),
            name: asset.name.clone(),
            variant: asset.variant,
            url: format!("{}/{}", url_base.trim_end_matches('/'), asset.path),
            vector,
        }
    }
}

/// Turns a source path into a storage-safe document key.
///
/// Index keys may only contain letters, digits, `_` and `-`; every other
/// character becomes `_`. The mapping is deterministic, so indexing the same
/// path twice overwrites the same document.
pub fn sanitize_key(path: &str) -> String {
    path.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
