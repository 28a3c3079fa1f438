//! Iconsync Core - Shared data models for icon index synchronization
//!
//! This crate defines the types passed between the sync stages:
//! revisions, classified file changes, icon assets and index documents,
//! plus the naming convention that decides which files are icons.

mod convention;
mod error;
mod models;

pub use convention::IconConvention;
pub use error::CoreError;
pub use models::{
    sanitize_key, ChangeStatus, FileChange, IconAsset, IndexDocument, RevisionId, Variant,
    FILLED_SUFFIX,
};
