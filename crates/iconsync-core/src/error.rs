//! Error types for iconsync-core

/// Errors specific to iconsync-core
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Icon path has no icon name segment: {0}")]
    MissingIconName(String),

    #[error("Empty revision id")]
    EmptyRevision,
}
