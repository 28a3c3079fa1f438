//! Iconsync DB - Local persistence for sync state
//!
//! Keeps the last processed upstream revision per sync target and a
//! history of completed runs in an embedded sled database.

mod database;
mod tracker;

pub use database::{IconSyncDb, RunRecord};
pub use tracker::CommitTracker;
