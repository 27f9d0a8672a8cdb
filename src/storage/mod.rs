//! # Storage
//!
//! File-backed persistence for Weekly World. Every store is a single JSON file in
//! the host config directory, rewritten in full on each change through
//! [`atomic::write_file_locked`] (exclusive lock, temp file, rename).
//!
//! - [`progress::PlayerProgressStore`] - completed objectives per player and world
//!   (`weekly_world_player_data.json`)
//! - the world identifier map lives with its service in [`crate::world_identity`]
//!   (`world_identifiers.json`)
//!
//! Read failures are logged and the store starts empty; write failures are logged
//! and the in-memory state stays authoritative until the next successful write.

pub mod atomic;
pub mod progress;

use thiserror::Error;

pub use progress::{PlayerProgressStore, ProgressData};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
