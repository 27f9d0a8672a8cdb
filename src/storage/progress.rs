//! Per-player, per-world completion store.
//!
//! ```json
//! {
//!   "objectives":   { "<player uuid>": { "<world id>": ["dimension|minecraft:the_nether"] } },
//!   "restrictions": { "<player uuid>": { "<world id>": ["hardcore|true"] } }
//! }
//! ```
//!
//! The file is parsed at most once per store; every mutation rewrites it while the
//! store lock is held, so concurrent marks on different keys all end up on disk.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::atomic;
use crate::challenge::completion_key;

/// player uuid → world identifier → completion keys
pub type CompletionMap = HashMap<String, HashMap<String, BTreeSet<String>>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressData {
    #[serde(default)]
    pub objectives: CompletionMap,
    #[serde(default)]
    pub restrictions: CompletionMap,
}

impl ProgressData {
    fn contains(map: &CompletionMap, player: &str, world: &str, key: &str) -> bool {
        map.get(player)
            .and_then(|worlds| worlds.get(world))
            .is_some_and(|keys| keys.contains(key))
    }

    fn insert(map: &mut CompletionMap, player: &str, world: &str, key: String) -> bool {
        map.entry(player.to_string())
            .or_default()
            .entry(world.to_string())
            .or_default()
            .insert(key)
    }

    /// Drop worlds not in `existing`, then players left without worlds.
    fn retain_worlds(map: &mut CompletionMap, existing: &HashSet<String>, what: &str) -> usize {
        let mut removed = 0;
        for worlds in map.values_mut() {
            worlds.retain(|world, _| {
                let keep = existing.contains(world);
                if !keep {
                    info!("Removing {} data for deleted world: {}", what, world);
                    removed += 1;
                }
                keep
            });
        }
        map.retain(|_, worlds| !worlds.is_empty());
        removed
    }
}

struct Inner {
    loaded: bool,
    data: ProgressData,
}

pub struct PlayerProgressStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl PlayerProgressStore {
    /// Create a store backed by `path`. Nothing is read until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            inner: Mutex::new(Inner {
                loaded: false,
                data: ProgressData::default(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !guard.loaded {
            guard.data = self.read_file();
            guard.loaded = true;
        }
        guard
    }

    fn read_file(&self) -> ProgressData {
        match atomic::read_json::<ProgressData>(&self.path) {
            Ok(Some(mut data)) => {
                data.objectives.retain(|_, worlds| !worlds.is_empty());
                data.restrictions.retain(|_, worlds| !worlds.is_empty());
                debug!(
                    "Loaded player data for {} players from {}",
                    data.objectives.len(),
                    self.path.display()
                );
                data
            }
            Ok(None) => ProgressData::default(),
            Err(e) => {
                error!("Failed to load player data from {}: {}", self.path.display(), e);
                ProgressData::default()
            }
        }
    }

    fn persist(&self, data: &ProgressData) {
        if let Err(e) = atomic::write_json(&self.path, data) {
            error!("Failed to save player data to {}: {}", self.path.display(), e);
        }
    }

    pub fn is_completed(&self, player: &str, world: &str, kind: &str, content: &str) -> bool {
        let inner = self.lock();
        ProgressData::contains(&inner.data.objectives, player, world, &completion_key(kind, content))
    }

    /// Record an objective as completed. Returns `true` when the key was new; the file
    /// is only rewritten in that case.
    pub fn mark_completed(&self, player: &str, world: &str, kind: &str, content: &str) -> bool {
        let mut inner = self.lock();
        let added = ProgressData::insert(
            &mut inner.data.objectives,
            player,
            world,
            completion_key(kind, content),
        );
        if added {
            self.persist(&inner.data);
        }
        added
    }

    pub fn is_restriction_checked(&self, player: &str, world: &str, kind: &str, content: &str) -> bool {
        let inner = self.lock();
        ProgressData::contains(&inner.data.restrictions, player, world, &completion_key(kind, content))
    }

    pub fn mark_restriction_checked(&self, player: &str, world: &str, kind: &str, content: &str) -> bool {
        let mut inner = self.lock();
        let added = ProgressData::insert(
            &mut inner.data.restrictions,
            player,
            world,
            completion_key(kind, content),
        );
        if added {
            self.persist(&inner.data);
        }
        added
    }

    /// Remove every (player, world) entry whose world is not in `existing_worlds`
    /// from both maps and persist. Returns how many entries were removed.
    pub fn cleanup_deleted_worlds(&self, existing_worlds: &HashSet<String>) -> usize {
        let mut inner = self.lock();
        let removed = ProgressData::retain_worlds(&mut inner.data.objectives, existing_worlds, "objective")
            + ProgressData::retain_worlds(&mut inner.data.restrictions, existing_worlds, "restriction");
        self.persist(&inner.data);
        removed
    }

    pub fn tracked_players(&self) -> HashSet<String> {
        self.lock().data.objectives.keys().cloned().collect()
    }

    pub fn tracked_worlds(&self) -> HashSet<String> {
        self.lock()
            .data
            .objectives
            .values()
            .flat_map(|worlds| worlds.keys().cloned())
            .collect()
    }

    /// Copy of the in-memory state.
    pub fn snapshot(&self) -> ProgressData {
        self.lock().data.clone()
    }

    /// Flush the in-memory state to disk.
    pub fn save(&self) {
        let inner = self.lock();
        self.persist(&inner.data);
    }
}
