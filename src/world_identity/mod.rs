//! # World identity
//!
//! Progress is scoped to a save instance, not to a dimension or a live world
//! object. Each world is looked up by its *world key*
//! (`<folder>_<dimension registry name>`) and mapped to a *world identifier*,
//! which is the save folder's base name. The mapping is persisted in
//! `world_identifiers.json` so the identifier stays stable across restarts.
//!
//! On server start the deleted-worlds sweep drops every entry whose key is not a
//! folder in the saves directory. Keys written by older versions were
//! `<folder>_<dimension>`, so each folder also keeps its three vanilla
//! dimension keys alive.

pub mod payload;

use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::config::Paths;
use crate::host::{PlayerHandle, WorldView};
use crate::logutil::escape_log;
use crate::storage::atomic;

pub use payload::{PayloadError, WorldIdPayload};

/// Custom payload channel for the world identifier message.
pub const SYNC_CHANNEL: &str = "weekly-world:world_uuid";

/// Identifier used when neither the save path nor the level name is usable.
pub const UNKNOWN_WORLD: &str = "unknown";

/// Dimension suffixes kept alive for keys written before the folder-only scheme.
pub const LEGACY_DIMENSION_SUFFIXES: [&str; 3] = [
    "_minecraft:overworld",
    "_minecraft:the_nether",
    "_minecraft:the_end",
];

/// Base name of the world's save folder, falling back to the level name and then
/// to [`UNKNOWN_WORLD`].
pub fn folder_name(world: &dyn WorldView) -> String {
    if let Some(root) = world.save_root() {
        // A root of `world/.` names the parent folder
        let name = root.components().rev().find_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        });
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            debug!("Got world folder name: {} for world {}", escape_log(&name), world.dimension());
            return name;
        }
    }

    if let Some(level) = world.level_name().filter(|n| !n.trim().is_empty()) {
        debug!("Using level name as fallback: {} for world {}", escape_log(&level), world.dimension());
        return level;
    }

    warn!(
        "Could not determine world folder name for world {}, using '{}'",
        world.dimension(),
        UNKNOWN_WORLD
    );
    UNKNOWN_WORLD.to_string()
}

/// `<folder>_<dimension>`, for a folder already derived with [`folder_name`].
pub fn world_key(folder: &str, world: &dyn WorldView) -> String {
    format!("{}_{}", folder, world.dimension())
}

/// Folder base names under `saves_dir` plus their legacy dimension keys.
/// `None` when the directory cannot be listed.
pub fn existing_worlds(saves_dir: &Path) -> Option<HashSet<String>> {
    let entries = match std::fs::read_dir(saves_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list saves directory {}: {}", saves_dir.display(), e);
            return None;
        }
    };
    let mut existing = HashSet::new();
    for entry in entries.flatten() {
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        for suffix in LEGACY_DIMENSION_SUFFIXES {
            existing.insert(format!("{}{}", name, suffix));
        }
        existing.insert(name);
    }
    Some(existing)
}

/// Assigns, persists and prunes world identifiers.
pub struct WorldIdentityService {
    path: PathBuf,
    saves_dir: PathBuf,
    identifiers: Mutex<HashMap<String, String>>,
}

impl WorldIdentityService {
    /// Load `world_identifiers.json`. Load failures are logged and start empty.
    pub fn open(paths: &Paths) -> Self {
        Self::with_files(paths.world_identifiers_file(), paths.saves_dir.clone())
    }

    pub fn with_files(path: impl Into<PathBuf>, saves_dir: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let identifiers = match atomic::read_json::<HashMap<String, String>>(&path) {
            Ok(Some(map)) => {
                debug!("Loaded {} world identifiers from {}", map.len(), path.display());
                map
            }
            Ok(None) => HashMap::new(),
            Err(e) => {
                error!("Failed to load world identifiers from {}: {}", path.display(), e);
                HashMap::new()
            }
        };
        Self {
            path,
            saves_dir: saves_dir.into(),
            identifiers: Mutex::new(identifiers),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.identifiers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, map: &HashMap<String, String>) {
        if let Err(e) = atomic::write_json(&self.path, map) {
            error!("Failed to save world identifiers to {}: {}", self.path.display(), e);
        }
    }

    /// Identifier for this world, created and persisted on first sight.
    pub fn get_or_create(&self, world: &dyn WorldView) -> String {
        let folder = folder_name(world);
        let key = world_key(&folder, world);
        let mut map = self.lock();
        if let Some(id) = map.get(&key) {
            return id.clone();
        }
        debug!("Creating new world identifier: {} for key: {}", escape_log(&folder), escape_log(&key));
        map.insert(key, folder.clone());
        self.persist(&map);
        folder
    }

    /// Send the player's current world identifier on [`SYNC_CHANNEL`].
    pub fn sync(&self, player: &dyn PlayerHandle) {
        let identifier = self.get_or_create(player.world());
        match WorldIdPayload::new(identifier).encode() {
            Ok(bytes) => player.send_payload(SYNC_CHANNEL, bytes),
            Err(e) => error!("Cannot encode world identifier for {}: {}", player.name(), e),
        }
    }

    /// Remove entries whose key is not an existing world folder (or a legacy
    /// dimension key of one) and persist.
    ///
    /// Returns the set of existing worlds used, or `None` when the saves directory
    /// could not be listed; in that case nothing is removed.
    pub fn cleanup_deleted_worlds(&self) -> Option<HashSet<String>> {
        let existing = existing_worlds(&self.saves_dir)?;
        let mut map = self.lock();
        let before = map.len();
        map.retain(|key, _| existing.contains(key));
        let removed = before - map.len();
        if removed > 0 {
            info!("Removed {} world identifiers for deleted worlds", removed);
        }
        self.persist(&map);
        Some(existing)
    }

    /// Flush the in-memory map.
    pub fn save_all(&self) {
        let map = self.lock();
        self.persist(&map);
    }

    pub fn identifiers(&self) -> HashMap<String, String> {
        self.lock().clone()
    }
}
