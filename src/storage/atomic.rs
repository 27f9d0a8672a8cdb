//! Whole-file JSON persistence helpers.

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use super::StorageError;

/// Read and parse a JSON file. A missing file is `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    match fs::read_to_string(path) {
        Ok(data) => {
            let cleaned = data.trim_start_matches('\0');
            if cleaned.trim().is_empty() {
                return Ok(None);
            }
            Ok(Some(serde_json::from_str(cleaned)?))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Serialize `value` and atomically replace `path` with it.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let content = serde_json::to_string_pretty(value)?;
    write_file_locked(path, &content)
}

/// Replace `path` with `content` under an exclusive lock.
///
/// Content goes to a sibling temp file which is fsynced and renamed over the
/// destination, so readers see either the old or the new file.
pub fn write_file_locked(path: &Path, content: &str) -> Result<(), StorageError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)?;
    }

    let lock_file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(path)?;
    lock_file.lock_exclusive()?;

    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("data.json");
    let mut counter = 0u32;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut tmp) => {
                fill_temp(&candidate, &mut tmp, content.as_bytes())?;
                let _ = tmp.sync_all();
                break candidate;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
            }
            Err(e) => return Err(e.into()),
        }
    };

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }
    drop(lock_file);
    Ok(())
}

/// Write the temp file, removing it again if the write fails.
fn fill_temp(candidate: &Path, tmp: &mut impl Write, content: &[u8]) -> std::io::Result<()> {
    let written = tmp.write_all(content).and_then(|_| tmp.flush());
    if written.is_err() {
        let _ = fs::remove_file(candidate);
    }
    written
}
