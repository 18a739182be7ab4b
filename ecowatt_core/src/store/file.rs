//! # File Store
//!
//! A [`KeyValueStore`] persisted as a single JSON object on disk, with
//! the safety features needed when the file lives on a shared drive:
//! - **Atomic saves**: write to `.tmp`, sync, rename over the original
//! - **File locking**: each write is a read-modify-write under an exclusive
//!   OS lock on a sibling `.lock` file
//! - **Lock metadata**: the holder writes who it is into the `.lock` file,
//!   so a refused writer gets a readable error instead of a silent failure
//!
//! The OS lock is the only source of truth. It is released when its holder
//! exits, however abruptly, so metadata found in an unlocked `.lock` file is
//! stale by definition and simply overwritten.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ecowatt_core::store::{FileStore, KeyValueStore};
//! use std::path::Path;
//!
//! let mut store = FileStore::open(Path::new("ecowatt_store.json"), "installer@example.com")?;
//! store.set("ecowatt_active_project", "{}")?;
//! # Ok::<(), ecowatt_core::errors::CalcError>(())
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::errors::{CalcError, CalcResult};

/// Lock file metadata stored next to the store file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    ["HOSTNAME", "COMPUTERNAME", "HOST"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
}

/// Exclusive store lock, released on drop.
pub struct FileLock {
    lock_path: PathBuf,
    lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the exclusive lock guarding a store file.
    ///
    /// Returns `CalcError::FileLocked`, naming the holder when its metadata
    /// is readable, if another handle holds the lock. The holder's metadata
    /// is never touched before the OS lock is ours.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let mut lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("open lock", lock_path.display().to_string(), e.to_string()))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(match read_lock_info(&mut lock_file) {
                Some(holder) => CalcError::file_locked(
                    path.display().to_string(),
                    format!("{} ({})", holder.user_id, holder.machine),
                    holder.locked_at.to_rfc3339(),
                ),
                None => CalcError::file_locked(path.display().to_string(), "another process", "unknown"),
            });
        }

        if let Some(previous) = read_lock_info(&mut lock_file) {
            warn!(
                path = %path.display(),
                holder = %previous.user_id,
                since = %previous.locked_at,
                "taking over stale lock"
            );
        }

        let info = LockInfo::new(user_id);
        let lock_json = serde_json::to_string_pretty(&info).map_err(CalcError::serialization)?;
        let write_error = |e: std::io::Error| CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string());
        lock_file.set_len(0).map_err(write_error)?;
        lock_file.seek(SeekFrom::Start(0)).map_err(write_error)?;
        lock_file.write_all(lock_json.as_bytes()).map_err(write_error)?;
        lock_file.sync_all().map_err(write_error)?;

        Ok(FileLock {
            lock_path,
            lock_file,
            info,
        })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Metadata is cleared under the lock; the file itself is never removed.
        if let Err(e) = self.lock_file.set_len(0) {
            debug!(path = %self.lock_path.display(), error = %e, "could not clear lock metadata");
        }
        let _ = self.lock_file.unlock();
    }
}

/// `store.json` -> `store.json.lock`
fn lock_path_for(store_path: &Path) -> PathBuf {
    with_suffix(store_path, "lock")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut result = path.to_path_buf();
    let extension = result
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    result.set_extension(extension);
    result
}

/// Holder metadata, or `None` when the file is empty or unreadable.
fn read_lock_info(lock_file: &mut File) -> Option<LockInfo> {
    let mut contents = String::new();
    lock_file.seek(SeekFrom::Start(0)).ok()?;
    lock_file.read_to_string(&mut contents).ok()?;
    if contents.trim().is_empty() {
        return None;
    }
    serde_json::from_str(&contents).ok()
}

/// JSON-file backed store.
///
/// Every read goes to disk so that other processes' writes are visible;
/// every write is a locked read-modify-write of the whole file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    user_id: String,
}

impl FileStore {
    /// Open (or prepare to create) a store file.
    ///
    /// Fails if the file exists but is not a JSON object of strings.
    pub fn open(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let store = FileStore {
            path: path.to_path_buf(),
            user_id: user_id.into(),
        };
        let entries = store.read_entries()?;
        debug!(path = %path.display(), keys = entries.len(), "opened store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> CalcResult<BTreeMap<String, String>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(CalcError::file_error("open", self.path.display().to_string(), e.to_string())),
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| CalcError::file_error("read", self.path.display().to_string(), e.to_string()))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents)
            .map_err(|e| CalcError::serialization(format!("Invalid JSON in {}: {}", self.path.display(), e)))
    }

    /// Write all entries with atomic temp-file-then-rename semantics.
    fn write_entries(&self, entries: &BTreeMap<String, String>) -> CalcResult<()> {
        let json = serde_json::to_string_pretty(entries).map_err(CalcError::serialization)?;
        let tmp_path = with_suffix(&self.path, "tmp");

        let mut tmp_file = File::create(&tmp_path)
            .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
        tmp_file
            .write_all(json.as_bytes())
            .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;
        tmp_file
            .sync_all()
            .map_err(|e| CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            CalcError::file_error("rename to final", self.path.display().to_string(), e.to_string())
        })
    }

    fn modify(&mut self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> CalcResult<()> {
        let _lock = FileLock::acquire(&self.path, self.user_id.clone())?;
        let mut entries = self.read_entries()?;
        apply(&mut entries);
        self.write_entries(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> CalcResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> CalcResult<()> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })?;
        debug!(key, bytes = value.len(), "store write");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CalcResult<()> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_store_path(name: &str) -> PathBuf {
        temp_dir().join(format!("ecowatt_test_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_lock_path_generation() {
        let lock_path = lock_path_for(Path::new("/path/to/store.json"));
        assert_eq!(lock_path, Path::new("/path/to/store.json.lock"));
        assert_eq!(lock_path_for(Path::new("store")), Path::new("store.lock"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("test@example.com");
        assert_eq!(info.user_id, "test@example.com");
        assert!(!info.machine.is_empty());
    }

    #[test]
    fn test_set_get_remove_roundtrip() {
        let path = temp_store_path("roundtrip");
        let _ = fs::remove_file(&path);

        let mut store = FileStore::open(&path, "tester").unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "{\"a\":1}").unwrap();
        store.set("other", "2").unwrap();

        // A second handle sees the first one's writes
        let reopened = FileStore::open(&path, "tester").unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("{\"a\":1}"));

        store.remove("k").unwrap();
        assert_eq!(reopened.get("k").unwrap(), None);
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("2"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_write_leaves_no_tmp_or_lock_metadata() {
        let path = temp_store_path("atomic");
        let mut store = FileStore::open(&path, "tester").unwrap();
        store.set("k", "v").unwrap();

        assert!(path.exists());
        assert!(!with_suffix(&path, "tmp").exists());
        assert_eq!(fs::read_to_string(lock_path_for(&path)).unwrap(), "");

        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(lock_path_for(&path));
    }

    #[test]
    fn test_write_refused_while_locked() {
        let path = temp_store_path("locked");
        let mut store = FileStore::open(&path, "tester").unwrap();

        let lock = FileLock::acquire(&path, "someone@else").unwrap();
        let err = store.set("k", "v").unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert!(err.is_recoverable());
        drop(lock);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(lock_path_for(&path));
    }

    #[cfg(unix)]
    #[test]
    fn test_refused_writer_keeps_holder_metadata() {
        let path = temp_store_path("holder");
        let lock = FileLock::acquire(&path, "someone@else").unwrap();

        let err = match FileLock::acquire(&path, "tester") {
            Err(e) => e,
            Ok(_) => panic!("second acquire should be refused"),
        };
        match err {
            CalcError::FileLocked { locked_by, .. } => assert!(locked_by.starts_with("someone@else")),
            other => panic!("Expected FileLocked, got {:?}", other),
        }

        let on_disk: LockInfo =
            serde_json::from_str(&fs::read_to_string(lock_path_for(&path)).unwrap()).unwrap();
        assert_eq!(on_disk, lock.info);

        drop(lock);
        let _ = fs::remove_file(lock_path_for(&path));
    }

    #[test]
    fn test_metadata_left_by_dead_holder_is_taken_over() {
        let path = temp_store_path("stale");
        let mut ghost = LockInfo::new("ghost");
        ghost.locked_at = Utc::now() - chrono::Duration::hours(3);
        fs::write(lock_path_for(&path), serde_json::to_string(&ghost).unwrap()).unwrap();

        let lock = FileLock::acquire(&path, "tester").unwrap();
        assert_eq!(lock.info.user_id, "tester");
        drop(lock);

        let mut store = FileStore::open(&path, "tester").unwrap();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(lock_path_for(&path));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_store_path("corrupt");
        fs::write(&path, "[1, 2").unwrap();
        let err = FileStore::open(&path, "tester").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }
}
