//! Persistence collaborator — opaque key-value byte storage.
//!
//! The core issues exactly two logical keys: [`ENTRIES_KEY`] for the
//! serialized entry snapshot and [`PIN_KEY`] for the stored PIN record.
//! The collaborator owns only serialized bytes, never live vault state,
//! and must round-trip them exactly.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

/// Storage key for the serialized entry snapshot.
pub const ENTRIES_KEY: &str = "entries";

/// Storage key for the stored PIN record.
pub const PIN_KEY: &str = "pin";

/// Opaque key-value persistence boundary supplied by the host platform.
///
/// `set` must be durable before it returns `Ok`: the vault treats a
/// successful return as a committed write. A partial write must never
/// corrupt previously committed bytes (write-new-then-swap, not in-place
/// truncation).
pub trait Storage {
    /// Read the bytes stored under `key`, or `None` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend read fails for any reason
    /// other than the key being absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Durably store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write could not be completed. The
    /// previously committed value must remain intact in that case.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// File-backed storage
// ---------------------------------------------------------------------------

/// One-file-per-key storage rooted at a data directory.
///
/// Writes go to a hidden temp file first and are then renamed over the
/// target, so a crash mid-write leaves the previous snapshot intact.
/// Clones share the same directory and therefore the same state.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a storage handle rooted at `dir`.
    ///
    /// The directory is created lazily on the first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.key_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;

        // Restrict file permissions to owner-only on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, self.key_path(key))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory storage
// ---------------------------------------------------------------------------

/// In-memory storage for tests and ephemeral vaults.
///
/// Clones share one underlying map, so the auth gate and the store can be
/// handed handles to the same state the way [`FileStorage`] clones share
/// a directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    cells: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let cells = self
            .cells
            .lock()
            .map_err(|_| StorageError::Backend("storage lock poisoned".into()))?;
        Ok(cells.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut cells = self
            .cells
            .lock()
            .map_err(|_| StorageError::Backend("storage lock poisoned".into()))?;
        cells.insert(key.to_owned(), value.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
