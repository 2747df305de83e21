//! File-backed store backend.
//!
//! Values are stored one file per key under a store directory, by default
//! `~/.config/quickpad/store/`. Keys are sanitized to safe filenames;
//! writes are atomic (temp file + rename) to prevent corruption on crash.

use crate::{KeyValueStore, StoreError};
use std::fs;
use std::path::{Path, PathBuf};

/// One-file-per-key store rooted at a directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

/// Get the default store directory (using XDG convention).
pub fn default_store_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("quickpad").join("store")
        } else {
            PathBuf::from("store")
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        // Use XDG convention on all platforms: ~/.config/quickpad/store
        if let Some(home_dir) = dirs::home_dir() {
            home_dir.join(".config").join("quickpad").join("store")
        } else {
            PathBuf::from("store")
        }
    }
}

/// Map a store key to a filename that is safe on all supported platforms.
///
/// Alphanumerics, `-`, `_` and `.` pass through; everything else (including
/// the `:` used by content keys) becomes `_`. Collisions are acceptable only
/// if the key namespace avoids them, which the session layer's fixed key set
/// does.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl FileStore {
    /// Open a store at the default platform location, creating the
    /// directory if needed.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(default_store_dir())
    }

    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            key: root.display().to_string(),
            source,
        })?;
        log::info!("Opened file store at {:?}", root);
        Ok(Self { root })
    }

    /// Directory this store reads and writes under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(sanitize_key(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Failed to read store key '{key}' from {:?}: {e}", path);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        // Atomic save: write to temp file then rename to prevent corruption
        // on crash.
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value).map_err(|source| StoreError::Io {
            key: key.to_string(),
            source,
        })?;
        fs::rename(&temp_path, &path).map_err(|source| StoreError::Io {
            key: key.to_string(),
            source,
        })?;
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        let path = self.path_for(key);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove store key '{key}' at {:?}: {e}", path);
            }
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }
}
