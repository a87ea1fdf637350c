// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Text blob storage for saved lyrics.
//!
//! Every song is a plain UTF-8 text file stored under `"<name>.txt"`.
//! The store is deliberately dumb: keys in, bytes out, with only two
//! failure kinds (`NotFound` and `Io`).

pub mod settings;

pub use settings::{FileSettingsStore, MemorySettingsStore, SettingsHandle, SettingsStore};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Extension appended to every song name to form its storage key.
pub const TEXT_EXT: &str = ".txt";

/// Errors from text blob storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested key does not exist
    #[error("no entry for key {0:?}")]
    NotFound(String),
    /// Underlying read/write failure
    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Named text blob storage.
pub trait TextStore: Send + Sync {
    /// Read the blob stored under `key`.
    fn read(&self, key: &str) -> StoreResult<String>;

    /// Write (create or replace) the blob under `key`.
    fn write(&self, key: &str, contents: &str) -> StoreResult<()>;

    /// List all stored keys, sorted.
    fn list(&self) -> StoreResult<Vec<String>>;

    /// Delete the blob under `key`.
    fn delete(&self, key: &str) -> StoreResult<()>;
}

/// Build the storage key for a song name.
pub fn song_key(name: &str) -> String {
    format!("{}{}", name, TEXT_EXT)
}

/// Strip the `.txt` extension from a key, yielding the display name.
pub fn display_name(key: &str) -> &str {
    key.strip_suffix(TEXT_EXT).unwrap_or(key)
}

/// Filesystem-backed text store: one file per key inside a flat directory.
#[derive(Debug, Clone)]
pub struct FsTextStore {
    root: PathBuf,
}

impl FsTextStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(root: P) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are always "<name>.txt"; refuse path separators so a key
        // can never escape the store directory.
        let safe: String = key
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.root.join(safe)
    }
}

impl TextStore for FsTextStore {
    fn read(&self, key: &str) -> StoreResult<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, contents: &str) -> StoreResult<()> {
        fs::write(self.path_for(key), contents)?;
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(TEXT_EXT) {
                keys.push(name);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FsTextStore) {
        let dir = TempDir::new().unwrap();
        let store = FsTextStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_write_then_read() {
        let (_dir, store) = store();
        store.write("Song A.txt", "first verse\nsecond verse").unwrap();
        let text = store.read("Song A.txt").unwrap();
        assert_eq!(text, "first verse\nsecond verse");
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (_dir, store) = store();
        match store.read("nope.txt") {
            Err(StoreError::NotFound(key)) => assert_eq!(key, "nope.txt"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_list_only_txt_sorted() {
        let (dir, store) = store();
        store.write("b.txt", "b").unwrap();
        store.write("a.txt", "a").unwrap();
        std::fs::write(dir.path().join("notes.md"), "x").unwrap();

        assert_eq!(store.list().unwrap(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = store();
        store.write("gone.txt", "x").unwrap();
        store.delete("gone.txt").unwrap();
        assert!(matches!(
            store.read("gone.txt"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("gone.txt"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_key_helpers() {
        assert_eq!(song_key("Artist - Track"), "Artist - Track.txt");
        assert_eq!(display_name("Artist - Track.txt"), "Artist - Track");
        assert_eq!(display_name("no-extension"), "no-extension");
    }

    #[test]
    fn test_key_cannot_escape_root() {
        let (dir, store) = store();
        store.write("../escape.txt", "x").unwrap();
        assert!(!dir.path().parent().unwrap().join("escape.txt").exists());
    }
}
