//! Persistence for the library snapshot. The whole collection lives in one
//! human-readable JSON file; every save rewrites it in full and every load
//! reads it in full. There is deliberately no locking and no atomic-rename
//! dance: this is a single-user tool and the snapshot is small, so the
//! simplest possible file handling wins. Concurrent writers would race, and
//! that is an accepted limitation rather than a bug to paper over.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

use crate::models::Book;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".bookshelf";
/// Snapshot file name stored inside the application data directory.
const LIBRARY_FILE_NAME: &str = "library.json";

/// Errors a snapshot read or write can surface. `Parse` is kept distinct so
/// callers can tell a corrupt file apart from a plain I/O failure; neither is
/// recovered from automatically.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed library snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Handle on the snapshot file. Holding only the path keeps file handles
/// scoped to individual load/save calls, never across them.
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Point the store at an explicit snapshot path. Used directly by tests
    /// and indirectly by [`Store::open`] for the real data directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the default snapshot location inside the user's home
    /// directory and make sure its parent directory exists.
    pub fn open() -> Result<Self> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        let path = base_dirs
            .home_dir()
            .join(DATA_DIR_NAME)
            .join(LIBRARY_FILE_NAME);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }

        Ok(Self::new(path))
    }

    /// Directory the snapshot lives in. Exported artifacts are written next
    /// to it so everything the tool produces sits in one place.
    pub fn data_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Read the full collection. A missing file is a brand-new library and
    /// yields an empty collection; a file that exists but does not parse is
    /// surfaced as [`StoreError::Parse`] with no attempt at repair.
    pub fn load(&self) -> Result<Vec<Book>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let books: Vec<Book> = serde_json::from_str(&content)?;
        Ok(books)
    }

    /// Overwrite the snapshot with the full collection, pretty-printed so
    /// the file stays hand-readable and diff-friendly.
    pub fn save(&self, books: &[Book]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(books)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn book(title: &str) -> Book {
        Book {
            title: title.to_string(),
            author: "Author".to_string(),
            year: 2000,
            genre: "Fiction".to_string(),
            read: false,
        }
    }

    #[test]
    fn missing_snapshot_loads_as_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("library.json"));
        assert_eq!(store.load().unwrap(), Vec::<Book>::new());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("library.json"));

        let books = vec![book("Dune"), book("Emma")];
        store.save(&books).unwrap();

        assert_eq!(store.load().unwrap(), books);
    }

    #[test]
    fn save_overwrites_prior_snapshot_in_full() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("library.json"));

        store.save(&[book("Dune"), book("Emma")]).unwrap();
        store.save(&[book("Solaris")]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "Solaris");
    }

    #[test]
    fn malformed_snapshot_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = Store::new(path);
        assert!(matches!(store.load(), Err(StoreError::Parse(_))));
    }

    #[test]
    fn snapshot_is_human_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        let store = Store::new(&path);

        store.save(&[book("Dune")]).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"title\": \"Dune\""));
        assert!(raw.contains('\n'));
    }
}
