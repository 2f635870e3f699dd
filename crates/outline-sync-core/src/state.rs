//! Identity store persistence
//!
//! Maps local document paths to Outline document ids so repeated runs
//! update the same documents instead of creating duplicates.
//!
//! The store is rewritten wholesale (temp file, fsync, rename) with sorted
//! keys and two-space indentation so it diffs cleanly under version control.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Remote identity of a synced document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentState {
    pub id: String,
}

/// Persisted path → remote id mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityStore {
    /// Outline collection id, absent until the first run creates it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,

    /// Synced documents keyed by repository-relative path
    #[serde(default)]
    pub documents: BTreeMap<String, DocumentState>,
}

impl IdentityStore {
    /// Create an empty store (first run)
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from disk
    ///
    /// Returns an empty store if the file doesn't exist.
    pub fn load(path: &Path) -> SyncResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|source| SyncError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| SyncError::InvalidState {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save the store to disk using atomic write
    pub fn save(&self, path: &Path) -> SyncResult<()> {
        // BTreeMap keeps document keys sorted; struct fields serialize in
        // alphabetical order already (collectionId < documents).
        let mut json = serde_json::to_string_pretty(self).map_err(|e| SyncError::WriteError {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        json.push('\n');

        atomic_write(path, json.as_bytes()).map_err(|source| SyncError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the remote id recorded for a document path
    ///
    /// An empty id counts as unsynced.
    pub fn document_id(&self, path: &str) -> Option<&str> {
        self.documents
            .get(path)
            .map(|doc| doc.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Get the cached collection id, ignoring an empty value
    pub fn collection_id(&self) -> Option<&str> {
        self.collection_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Record the remote id of a newly created document
    pub fn record_document(&mut self, path: impl Into<String>, id: impl Into<String>) {
        self.documents
            .insert(path.into(), DocumentState { id: id.into() });
    }

    /// Number of documents with a recorded remote id
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");

        let store = IdentityStore::load(&path).unwrap();
        assert!(store.collection_id.is_none());
        assert_eq!(store.document_count(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("outline_sync").join("state.json");

        let mut store = IdentityStore::new();
        store.collection_id = Some("col-1".to_string());
        store.record_document("docs/setup.md", "doc-1");
        store.record_document("README.md", "doc-2");
        store.save(&path).unwrap();

        let loaded = IdentityStore::load(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.document_id("docs/setup.md"), Some("doc-1"));
        assert_eq!(loaded.document_id("docs/missing.md"), None);
    }

    #[test]
    fn test_saved_format_is_sorted_and_indented() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");

        let mut store = IdentityStore::new();
        store.record_document("docs/zeta.md", "z");
        store.record_document("docs/alpha.md", "a");
        store.collection_id = Some("col-1".to_string());
        store.save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let expected = r#"{
  "collectionId": "col-1",
  "documents": {
    "docs/alpha.md": {
      "id": "a"
    },
    "docs/zeta.md": {
      "id": "z"
    }
  }
}
"#;
        assert_eq!(content, expected);
        assert!(!temp_dir.path().join("state.tmp").exists());
    }

    #[test]
    fn test_load_without_collection() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        fs::write(&path, r#"{"documents": {"a.md": {"id": "doc-a"}}}"#).unwrap();

        let store = IdentityStore::load(&path).unwrap();
        assert!(store.collection_id.is_none());
        assert_eq!(store.document_id("a.md"), Some("doc-a"));
    }

    #[test]
    fn test_load_invalid_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let err = IdentityStore::load(&path).unwrap_err();
        assert!(matches!(err, SyncError::InvalidState { .. }));
        // Nothing is rewritten on failure
        assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn test_empty_ids_count_as_missing() {
        let mut store = IdentityStore::new();
        store.collection_id = Some(String::new());
        store.record_document("a.md", "");

        assert!(store.collection_id().is_none());
        assert!(store.document_id("a.md").is_none());

        store.collection_id = Some("col-1".to_string());
        assert_eq!(store.collection_id(), Some("col-1"));
    }

    #[test]
    fn test_record_document_overwrites() {
        let mut store = IdentityStore::new();
        store.record_document("a.md", "old");
        store.record_document("a.md", "new");
        assert_eq!(store.document_count(), 1);
        assert_eq!(store.document_id("a.md"), Some("new"));
    }
}
