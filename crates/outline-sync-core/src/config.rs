//! Sync configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (`<root>/outline_sync/config.json`)
//! 3. Environment variables (`OUTLINE_API_URL`)
//!
//! Environment variables take precedence over config file values.
//! The API token is never stored on disk; it is read from
//! `OUTLINE_API_TOKEN` at startup.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{SyncError, SyncResult};

/// Default Outline API base URL
pub const DEFAULT_API_URL: &str = "https://docs.lab.axiomlayer.com/api";

/// Environment variable holding the bearer token
pub const TOKEN_VAR: &str = "OUTLINE_API_TOKEN";

/// Environment variable overriding `apiUrl`
pub const API_URL_VAR: &str = "OUTLINE_API_URL";

/// Directory (relative to the repository root) holding config and state
const SYNC_DIR: &str = "outline_sync";

/// Directory (relative to the repository root) scanned for markdown files
pub const DOCS_DIR: &str = "docs";

/// A document to sync, either listed in the config file or discovered on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    /// Path relative to the repository root; the identity key
    pub path: String,
    /// Display title in Outline
    pub title: String,
    /// Remote id of the parent document, if nested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_document_id: Option<String>,
}

impl DocumentEntry {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            parent_document_id: None,
        }
    }

    /// Nest this document under an existing remote document
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_document_id = Some(parent_id.into());
        self
    }
}

/// Sync configuration file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Outline API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Collection that receives every synced document
    pub collection_name: String,

    /// Explicit document entries, in sync order
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
}

impl SyncConfig {
    /// Load configuration for a repository layout
    pub fn load(paths: &SyncPaths) -> SyncResult<Self> {
        Self::load_from_path(&paths.config_path())
    }

    /// Load configuration from a specific path
    ///
    /// Unlike the state file, a missing config file is an error.
    pub fn load_from_path(path: &Path) -> SyncResult<Self> {
        if !path.exists() {
            return Err(SyncError::MissingConfig {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| SyncError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content, path)
    }

    /// Load configuration from a JSON string (useful for testing)
    pub fn load_from_str(json: &str) -> SyncResult<Self> {
        Self::parse(json, Path::new("<inline>"))
    }

    fn parse(json: &str, path: &Path) -> SyncResult<Self> {
        let mut config: SyncConfig =
            serde_json::from_str(json).map_err(|source| SyncError::InvalidConfig {
                path: path.to_path_buf(),
                source,
            })?;

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // OUTLINE_API_URL
        if let Ok(val) = std::env::var(API_URL_VAR) {
            if !val.is_empty() {
                self.api_url = val;
            }
        }
    }

    fn validate(&self) -> SyncResult<()> {
        if self.collection_name.trim().is_empty() {
            return Err(SyncError::InvalidValue(
                "collectionName must not be empty".to_string(),
            ));
        }
        if self.api_url.trim().is_empty() {
            return Err(SyncError::InvalidValue(
                "apiUrl must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read the Outline API token from the environment
pub fn api_token() -> SyncResult<String> {
    match std::env::var(TOKEN_VAR) {
        Ok(token) if !token.is_empty() => Ok(token),
        _ => Err(SyncError::MissingToken { var: TOKEN_VAR }),
    }
}

/// Repository layout: where config, state and docs live
#[derive(Debug, Clone)]
pub struct SyncPaths {
    root: PathBuf,
}

impl SyncPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the config file path
    pub fn config_path(&self) -> PathBuf {
        self.root.join(SYNC_DIR).join("config.json")
    }

    /// Get the identity store path
    pub fn state_path(&self) -> PathBuf {
        self.root.join(SYNC_DIR).join("state.json")
    }

    /// Get the directory scanned for markdown files
    pub fn docs_dir(&self) -> PathBuf {
        self.root.join(DOCS_DIR)
    }

    /// Resolve a document path against the repository root
    pub fn resolve(&self, rel_path: &str) -> PathBuf {
        self.root.join(rel_path)
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    pub(crate) struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        pub(crate) fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    pub(crate) const ENV_VARS: &[&str] = &[TOKEN_VAR, API_URL_VAR];

    #[test]
    fn test_load_from_str_defaults() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = SyncConfig::load_from_str(r#"{"collectionName": "Homelab"}"#).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.collection_name, "Homelab");
        assert!(config.documents.is_empty());
    }

    #[test]
    fn test_load_from_str_full() {
        let _guard = EnvGuard::new(ENV_VARS);

        let json = r#"{
            "apiUrl": "https://outline.example.com/api",
            "collectionName": "Docs",
            "documents": [
                {"path": "README.md", "title": "Overview"},
                {"path": "docs/child.md", "title": "Child", "parentDocumentId": "doc-1"}
            ]
        }"#;

        let config = SyncConfig::load_from_str(json).unwrap();
        assert_eq!(config.api_url, "https://outline.example.com/api");
        assert_eq!(config.documents.len(), 2);
        assert_eq!(config.documents[0], DocumentEntry::new("README.md", "Overview"));
        assert_eq!(
            config.documents[1],
            DocumentEntry::new("docs/child.md", "Child").with_parent("doc-1")
        );
    }

    #[test]
    fn test_missing_collection_name() {
        let _guard = EnvGuard::new(ENV_VARS);

        let err = SyncConfig::load_from_str(r#"{"documents": []}"#).unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig { .. }));
        assert!(err.is_configuration());

        let err = SyncConfig::load_from_str(r#"{"collectionName": "  "}"#).unwrap_err();
        assert!(matches!(err, SyncError::InvalidValue(_)));
    }

    #[test]
    fn test_env_override_api_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        env::set_var(API_URL_VAR, "http://localhost:3000/api");
        let config = SyncConfig::load_from_str(
            r#"{"apiUrl": "https://file.example.com/api", "collectionName": "Docs"}"#,
        )
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:3000/api");

        // Empty string leaves the file value in place
        env::set_var(API_URL_VAR, "");
        let config = SyncConfig::load_from_str(
            r#"{"apiUrl": "https://file.example.com/api", "collectionName": "Docs"}"#,
        )
        .unwrap();
        assert_eq!(config.api_url, "https://file.example.com/api");
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let temp_dir = TempDir::new().unwrap();
        let paths = SyncPaths::new(temp_dir.path());

        let err = SyncConfig::load(&paths).unwrap_err();
        assert!(matches!(err, SyncError::MissingConfig { .. }));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_load_from_path() {
        let _guard = EnvGuard::new(ENV_VARS);

        let temp_dir = TempDir::new().unwrap();
        let paths = SyncPaths::new(temp_dir.path());
        fs::create_dir_all(paths.config_path().parent().unwrap()).unwrap();
        fs::write(paths.config_path(), r#"{"collectionName": "Homelab"}"#).unwrap();

        let config = SyncConfig::load(&paths).unwrap();
        assert_eq!(config.collection_name, "Homelab");
    }

    #[test]
    fn test_api_token() {
        let _guard = EnvGuard::new(ENV_VARS);

        assert!(matches!(api_token(), Err(SyncError::MissingToken { .. })));

        env::set_var(TOKEN_VAR, "");
        assert!(api_token().is_err());

        env::set_var(TOKEN_VAR, "ol_api_secret");
        assert_eq!(api_token().unwrap(), "ol_api_secret");
    }

    #[test]
    fn test_file_paths() {
        let paths = SyncPaths::new("/repo");

        assert_eq!(paths.config_path(), PathBuf::from("/repo/outline_sync/config.json"));
        assert_eq!(paths.state_path(), PathBuf::from("/repo/outline_sync/state.json"));
        assert_eq!(paths.docs_dir(), PathBuf::from("/repo/docs"));
        assert_eq!(paths.resolve("docs/a.md"), PathBuf::from("/repo/docs/a.md"));
    }
}
