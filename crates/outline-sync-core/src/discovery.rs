//! Document discovery
//!
//! Builds the ordered set of documents to sync: explicit config entries
//! first, then any `docs/*.md` file not already listed, titled from its
//! file name.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::{DocumentEntry, SyncConfig, SyncPaths, DOCS_DIR};
use crate::error::{SyncError, SyncResult};

/// Merge configured entries with markdown files found in the docs directory
///
/// Entries are keyed by `path`; the first occurrence wins, so an explicit
/// entry is never replaced by a discovered one.
pub fn discover_documents(
    config: &SyncConfig,
    paths: &SyncPaths,
) -> SyncResult<Vec<DocumentEntry>> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for entry in &config.documents {
        if seen.insert(entry.path.clone()) {
            entries.push(entry.clone());
        }
    }

    for name in scan_markdown_files(&paths.docs_dir())? {
        let rel_path = format!("{}/{}", DOCS_DIR, name);
        if seen.insert(rel_path.clone()) {
            let title = path_to_title(&rel_path);
            debug!("Discovered '{}' as '{}'", rel_path, title);
            entries.push(DocumentEntry::new(rel_path, title));
        }
    }

    Ok(entries)
}

/// List `*.md` file names directly inside `dir`, sorted
///
/// A missing directory yields an empty list.
fn scan_markdown_files(dir: &Path) -> SyncResult<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let read_err = |source: std::io::Error| SyncError::ReadError {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("md") {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        }
    }

    names.sort();
    Ok(names)
}

/// Convert a file path to a document title
///
/// `docs/my-doc_name.md` becomes `My Doc Name`; words that are already
/// all uppercase (`API`, `SDK`) are kept as-is.
pub fn path_to_title(path: &str) -> String {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path);

    stem.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            if is_uppercase_word(word) {
                word.to_string()
            } else {
                title_case(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when the word has cased letters and none of them are lowercase
fn is_uppercase_word(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut in_run = false;

    for c in word.chars() {
        if c.is_alphabetic() {
            if in_run {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }

    out
}
