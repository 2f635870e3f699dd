//! Reconciliation of local documents against Outline
//!
//! For each discovered entry, in order:
//! - missing file: skipped, nothing recorded
//! - path already in the identity store: `documents.update`
//! - otherwise: `documents.create`, and the new id is recorded
//!
//! The first remote failure aborts the run. The store is only mutated in
//! memory here; persisting it is the caller's job, so an aborted run never
//! reaches disk.

use std::fs;

use tracing::{debug, info};

use crate::config::{DocumentEntry, SyncPaths};
use crate::error::{SyncError, SyncResult};
use crate::remote::DocumentService;
use crate::state::IdentityStore;

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Whether the collection was created during this run
    pub collection_created: bool,
    /// Paths of newly created documents
    pub created: Vec<String>,
    /// Paths of updated documents
    pub updated: Vec<String>,
    /// Paths skipped because the file is missing
    pub skipped: Vec<String>,
    /// Documents recorded in the identity store after the run
    pub tracked: usize,
}

impl SyncReport {
    /// Number of documents pushed to Outline
    pub fn synced_count(&self) -> usize {
        self.created.len() + self.updated.len()
    }
}

/// Drives a [`DocumentService`] from the discovered entries and the identity store
pub struct Reconciler<'a, S: DocumentService + ?Sized> {
    service: &'a S,
    paths: &'a SyncPaths,
}

impl<'a, S: DocumentService + ?Sized> Reconciler<'a, S> {
    pub fn new(service: &'a S, paths: &'a SyncPaths) -> Self {
        Self { service, paths }
    }

    /// Return the cached collection id, creating the collection on first run
    pub fn ensure_collection(
        &self,
        collection_name: &str,
        store: &mut IdentityStore,
        report: &mut SyncReport,
    ) -> SyncResult<String> {
        if let Some(id) = store.collection_id() {
            debug!("Using existing collection {}", id);
            return Ok(id.to_string());
        }

        info!("Creating Outline collection '{}'...", collection_name);
        let id = self.service.create_collection(collection_name)?;
        store.collection_id = Some(id.clone());
        report.collection_created = true;
        Ok(id)
    }

    /// Sync every entry into the collection
    pub fn run(
        &self,
        collection_name: &str,
        entries: &[DocumentEntry],
        store: &mut IdentityStore,
    ) -> SyncResult<SyncReport> {
        let mut report = SyncReport::default();
        let collection_id = self.ensure_collection(collection_name, store, &mut report)?;

        for entry in entries {
            self.sync_entry(&collection_id, entry, store, &mut report)?;
        }

        report.tracked = store.document_count();
        Ok(report)
    }

    fn sync_entry(
        &self,
        collection_id: &str,
        entry: &DocumentEntry,
        store: &mut IdentityStore,
        report: &mut SyncReport,
    ) -> SyncResult<()> {
        let file_path = self.paths.resolve(&entry.path);
        if !file_path.exists() {
            info!("Skipping '{}' (missing file)", entry.path);
            report.skipped.push(entry.path.clone());
            return Ok(());
        }

        let text = fs::read_to_string(&file_path).map_err(|source| SyncError::ReadError {
            path: file_path.clone(),
            source,
        })?;
        let parent_id = entry.parent_document_id.as_deref();

        if let Some(doc_id) = store.document_id(&entry.path) {
            self.service
                .update_document(doc_id, &entry.title, &text, parent_id)?;
            info!("Updated '{}'", entry.title);
            report.updated.push(entry.path.clone());
        } else {
            let doc_id =
                self.service
                    .create_document(collection_id, &entry.title, &text, parent_id)?;
            info!("Created '{}'", entry.title);
            store.record_document(entry.path.clone(), doc_id);
            report.created.push(entry.path.clone());
        }

        Ok(())
    }
}
