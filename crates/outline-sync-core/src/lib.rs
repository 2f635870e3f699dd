//! outline-sync core library
//!
//! Syncs local markdown files into an Outline collection. A persisted
//! identity store maps each file path to its Outline document id, so
//! re-running the sync updates documents instead of duplicating them.
//!
//! # Quick Start
//!
//! ```text
//! let paths = SyncPaths::new(".");
//! let config = SyncConfig::load(&paths)?;
//! let client = OutlineClient::new(&config.api_url, api_token()?)?;
//! let report = sync_repository(&paths, &config, &client)?;
//! ```
//!
//! # Modules
//!
//! - `config`: Config file, repository layout and API token
//! - `discovery`: Merge configured entries with `docs/*.md`
//! - `remote`: Outline API client
//! - `reconcile`: Create-or-update decision per document
//! - `state`: Identity store persistence
//! - `error`: Error types

pub mod config;
pub mod discovery;
pub mod error;
pub mod reconcile;
pub mod remote;
pub mod state;

pub use config::{api_token, DocumentEntry, SyncConfig, SyncPaths};
pub use discovery::{discover_documents, path_to_title};
pub use error::{SyncError, SyncResult};
pub use reconcile::{Reconciler, SyncReport};
pub use remote::{DocumentService, OutlineClient};
pub use state::IdentityStore;

/// Run a full sync for a repository
///
/// Loads the identity store, discovers documents, reconciles them against
/// `service`, and saves the store once at the end. If any step fails the
/// state file is left exactly as it was before the run.
pub fn sync_repository<S: DocumentService + ?Sized>(
    paths: &SyncPaths,
    config: &SyncConfig,
    service: &S,
) -> SyncResult<SyncReport> {
    let state_path = paths.state_path();
    let mut store = IdentityStore::load(&state_path)?;

    let entries = discover_documents(config, paths)?;
    tracing::debug!("{} document(s) to sync", entries.len());

    let report =
        Reconciler::new(service, paths).run(&config.collection_name, &entries, &mut store)?;

    store.save(&state_path)?;
    Ok(report)
}
