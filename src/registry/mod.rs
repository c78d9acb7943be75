//! Client-side view of the backend's document registry
//!
//! Holds the last document snapshot, its load state, and the polling policy
//! derived from it. Each successful load replaces the snapshot wholesale.

mod poller;

pub use poller::*;

use crate::api::DocumentApi;
use crate::models::DocumentMetadata;
use tracing::{debug, warn};

/// Shown while the last refresh failed; the previous snapshot stays visible.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to fetch documents. Make sure the backend is running.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    /// Only held while `refresh` awaits the backend; callers show a spinner.
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct Registry {
    documents: Vec<DocumentMetadata>,
    state: LoadState,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[DocumentMetadata] {
        &self.documents
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn get(&self, doc_id: &str) -> Option<&DocumentMetadata> {
        self.documents.iter().find(|doc| doc.doc_id == doc_id)
    }

    /// Run one refresh cycle; returns whether the load succeeded.
    pub async fn refresh<A: DocumentApi + ?Sized>(&mut self, api: &A) -> bool {
        self.state = LoadState::Loading;
        match api.list_documents().await {
            Ok(documents) => {
                debug!("Loaded {} documents", documents.len());
                self.replace(documents);
                true
            }
            Err(e) => {
                warn!("Document refresh failed: {}", e);
                self.state = LoadState::Failed(LOAD_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    /// Replace the snapshot with a freshly loaded list.
    pub fn replace(&mut self, documents: Vec<DocumentMetadata>) {
        self.documents = sort_ready_first(documents);
        self.state = LoadState::Loaded;
    }

    /// Drop a document from the local snapshot after a successful delete.
    pub fn remove(&mut self, doc_id: &str) -> Option<DocumentMetadata> {
        let index = self.documents.iter().position(|doc| doc.doc_id == doc_id)?;
        Some(self.documents.remove(index))
    }

    pub fn needs_polling(&self) -> bool {
        needs_polling(&self.documents)
    }
}

/// Stable partition: every "ready" document before every other one.
pub fn sort_ready_first(mut documents: Vec<DocumentMetadata>) -> Vec<DocumentMetadata> {
    documents.sort_by_key(|doc| !doc.is_ready());
    documents
}

/// True while any document is neither ready nor failed.
pub fn needs_polling(documents: &[DocumentMetadata]) -> bool {
    documents.iter().any(DocumentMetadata::is_pending)
}
