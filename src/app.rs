//! Top-level client state
//!
//! [`App`] is the single owner of the registry, the selection and every
//! component that reacts to them. User intents and timer events go in through
//! its methods; renderers only read.

use crate::api::DocumentApi;
use crate::chat::ChatSession;
use crate::config::Config;
use crate::confirm::ConfirmationGate;
use crate::documents::{build_rows, resolve_selection, DocumentRow, SelectionRejected};
use crate::error::{Error, Result};
use crate::models::{ChatMessage, DocumentMetadata, Selection};
use crate::preview::PreviewPane;
use crate::registry::{PollTick, Poller, Registry};
use crate::upload::UploadForm;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete document.";

/// Events delivered to the app's loop from outside user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    PollDue(PollTick),
}

impl From<PollTick> for AppEvent {
    fn from(tick: PollTick) -> Self {
        AppEvent::PollDue(tick)
    }
}

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub poll_interval: Duration,
    pub top_n: Option<usize>,
    pub preview_dir: Option<PathBuf>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(crate::config::default_poll_interval_secs()),
            top_n: None,
            preview_dir: None,
        }
    }
}

impl AppOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            top_n: config.search.top_n,
            preview_dir: config.preview.dir.clone(),
        }
    }
}

pub struct App<A> {
    api: A,
    options: AppOptions,
    registry: Registry,
    selection: Selection,
    upload: UploadForm,
    chat: ChatSession,
    preview: PreviewPane,
    delete_gate: ConfirmationGate<DocumentMetadata>,
    poller: Poller,
    events: UnboundedSender<AppEvent>,
    notice: Option<String>,
}

impl<A: DocumentApi> App<A> {
    /// Create the app and the receiving end of its event channel.
    pub fn new(api: A, options: AppOptions) -> (Self, UnboundedReceiver<AppEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let preview = PreviewPane::new(options.preview_dir.clone());
        let app = Self {
            api,
            options,
            registry: Registry::new(),
            selection: Selection::All,
            upload: UploadForm::new(),
            chat: ChatSession::new(),
            preview,
            delete_gate: ConfirmationGate::new(),
            poller: Poller::new(),
            events,
            notice: None,
        };
        (app, receiver)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn rows(&self) -> Vec<DocumentRow> {
        build_rows(&self.registry, &self.selection)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_document(&self) -> Option<&DocumentMetadata> {
        self.selection.doc_id().and_then(|id| self.registry.get(id))
    }

    pub fn upload(&self) -> &UploadForm {
        &self.upload
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn preview(&self) -> &PreviewPane {
        &self.preview
    }

    pub fn pending_delete(&self) -> Option<&DocumentMetadata> {
        self.delete_gate.pending()
    }

    /// Whether the next input answers a delete question
    pub fn is_confirming_delete(&self) -> bool {
        self.delete_gate.is_open()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_scheduled()
    }

    /// One-line status from the last delete, if not yet shown
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Initial registry load.
    pub async fn start(&mut self) {
        info!("Loading documents");
        self.refresh().await;
    }

    /// Reload the registry and decide whether to keep polling.
    pub async fn refresh(&mut self) -> bool {
        let loaded = self.registry.refresh(&self.api).await;

        if let Some(doc_id) = self.selection.doc_id() {
            if self.registry.get(doc_id).is_none() {
                debug!("Selected document {} disappeared from the registry", doc_id);
                self.apply_selection(Selection::All).await;
            }
        }

        self.update_polling();
        loaded
    }

    fn update_polling(&mut self) {
        if self.registry.needs_polling() {
            self.poller
                .schedule(self.options.poll_interval, self.events.clone());
        } else {
            self.poller.cancel();
        }
    }

    pub async fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::PollDue(tick) => {
                if self.poller.accept(tick) {
                    debug!("Poll {} due", tick.generation);
                    self.refresh().await;
                }
            }
        }
    }

    /// Select a document by id, or all documents with `None`.
    ///
    /// Returns whether the selection changed.
    pub async fn select(&mut self, target: Option<&str>) -> std::result::Result<bool, SelectionRejected> {
        let selection = resolve_selection(&self.registry, target)?;
        Ok(self.apply_selection(selection).await)
    }

    pub async fn clear_selection(&mut self) -> bool {
        self.apply_selection(Selection::All).await
    }

    async fn apply_selection(&mut self, selection: Selection) -> bool {
        if selection == self.selection {
            return false;
        }
        info!("Selection changed to {:?}", selection);
        self.selection = selection;
        self.chat.reset();

        let doc = self.selection.doc_id().and_then(|id| self.registry.get(id));
        self.preview.show(&self.api, doc).await;
        true
    }

    pub fn choose_upload_file(&mut self, path: impl Into<PathBuf>) {
        self.upload.choose_file(path);
    }

    /// Submit the upload form; refreshes the registry on success.
    pub async fn submit_upload(&mut self) -> Option<DocumentMetadata> {
        let document = self.upload.submit(&self.api).await?;
        self.refresh().await;
        Some(document)
    }

    /// Ask a question in the current scope; returns the assistant reply.
    pub async fn ask(&mut self, input: &str) -> Option<ChatMessage> {
        self.chat
            .submit(&self.api, &self.selection, input, self.options.top_n)
            .await
            .cloned()
    }

    /// Open the deletion gate for `doc_id`.
    pub fn request_delete(&mut self, doc_id: &str) -> Result<&DocumentMetadata> {
        let doc = self
            .registry
            .get(doc_id)
            .cloned()
            .ok_or_else(|| Error::DocumentNotFound(doc_id.to_string()))?;
        self.delete_gate.open(doc);
        self.delete_gate
            .pending()
            .ok_or_else(|| Error::DocumentNotFound(doc_id.to_string()))
    }

    pub fn cancel_delete(&mut self) {
        self.delete_gate.cancel();
    }

    /// Delete the pending document. `None` when nothing was pending,
    /// otherwise whether the backend accepted the delete.
    pub async fn confirm_delete(&mut self) -> Option<bool> {
        let doc = self.delete_gate.confirm(|doc| doc)?;

        match self.api.delete_document(&doc.doc_id).await {
            Ok(()) => {
                info!("Deleted {} ({})", doc.filename, doc.doc_id);
                self.registry.remove(&doc.doc_id);
                if self.selection.is_document(&doc.doc_id) {
                    self.apply_selection(Selection::All).await;
                }
                if !self.registry.needs_polling() {
                    self.poller.cancel();
                }
                self.notice = Some(format!("Deleted {}", doc.filename));
                Some(true)
            }
            Err(e) => {
                warn!("Delete of {} failed: {}", doc.doc_id, e);
                self.notice = Some(DELETE_FAILED_MESSAGE.to_string());
                Some(false)
            }
        }
    }

    /// Stop the poll timer and release the preview.
    pub fn shutdown(&mut self) {
        self.poller.cancel();
        self.preview.release();
    }
}
