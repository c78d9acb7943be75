//! Upload form state machine
//!
//! `Idle -> Uploading -> (Success | Error)`, back to `Idle` on the next file
//! selection.

use crate::api::{display_file_name, DocumentApi, UploadFile};
use crate::models::DocumentMetadata;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const NO_FILE_MESSAGE: &str = "Please select a file to upload.";
pub const UPLOADING_MESSAGE: &str = "Uploading document...";
pub const SUPPORTED_TYPES_HINT: &str = "Supports .pdf, .docx, .txt";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Success,
    Error,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    file: Option<PathBuf>,
    status: UploadStatus,
    message: String,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// Status line for the form; empty when there is nothing to say.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn choose_file(&mut self, path: impl Into<PathBuf>) {
        self.file = Some(path.into());
        self.status = UploadStatus::Idle;
        self.message.clear();
    }

    pub fn can_submit(&self) -> bool {
        self.file.is_some() && self.status != UploadStatus::Uploading
    }

    /// Upload the chosen file. Returns the new document on success so the
    /// caller can refresh the registry.
    pub async fn submit<A: DocumentApi + ?Sized>(&mut self, api: &A) -> Option<DocumentMetadata> {
        if self.status == UploadStatus::Uploading {
            return None;
        }
        let Some(path) = self.file.clone() else {
            self.fail(NO_FILE_MESSAGE.to_string());
            return None;
        };

        self.status = UploadStatus::Uploading;
        self.message = UPLOADING_MESSAGE.to_string();

        let file = match UploadFile::read(&path).await {
            Ok(file) => file,
            Err(e) => {
                self.fail(format!("Could not read {}: {}", path.display(), e));
                return None;
            }
        };

        match api.upload_document(file).await {
            Ok(document) => {
                info!("Uploaded {} as {}", path.display(), document.doc_id);
                self.status = UploadStatus::Success;
                self.message = format!(
                    "Successfully uploaded {}! It is now being processed.",
                    display_file_name(&path)
                );
                self.file = None;
                Some(document)
            }
            Err(e) => {
                self.fail(e.to_string());
                None
            }
        }
    }

    fn fail(&mut self, message: String) {
        warn!("Upload failed: {}", message);
        self.status = UploadStatus::Error;
        self.message = message;
    }
}
