//! Document preview pane
//!
//! A loaded preview is held as a temporary file. It is released explicitly
//! before every new fetch, when the selection is cleared, and on teardown.

use crate::api::DocumentApi;
use crate::error::Result;
use crate::models::{DocumentMetadata, PreviewBlob};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub const PREVIEW_ERROR: &str = "Could not load document preview.";

/// A fetched preview written to disk
#[derive(Debug)]
pub struct PreviewResource {
    doc_id: String,
    filename: String,
    content_type: Option<String>,
    size: usize,
    file: NamedTempFile,
}

impl PreviewResource {
    fn acquire(dir: Option<&Path>, doc: &DocumentMetadata, blob: PreviewBlob) -> Result<Self> {
        let suffix = preview_suffix(&doc.filename, blob.content_type.as_deref());
        let mut builder = tempfile::Builder::new();
        builder.prefix("docqa-preview-").suffix(&suffix);

        let mut file = match dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempfile_in(dir)?
            }
            None => builder.tempfile()?,
        };
        file.write_all(&blob.bytes)?;
        file.flush()?;
        debug!("Preview for {} written to {:?}", doc.doc_id, file.path());

        Ok(Self {
            doc_id: doc.doc_id.clone(),
            filename: doc.filename.clone(),
            content_type: blob.content_type,
            size: blob.bytes.len(),
            file,
        })
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the backing file.
    pub fn release(self) -> Result<()> {
        debug!("Releasing preview for {}", self.doc_id);
        self.file.close()?;
        Ok(())
    }
}

/// File suffix that lets a viewer recognise the preview
fn preview_suffix(filename: &str, content_type: Option<&str>) -> String {
    if let Some(ext) = Path::new(filename).extension() {
        return format!(".{}", ext.to_string_lossy());
    }
    content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
        .and_then(mime_guess::get_mime_extensions_str)
        .and_then(|exts| exts.first())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

#[derive(Debug, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    Loading {
        filename: String,
    },
    Loaded(PreviewResource),
    Failed {
        doc_id: String,
        message: String,
    },
}

#[derive(Debug, Default)]
pub struct PreviewPane {
    state: PreviewState,
    dir: Option<PathBuf>,
}

impl PreviewPane {
    /// `dir` overrides the system temp directory for preview files.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            state: PreviewState::Idle,
            dir,
        }
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn resource(&self) -> Option<&PreviewResource> {
        match &self.state {
            PreviewState::Loaded(resource) => Some(resource),
            _ => None,
        }
    }

    /// Release whatever is held and fetch the preview for `doc`, if any.
    pub async fn show<A: DocumentApi + ?Sized>(&mut self, api: &A, doc: Option<&DocumentMetadata>) {
        self.release();
        let Some(doc) = doc else {
            return;
        };

        self.state = PreviewState::Loading {
            filename: doc.filename.clone(),
        };

        let loaded = match api.get_preview(&doc.doc_id).await {
            Ok(blob) => PreviewResource::acquire(self.dir.as_deref(), doc, blob),
            Err(e) => Err(e),
        };

        self.state = match loaded {
            Ok(resource) => PreviewState::Loaded(resource),
            Err(e) => {
                warn!("Preview for {} failed: {}", doc.doc_id, e);
                PreviewState::Failed {
                    doc_id: doc.doc_id.clone(),
                    message: PREVIEW_ERROR.to_string(),
                }
            }
        };
    }

    /// Drop the current preview and return to `Idle`.
    pub fn release(&mut self) {
        if let PreviewState::Loaded(resource) = std::mem::take(&mut self.state) {
            if let Err(e) = resource.release() {
                warn!("Failed to remove preview file: {}", e);
            }
        }
    }
}

impl Drop for PreviewPane {
    fn drop(&mut self) {
        self.release();
    }
}
