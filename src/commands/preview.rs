//! Preview download command

use crate::api::DocumentApi;
use crate::error::{Error, Result};
use crate::models::DocumentMetadata;
use crate::progress;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct PreviewOptions {
    /// Destination file; defaults to the document's filename in the current directory
    pub output: Option<PathBuf>,
    pub force: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedPreview {
    pub doc_id: String,
    pub path: PathBuf,
    pub content_type: Option<String>,
    pub bytes: usize,
}

/// Fetch the preview bytes for `doc_id` and write them to disk.
pub async fn cmd_preview<A: DocumentApi + ?Sized>(
    api: &A,
    doc_id: &str,
    options: PreviewOptions,
) -> Result<SavedPreview> {
    let documents = api.list_documents().await?;
    let doc = documents
        .iter()
        .find(|d| d.doc_id == doc_id)
        .ok_or_else(|| Error::DocumentNotFound(doc_id.to_string()))?;

    let path = options
        .output
        .unwrap_or_else(|| default_output_path(doc));
    if path.exists() && !options.force {
        return Err(Error::Validation(format!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        )));
    }

    let spinner = progress::spinner(format!("Loading preview of {}", doc.filename));
    let blob = api.get_preview(doc_id).await;
    spinner.finish_and_clear();
    let blob = blob?;

    tokio::fs::write(&path, &blob.bytes).await?;
    info!("Saved preview of {} to {:?}", doc_id, path);

    Ok(SavedPreview {
        doc_id: doc_id.to_string(),
        path,
        content_type: blob.content_type,
        bytes: blob.bytes.len(),
    })
}

fn default_output_path(doc: &DocumentMetadata) -> PathBuf {
    // Backend filenames are untrusted; keep only the final component
    Path::new(&doc.filename)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("{}.preview", doc.doc_id)))
}

pub fn print_saved_preview(saved: &SavedPreview) {
    println!("✓ Saved preview to {}", saved.path.display());
    println!(
        "  {} bytes, {}",
        saved.bytes,
        saved.content_type.as_deref().unwrap_or("unknown type")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{document, fetch_error, FakeApi};
    use crate::api::ApiOperation;
    use crate::models::PreviewBlob;
    use tempfile::TempDir;

    fn options(output: PathBuf) -> PreviewOptions {
        PreviewOptions {
            output: Some(output),
            force: false,
        }
    }

    #[tokio::test]
    async fn test_preview_is_written() {
        let tmp = TempDir::new().unwrap();
        let api = FakeApi::new();
        api.push_list(Ok(vec![document("a", "ready")]))
            .push_preview(Ok(PreviewBlob {
                bytes: b"hello".to_vec(),
                content_type: Some("text/plain".to_string()),
            }));

        let target = tmp.path().join("out.txt");
        let saved = cmd_preview(&api, "a", options(target.clone())).await.unwrap();
        assert_eq!(saved.bytes, 5);
        assert_eq!(std::fs::read(&target).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_existing_output_needs_force() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("out.txt");
        std::fs::write(&target, "old").unwrap();

        let api = FakeApi::new();
        api.push_list(Ok(vec![document("a", "ready")]));

        let err = cmd_preview(&api, "a", options(target.clone())).await.unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "old");
    }

    #[tokio::test]
    async fn test_failed_fetch_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let api = FakeApi::new();
        api.push_list(Ok(vec![document("a", "ready")]))
            .push_preview(Err(fetch_error(ApiOperation::Preview)));

        let target = tmp.path().join("out.txt");
        assert!(cmd_preview(&api, "a", options(target.clone())).await.is_err());
        assert!(!target.exists());
    }

    #[test]
    fn test_default_output_strips_directories() {
        let mut doc = document("a", "ready");
        doc.filename = "../../etc/report.pdf".to_string();
        assert_eq!(default_output_path(&doc), PathBuf::from("report.pdf"));

        doc.filename = "..".to_string();
        assert_eq!(default_output_path(&doc), PathBuf::from("a.preview"));
    }
}
