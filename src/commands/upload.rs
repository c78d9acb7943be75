//! Upload command

use crate::api::DocumentApi;
use crate::app::{App, AppOptions};
use crate::error::{Error, Result};
use crate::models::DocumentMetadata;
use crate::progress;
use crate::upload::UPLOADING_MESSAGE;
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub message: String,
    /// Final document state; after `--wait` this is ready or failed
    pub document: DocumentMetadata,
}

/// Upload `path`, optionally waiting until processing finishes.
pub async fn cmd_upload<A: DocumentApi>(
    api: A,
    options: AppOptions,
    path: &Path,
    wait: bool,
) -> Result<UploadOutcome> {
    let (mut app, mut events) = App::new(api, options);
    app.choose_upload_file(path);

    let spinner = progress::spinner(UPLOADING_MESSAGE);
    let uploaded = app.submit_upload().await;
    spinner.finish_and_clear();

    let message = app.upload().message().to_string();
    let Some(uploaded) = uploaded else {
        return Err(Error::Upload(message));
    };

    if !wait {
        app.shutdown();
        return Ok(UploadOutcome {
            message,
            document: uploaded,
        });
    }

    let spinner = progress::spinner(format!("Processing {}", uploaded.filename));
    let result = loop {
        if let Some(doc) = app.registry().get(&uploaded.doc_id) {
            if !doc.is_pending() {
                info!("{} finished with status {}", doc.filename, doc.status);
                break Ok(doc.clone());
            }
            spinner.set_message(format!(
                "{} {} ({})",
                doc.status_kind().glyph(),
                doc.filename,
                doc.status
            ));
        }

        if !app.is_polling() {
            break Err(match app.registry().error() {
                Some(message) => Error::Backend(message.to_string()),
                None => Error::DocumentNotFound(uploaded.doc_id.clone()),
            });
        }

        match events.recv().await {
            Some(event) => app.handle_event(event).await,
            None => break Err(Error::DocumentNotFound(uploaded.doc_id.clone())),
        }
    };
    spinner.finish_and_clear();
    app.shutdown();

    result.map(|document| UploadOutcome { message, document })
}

/// Print upload result to console
pub fn print_upload_outcome(outcome: &UploadOutcome) {
    let doc = &outcome.document;
    println!("✓ {}", outcome.message);
    println!("  ID: {}", doc.doc_id);
    println!("  Status: {} {}", doc.status_kind().glyph(), doc.status);
    if doc.is_failed() {
        if let Some(message) = &doc.error_message {
            println!("  Error: {}", message);
        }
    }
}
