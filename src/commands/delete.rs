//! Delete command

use super::prompt::{needs_prompt, prompt_confirm, stdin_is_tty};
use crate::api::DocumentApi;
use crate::app::{App, AppOptions, DELETE_FAILED_MESSAGE};
use crate::confirm::delete_question;
use crate::error::{Error, Result};
use crate::models::DocumentMetadata;

/// Delete `doc_id` after confirmation.
///
/// Returns the deleted document, or `None` when the user declined.
pub async fn cmd_delete<A: DocumentApi>(
    api: A,
    options: AppOptions,
    doc_id: &str,
    assume_yes: bool,
) -> Result<Option<DocumentMetadata>> {
    let (mut app, _events) = App::new(api, options);
    if !app.refresh().await {
        return Err(Error::Backend(
            app.registry().error().unwrap_or_default().to_string(),
        ));
    }

    let doc = app.request_delete(doc_id)?.clone();

    let prompt = needs_prompt(
        stdin_is_tty(),
        assume_yes,
        "Use --yes to delete without confirmation.",
    )?;
    if prompt && !prompt_confirm(&delete_question(&doc.filename), false)? {
        app.cancel_delete();
        app.shutdown();
        return Ok(None);
    }

    let deleted = app.confirm_delete().await;
    app.shutdown();
    match deleted {
        Some(true) => Ok(Some(doc)),
        _ => Err(Error::Backend(DELETE_FAILED_MESSAGE.to_string())),
    }
}

pub fn print_deleted(deleted: Option<&DocumentMetadata>) {
    match deleted {
        Some(doc) => println!("✓ Deleted {} ({})", doc.filename, doc.doc_id),
        None => println!("Deletion cancelled."),
    }
}
