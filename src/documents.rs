//! Document list rows and selection rules

use crate::models::{DocumentMetadata, Selection, StatusKind};
use crate::registry::Registry;
use serde::Serialize;
use thiserror::Error;

pub const EMPTY_LIST_HINT: &str = "Upload a document to get started.";
pub const ALL_DOCUMENTS_LABEL: &str = "All Documents";

/// Why a selection request was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionRejected {
    #[error("Cannot query, status: {status}")]
    NotReady { doc_id: String, status: String },

    #[error("Unknown document: {0}")]
    Unknown(String),
}

/// One rendered row of the document list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRow {
    /// `None` for the synthetic "All Documents" row
    pub doc_id: Option<String>,
    pub label: String,
    pub status: Option<String>,
    pub kind: Option<StatusKind>,
    pub selectable: bool,
    pub selected: bool,
    /// Only set for failed documents that carry a message
    pub error_message: Option<String>,
}

impl DocumentRow {
    fn all_documents(selection: &Selection) -> Self {
        Self {
            doc_id: None,
            label: ALL_DOCUMENTS_LABEL.to_string(),
            status: None,
            kind: None,
            selectable: true,
            selected: *selection == Selection::All,
            error_message: None,
        }
    }

    fn document(doc: &DocumentMetadata, selection: &Selection) -> Self {
        let kind = doc.status_kind();
        let error_message = if doc.is_failed() {
            doc.error_message.clone().filter(|m| !m.is_empty())
        } else {
            None
        };
        Self {
            doc_id: Some(doc.doc_id.clone()),
            label: doc.filename.clone(),
            status: Some(doc.status.clone()),
            kind: Some(kind),
            selectable: doc.is_ready(),
            selected: selection.is_document(&doc.doc_id),
            error_message,
        }
    }
}

/// "All Documents" followed by one row per registry entry, in registry order.
pub fn build_rows(registry: &Registry, selection: &Selection) -> Vec<DocumentRow> {
    std::iter::once(DocumentRow::all_documents(selection))
        .chain(
            registry
                .documents()
                .iter()
                .map(|doc| DocumentRow::document(doc, selection)),
        )
        .collect()
}

/// Resolve a selection request against the registry.
///
/// `None` selects all documents. A document is selectable only when its
/// status is exactly "ready".
pub fn resolve_selection(
    registry: &Registry,
    target: Option<&str>,
) -> Result<Selection, SelectionRejected> {
    let Some(doc_id) = target else {
        return Ok(Selection::All);
    };
    let doc = registry
        .get(doc_id)
        .ok_or_else(|| SelectionRejected::Unknown(doc_id.to_string()))?;

    if doc.is_ready() {
        Ok(Selection::Document(doc.doc_id.clone()))
    } else {
        Err(SelectionRejected::NotReady {
            doc_id: doc.doc_id.clone(),
            status: doc.status.clone(),
        })
    }
}

/// Map a shell reference (1-based row number or doc id) to a doc id.
///
/// Row 1 is "All Documents", so numbers address `documents()[n - 2]`.
/// Returns `Ok(None)` for the "All Documents" row.
pub fn lookup_reference<'a>(
    registry: &'a Registry,
    reference: &'a str,
) -> Result<Option<&'a str>, SelectionRejected> {
    let reference = reference.trim();
    if let Some(doc) = registry.get(reference) {
        return Ok(Some(doc.doc_id.as_str()));
    }
    match reference.parse::<usize>() {
        Ok(1) => Ok(None),
        Ok(n) if n >= 2 => registry
            .documents()
            .get(n - 2)
            .map(|doc| Some(doc.doc_id.as_str()))
            .ok_or_else(|| SelectionRejected::Unknown(reference.to_string())),
        _ => Err(SelectionRejected::Unknown(reference.to_string())),
    }
}
