//! List command and document row rendering

use crate::api::DocumentApi;
use crate::documents::{DocumentRow, EMPTY_LIST_HINT};
use crate::error::Result;
use crate::models::DocumentMetadata;
use crate::registry::{sort_ready_first, Registry};
use crossterm::style::Stylize;
use unicode_segmentation::UnicodeSegmentation;

/// Widest filename shown before truncation, in graphemes
const LABEL_WIDTH: usize = 48;

/// Fetch the documents, ready ones first.
pub async fn cmd_list<A: DocumentApi + ?Sized>(api: &A) -> Result<Vec<DocumentMetadata>> {
    let documents = api.list_documents().await?;
    Ok(sort_ready_first(documents))
}

/// Print documents to console
pub fn print_documents(documents: &[DocumentMetadata]) {
    println!("\n📄 Documents\n");

    if documents.is_empty() {
        println!("{}", EMPTY_LIST_HINT);
        return;
    }

    for doc in documents {
        let kind = doc.status_kind();
        println!(
            "{} {}  [{}]",
            kind.glyph(),
            truncate_label(&doc.filename, LABEL_WIDTH),
            doc.status
        );
        println!("  ID: {}", doc.doc_id);
        if let Some(chunks) = doc.num_chunks {
            println!("  Chunks: {}", chunks);
        }
        if doc.is_failed() {
            if let Some(message) = doc.error_message.as_deref().filter(|m| !m.is_empty()) {
                println!("  Error: {}", message);
            }
        }
        println!();
    }
}

/// Print the numbered rows used by the shell's `/select` and `/delete`.
pub fn print_document_rows(registry: &Registry, rows: &[DocumentRow]) {
    if let Some(message) = registry.error() {
        println!("{} {}", "⚠".yellow(), message);
    }

    for (idx, row) in rows.iter().enumerate() {
        println!("{}", format_row(idx + 1, row));
        if let Some(message) = &row.error_message {
            println!("       {}", message.as_str().red());
        }
    }

    if registry.documents().is_empty() {
        println!("   {}", EMPTY_LIST_HINT.dim());
    }
}

fn format_row(number: usize, row: &DocumentRow) -> String {
    let marker = if row.selected { "›" } else { " " };
    let label = truncate_label(&row.label, LABEL_WIDTH);

    let Some(kind) = row.kind else {
        return format!("{} {:>2}. {}", marker, number, label);
    };
    let status = row.status.as_deref().unwrap_or_default();

    if row.selectable {
        format!("{} {:>2}. {} {}", marker, number, kind.glyph(), label)
    } else {
        format!(
            "{} {:>2}. {} {}  {}",
            marker,
            number,
            kind.glyph(),
            label.dim(),
            format!("({}: {})", kind.label(), status).dim()
        )
    }
}

/// Cut `label` to `width` graphemes, marking the cut with an ellipsis.
pub fn truncate_label(label: &str, width: usize) -> String {
    let graphemes: Vec<&str> = label.graphemes(true).collect();
    if graphemes.len() <= width {
        return label.to_string();
    }
    let keep = width.saturating_sub(1);
    format!("{}…", graphemes[..keep].concat())
}
