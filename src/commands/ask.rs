//! One-shot question command

use crate::api::DocumentApi;
use crate::chat::answer_text;
use crate::documents::resolve_selection;
use crate::error::{Error, Result};
use crate::models::{SearchQuery, SearchResponse, Selection};
use crate::registry::Registry;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    /// Restrict the question to one ready document
    pub doc_id: Option<String>,
    pub top_n: Option<usize>,
}

/// Ask one question and return the backend's full response.
pub async fn cmd_ask<A: DocumentApi + ?Sized>(
    api: &A,
    question: &str,
    options: AskOptions,
) -> Result<SearchResponse> {
    if question.trim().is_empty() {
        return Err(Error::Validation("Question cannot be empty".to_string()));
    }

    let selection = match options.doc_id.as_deref() {
        Some(doc_id) => {
            let mut registry = Registry::new();
            if !registry.refresh(api).await {
                return Err(Error::Backend(
                    registry.error().unwrap_or_default().to_string(),
                ));
            }
            resolve_selection(&registry, Some(doc_id))
                .map_err(|e| Error::Validation(e.to_string()))?
        }
        None => Selection::All,
    };

    let query = SearchQuery::scoped(question, &selection, options.top_n);
    debug!("Searching with {:?}", query);
    api.search(&query).await
}

/// Print the answer, and the retrieved chunks when `show_sources` is set
pub fn print_answer(response: &SearchResponse, show_sources: bool) {
    println!("\n💬 {}\n", response.query.trim());
    println!("{}", answer_text(response));

    if !show_sources {
        return;
    }

    println!("\nSources ({}):\n", response.search_results.len());
    for (i, item) in response.search_results.iter().enumerate() {
        let source = item
            .metadata
            .get("filename")
            .and_then(Value::as_str)
            .unwrap_or(item.chunk_id.as_str());
        match item.distance {
            Some(distance) => println!("{}. [distance: {:.3}] {}", i + 1, distance, source),
            None => println!("{}. {}", i + 1, source),
        }

        let text = item.document_text.trim().replace('\n', " ");
        let preview = if text.chars().count() > 200 {
            format!("{}...", text.chars().take(200).collect::<String>().trim_end())
        } else {
            text
        };
        println!("   {}\n", preview);
    }
}
