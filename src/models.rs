//! Wire types shared with the backend and the client-side view types built on them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// The one status string that makes a document queryable.
pub const READY_STATUS: &str = "ready";

/// Document metadata as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub doc_id: String,
    pub filename: String,
    #[serde(default)]
    pub content_type: String,
    pub status: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub extracted_text_preview: Option<String>,
    #[serde(default)]
    pub num_chunks: Option<u64>,
    #[serde(default)]
    pub embedding_dim: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl DocumentMetadata {
    /// Exact, case-sensitive match on `"ready"`.
    pub fn is_ready(&self) -> bool {
        self.status == READY_STATUS
    }

    pub fn is_failed(&self) -> bool {
        status_is_failure(&self.status)
    }

    /// Still moving through the ingestion pipeline: neither ready nor failed.
    pub fn is_pending(&self) -> bool {
        !self.is_ready() && !self.is_failed()
    }

    pub fn status_kind(&self) -> StatusKind {
        StatusKind::classify(&self.status)
    }
}

/// Case-insensitive check for the failure substrings.
pub fn status_is_failure(status: &str) -> bool {
    let lower = status.to_lowercase();
    lower.contains("fail") || lower.contains("error")
}

/// Display bucket for an open-ended status string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Ready,
    Processing,
    Queued,
    Failed,
}

impl StatusKind {
    pub fn classify(status: &str) -> Self {
        if status_is_failure(status) {
            return StatusKind::Failed;
        }
        match status.to_lowercase().as_str() {
            "ready" => StatusKind::Ready,
            "processing" | "embedding" => StatusKind::Processing,
            _ => StatusKind::Queued,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            StatusKind::Ready => "✓",
            StatusKind::Processing => "⟳",
            StatusKind::Queued => "⏳",
            StatusKind::Failed => "⚠",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusKind::Ready => "Ready for Q&A",
            StatusKind::Processing => "Processing...",
            StatusKind::Queued => "Queued for processing",
            StatusKind::Failed => "Failed",
        }
    }
}

/// The current query scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "doc_id", rename_all = "snake_case")]
pub enum Selection {
    /// Query all documents
    #[default]
    All,
    Document(String),
}

impl Selection {
    pub fn doc_id(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Document(id) => Some(id),
        }
    }

    pub fn is_document(&self, doc_id: &str) -> bool {
        self.doc_id() == Some(doc_id)
    }
}

/// Request body for `POST /search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

impl SearchQuery {
    pub fn scoped(query: impl Into<String>, selection: &Selection, top_n: Option<usize>) -> Self {
        Self {
            query: query.into(),
            doc_id: selection.doc_id().map(str::to_string),
            top_n,
        }
    }
}

/// A retrieved chunk backing an answer.
///
/// Only the answer text matters to the chat, so every field here is read
/// leniently: missing or null values fall back to empty, and a distance that
/// is not a number is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub chunk_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub document_text: String,
    #[serde(default, deserialize_with = "lenient_distance")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: HashMap<String, Value>,
}

/// Response body of `POST /search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub query: String,
    #[serde(default, deserialize_with = "lenient_results")]
    pub search_results: Vec<SearchResultItem>,
    #[serde(default)]
    pub llm_answer: Option<String>,
}

/// Raw preview bytes with the content type the backend reported
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewBlob {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "you"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_distance<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

// Unreadable items are skipped so the answer still comes through.
fn lenient_results<'de, D>(deserializer: D) -> Result<Vec<SearchResultItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Value> = null_as_default(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(StatusKind::classify("ready"), StatusKind::Ready);
        assert_eq!(StatusKind::classify("READY"), StatusKind::Ready);
        assert_eq!(StatusKind::classify("Embedding"), StatusKind::Processing);
        assert_eq!(StatusKind::classify("uploaded"), StatusKind::Queued);
        assert_eq!(StatusKind::classify("parsing"), StatusKind::Queued);
        assert_eq!(StatusKind::classify("Failed: bad pdf"), StatusKind::Failed);
        assert_eq!(StatusKind::classify("embedding_error"), StatusKind::Failed);
    }

    #[test]
    fn test_ready_is_case_sensitive() {
        let json = r#"{"doc_id":"a","filename":"a.pdf","content_type":"application/pdf","status":"Ready"}"#;
        let doc: DocumentMetadata = serde_json::from_str(json).unwrap();
        assert!(!doc.is_ready());
        assert!(doc.is_pending());
        assert_eq!(doc.num_chunks, None);
    }

    #[test]
    fn test_search_query_omits_absent_fields() {
        let all = SearchQuery::scoped("hello", &Selection::All, None);
        assert_eq!(
            serde_json::to_value(&all).unwrap(),
            serde_json::json!({"query": "hello"})
        );

        let scoped = SearchQuery::scoped("hi", &Selection::Document("a".into()), Some(3));
        assert_eq!(
            serde_json::to_value(&scoped).unwrap(),
            serde_json::json!({"query": "hi", "doc_id": "a", "top_n": 3})
        );
    }

    #[test]
    fn test_search_response_tolerates_null_answer() {
        let json = r#"{"query":"q","search_results":[{"chunk_id":"c1","document_text":"t","distance":0.12,"metadata":{"page":3}}],"llm_answer":null}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(response.llm_answer.is_none());
        assert_eq!(response.search_results[0].metadata["page"], 3);
    }

    #[test]
    fn test_search_result_fields_tolerate_nulls() {
        let json = r#"{
            "query": "q",
            "search_results": [
                {"chunk_id": "c1", "document_text": "t", "distance": "0.25", "metadata": null},
                {"chunk_id": null, "document_text": null, "distance": null},
                42
            ],
            "llm_answer": "The answer"
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.llm_answer.as_deref(), Some("The answer"));
        assert_eq!(response.search_results.len(), 2);
        assert_eq!(response.search_results[0].distance, Some(0.25));
        assert!(response.search_results[0].metadata.is_empty());
        assert_eq!(response.search_results[1], SearchResultItem::default());
    }

    #[test]
    fn test_search_response_tolerates_null_results() {
        let json = r#"{"query":null,"search_results":null,"llm_answer":"ok"}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(response.query.is_empty());
        assert!(response.search_results.is_empty());
    }
}
