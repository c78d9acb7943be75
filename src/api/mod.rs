//! Backend API access
//!
//! The UI components only see the [`DocumentApi`] trait; [`ApiClient`] is the
//! reqwest implementation used by the binary.

mod http_backend;

pub use http_backend::*;

use crate::error::Result;
use crate::models::{DocumentMetadata, PreviewBlob, SearchQuery, SearchResponse};
use async_trait::async_trait;
use std::fmt;
use std::path::Path;

/// The backend calls, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    ListDocuments,
    UploadDocument,
    DeleteDocument,
    Search,
    Preview,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ApiOperation::ListDocuments => "Failed to fetch documents",
            ApiOperation::UploadDocument => "Failed to upload document",
            ApiOperation::DeleteDocument => "Failed to delete document",
            ApiOperation::Search => "Failed to perform search",
            ApiOperation::Preview => "Failed to fetch document preview",
        };
        f.write_str(message)
    }
}

/// A file read into memory, ready for a multipart upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let mime_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            filename,
            mime_type,
            bytes,
        }
    }

    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(display_file_name(path), bytes))
    }
}

/// Final path component, or the whole path when there is none
pub fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[async_trait]
pub trait DocumentApi: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<DocumentMetadata>>;
    async fn upload_document(&self, file: UploadFile) -> Result<DocumentMetadata>;
    async fn delete_document(&self, doc_id: &str) -> Result<()>;
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse>;
    async fn get_preview(&self, doc_id: &str) -> Result<PreviewBlob>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory backend for component tests.

    use super::*;
    use crate::error::Error;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum ApiCall {
        List,
        Upload(String),
        Delete(String),
        Search(SearchQuery),
        Preview(String),
    }

    #[derive(Default)]
    pub struct FakeApi {
        lists: Mutex<VecDeque<Result<Vec<DocumentMetadata>>>>,
        uploads: Mutex<VecDeque<Result<DocumentMetadata>>>,
        deletes: Mutex<VecDeque<Result<()>>>,
        searches: Mutex<VecDeque<Result<SearchResponse>>>,
        previews: Mutex<VecDeque<Result<PreviewBlob>>>,
        calls: Mutex<Vec<ApiCall>>,
    }

    pub fn document(doc_id: &str, status: &str) -> DocumentMetadata {
        DocumentMetadata {
            doc_id: doc_id.to_string(),
            filename: format!("{}.pdf", doc_id),
            content_type: "application/pdf".to_string(),
            status: status.to_string(),
            file_path: None,
            extracted_text_preview: None,
            num_chunks: None,
            embedding_dim: None,
            error_message: None,
        }
    }

    pub fn answer(query: &str, llm_answer: Option<&str>) -> SearchResponse {
        SearchResponse {
            query: query.to_string(),
            search_results: Vec::new(),
            llm_answer: llm_answer.map(str::to_string),
        }
    }

    pub fn fetch_error(operation: ApiOperation) -> Error {
        Error::Fetch {
            operation,
            status: 500,
        }
    }

    impl FakeApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_list(&self, response: Result<Vec<DocumentMetadata>>) -> &Self {
            self.lists.lock().unwrap().push_back(response);
            self
        }

        pub fn push_upload(&self, response: Result<DocumentMetadata>) -> &Self {
            self.uploads.lock().unwrap().push_back(response);
            self
        }

        pub fn push_delete(&self, response: Result<()>) -> &Self {
            self.deletes.lock().unwrap().push_back(response);
            self
        }

        pub fn push_search(&self, response: Result<SearchResponse>) -> &Self {
            self.searches.lock().unwrap().push_back(response);
            self
        }

        pub fn push_preview(&self, response: Result<PreviewBlob>) -> &Self {
            self.previews.lock().unwrap().push_back(response);
            self
        }

        pub fn calls(&self) -> Vec<ApiCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
        }

        fn record(&self, call: ApiCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl DocumentApi for FakeApi {
        async fn list_documents(&self) -> Result<Vec<DocumentMetadata>> {
            self.record(ApiCall::List);
            self.lists
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn upload_document(&self, file: UploadFile) -> Result<DocumentMetadata> {
            self.record(ApiCall::Upload(file.filename));
            self.uploads
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(fetch_error(ApiOperation::UploadDocument)))
        }

        async fn delete_document(&self, doc_id: &str) -> Result<()> {
            self.record(ApiCall::Delete(doc_id.to_string()));
            self.deletes.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }

        async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
            self.record(ApiCall::Search(query.clone()));
            self.searches
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(fetch_error(ApiOperation::Search)))
        }

        async fn get_preview(&self, doc_id: &str) -> Result<PreviewBlob> {
            self.record(ApiCall::Preview(doc_id.to_string()));
            self.previews
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(fetch_error(ApiOperation::Preview)))
        }
    }
}
