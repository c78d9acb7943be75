use super::{ApiOperation, DocumentApi, UploadFile};
use crate::error::{Error, Result};
use crate::models::{DocumentMetadata, PreviewBlob, SearchQuery, SearchResponse};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// Message used when an upload failure body is not JSON at all.
const UPLOAD_FAILED: &str = "Upload failed";

/// HTTP client for the document Q&A backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Invalid API base URL: {}",
                base_url
            )));
        }
        let client = Client::builder().build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, keeping any base path prefix.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::Config(format!("Invalid API base URL: {}", self.base_url)))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn check_status(response: Response, operation: ApiOperation) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        warn!("{} returned HTTP {}", response.url().path(), status);
        Err(Error::Fetch {
            operation,
            status: status.as_u16(),
        })
    }

    async fn upload_error_message(response: Response) -> String {
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Could not read upload error body: {}", e);
                return UPLOAD_FAILED.to_string();
            }
        };

        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => detail_message(&value)
                .unwrap_or_else(|| ApiOperation::UploadDocument.to_string()),
            Err(_) => UPLOAD_FAILED.to_string(),
        }
    }
}

/// Pull a human message out of a `{"detail": ...}` error body.
fn detail_message(value: &Value) -> Option<String> {
    match value.get("detail")? {
        Value::Null => None,
        Value::String(detail) if detail.is_empty() => None,
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl DocumentApi for ApiClient {
    async fn list_documents(&self) -> Result<Vec<DocumentMetadata>> {
        let url = self.endpoint(&["documents", "list"])?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response, ApiOperation::ListDocuments)?;
        Ok(response.json::<Vec<DocumentMetadata>>().await?)
    }

    async fn upload_document(&self, file: UploadFile) -> Result<DocumentMetadata> {
        let url = self.endpoint(&["upload"])?;
        debug!("POST {} ({}, {} bytes)", url, file.filename, file.bytes.len());

        let part = Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(&file.mime_type)?;
        let form = Form::new().part("file", part);

        let response = self.client.post(url).multipart(form).send().await?;
        if !response.status().is_success() {
            warn!("Upload rejected with HTTP {}", response.status());
            return Err(Error::Upload(Self::upload_error_message(response).await));
        }
        Ok(response.json::<DocumentMetadata>().await?)
    }

    async fn delete_document(&self, doc_id: &str) -> Result<()> {
        let url = self.endpoint(&["docs", doc_id])?;
        debug!("DELETE {}", url);

        let response = self.client.delete(url).send().await?;
        Self::check_status(response, ApiOperation::DeleteDocument)?;
        Ok(())
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let url = self.endpoint(&["search"])?;
        debug!("POST {} (doc_id: {:?})", url, query.doc_id);

        let response = self.client.post(url).json(query).send().await?;
        let response = Self::check_status(response, ApiOperation::Search)?;
        Ok(response.json::<SearchResponse>().await?)
    }

    async fn get_preview(&self, doc_id: &str) -> Result<PreviewBlob> {
        let url = self.endpoint(&["documents", "preview", doc_id])?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response, ApiOperation::Preview)?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(PreviewBlob {
            bytes,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn document_json(doc_id: &str, status: &str) -> Value {
        json!({
            "doc_id": doc_id,
            "filename": format!("{}.pdf", doc_id),
            "content_type": "application/pdf",
            "status": status,
            "file_path": null,
            "extracted_text_preview": null,
            "num_chunks": null,
            "embedding_dim": null,
            "error_message": null
        })
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_escapes_ids() {
        let client = ApiClient::new("http://localhost:8000/api/").unwrap();
        let url = client.endpoint(&["docs", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/docs/a%20b%2Fc");

        let bare = ApiClient::new("http://localhost:8000").unwrap();
        assert_eq!(
            bare.endpoint(&["documents", "list"]).unwrap().as_str(),
            "http://localhost:8000/documents/list"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(matches!(
            ApiClient::new("mailto:someone@example.com"),
            Err(Error::Config(_))
        ));
        assert!(ApiClient::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_list_documents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/documents/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                document_json("a", "ready"),
                document_json("b", "processing")
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&format!("{}/api", server.uri())).unwrap();
        let docs = client.list_documents().await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].status, "processing");
    }

    #[tokio::test]
    async fn test_list_documents_non_success_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents/list"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client.list_documents().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Fetch {
                operation: ApiOperation::ListDocuments,
                status: 503
            }
        ));
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_file_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(body_string_contains("name=\"file\""))
            .and(body_string_contains("filename=\"notes.txt\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(document_json("n", "uploaded")))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let doc = client
            .upload_document(UploadFile::new("notes.txt", b"hello".to_vec()))
            .await
            .unwrap();

        assert_eq!(doc.doc_id, "n");
        assert_eq!(doc.status, "uploaded");
    }

    #[tokio::test]
    async fn test_upload_error_messages() {
        let server = MockServer::start().await;
        let client = ApiClient::new(&server.uri()).unwrap();

        let detail = Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Unsupported file type"})),
            )
            .mount_as_scoped(&server)
            .await;
        let err = client
            .upload_document(UploadFile::new("x.exe", Vec::new()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type");
        drop(detail);

        let not_json = Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount_as_scoped(&server)
            .await;
        let err = client
            .upload_document(UploadFile::new("x.pdf", Vec::new()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Upload failed");
        drop(not_json);

        let _no_detail = Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .mount_as_scoped(&server)
            .await;
        let err = client
            .upload_document(UploadFile::new("x.pdf", Vec::new()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to upload document");
    }

    #[test]
    fn test_detail_message_renders_validation_lists() {
        let value = json!({"detail": [{"loc": ["body", "file"], "msg": "field required"}]});
        let message = detail_message(&value).unwrap();
        assert!(message.contains("field required"));
        assert_eq!(detail_message(&json!({"detail": ""})), None);
        assert_eq!(detail_message(&json!([1, 2])), None);
    }

    #[tokio::test]
    async fn test_delete_document() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/docs/doc-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/docs/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        client.delete_document("doc-1").await.unwrap();

        let err = client.delete_document("missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to delete document (HTTP 404)");
    }

    #[tokio::test]
    async fn test_search_posts_scoped_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_json(json!({"query": "What is X?", "doc_id": "a"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": "What is X?",
                "search_results": [
                    {"chunk_id": "a-0", "document_text": "X is a thing", "distance": 0.2, "metadata": {}}
                ],
                "llm_answer": "X is..."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let query = SearchQuery {
            query: "What is X?".to_string(),
            doc_id: Some("a".to_string()),
            top_n: None,
        };
        let response = client.search(&query).await.unwrap();

        assert_eq!(response.llm_answer.as_deref(), Some("X is..."));
        assert_eq!(response.search_results.len(), 1);
    }

    #[tokio::test]
    async fn test_preview_returns_bytes_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents/preview/a"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/documents/preview/b"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let blob = client.get_preview("a").await.unwrap();
        assert_eq!(blob.bytes, b"%PDF-1.4");
        assert_eq!(blob.content_type.as_deref(), Some("application/pdf"));

        let err = client.get_preview("b").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Fetch {
                operation: ApiOperation::Preview,
                ..
            }
        ));
    }
}
