//! Chat transcript for the current selection

use crate::api::DocumentApi;
use crate::models::{ChatMessage, SearchQuery, SearchResponse, Selection};
use tracing::{debug, warn};

/// Assistant reply when the backend returns no answer text.
pub const NO_ANSWER_FALLBACK: &str = "I found some information but couldn't generate a summary.";
/// Assistant reply when the search call fails.
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Text shown for a search response, falling back when the answer is empty.
pub fn answer_text(response: &SearchResponse) -> &str {
    match response.llm_answer.as_deref() {
        Some(answer) if !answer.is_empty() => answer,
        _ => NO_ANSWER_FALLBACK,
    }
}

#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    in_flight: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// "Thinking..." state
    pub fn is_waiting(&self) -> bool {
        self.in_flight
    }

    pub fn can_submit(&self, input: &str) -> bool {
        !self.in_flight && !input.trim().is_empty()
    }

    pub fn reset(&mut self) {
        self.messages.clear();
    }

    /// Ask `input` within `scope` and append the exchange to the transcript.
    ///
    /// Returns the assistant message, or `None` when submission is refused.
    pub async fn submit<A: DocumentApi + ?Sized>(
        &mut self,
        api: &A,
        scope: &Selection,
        input: &str,
        top_n: Option<usize>,
    ) -> Option<&ChatMessage> {
        if !self.can_submit(input) {
            return None;
        }

        self.messages.push(ChatMessage::user(input));
        self.in_flight = true;

        let query = SearchQuery::scoped(input, scope, top_n);
        let reply = match api.search(&query).await {
            Ok(response) => {
                debug!(
                    "Search returned {} chunks",
                    response.search_results.len()
                );
                answer_text(&response).to_string()
            }
            Err(e) => {
                warn!("Search failed: {}", e);
                ERROR_REPLY.to_string()
            }
        };

        self.in_flight = false;
        self.messages.push(ChatMessage::assistant(reply));
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{answer, ApiCall, FakeApi};
    use crate::models::Role;

    #[tokio::test]
    async fn test_exchange_is_scoped_to_selection() {
        let api = FakeApi::new();
        api.push_search(Ok(answer("What is X?", Some("X is..."))));

        let mut chat = ChatSession::new();
        let scope = Selection::Document("a".to_string());
        let reply = chat.submit(&api, &scope, "What is X?", None).await.unwrap();
        assert_eq!(reply.content, "X is...");

        assert_eq!(
            chat.messages(),
            &[ChatMessage::user("What is X?"), ChatMessage::assistant("X is...")]
        );
        assert_eq!(
            api.calls(),
            vec![ApiCall::Search(SearchQuery {
                query: "What is X?".to_string(),
                doc_id: Some("a".to_string()),
                top_n: None,
            })]
        );
        assert!(!chat.is_waiting());
    }

    #[tokio::test]
    async fn test_missing_or_empty_answer_uses_fallback() {
        let api = FakeApi::new();
        api.push_search(Ok(answer("q", None)))
            .push_search(Ok(answer("q", Some(""))));

        let mut chat = ChatSession::new();
        chat.submit(&api, &Selection::All, "q", Some(3)).await;
        chat.submit(&api, &Selection::All, "q", Some(3)).await;

        let replies: Vec<_> = chat
            .messages()
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(replies, vec![NO_ANSWER_FALLBACK, NO_ANSWER_FALLBACK]);
    }

    #[tokio::test]
    async fn test_failure_appends_error_reply() {
        let api = FakeApi::new();
        let mut chat = ChatSession::new();

        let reply = chat.submit(&api, &Selection::All, "hello", None).await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, ERROR_REPLY);
        assert_eq!(chat.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_input_is_refused() {
        let api = FakeApi::new();
        let mut chat = ChatSession::new();

        assert!(chat.submit(&api, &Selection::All, "   \n", None).await.is_none());
        assert!(chat.messages().is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_raw_input_is_sent_untrimmed() {
        let api = FakeApi::new();
        api.push_search(Ok(answer(" padded ", Some("ok"))));
        let mut chat = ChatSession::new();

        chat.submit(&api, &Selection::All, " padded ", None).await;
        assert_eq!(chat.messages()[0].content, " padded ");
        assert!(matches!(
            &api.calls()[0],
            ApiCall::Search(q) if q.query == " padded " && q.doc_id.is_none()
        ));
    }

    #[test]
    fn test_reset_clears_transcript() {
        let mut chat = ChatSession::new();
        chat.messages.push(ChatMessage::user("hi"));
        chat.reset();
        assert!(chat.messages().is_empty());
    }
}
