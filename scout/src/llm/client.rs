//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Text/tool-call generation boundary
///
/// Stage handlers call this once per turn: given the ordered
/// conversation, the model returns one assistant message with text and
/// zero or more typed tool-call requests. From the workflow's point of
/// view the call is blocking; nothing else in the same run interleaves
/// with it.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock LLM client that replays scripted responses in order
    pub struct MockLlmClient {
        responses: Mutex<Vec<CompletionResponse>>,
        calls: Mutex<Vec<CompletionRequest>>,
    }

    impl MockLlmClient {
        pub fn new(mut responses: Vec<CompletionResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Requests seen so far, for asserting on prompts and tool lists
        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            self.calls.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| LlmError::InvalidResponse("No more mock responses".to_string()))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::llm::{StopReason, TokenUsage};

        fn text_response(text: &str) -> CompletionResponse {
            CompletionResponse {
                content: Some(text.to_string()),
                tool_calls: vec![],
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            }
        }

        #[tokio::test]
        async fn test_mock_replays_in_order() {
            let client = MockLlmClient::new(vec![text_response("first"), text_response("second")]);

            let req = CompletionRequest {
                system_prompt: "test".to_string(),
                messages: vec![],
                tools: vec![],
                max_tokens: 100,
            };

            assert_eq!(client.complete(req.clone()).await.unwrap().content.as_deref(), Some("first"));
            assert_eq!(client.complete(req.clone()).await.unwrap().content.as_deref(), Some("second"));
            assert_eq!(client.call_count(), 2);
        }

        #[tokio::test]
        async fn test_mock_errors_when_exhausted() {
            let client = MockLlmClient::new(vec![]);
            let req = CompletionRequest {
                system_prompt: "test".to_string(),
                messages: vec![],
                tools: vec![],
                max_tokens: 100,
            };
            assert!(client.complete(req).await.is_err());
        }
    }
}
