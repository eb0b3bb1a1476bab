use async_trait::async_trait;
use rig_deform_gateway::{
    Error, Result,
    llm::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice, LlmClient, Usage},
};
use std::sync::{Arc, Mutex};

/// Mock LLM client for testing. Clones share the recorded requests, so keep
/// one clone to inspect what the animator sent.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    pub reply: Option<String>,
    pub requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
    pub error: Option<String>,
    pub empty_choices: bool,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies with `content` to every request.
    pub fn with_reply(mut self, content: &str) -> Self {
        self.reply = Some(content.to_string());
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn with_empty_choices(mut self) -> Self {
        self.empty_choices = true;
        self
    }

    pub fn get_requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.requests.lock().unwrap().push(request);

        if let Some(ref error) = self.error {
            return Err(Error::upstream(error.clone()));
        }

        if self.empty_choices {
            return Ok(ChatCompletionResponse {
                choices: vec![],
                ..create_mock_chat_response("")
            });
        }

        match self.reply {
            Some(ref content) => Ok(create_mock_chat_response(content)),
            None => Err(Error::upstream("No mock reply configured")),
        }
    }
}

pub fn create_mock_chat_response(content: &str) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: "chatcmpl-test".to_string(),
        model: "test-model".to_string(),
        choices: vec![Choice {
            message: ChatMessage {
                role: "assistant".to_string(),
                content: content.to_string(),
            },
            finish_reason: Some("Stop".to_string()),
        }],
        usage: Some(Usage {
            prompt_tokens: 120,
            completion_tokens: 40,
            total_tokens: 160,
        }),
    }
}
