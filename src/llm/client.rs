use super::types::*;
use crate::{Result, config::LlmConfig};
use async_openai::{Client, config::OpenAIConfig, types as openai_types};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use std::time::Duration;
use tracing::debug;

/// Single-shot chat completion. The endpoint only depends on this trait so
/// the provider can be replaced by a stub.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse>;
}

pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    /// Builds a client for `api_key`; the rest comes from `config`.
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self> {
        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(&config.base_url);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Zero elapsed budget: the first transient 429/5xx is returned as is.
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(no_retry);

        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        debug!(
            "Creating chat completion with {} messages",
            request.messages.len()
        );

        let mut messages = Vec::new();
        for msg in &request.messages {
            messages.push(msg.to_openai_message()?);
        }

        let mut request_builder = openai_types::CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model).messages(messages);

        if let Some(temperature) = request.temperature {
            request_builder.temperature(temperature);
        }

        if request.json_response {
            request_builder.response_format(openai_types::ResponseFormat::JsonObject);
        }

        let openai_request = request_builder.build()?;

        let response = self.client.chat().create(openai_request).await?;

        debug!(
            "Received chat completion response with {} choices",
            response.choices.len()
        );

        let choices: Vec<Choice> = response
            .choices
            .into_iter()
            .map(|choice| Choice {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: choice.message.content.unwrap_or_default(),
                },
                finish_reason: choice.finish_reason.map(|fr| format!("{fr:?}")),
            })
            .collect();

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatCompletionResponse {
            id: response.id,
            model: response.model,
            choices,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::types::ChatCompletionRequestMessage;
    use pretty_assertions::assert_eq;

    fn create_test_config() -> LlmConfig {
        LlmConfig {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: Some("test-api-key".to_string()),
            model: "gpt-4.1".to_string(),
            temperature: None,
        }
    }

    #[test]
    fn test_openai_client_creation() {
        let client = OpenAiClient::new(&create_test_config(), "test-api-key").unwrap();
        assert_eq!(client.model(), "gpt-4.1");
    }

    #[test]
    fn test_openai_client_with_default_base_url() {
        let mut config = create_test_config();
        config.base_url = String::new();

        let client = OpenAiClient::new(&config, "test-api-key").unwrap();
        assert_eq!(client.model(), "gpt-4.1");
    }

    #[test]
    fn test_chat_message_to_openai_system() {
        let openai_msg = ChatMessage::system("You are an animation assistant")
            .to_openai_message()
            .unwrap();
        assert!(matches!(
            openai_msg,
            ChatCompletionRequestMessage::System(_)
        ));
    }

    #[test]
    fn test_chat_message_to_openai_user() {
        let openai_msg = ChatMessage::user(r#"{"prompt": "wave"}"#)
            .to_openai_message()
            .unwrap();
        assert!(matches!(openai_msg, ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_chat_message_invalid_role() {
        let msg = ChatMessage {
            role: "assistant".to_string(),
            content: "unsupported".to_string(),
        };

        let result = msg.to_openai_message();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Unknown message role")
        );
    }

    #[test]
    fn test_first_content() {
        let response = ChatCompletionResponse {
            id: "chatcmpl-123".to_string(),
            model: "gpt-4.1".to_string(),
            choices: vec![Choice {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: r#"{"frames": []}"#.to_string(),
                },
                finish_reason: Some("Stop".to_string()),
            }],
            usage: None,
        };
        assert_eq!(response.first_content(), Some(r#"{"frames": []}"#));
        assert_eq!(response.first_finish_reason(), Some("Stop"));

        let empty = ChatCompletionResponse {
            choices: vec![],
            ..response
        };
        assert_eq!(empty.first_content(), None);
    }
}
