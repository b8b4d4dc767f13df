//! An OpenAI-compatible `LlmProvider`, built on `async-openai`. Works against
//! any endpoint speaking the OpenAI chat-completions wire format (OpenAI
//! itself, Azure OpenAI via a custom base URL, Ollama and Groq in
//! OpenAI-compatibility mode), which is why `ProviderKind` folds several
//! provider names onto this one implementation rather than writing four
//! near-identical clients.

use std::pin::Pin;

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionFunctionsArgs, ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    FunctionCall as OpenAiFunctionCall,
};
use async_openai::Client;
use async_trait::async_trait;
use futures::StreamExt;

use crate::error::CannoliError;
use crate::message::{FunctionCall, Message};

use super::{CompletionRequest, CompletionStream, FunctionCallMode, LlmProvider};

/// Builder-configured OpenAI-compatible chat client.
pub struct ChatOpenAi {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl ChatOpenAi {
    pub fn new(model: impl Into<String>) -> Self {
        Self { client: Client::new(), model: model.into(), temperature: None }
    }

    /// Points the client at a different API base, for Azure OpenAI or any
    /// other OpenAI-compatible endpoint (Ollama, Groq).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_base(base_url);
        self.client = Client::with_config(config);
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        self.client = Client::with_config(config);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn to_wire_message(message: &Message) -> Result<ChatCompletionRequestMessage, CannoliError> {
        let built = match message {
            Message::System(content) => ChatCompletionRequestSystemMessageArgs::default()
                .content(content.clone())
                .build()
                .map(ChatCompletionRequestMessage::System),
            Message::User(content) => ChatCompletionRequestUserMessageArgs::default()
                .content(content.clone())
                .build()
                .map(ChatCompletionRequestMessage::User),
            Message::Assistant { content, .. } => ChatCompletionRequestAssistantMessageArgs::default()
                .content(content.clone())
                .build()
                .map(ChatCompletionRequestMessage::Assistant),
        };
        built.map_err(|e| CannoliError::LlmFailed(e.to_string()))
    }

    fn build_request(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<async_openai::types::CreateChatCompletionRequest, CannoliError> {
        let messages = request
            .messages
            .iter()
            .map(Self::to_wire_message)
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages).stream(stream);
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }

        if !request.functions.is_empty() {
            let functions = request
                .functions
                .iter()
                .map(|spec| {
                    ChatCompletionFunctionsArgs::default()
                        .name(&spec.name)
                        .description(&spec.description)
                        .parameters(spec.parameters.clone())
                        .build()
                        .map_err(|e| CannoliError::LlmFailed(e.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            builder.functions(functions);
        }
        if let Some(FunctionCallMode::Forced(name)) = &request.function_call {
            builder.function_call(OpenAiFunctionCall::Object(serde_json::json!({ "name": name })));
        }

        builder.build().map_err(|e| CannoliError::LlmFailed(e.to_string()))
    }
}

#[async_trait]
impl LlmProvider for ChatOpenAi {
    async fn complete(&self, request: CompletionRequest) -> Result<Message, CannoliError> {
        let wire_request = self.build_request(&request, false)?;
        let response = self
            .client
            .chat()
            .create(wire_request)
            .await
            .map_err(|e| CannoliError::LlmFailed(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CannoliError::LlmFailed("no choices in completion response".to_string()))?;

        let content = choice.message.content.unwrap_or_default();
        let function_call = choice.message.function_call.map(|call| FunctionCall {
            name: call.name,
            arguments: serde_json::from_str(&call.arguments).unwrap_or(serde_json::Value::Null),
        });

        Ok(Message::Assistant { content, function_call })
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<CompletionStream, CannoliError> {
        let wire_request = self.build_request(&request, true)?;
        let upstream = self
            .client
            .chat()
            .create_stream(wire_request)
            .await
            .map_err(|e| CannoliError::LlmFailed(e.to_string()))?;

        let mapped = upstream.map(|chunk| {
            let chunk = chunk.map_err(|e| CannoliError::LlmFailed(e.to_string()))?;
            let text = chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .unwrap_or_default();
            Ok(text)
        });

        Ok(Pin::from(Box::new(mapped)) as CompletionStream)
    }
}
