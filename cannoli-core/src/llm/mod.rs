//! The LLM provider interface: the one seam every call node's behavior goes
//! through to reach a language model, whether for a free-text completion or
//! a forced tool call (`choice`/`note_select`/`form`).

mod mock;
#[cfg(feature = "openai")]
mod openai;
mod tools;

pub use mock::MockLlm;
#[cfg(feature = "openai")]
pub use openai::ChatOpenAi;
pub use tools::{choice_tool, form_tool, note_select_tool};

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;

use crate::error::CannoliError;
use crate::message::{ImageReference, Message};

/// Which hosted chat API a provider name selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    AzureOpenAi,
    Ollama,
    Anthropic,
    Groq,
    Gemini,
}

impl ProviderKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "openai" => Some(ProviderKind::OpenAi),
            "azure_openai" => Some(ProviderKind::AzureOpenAi),
            "ollama" => Some(ProviderKind::Ollama),
            "anthropic" => Some(ProviderKind::Anthropic),
            "groq" => Some(ProviderKind::Groq),
            "gemini" => Some(ProviderKind::Gemini),
            _ => None,
        }
    }
}

/// A callable function definition offered to the model, named and JSON-Schema
/// shaped like the OpenAI tool-calling convention every provider here speaks.
#[derive(Clone, Debug)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// How a completion request should constrain tool use: free text, or a
/// forced call to one specific named function (what choose/form nodes need).
#[derive(Clone, Debug, PartialEq)]
pub enum FunctionCallMode {
    Auto,
    Forced(String),
}

#[derive(Clone, Debug, Default)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub image_references: Vec<ImageReference>,
    pub functions: Vec<FunctionSpec>,
    pub function_call: Option<FunctionCallMode>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages, ..Default::default() }
    }

    pub fn with_images(mut self, images: Vec<ImageReference>) -> Self {
        self.image_references = images;
        self
    }

    pub fn with_forced_function(mut self, spec: FunctionSpec) -> Self {
        let name = spec.name.clone();
        self.functions = vec![spec];
        self.function_call = Some(FunctionCallMode::Forced(name));
        self
    }
}

pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String, CannoliError>> + Send>>;

/// The narrow interface every node behavior that talks to a model is
/// written against. `complete` returns one finished assistant message;
/// `complete_stream` yields text chunks as they arrive, for chat-response
/// edges that render incrementally.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Message, CannoliError>;

    async fn complete_stream(&self, request: CompletionRequest) -> Result<CompletionStream, CannoliError>;
}
