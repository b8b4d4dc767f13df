//! Chat message types exchanged between call nodes, chat-carrying edges, and
//! the LLM provider interface.
//!
//! Mirrors the `{role, content}` shape LLM providers expect, plus the
//! `function_call` slot used by choose/form call nodes to request a forced
//! tool call.

use serde::{Deserialize, Serialize};

/// One message in a conversation transcript.
///
/// `System` messages are deduplicated when gathered from multiple incoming
/// edges. `Assistant` carries an optional `function_call`, populated when a
/// choose/form node's forced tool call produced one instead of free text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Message {
    System(String),
    User(String),
    Assistant {
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        function_call: Option<FunctionCall>,
    },
}

impl Message {
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: content.into(),
            function_call: None,
        }
    }

    pub fn assistant_with_call(content: impl Into<String>, call: FunctionCall) -> Self {
        Message::Assistant {
            content: content.into(),
            function_call: Some(call),
        }
    }

    /// Plain-text content regardless of role, used for rendering and for
    /// edge-content propagation.
    pub fn text(&self) -> &str {
        match self {
            Message::System(s) => s,
            Message::User(s) => s,
            Message::Assistant { content, .. } => content,
        }
    }

    pub fn role_name(&self) -> &'static str {
        match self {
            Message::System(_) => "system",
            Message::User(_) => "user",
            Message::Assistant { .. } => "assistant",
        }
    }
}

/// A forced tool invocation returned by the LLM for choose/form call nodes,
/// which force a tool call named `choice`/`form`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// A base64-encoded image extracted from `![[...]]` file references or
/// markdown `![](url)` links embedded in a call node's text.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageReference {
    pub mime_type: String,
    pub base64_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: `Message::text` returns the inner string for every variant.
    #[test]
    fn message_text_returns_inner_string() {
        assert_eq!(Message::System("sys".into()).text(), "sys");
        assert_eq!(Message::User("usr".into()).text(), "usr");
        assert_eq!(Message::assistant("asst").text(), "asst");
    }

    /// **Scenario**: `assistant_with_call` attaches the function call.
    #[test]
    fn assistant_with_call_sets_function_call() {
        let call = FunctionCall {
            name: "choice".into(),
            arguments: serde_json::json!({"choice": "yes"}),
        };
        let msg = Message::assistant_with_call("", call.clone());
        match msg {
            Message::Assistant { function_call, .. } => {
                assert_eq!(function_call, Some(call));
            }
            _ => panic!("expected assistant variant"),
        }
    }

    /// **Scenario**: `role_name` reports the lowercase OpenAI-style role string.
    #[test]
    fn role_name_matches_provider_convention() {
        assert_eq!(Message::System("".into()).role_name(), "system");
        assert_eq!(Message::User("".into()).role_name(), "user");
        assert_eq!(Message::assistant("").role_name(), "assistant");
    }
}
