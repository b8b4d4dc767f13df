//! Edge objects.

use std::sync::Mutex;

use crate::message::Message;

use super::base::{ObjectBase, ObjectKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeSubtype {
    Chat,
    ChatConverter,
    ChatResponse,
    SystemMessage,
    Write,
    Variable,
    Field,
    List,
    Item,
    Choice,
    Config,
    Logging,
}

impl EdgeSubtype {
    pub fn type_name(self) -> &'static str {
        match self {
            EdgeSubtype::Chat => "chat",
            EdgeSubtype::ChatConverter => "chat-converter",
            EdgeSubtype::ChatResponse => "chat-response",
            EdgeSubtype::SystemMessage => "system-message",
            EdgeSubtype::Write => "write",
            EdgeSubtype::Variable => "variable",
            EdgeSubtype::Field => "field",
            EdgeSubtype::List => "list",
            EdgeSubtype::Item => "item",
            EdgeSubtype::Choice => "choice",
            EdgeSubtype::Config => "config",
            EdgeSubtype::Logging => "logging",
        }
    }

    /// Edges that carry a message-list payload rather than a single value
    /// (used by several behaviors, e.g. variable-resolution exclusions).
    pub fn carries_messages(self) -> bool {
        matches!(
            self,
            EdgeSubtype::Chat
                | EdgeSubtype::ChatConverter
                | EdgeSubtype::ChatResponse
                | EdgeSubtype::SystemMessage
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeModifier {
    Note,
    Folder,
    Property,
    List,
    Headers,
    Table,
}

/// A per-iteration tag stamped on edges duplicated during for-each expansion.
/// Ordering for merge-rendering is by `index` alone, never by `sub_header`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeVersion {
    pub index: usize,
    pub header: Option<String>,
    pub sub_header: Option<String>,
}

/// The payload an edge carries once its source has run `load()` on it.
/// Single-assignment: written once, immediately before the edge transitions
/// to `Complete`.
#[derive(Default, Clone)]
pub struct EdgePayload {
    pub content: Option<String>,
    pub messages: Vec<Message>,
    pub versions: Vec<EdgeVersion>,
}

pub struct EdgeObject {
    pub base: ObjectBase,
    pub subtype: EdgeSubtype,
    pub source: String,
    pub target: String,
    /// Ordered group ids the edge leaves, immediate-first.
    pub crossing_out_groups: Vec<String>,
    /// Ordered group ids the edge enters, immediate-first.
    pub crossing_in_groups: Vec<String>,
    pub add_messages: bool,
    /// True if source or target is a group enclosing the other endpoint
    /// (Glossary: "Reflexive edge").
    pub is_reflexive: bool,
    pub modifier: Option<EdgeModifier>,
    /// The edge label (pre-suffix-stripped), used for value-edge redundancy
    /// grouping and for versioned-edge merge keys.
    pub label: Option<String>,
    payload: Mutex<EdgePayload>,
}

impl EdgeObject {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        subtype: EdgeSubtype,
        source: impl Into<String>,
        target: impl Into<String>,
        crossing_out_groups: Vec<String>,
        crossing_in_groups: Vec<String>,
        add_messages: bool,
        is_reflexive: bool,
        modifier: Option<EdgeModifier>,
        label: Option<String>,
        dependencies: Vec<String>,
    ) -> Self {
        Self {
            base: ObjectBase::new(id, "", ObjectKind::Edge, subtype.type_name(), dependencies),
            subtype,
            source: source.into(),
            target: target.into(),
            crossing_out_groups,
            crossing_in_groups,
            add_messages,
            is_reflexive,
            modifier,
            label,
            payload: Mutex::new(EdgePayload::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.base.id
    }

    /// Deposits the edge's payload: records `content` and, if `add_messages`
    /// is true, `messages`. Called by the source node after its own
    /// completion, before the edge transitions to a terminal status.
    pub fn load(&self, content: Option<String>, messages: Vec<Message>, versions: Vec<EdgeVersion>) {
        let mut guard = self.payload.lock().expect("edge payload lock poisoned");
        guard.content = content;
        if self.add_messages {
            guard.messages = messages;
        }
        guard.versions = versions;
    }

    /// Appends to existing content rather than replacing it (used by
    /// chat-response streaming chunks and logging-edge chaining).
    pub fn append_content(&self, chunk: &str) {
        let mut guard = self.payload.lock().expect("edge payload lock poisoned");
        match &mut guard.content {
            Some(existing) => existing.push_str(chunk),
            None => guard.content = Some(chunk.to_string()),
        }
    }

    pub fn payload(&self) -> EdgePayload {
        self.payload.lock().expect("edge payload lock poisoned").clone()
    }

    pub fn content(&self) -> Option<String> {
        self.payload.lock().expect("edge payload lock poisoned").content.clone()
    }
}
