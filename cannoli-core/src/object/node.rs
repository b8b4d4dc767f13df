//! Node objects.

use std::sync::Mutex;

use serde_json::Value;

use crate::canvas::Rect;
use crate::message::Message;
use crate::reference::Reference;

use super::base::{ObjectBase, ObjectKind};
use super::status::Status;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Standard,
    Choose,
    Form,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Standard,
    Input,
    Output,
    Reference,
    Formatter,
    Http,
    Search,
    SubCannoli,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeSubtype {
    Call(CallKind),
    Content(ContentKind),
    Floating,
}

impl NodeSubtype {
    pub fn type_name(self) -> &'static str {
        match self {
            NodeSubtype::Call(CallKind::Standard) => "call:standard",
            NodeSubtype::Call(CallKind::Choose) => "call:choose",
            NodeSubtype::Call(CallKind::Form) => "call:form",
            NodeSubtype::Content(ContentKind::Standard) => "content:standard",
            NodeSubtype::Content(ContentKind::Input) => "content:input",
            NodeSubtype::Content(ContentKind::Output) => "content:output",
            NodeSubtype::Content(ContentKind::Reference) => "content:reference",
            NodeSubtype::Content(ContentKind::Formatter) => "content:formatter",
            NodeSubtype::Content(ContentKind::Http) => "content:http",
            NodeSubtype::Content(ContentKind::Search) => "content:search",
            NodeSubtype::Content(ContentKind::SubCannoli) => "content:subcannoli",
            NodeSubtype::Floating => "floating:variable",
        }
    }
}

/// Buffered runtime output of a node's `execute()`. Written once by the
/// node's own behavior immediately before its status transitions to a
/// terminal state.
#[derive(Default)]
pub struct NodeBuffer {
    pub content: Option<String>,
    pub messages: Vec<Message>,
    /// HTTP receive-style actions stash their first-phase response here.
    pub receive_info: Option<Value>,
    /// For choose nodes: the selected outgoing edge label, recorded so the
    /// scheduler can reject the rest.
    pub selected_choice: Option<String>,
}

pub struct NodeObject {
    pub base: ObjectBase,
    pub subtype: NodeSubtype,
    /// Placeholders parsed out of `text` at compile time.
    pub references: Vec<Reference>,
    /// Enclosing groups, immediate-parent-first.
    pub groups: Vec<String>,
    pub rect: Rect,
    /// Leading `[name]` line, for input/output/floating nodes.
    pub name: Option<String>,
    pub buffer: Mutex<NodeBuffer>,
}

impl NodeObject {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        subtype: NodeSubtype,
        references: Vec<Reference>,
        groups: Vec<String>,
        rect: Rect,
        dependencies: Vec<String>,
    ) -> Self {
        let text = text.into();
        let type_name = subtype.type_name();
        let initial_status = if matches!(subtype, NodeSubtype::Floating) {
            Status::Complete
        } else {
            Status::Pending
        };
        Self {
            base: ObjectBase::new(id, text, ObjectKind::Node, type_name, dependencies)
                .with_initial_status(initial_status),
            subtype,
            references,
            groups,
            rect,
            name: None,
            buffer: Mutex::new(NodeBuffer::default()),
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn id(&self) -> &str {
        &self.base.id
    }

    pub fn is_call(&self) -> bool {
        matches!(self.subtype, NodeSubtype::Call(_))
    }

    pub fn is_for_each_ineligible_output(&self) -> bool {
        matches!(self.subtype, NodeSubtype::Content(ContentKind::Output)) && self.name.is_some()
    }
}

/// Reserved keywords that cannot be used as an input/output node's `[name]`.
pub const RESERVED_NAMES: &[&str] = &["NOTE", "SELECTION"];

pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 }
    }

    /// **Scenario**: a floating node is constructed already Complete.
    #[test]
    fn floating_node_starts_complete() {
        let node = NodeObject::new("f1", "[x]", NodeSubtype::Floating, vec![], vec![], rect(), vec![]);
        assert_eq!(node.base.status(), Status::Complete);
    }

    /// **Scenario**: a standard content node starts Pending.
    #[test]
    fn standard_content_node_starts_pending() {
        let node = NodeObject::new(
            "n1",
            "hello",
            NodeSubtype::Content(ContentKind::Standard),
            vec![],
            vec![],
            rect(),
            vec![],
        );
        assert_eq!(node.base.status(), Status::Pending);
    }

    /// **Scenario**: reserved names NOTE/SELECTION are rejected case-insensitively.
    #[test]
    fn reserved_name_check_is_case_insensitive() {
        assert!(is_reserved_name("note"));
        assert!(is_reserved_name("SELECTION"));
        assert!(!is_reserved_name("myVar"));
    }
}
