//! Factory Steps B and C: node role/subtype classification and edge subtype
//! classification. Both steps are pure functions over already-parsed canvas
//! data; they know nothing about groups (Step D) or dependencies (Step G).

use std::collections::HashMap;

use crate::canvas::{CanvasColor, CanvasNode, CanvasNodeKind};
use crate::object::{CallKind, ContentKind, EdgeModifier, EdgeSubtype, NodeSubtype};
use crate::reference::is_bare_reference;

use super::config::{ColorRole, FactoryConfig};
use super::label_grammar::parse_label;

/// The coarse role an edge endpoint plays, used only for Step C's heuristic
/// fallback. Distinct from `NodeSubtype`: a call node and a content node are
/// both still just "call"/"content" here regardless of fine subtype.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointRole {
    Floating,
    Content,
    Call,
    Group,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeClassification {
    pub subtype: NodeSubtype,
    /// The `[name]` line, present for floating variables and for named
    /// input/output content nodes.
    pub name: Option<String>,
}

/// The first line of `text`, if it is wholly `[something]` with nothing
/// else on that line.
fn bracket_name(text: &str) -> Option<String> {
    let first_line = text.lines().next()?.trim();
    if first_line.len() > 2 && first_line.starts_with('[') && first_line.ends_with(']') {
        Some(first_line[1..first_line.len() - 1].to_string())
    } else {
        None
    }
}

fn is_quoted(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"')
}

/// Classifies a single canvas text/file/link node (Step B). Groups are
/// classified separately by `factory::groups`.
pub fn classify_node(
    node: &CanvasNode,
    incoming_count: usize,
    outgoing_count: usize,
    config: &FactoryConfig,
) -> NodeClassification {
    let text = node.classification_text().unwrap_or_default();
    let role = config.color_map.role_for(node.color.as_ref(), config.content_is_colorless);
    let has_incident_edges = incoming_count + outgoing_count > 0;

    if !has_incident_edges {
        if let Some(name) = bracket_name(text) {
            return NodeClassification { subtype: NodeSubtype::Floating, name: Some(name) };
        }
    }
    if role == ColorRole::Floating {
        return NodeClassification { subtype: NodeSubtype::Floating, name: bracket_name(text) };
    }

    match node.kind {
        CanvasNodeKind::File | CanvasNodeKind::Link => NodeClassification {
            subtype: NodeSubtype::Content(ContentKind::Reference),
            name: None,
        },
        CanvasNodeKind::Group => NodeClassification {
            subtype: NodeSubtype::Content(ContentKind::Standard),
            name: None,
        },
        CanvasNodeKind::Text => {
            if role == ColorRole::Call {
                NodeClassification { subtype: NodeSubtype::Call(CallKind::Standard), name: None }
            } else {
                classify_content(node, text, incoming_count, outgoing_count)
            }
        }
    }
}

fn classify_content(
    node: &CanvasNode,
    text: &str,
    incoming_count: usize,
    outgoing_count: usize,
) -> NodeClassification {
    if matches!(node.color, Some(CanvasColor::Indexed(2))) {
        return NodeClassification { subtype: NodeSubtype::Content(ContentKind::Http), name: None };
    }
    if is_quoted(text) {
        return NodeClassification { subtype: NodeSubtype::Content(ContentKind::Formatter), name: None };
    }
    if is_bare_reference(text) {
        return NodeClassification { subtype: NodeSubtype::Content(ContentKind::Reference), name: None };
    }
    if let Some(name) = bracket_name(text) {
        let kind = if outgoing_count > 0 && incoming_count == 0 {
            ContentKind::Input
        } else if incoming_count > 0 && outgoing_count == 0 {
            ContentKind::Output
        } else {
            ContentKind::Standard
        };
        return NodeClassification { subtype: NodeSubtype::Content(kind), name: Some(name) };
    }
    NodeClassification { subtype: NodeSubtype::Content(ContentKind::Standard), name: None }
}

/// Refines a freshly-classified call node's `CallKind` using its now-known
/// outgoing edges, which classify_node alone cannot see (Step C runs after
/// Step B). A `choice`-subtype outgoing edge makes the call a `choose`; a
/// `field`-subtype outgoing edge makes it a `form`.
pub fn refine_call_kind(outgoing_edge_subtypes: &[EdgeSubtype]) -> CallKind {
    if outgoing_edge_subtypes.iter().any(|s| *s == EdgeSubtype::Choice) {
        CallKind::Choose
    } else if outgoing_edge_subtypes.iter().any(|s| *s == EdgeSubtype::Field) {
        CallKind::Form
    } else {
        CallKind::Standard
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeClassification {
    pub subtype: EdgeSubtype,
    pub modifier: Option<EdgeModifier>,
    pub label: Option<String>,
    pub add_messages: bool,
}

/// Splits a raw canvas edge label on newlines for Step A's multi-label
/// expansion: a label with several lines becomes several independently
/// classified logical edges sharing the same endpoints.
pub fn expand_labels(raw_label: &str) -> Vec<String> {
    let lines: Vec<String> = raw_label
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

fn heuristic_subtype(source: EndpointRole, target: EndpointRole) -> EdgeSubtype {
    if source == EndpointRole::Group || target == EndpointRole::Group {
        return EdgeSubtype::Chat;
    }
    match (source, target) {
        (EndpointRole::Call, EndpointRole::Call) => EdgeSubtype::Chat,
        (EndpointRole::Call, _) => EdgeSubtype::Write,
        (_, EndpointRole::Call) => EdgeSubtype::SystemMessage,
        _ => EdgeSubtype::Write,
    }
}

/// Classifies one (already label-expanded) logical edge (Step C). Decision
/// order is color map, then label prefix, then role-pair heuristic.
pub fn classify_edge(
    edge_color: Option<&CanvasColor>,
    raw_label: &str,
    source: EndpointRole,
    target: EndpointRole,
    edge_color_map: &HashMap<CanvasColor, EdgeSubtype>,
) -> EdgeClassification {
    let parsed = parse_label(raw_label);

    let subtype = if let Some(c) = edge_color {
        if let Some(forced) = edge_color_map.get(c) {
            *forced
        } else if let Some(prefix) = parsed.subtype_prefix {
            prefix
        } else {
            heuristic_subtype(source, target)
        }
    } else if let Some(prefix) = parsed.subtype_prefix {
        prefix
    } else {
        heuristic_subtype(source, target)
    };

    // An empty-bodied config edge carries no variable name to bind, so it
    // can only be meant as a logging sink.
    let subtype = if subtype == EdgeSubtype::Config && parsed.body.is_empty() {
        EdgeSubtype::Logging
    } else {
        subtype
    };

    EdgeClassification {
        subtype,
        modifier: parsed.modifier,
        label: if parsed.body.is_empty() { None } else { Some(parsed.body) },
        add_messages: parsed.add_messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasNodeKind;
    use std::collections::HashMap as Map;

    fn node(kind: CanvasNodeKind, text: &str, color: Option<CanvasColor>) -> CanvasNode {
        CanvasNode {
            id: "n1".into(),
            kind,
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            color,
            text: Some(text.to_string()),
            file: None,
            url: None,
            label: None,
            extra: Map::new(),
        }
    }

    /// **Scenario**: an unconnected `[x]`-named text node classifies as floating.
    #[test]
    fn classify_node_unconnected_bracket_name_is_floating() {
        let n = node(CanvasNodeKind::Text, "[x]", None);
        let c = classify_node(&n, 0, 0, &FactoryConfig::default());
        assert_eq!(c.subtype, NodeSubtype::Floating);
        assert_eq!(c.name.as_deref(), Some("x"));
    }

    /// **Scenario**: a `[name]` node with only outgoing edges is an input node.
    #[test]
    fn classify_node_outgoing_only_bracket_name_is_input() {
        let n = node(CanvasNodeKind::Text, "[topic]", None);
        let c = classify_node(&n, 0, 1, &FactoryConfig::default());
        assert_eq!(c.subtype, NodeSubtype::Content(ContentKind::Input));
    }

    /// **Scenario**: a `[name]` node with only incoming edges is an output node.
    #[test]
    fn classify_node_incoming_only_bracket_name_is_output() {
        let n = node(CanvasNodeKind::Text, "[result]", None);
        let c = classify_node(&n, 1, 0, &FactoryConfig::default());
        assert_eq!(c.subtype, NodeSubtype::Content(ContentKind::Output));
    }

    /// **Scenario**: color 1 makes a connected text node a call node.
    #[test]
    fn classify_node_colored_call() {
        let n = node(CanvasNodeKind::Text, "hello {{x}}", Some(CanvasColor::Indexed(1)));
        let c = classify_node(&n, 1, 1, &FactoryConfig::default());
        assert_eq!(c.subtype, NodeSubtype::Call(CallKind::Standard));
    }

    /// **Scenario**: a file node always classifies as a reference regardless of color.
    #[test]
    fn classify_node_file_is_reference() {
        let n = node(CanvasNodeKind::File, "", None);
        let c = classify_node(&n, 1, 0, &FactoryConfig::default());
        assert_eq!(c.subtype, NodeSubtype::Content(ContentKind::Reference));
    }

    /// **Scenario**: a `"..."`-wrapped connected text node is a formatter.
    #[test]
    fn classify_node_quoted_text_is_formatter() {
        let n = node(CanvasNodeKind::Text, "\"{{x}} - {{y}}\"", None);
        let c = classify_node(&n, 1, 1, &FactoryConfig::default());
        assert_eq!(c.subtype, NodeSubtype::Content(ContentKind::Formatter));
    }

    /// **Scenario**: a bare `{{[[Note]]}}` connected text node is a reference.
    #[test]
    fn classify_node_bare_reference_text_is_reference() {
        let n = node(CanvasNodeKind::Text, "{{[[Note]]}}", None);
        let c = classify_node(&n, 1, 0, &FactoryConfig::default());
        assert_eq!(c.subtype, NodeSubtype::Content(ContentKind::Reference));
    }

    /// **Scenario**: an edge with no label falls back to the role-pair heuristic.
    #[test]
    fn classify_edge_heuristic_call_to_call_is_chat() {
        let c = classify_edge(None, "", EndpointRole::Call, EndpointRole::Call, &Map::new());
        assert_eq!(c.subtype, EdgeSubtype::Chat);
    }

    /// **Scenario**: content feeding a call with no label defaults to system-message.
    #[test]
    fn classify_edge_heuristic_content_to_call_is_system_message() {
        let c = classify_edge(None, "", EndpointRole::Content, EndpointRole::Call, &Map::new());
        assert_eq!(c.subtype, EdgeSubtype::SystemMessage);
    }

    /// **Scenario**: a call writing into content with no label defaults to write.
    #[test]
    fn classify_edge_heuristic_call_to_content_is_write() {
        let c = classify_edge(None, "", EndpointRole::Call, EndpointRole::Content, &Map::new());
        assert_eq!(c.subtype, EdgeSubtype::Write);
    }

    /// **Scenario**: an edge touching a group defaults to chat regardless of the other endpoint.
    #[test]
    fn classify_edge_touching_group_is_chat() {
        let c = classify_edge(None, "", EndpointRole::Content, EndpointRole::Group, &Map::new());
        assert_eq!(c.subtype, EdgeSubtype::Chat);
    }

    /// **Scenario**: an explicit `=` prefix with a name is a config edge, not logging.
    #[test]
    fn classify_edge_config_prefix_with_body() {
        let c = classify_edge(None, "=apiKey", EndpointRole::Content, EndpointRole::Call, &Map::new());
        assert_eq!(c.subtype, EdgeSubtype::Config);
        assert_eq!(c.label.as_deref(), Some("apiKey"));
    }

    /// **Scenario**: an empty-bodied `=` edge promotes to logging.
    #[test]
    fn classify_edge_empty_config_promotes_to_logging() {
        let c = classify_edge(None, "=", EndpointRole::Content, EndpointRole::Call, &Map::new());
        assert_eq!(c.subtype, EdgeSubtype::Logging);
        assert_eq!(c.label, None);
    }

    /// **Scenario**: expand_labels splits a multi-line label into independent entries.
    #[test]
    fn expand_labels_splits_on_newlines() {
        let parts = expand_labels("a\nb\n\nc");
        assert_eq!(parts, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    /// **Scenario**: refine_call_kind promotes to choose/form based on outgoing edge subtypes.
    #[test]
    fn refine_call_kind_detects_choice_and_field() {
        assert_eq!(refine_call_kind(&[EdgeSubtype::Choice]), CallKind::Choose);
        assert_eq!(refine_call_kind(&[EdgeSubtype::Field]), CallKind::Form);
        assert_eq!(refine_call_kind(&[EdgeSubtype::Write]), CallKind::Standard);
    }
}
