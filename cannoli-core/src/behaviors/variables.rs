//! Variable resolution: turning a node's `{{...}}` placeholders into text,
//! in the precedence order the engine promises — an incoming edge labeled
//! with the variable's name wins over a same-named floating-variable node,
//! which wins over treating the name as a dangling reference (rendered as
//! an empty string with a warning, never a fatal error).

use crate::context::RunContext;
use crate::error::CannoliError;
use crate::object::{NodeObject, NodeSubtype};
use crate::reference::Reference;

pub(crate) fn incoming_edge_content(node: &NodeObject, ctx: &RunContext, label: &str) -> Option<String> {
    let matching: Vec<_> = node
        .base
        .dependencies
        .iter()
        .filter_map(|dep_id| ctx.graph.edges.get(dep_id))
        .filter(|edge| edge.label.as_deref() == Some(label))
        .collect();

    match matching.as_slice() {
        [] => None,
        [single] if single.payload().versions.is_empty() => single.content(),
        _ => Some(super::merge::render_modifier(&matching, label, matching[0].modifier)),
    }
}

pub(crate) fn floating_node_content(ctx: &RunContext, name: &str) -> Option<String> {
    ctx.graph
        .nodes
        .values()
        .find(|n| matches!(n.subtype, NodeSubtype::Floating) && n.name.as_deref() == Some(name))
        .and_then(|n| n.buffer.lock().expect("node buffer lock poisoned").content.clone())
}

/// Replaces every `{{name}}` in `template` with an incoming edge's content
/// for that label, falling back to a same-named floating node, the way
/// `render` resolves a plain `Variable` reference — but against arbitrary
/// template text rather than a node's own parsed `references`, since a
/// named HTTP template has none of its own.
pub(crate) fn substitute_braces(template: &str, node: &NodeObject, ctx: &RunContext) -> String {
    let mut rendered = String::new();
    let mut rest = template;
    loop {
        let Some(start) = rest.find("{{") else { break };
        let Some(end_rel) = rest[start..].find("}}") else { break };
        let end = start + end_rel + 2;
        rendered.push_str(&rest[..start]);
        let name = rest[start + 2..start + end_rel].trim();
        let value = incoming_edge_content(node, ctx, name).or_else(|| floating_node_content(ctx, name)).unwrap_or_default();
        rendered.push_str(&value);
        rest = &rest[end..];
    }
    rendered.push_str(rest);
    rendered
}

/// The 1-indexed loop counter of the `depth`th enclosing repeat/for-each
/// group, counting outward from the node's immediate parent.
fn loop_index(node: &NodeObject, ctx: &RunContext, depth: usize) -> Option<u32> {
    node.groups
        .iter()
        .filter_map(|group_id| ctx.graph.groups.get(group_id))
        .filter(|group| group.max_loops.is_some() || group.from_for_each)
        .nth(depth.saturating_sub(1))
        .map(|group| group.current_loop())
}

/// Resolves one placeholder to the text it renders as. Never returns an
/// error for a missing lookup — a dangling reference renders empty, per the
/// engine's "recoverable" error policy; only a port failure (a file-manager
/// error, not merely "not found") is propagated.
pub async fn resolve(reference: &Reference, node: &NodeObject, ctx: &RunContext) -> Result<String, CannoliError> {
    match reference {
        Reference::Variable(name) if name == "NOTE" || name == "SELECTION" => {
            Ok(ctx.ports.file_manager.get_selection().await?.unwrap_or_default())
        }
        Reference::Variable(name) => Ok(incoming_edge_content(node, ctx, name)
            .or_else(|| floating_node_content(ctx, name))
            .unwrap_or_default()),
        Reference::NoteLink { name, .. } => Ok(ctx.ports.file_manager.read_note(name).await?.unwrap_or_default()),
        Reference::Floating(name) => Ok(floating_node_content(ctx, name).unwrap_or_default()),
        Reference::Dynamic(name) | Reference::DynamicCreate(name) => {
            Ok(incoming_edge_content(node, ctx, name).unwrap_or_default())
        }
        Reference::LoopIndex(depth) => Ok(loop_index(node, ctx, *depth).map(|n| n.to_string()).unwrap_or_default()),
    }
}

/// Renders `node.text` with every `{{...}}` placeholder replaced by its
/// resolved value, left to right.
pub async fn render(node: &NodeObject, ctx: &RunContext) -> Result<String, CannoliError> {
    let mut rendered = String::new();
    let mut rest = node.text.as_str();
    for reference in &node.references {
        let Some(start) = rest.find("{{") else { break };
        let Some(end_rel) = rest[start..].find("}}") else { break };
        let end = start + end_rel + 2;
        rendered.push_str(&rest[..start]);
        rendered.push_str(&resolve(reference, node, ctx).await?);
        rest = &rest[end..];
    }
    rendered.push_str(rest);
    Ok(rendered)
}
