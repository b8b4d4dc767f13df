//! Call node behaviors (C5): the three ways a node talks to the LLM
//! provider. `standard` gathers incoming chat messages and either streams
//! or returns one completion; `choose` and `form` force a tool call so the
//! model's answer is structured instead of free text.

mod choose;
mod form;
mod standard;

use crate::context::RunContext;
use crate::object::{CallKind, NodeObject};

pub async fn execute(node: &NodeObject, kind: CallKind, ctx: &RunContext) {
    match kind {
        CallKind::Standard => standard::execute(node, ctx).await,
        CallKind::Choose => choose::execute(node, ctx).await,
        CallKind::Form => form::execute(node, ctx).await,
    }
}

/// Gathers the `System`/chat-carrying messages delivered over `node`'s
/// incoming edges, deduplicating system messages and preserving delivery
/// order for everything else — the transcript every call kind starts from.
pub(super) fn gather_messages(node: &NodeObject, ctx: &RunContext) -> Vec<crate::message::Message> {
    let mut seen_system = std::collections::HashSet::new();
    let mut messages = Vec::new();
    for dep_id in &node.base.dependencies {
        let Some(edge) = ctx.graph.edges.get(dep_id) else { continue };
        if !edge.subtype.carries_messages() {
            continue;
        }
        for message in edge.payload().messages {
            if let crate::message::Message::System(text) = &message {
                if !seen_system.insert(text.clone()) {
                    continue;
                }
            }
            messages.push(message);
        }
    }
    messages
}
