//! Content node behaviors: everything that isn't a call node. Most content
//! kinds just render their placeholders and publish the result; `http`,
//! `search`, and `subcannoli` reach out through a port instead.

use crate::context::RunContext;
use crate::object::{ContentKind, EdgeSubtype, NodeObject, Status};
use crate::reference::Reference;

use super::actions::{build_args, coerce_response_to_string, invoke};
use super::http;
use super::variables::render;

pub async fn execute(node: &NodeObject, kind: ContentKind, ctx: &RunContext) {
    node.base.set_status(Status::Executing);
    match kind {
        ContentKind::Standard | ContentKind::Input | ContentKind::Output | ContentKind::Formatter => {
            run_render(node, ctx).await;
        }
        ContentKind::Reference => run_reference(node, ctx).await,
        ContentKind::Http => run_http(node, ctx).await,
        ContentKind::Search => run_search(node, ctx).await,
        ContentKind::SubCannoli => run_subcannoli(node, ctx).await,
    }
}

async fn run_render(node: &NodeObject, ctx: &RunContext) {
    match render(node, ctx).await {
        Ok(text) => {
            node.buffer.lock().expect("node buffer lock poisoned").content = Some(text);
            node.base.set_status(Status::Complete);
        }
        Err(err) => {
            node.buffer.lock().expect("node buffer lock poisoned").content = Some(err.to_string());
            node.base.set_status(Status::Warning);
        }
    }
}

/// Finds the note name this reference node targets and the content of
/// whichever incoming edge carries it, if any incoming edge has already
/// loaded content. A reference node with such an edge writes rather than
/// reads; one with none falls back to the normal read-and-render path.
/// `append` is true when the writing edge is a `chat-response` edge, since
/// those stream in chunks that accumulate rather than replace.
fn incoming_write(node: &NodeObject, ctx: &RunContext) -> Option<(String, String, bool)> {
    let name = node.references.iter().find_map(|reference| match reference {
        Reference::NoteLink { name, .. } => Some(name.clone()),
        _ => None,
    })?;
    let edge = node
        .base
        .dependencies
        .iter()
        .filter_map(|dep_id| ctx.graph.edges.get(dep_id))
        .find(|edge| edge.target == node.id())?;
    let content = edge.content()?;
    Some((name, content, edge.subtype == EdgeSubtype::ChatResponse))
}

async fn run_reference(node: &NodeObject, ctx: &RunContext) {
    let Some((name, content, append)) = incoming_write(node, ctx) else {
        run_render(node, ctx).await;
        return;
    };
    match ctx.ports.file_manager.edit_note(&name, &content, append).await {
        Ok(()) => {
            node.buffer.lock().expect("node buffer lock poisoned").content = Some(content);
            node.base.set_status(Status::Complete);
        }
        Err(err) => {
            node.buffer.lock().expect("node buffer lock poisoned").content = Some(err.to_string());
            node.base.set_status(Status::Warning);
        }
    }
}

async fn run_http(node: &NodeObject, ctx: &RunContext) {
    http::execute(node, ctx).await;
}

async fn run_search(node: &NodeObject, ctx: &RunContext) {
    // A search node is a thin specialization of http: its rendered text is
    // the query, issued as a GET against whatever endpoint the fetcher was
    // configured with.
    run_http(node, ctx).await;
}

/// Runs a sub-cannoli as a registered `subcannoli` action (§4.5 Sub-cannoli,
/// §6 Actions): collects every incoming labeled edge into the argument map
/// (coerced per the action's declared `arg_info`, if any), runs it — a
/// receive-style action's two-phase handshake collapses into one call here
/// — and routes an object-shaped response straight onto same-named outgoing
/// edges rather than forcing it through a single buffer string.
async fn run_subcannoli(node: &NodeObject, ctx: &RunContext) {
    let input = match render(node, ctx).await {
        Ok(text) => text,
        Err(err) => {
            node.buffer.lock().expect("node buffer lock poisoned").content = Some(err.to_string());
            node.base.set_status(Status::Warning);
            return;
        }
    };

    let Some(action) = ctx.ports.actions.get("subcannoli") else {
        node.buffer.lock().expect("node buffer lock poisoned").content =
            Some("no subcannoli action registered".to_string());
        node.base.set_status(Status::Warning);
        return;
    };

    let args = build_args(node, ctx, action.as_ref(), &input);
    match invoke(action.as_ref(), args, node).await {
        Ok(value) => match coerce_response_to_string(node, ctx, &value) {
            Some(text) => {
                node.buffer.lock().expect("node buffer lock poisoned").content = Some(text);
                node.base.set_status(Status::Complete);
            }
            None => {
                node.buffer.lock().expect("node buffer lock poisoned").content = Some(String::new());
                node.base.set_status(Status::Complete);
            }
        },
        Err(err) => {
            node.buffer.lock().expect("node buffer lock poisoned").content = Some(err.to_string());
            node.base.set_status(Status::Warning);
        }
    }
}
