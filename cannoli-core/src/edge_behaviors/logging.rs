//! A `logging` edge aggregates a run record rather than forwarding plain
//! content: repeat-loop headers for every enclosing repeat/for-each group
//! (outermost first), a version header when the edge carries an
//! `EdgeVersion` stamp, an interaction transcript rendered the way a
//! streamed response renders, and a secret-redacted config dump (§12.5) —
//! appended rather than overwritten, since several logging edges converging
//! on one sink each add their own record instead of clobbering each other.

use crate::context::RunContext;
use crate::object::{EdgeObject, EdgeVersion, NodeObject};

use super::chat_response::format_block;

fn loop_headers(source: &NodeObject, ctx: &RunContext) -> String {
    source
        .groups
        .iter()
        .rev()
        .filter_map(|id| ctx.graph.groups.get(id))
        .filter(|group| group.max_loops.is_some() || group.from_for_each)
        .map(|group| format!("## Loop {}/{}\n", group.current_loop(), group.max_loops.unwrap_or(0)))
        .collect::<Vec<_>>()
        .join("")
}

fn version_header(versions: &[EdgeVersion]) -> String {
    versions
        .first()
        .map(|v| {
            let suffix = v.header.as_deref().map(|h| format!(": {h}")).unwrap_or_default();
            format!("### Version {}{}\n", v.index, suffix)
        })
        .unwrap_or_default()
}

fn interaction_transcript(source: &NodeObject) -> String {
    let buffer = source.buffer.lock().expect("node buffer lock poisoned");
    if buffer.messages.is_empty() {
        buffer.content.clone().unwrap_or_default()
    } else {
        buffer.messages.iter().map(|m| format_block(m.role_name(), m.text())).collect::<Vec<_>>().join("\n\n")
    }
}

pub fn load(edge: &EdgeObject, source: &NodeObject, ctx: &RunContext) {
    let mut record = String::new();
    record.push_str(&loop_headers(source, ctx));
    record.push_str(&version_header(&edge.payload().versions));
    record.push_str(&interaction_transcript(source));

    let dump = ctx.config.redacted_dump();
    if !dump.is_empty() {
        record.push_str("\n\n### Config\n");
        record.push_str(&dump);
    }
    record.push_str("\n\n");

    edge.append_content(&record);
}
