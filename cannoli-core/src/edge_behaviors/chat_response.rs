//! A `chat-response` edge is usually filled incrementally while a streaming
//! call node is still executing — the call behavior opens a block,
//! `append_content`s chunks as they arrive, and closes it with the
//! `"END OF STREAM"` sentinel that marks a user-turn boundary (§4.4, §4.5).
//! This `load` only covers the non-streaming fallback: if nothing was
//! appended during execution, copy the source's finished content over in
//! one shot.

use crate::object::{EdgeObject, NodeObject};

/// The transcript block format every streamed/converted turn renders
/// against: `---\n# <u>{role}</u>\n\n{content}`.
pub(crate) const FORMAT_TEMPLATE: &str = "---\n# <u>{role}</u>\n\n{content}";

/// The sentinel chunk emitted after a streaming call's final chunk, marking
/// the end of an assistant turn.
pub(crate) const END_OF_STREAM: &str = "END OF STREAM";

pub(crate) fn format_block(role: &str, content: &str) -> String {
    FORMAT_TEMPLATE.replace("{role}", role).replace("{content}", content)
}

/// Opens an assistant turn block on every `edge` about to receive streamed
/// chunks, called once before the first chunk arrives.
pub(crate) fn open_assistant_block(edge: &EdgeObject) {
    edge.append_content(&format_block("assistant", ""));
}

/// Closes a streamed assistant turn with the `"END OF STREAM"` sentinel and
/// opens the next user block, called once after the stream's final chunk.
pub(crate) fn close_with_stream_sentinel(edge: &EdgeObject) {
    edge.append_content(&format!("\n\n{END_OF_STREAM}\n\n"));
    edge.append_content(&format_block("user", ""));
}

pub fn load(edge: &EdgeObject, source: &NodeObject) {
    if edge.content().is_some() {
        return;
    }
    let buffer = source.buffer.lock().expect("node buffer lock poisoned");
    edge.load(buffer.content.clone(), buffer.messages.clone(), edge.payload().versions);
}
