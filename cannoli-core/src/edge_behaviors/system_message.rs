//! A `system-message` edge carries its source's content as a `System`
//! message rather than a plain string, so a downstream call node prepends
//! it to the conversation instead of treating it as a user turn.

use crate::message::Message;
use crate::object::{EdgeObject, NodeObject};

pub fn load(edge: &EdgeObject, source: &NodeObject) {
    let buffer = source.buffer.lock().expect("node buffer lock poisoned");
    let content = buffer.content.clone().unwrap_or_default();
    edge.load(Some(content.clone()), vec![Message::System(content)], edge.payload().versions);
}
