//! A `field` edge carries one named property out of a form call node's
//! structured JSON result, picked out by the edge's own label rather than
//! the node's whole buffer.

use crate::object::{EdgeObject, NodeObject};

pub fn load(edge: &EdgeObject, source: &NodeObject) {
    let buffer = source.buffer.lock().expect("node buffer lock poisoned");
    let value = edge.label.as_deref().and_then(|label| {
        buffer
            .content
            .as_deref()
            .and_then(|json| serde_json::from_str::<serde_json::Value>(json).ok())
            .and_then(|parsed| parsed.get(label).and_then(|v| v.as_str().map(|s| s.to_string())))
    });
    edge.load(value, vec![], edge.payload().versions);
}
