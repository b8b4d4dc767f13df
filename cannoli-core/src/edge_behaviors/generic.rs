//! The default edge behavior: copy the source node's rendered content (and,
//! if `addMessages` is set, its accumulated message list) onto the edge
//! verbatim. Used directly by every subtype that doesn't need its own file
//! here (`write`, `variable`, `field`, `list`, `item`, `config`), and as the
//! final step of the `choice` special case once a choice edge is selected.
//! Carries forward any version stamp the edge already had (for-each crossing
//! edges are version-stamped at hydration time, before they ever run) rather
//! than clobbering it with an empty one.

use crate::object::{EdgeObject, NodeObject};

pub fn load(edge: &EdgeObject, source: &NodeObject) {
    let buffer = source.buffer.lock().expect("node buffer lock poisoned");
    edge.load(buffer.content.clone(), buffer.messages.clone(), edge.payload().versions);
}
