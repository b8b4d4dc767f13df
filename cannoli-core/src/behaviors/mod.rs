//! Node behaviors (C5): what actually runs when the scheduler decides an
//! object is ready. A node's behavior owns its own buffer and status;
//! edge propagation onto whatever it feeds happens afterward, in
//! `edge_behaviors`.

mod actions;
pub mod call;
mod content;
mod http;
pub mod merge;
pub mod variables;

use crate::context::RunContext;
use crate::object::{NodeObject, NodeSubtype};

/// Runs `node`'s behavior to completion, leaving it in a terminal status.
/// A floating node never reaches here — it's constructed already
/// `Complete` and the scheduler only ever reads its buffer.
pub async fn execute(node: &NodeObject, ctx: &RunContext) {
    match node.subtype {
        NodeSubtype::Content(kind) => content::execute(node, kind, ctx).await,
        NodeSubtype::Call(kind) => call::execute(node, kind, ctx).await,
        NodeSubtype::Floating => {}
    }
}
