//! Edge behaviors (C6): what happens to an edge once its source node
//! reaches a terminal status. Every edge subtype shares the same shape —
//! read the source's buffer, call `load`/`append_content`, then transition
//! the edge itself to a terminal status — so this module is mostly a
//! dispatch table over `EdgeSubtype` plus the handful of subtypes that
//! deviate from plain pass-through.

mod chat_converter;
pub(crate) mod chat_response;
mod field;
mod generic;
mod logging;
mod system_message;

use crate::context::RunContext;
use crate::object::{EdgeObject, EdgeSubtype, NodeObject, Status};

/// Propagates `source`'s completed output onto `edge`, then transitions the
/// edge to a terminal status mirroring the source (a rejected source
/// rejects every edge leaving it without loading anything).
pub fn propagate(edge: &EdgeObject, source: &NodeObject, ctx: &RunContext) {
    if source.base.status().is_rejected() {
        edge.base.set_status(Status::Rejected);
        return;
    }

    if edge.subtype == EdgeSubtype::Choice {
        let selected = source.buffer.lock().expect("node buffer lock poisoned").selected_choice.clone();
        let this_is_selected = selected.as_deref() == edge.label.as_deref();
        edge.base.set_status(Status::Executing);
        if this_is_selected {
            generic::load(edge, source);
            edge.base.set_status(Status::Complete);
        } else {
            edge.base.set_status(Status::Rejected);
        }
        return;
    }

    edge.base.set_status(Status::Executing);
    match edge.subtype {
        EdgeSubtype::ChatConverter => chat_converter::load(edge, source, ctx),
        EdgeSubtype::ChatResponse => chat_response::load(edge, source),
        EdgeSubtype::SystemMessage => system_message::load(edge, source),
        EdgeSubtype::Logging => logging::load(edge, source, ctx),
        EdgeSubtype::Field => field::load(edge, source),
        _ => generic::load(edge, source),
    }
    edge.base.set_status(Status::Complete);
}
