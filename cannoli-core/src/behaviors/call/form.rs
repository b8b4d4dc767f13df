//! The `form` call node: force the model to call the `form` tool with one
//! value per outgoing field-edge label, and publish the whole object as
//! JSON so each `field` edge can pick its own property back out.

use crate::context::RunContext;
use crate::llm::{form_tool, CompletionRequest};
use crate::message::Message;
use crate::object::{EdgeSubtype, NodeObject, Status};

use super::gather_messages;

fn field_labels(node: &NodeObject, ctx: &RunContext) -> Vec<String> {
    let mut labels: Vec<String> = ctx
        .graph
        .edges
        .values()
        .filter(|edge| edge.source == node.id() && edge.subtype == EdgeSubtype::Field)
        .filter_map(|edge| edge.label.clone())
        .collect();
    labels.sort();
    labels.dedup();
    labels
}

pub async fn execute(node: &NodeObject, ctx: &RunContext) {
    node.base.set_status(Status::Executing);

    let rendered = match super::super::variables::render(node, ctx).await {
        Ok(text) => text,
        Err(err) => {
            node.buffer.lock().expect("node buffer lock poisoned").content = Some(err.to_string());
            node.base.set_status(Status::Warning);
            return;
        }
    };

    let fields = field_labels(node, ctx);
    let mut messages = gather_messages(node, ctx);
    if !rendered.trim().is_empty() {
        messages.push(Message::User(rendered));
    }

    let request = CompletionRequest::new(messages).with_forced_function(form_tool(&fields));

    match ctx.llm.complete(request).await {
        Ok(Message::Assistant { function_call: Some(call), .. }) => {
            node.buffer.lock().expect("node buffer lock poisoned").content = Some(call.arguments.to_string());
            node.base.set_status(Status::Complete);
        }
        Ok(_) => {
            node.buffer.lock().expect("node buffer lock poisoned").content =
                Some("model did not return a forced form call".to_string());
            node.base.set_status(Status::Warning);
        }
        Err(err) => {
            node.buffer.lock().expect("node buffer lock poisoned").content = Some(err.to_string());
            node.base.set_status(Status::Error);
        }
    }
}
