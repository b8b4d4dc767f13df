//! The `choose` call node: force the model to call the `choice` tool with
//! one of the node's outgoing choice-edge labels, then record the pick so
//! `edge_behaviors` can complete that one edge and reject the rest.

use crate::context::RunContext;
use crate::llm::{choice_tool, CompletionRequest};
use crate::message::Message;
use crate::object::{EdgeSubtype, NodeObject, Status};

use super::gather_messages;

fn choice_labels(node: &NodeObject, ctx: &RunContext) -> Vec<String> {
    let mut labels: Vec<String> = ctx
        .graph
        .edges
        .values()
        .filter(|edge| edge.source == node.id() && edge.subtype == EdgeSubtype::Choice)
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

    let labels = choice_labels(node, ctx);
    let mut messages = gather_messages(node, ctx);
    if !rendered.trim().is_empty() {
        messages.push(Message::User(rendered));
    }

    let request = CompletionRequest::new(messages).with_forced_function(choice_tool(&labels));

    match ctx.llm.complete(request).await {
        Ok(Message::Assistant { function_call: Some(call), .. }) => {
            let choice = call.arguments.get("choice").and_then(|v| v.as_str()).map(|s| s.to_string());
            let mut buffer = node.buffer.lock().expect("node buffer lock poisoned");
            buffer.content = choice.clone();
            buffer.selected_choice = choice;
            drop(buffer);
            node.base.set_status(Status::Complete);
        }
        Ok(_) => {
            node.buffer.lock().expect("node buffer lock poisoned").content =
                Some("model did not return a forced choice call".to_string());
            node.base.set_status(Status::Warning);
        }
        Err(err) => {
            node.buffer.lock().expect("node buffer lock poisoned").content = Some(err.to_string());
            node.base.set_status(Status::Error);
        }
    }
}
