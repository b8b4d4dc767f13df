//! The `standard` call node: render the node's own text as the final user
//! turn, gather the incoming chat transcript, and get one completion back
//! — streamed chunk-by-chunk onto any `chat-response` edges leaving the
//! node, or fetched in one shot if there are none.

use futures::StreamExt;

use crate::context::RunContext;
use crate::llm::CompletionRequest;
use crate::message::{ImageReference, Message};
use crate::object::{EdgeSubtype, NodeObject, Status};
use crate::reference::{parse_image_embeds, ImageEmbed};

use super::gather_messages;

async fn extract_images(node: &NodeObject, ctx: &RunContext) -> Vec<ImageReference> {
    let mut images = Vec::new();
    for embed in parse_image_embeds(&node.text) {
        let result = match embed {
            ImageEmbed::File(name) => ctx.ports.file_manager.read_note(&name).await,
            ImageEmbed::Url(url) => ctx
                .ports
                .fetcher
                .fetch(crate::ports::HttpRequest::get(url))
                .await
                .map(|response| Some(response.body)),
        };
        if let Ok(Some(data)) = result {
            images.push(ImageReference { mime_type: "application/octet-stream".to_string(), base64_data: data });
        }
    }
    images
}

fn chat_response_edges<'a>(node: &NodeObject, ctx: &'a RunContext) -> Vec<&'a str> {
    ctx.graph
        .edges
        .values()
        .filter(|edge| edge.source == node.id() && edge.subtype == EdgeSubtype::ChatResponse)
        .map(|edge| edge.id())
        .collect()
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

    let mut messages = gather_messages(node, ctx);
    if !rendered.trim().is_empty() {
        messages.push(Message::User(rendered));
    }
    let images = extract_images(node, ctx).await;

    let response_targets = chat_response_edges(node, ctx);
    let request = CompletionRequest::new(messages).with_images(images);

    if response_targets.is_empty() {
        match ctx.llm.complete(request).await {
            Ok(message) => {
                let mut buffer = node.buffer.lock().expect("node buffer lock poisoned");
                buffer.content = Some(message.text().to_string());
                buffer.messages = vec![message];
                drop(buffer);
                node.base.set_status(Status::Complete);
            }
            Err(err) => {
                node.buffer.lock().expect("node buffer lock poisoned").content = Some(err.to_string());
                node.base.set_status(Status::Error);
            }
        }
        return;
    }

    for edge_id in &response_targets {
        if let Some(edge) = ctx.graph.edges.get(*edge_id) {
            crate::edge_behaviors::chat_response::open_assistant_block(edge);
        }
    }

    match ctx.llm.complete_stream(request).await {
        Ok(mut stream) => {
            let mut full = String::new();
            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(text) => {
                        full.push_str(&text);
                        for edge_id in &response_targets {
                            if let Some(edge) = ctx.graph.edges.get(*edge_id) {
                                edge.append_content(&text);
                            }
                        }
                    }
                    Err(err) => {
                        node.buffer.lock().expect("node buffer lock poisoned").content = Some(err.to_string());
                        node.base.set_status(Status::Error);
                        return;
                    }
                }
            }
            // Marks the user-turn boundary a downstream chat-converter/logging
            // edge parses against: one sentinel chunk, then a fresh user block.
            for edge_id in &response_targets {
                if let Some(edge) = ctx.graph.edges.get(*edge_id) {
                    crate::edge_behaviors::chat_response::close_with_stream_sentinel(edge);
                }
            }
            let mut buffer = node.buffer.lock().expect("node buffer lock poisoned");
            buffer.content = Some(full.clone());
            buffer.messages = vec![Message::assistant(full)];
            drop(buffer);
            node.base.set_status(Status::Complete);
        }
        Err(err) => {
            node.buffer.lock().expect("node buffer lock poisoned").content = Some(err.to_string());
            node.base.set_status(Status::Error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Rect;
    use crate::llm::MockLlm;
    use crate::object::{CallKind, CannoliGraph, ContentKind, NodeSubtype};
    use crate::ports::Ports;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn rect() -> Rect {
        Rect { x: 0.0, y: 0.0, width: 1.0, height: 1.0 }
    }

    /// **Scenario**: with no chat-response edges, a standard call node fetches one completion.
    #[tokio::test]
    async fn standard_call_without_streaming_targets_fetches_one_completion() {
        let node = NodeObject::new("n1", "hello", NodeSubtype::Call(CallKind::Standard), vec![], vec![], rect(), vec![]);
        let graph = CannoliGraph::new(HashMap::new(), HashMap::new(), HashMap::new());
        let llm = MockLlm::new().with_response(Message::assistant("hi there"));
        let ctx = RunContext::new(Arc::new(graph), Ports::mock(), Arc::new(llm), true);

        execute(&node, &ctx).await;
        assert_eq!(node.base.status(), Status::Complete);
        assert_eq!(node.buffer.lock().unwrap().content.as_deref(), Some("hi there"));
    }

    /// **Scenario**: a chat-response edge downstream receives streamed chunks as they arrive.
    #[tokio::test]
    async fn standard_call_with_streaming_target_appends_chunks() {
        let node = NodeObject::new("n1", "hello", NodeSubtype::Call(CallKind::Standard), vec![], vec![], rect(), vec![]);
        let mut edges = HashMap::new();
        edges.insert(
            "resp".to_string(),
            crate::object::EdgeObject::new("resp", EdgeSubtype::ChatResponse, "n1", "sink", vec![], vec![], false, false, None, None, vec!["n1".into()]),
        );
        let mut nodes = HashMap::new();
        nodes.insert(
            "sink".to_string(),
            NodeObject::new("sink", "", NodeSubtype::Content(ContentKind::Output), vec![], vec![], rect(), vec!["resp".into()]),
        );
        let graph = CannoliGraph::new(nodes, edges, HashMap::new());
        let llm = MockLlm::new().with_stream(vec!["Hel", "lo"]);
        let ctx = RunContext::new(Arc::new(graph), Ports::mock(), Arc::new(llm), true);

        execute(&node, &ctx).await;
        assert_eq!(node.base.status(), Status::Complete);
        let content = ctx.graph.edges.get("resp").unwrap().content().unwrap();
        assert!(content.starts_with("---\n# <u>assistant</u>\n\nHello"));
        assert!(content.contains("END OF STREAM"));
        assert!(content.ends_with("---\n# <u>user</u>\n\n"));
    }
}
