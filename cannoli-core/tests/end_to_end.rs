//! End-to-end scheduler runs: each test builds a small hydrated graph by
//! hand (the same way the object-model unit tests do, just wired into a full
//! `scheduler::run` instead of exercising one behavior in isolation) and
//! asserts on the graph's final state and the run's `Stoppage`.

use std::collections::HashMap;
use std::sync::Arc;

use cannoli_core::canvas::Rect;
use cannoli_core::llm::MockLlm;
use cannoli_core::message::{FunctionCall, Message};
use cannoli_core::object::{
    CallKind, CannoliGraph, ContentKind, EdgeModifier, EdgeObject, EdgeSubtype, EdgeVersion, GroupObject, GroupSubtype,
    NodeObject, NodeSubtype, Status,
};
use cannoli_core::ports::{MockFetcher, MockFileManager, Ports};
use cannoli_core::reference::Reference;
use cannoli_core::scheduler::{self, StoppageReason};

fn rect() -> Rect {
    Rect { x: 0.0, y: 0.0, width: 1.0, height: 1.0 }
}

fn assert_completed(reason: &StoppageReason) {
    assert!(matches!(reason, StoppageReason::Completed), "expected Completed, got {reason:?}");
}

/// **Scenario**: an input feeds a standard call node whose reply lands on a named output node.
#[tokio::test]
async fn linear_call_writes_its_reply_to_the_named_output() {
    let mut nodes = HashMap::new();
    nodes.insert(
        "in".to_string(),
        NodeObject::new("in", "Hello", NodeSubtype::Content(ContentKind::Input), vec![], vec![], rect(), vec![])
            .with_name(Some("greeting".to_string())),
    );
    nodes.insert(
        "call".to_string(),
        NodeObject::new("call", "", NodeSubtype::Call(CallKind::Standard), vec![], vec![], rect(), vec!["e1".to_string()]),
    );
    nodes.insert(
        "out".to_string(),
        NodeObject::new("out", "", NodeSubtype::Content(ContentKind::Output), vec![], vec![], rect(), vec!["e2".to_string()])
            .with_name(Some("result".to_string())),
    );

    let mut edges = HashMap::new();
    edges.insert(
        "e1".to_string(),
        EdgeObject::new("e1", EdgeSubtype::SystemMessage, "in", "call", vec![], vec![], true, false, None, None, vec!["in".into()]),
    );
    edges.insert(
        "e2".to_string(),
        EdgeObject::new("e2", EdgeSubtype::Write, "call", "out", vec![], vec![], false, false, None, None, vec!["call".into()]),
    );

    let graph = Arc::new(CannoliGraph::new(nodes, edges, HashMap::new()));
    let llm = MockLlm::new().with_response(Message::assistant("world"));
    let stoppage = scheduler::run(graph.clone(), Ports::mock(), Arc::new(llm), true).await;

    assert_completed(&stoppage.reason);
    assert_eq!(graph.nodes.get("out").unwrap().buffer.lock().unwrap().content.as_deref(), Some("world"));
}

/// **Scenario**: a choose node's forced pick completes its matching edge and rejects the rest.
#[tokio::test]
async fn choose_node_rejects_every_edge_but_the_selected_one() {
    let mut nodes = HashMap::new();
    nodes.insert(
        "call".to_string(),
        NodeObject::new("call", "pick one", NodeSubtype::Call(CallKind::Choose), vec![], vec![], rect(), vec![]),
    );
    nodes.insert(
        "yes_sink".to_string(),
        NodeObject::new("yes_sink", "", NodeSubtype::Content(ContentKind::Standard), vec![], vec![], rect(), vec!["yes".to_string()]),
    );
    nodes.insert(
        "no_sink".to_string(),
        NodeObject::new("no_sink", "", NodeSubtype::Content(ContentKind::Standard), vec![], vec![], rect(), vec!["no".to_string()]),
    );

    let mut edges = HashMap::new();
    edges.insert(
        "yes".to_string(),
        EdgeObject::new("yes", EdgeSubtype::Choice, "call", "yes_sink", vec![], vec![], false, false, None, Some("yes".into()), vec!["call".into()]),
    );
    edges.insert(
        "no".to_string(),
        EdgeObject::new("no", EdgeSubtype::Choice, "call", "no_sink", vec![], vec![], false, false, None, Some("no".into()), vec!["call".into()]),
    );

    let graph = Arc::new(CannoliGraph::new(nodes, edges, HashMap::new()));
    let call = FunctionCall { name: "choice".into(), arguments: serde_json::json!({"choice": "yes"}) };
    let llm = MockLlm::new().with_response(Message::assistant_with_call("", call));
    let stoppage = scheduler::run(graph.clone(), Ports::mock(), Arc::new(llm), true).await;

    assert_completed(&stoppage.reason);
    assert_eq!(graph.edges.get("yes").unwrap().base.status(), Status::Complete);
    assert_eq!(graph.edges.get("no").unwrap().base.status(), Status::Rejected);
    assert_eq!(graph.nodes.get("no_sink").unwrap().base.status(), Status::Rejected);
    assert_eq!(graph.nodes.get("yes_sink").unwrap().base.status(), Status::Complete);
}

/// **Scenario**: a repeat group with a "3" label runs its body exactly three times.
#[tokio::test]
async fn repeat_group_runs_its_body_exactly_the_labeled_number_of_times() {
    let mut nodes = HashMap::new();
    nodes.insert(
        "call".to_string(),
        NodeObject::new("call", "go", NodeSubtype::Call(CallKind::Standard), vec![], vec!["g1".to_string()], rect(), vec![]),
    );

    let mut groups = HashMap::new();
    groups.insert(
        "g1".to_string(),
        GroupObject::new("g1", "3", GroupSubtype::Repeat, vec!["call".to_string()], Some(3), false, rect(), vec![]),
    );

    let graph = Arc::new(CannoliGraph::new(nodes, HashMap::new(), groups));
    let llm = MockLlm::new()
        .with_response(Message::assistant("first"))
        .with_response(Message::assistant("second"))
        .with_response(Message::assistant("third"));
    let stoppage = scheduler::run(graph.clone(), Ports::mock(), Arc::new(llm), true).await;

    assert_completed(&stoppage.reason);
    assert_eq!(graph.groups.get("g1").unwrap().current_loop(), 3);
    assert_eq!(graph.nodes.get("call").unwrap().buffer.lock().unwrap().content.as_deref(), Some("third"));
}

/// **Scenario**: an http node against an unseeded fetcher settles Error under the default catch=true, and the run still completes.
#[tokio::test]
async fn http_node_failure_settles_error_and_the_run_still_completes() {
    let mut nodes = HashMap::new();
    nodes.insert(
        "fetch".to_string(),
        NodeObject::new("fetch", "https://unknown.example", NodeSubtype::Content(ContentKind::Http), vec![], vec![], rect(), vec![]),
    );

    let graph = Arc::new(CannoliGraph::new(nodes, HashMap::new(), HashMap::new()));
    let mut ports = Ports::mock();
    ports.fetcher = Arc::new(MockFetcher::new());
    let stoppage = scheduler::run(graph.clone(), ports, Arc::new(MockLlm::new()), true).await;

    assert_completed(&stoppage.reason);
    let fetch = graph.nodes.get("fetch").unwrap();
    assert_eq!(fetch.base.status(), Status::Error);
    assert!(fetch.buffer.lock().unwrap().content.as_deref().unwrap().contains("no mock response"));
}

/// **Scenario**: an http node with a catch=false config edge settles Complete with the error text routed downstream.
#[tokio::test]
async fn http_node_with_catch_false_settles_complete_and_routes_error_downstream() {
    let mut nodes = HashMap::new();
    nodes.insert(
        "fetch".to_string(),
        NodeObject::new(
            "fetch",
            "https://unknown.example",
            NodeSubtype::Content(ContentKind::Http),
            vec![],
            vec![],
            rect(),
            vec!["cfg".to_string()],
        ),
    );
    nodes.insert(
        "sink".to_string(),
        NodeObject::new("sink", "", NodeSubtype::Content(ContentKind::Output), vec![], vec![], rect(), vec!["downstream".to_string()])
            .with_name(Some("result".to_string())),
    );
    nodes.insert(
        "cfgsrc".to_string(),
        NodeObject::new(
            "cfgsrc",
            serde_json::json!({"catch": false}).to_string(),
            NodeSubtype::Content(ContentKind::Standard),
            vec![],
            vec![],
            rect(),
            vec![],
        ),
    );

    let mut edges = HashMap::new();
    let config_edge = EdgeObject::new(
        "cfg", EdgeSubtype::Config, "cfgsrc", "fetch", vec![], vec![], false, false, None, None, vec!["cfgsrc".into()],
    );
    edges.insert("cfg".to_string(), config_edge);
    edges.insert(
        "downstream".to_string(),
        EdgeObject::new("downstream", EdgeSubtype::Write, "fetch", "sink", vec![], vec![], false, false, None, None, vec!["fetch".into()]),
    );

    let graph = Arc::new(CannoliGraph::new(nodes, edges, HashMap::new()));
    let mut ports = Ports::mock();
    ports.fetcher = Arc::new(MockFetcher::new());
    let stoppage = scheduler::run(graph.clone(), ports, Arc::new(MockLlm::new()), true).await;

    assert_completed(&stoppage.reason);
    let fetch = graph.nodes.get("fetch").unwrap();
    assert_eq!(fetch.base.status(), Status::Complete);
    let sink_content = graph.nodes.get("sink").unwrap().buffer.lock().unwrap().content.clone().unwrap();
    assert!(sink_content.contains("no mock response"));
}

/// **Scenario**: a reference node with an incoming chat-response edge writes the note instead of reading it.
#[tokio::test]
async fn reference_node_writes_incoming_chat_response_to_its_note() {
    let mut nodes = HashMap::new();
    nodes.insert(
        "in".to_string(),
        NodeObject::new("in", "new", NodeSubtype::Content(ContentKind::Input), vec![], vec![], rect(), vec![])
            .with_name(Some("draft".to_string())),
    );
    nodes.insert(
        "note".to_string(),
        NodeObject::new(
            "note",
            "{{[[Note]]}}",
            NodeSubtype::Content(ContentKind::Reference),
            vec![Reference::NoteLink { name: "Note".to_string(), modifier: None }],
            vec![],
            rect(),
            vec!["e1".to_string()],
        ),
    );

    let mut edges = HashMap::new();
    edges.insert(
        "e1".to_string(),
        EdgeObject::new("e1", EdgeSubtype::ChatResponse, "in", "note", vec![], vec![], false, false, None, None, vec!["in".into()]),
    );

    let graph = Arc::new(CannoliGraph::new(nodes, edges, HashMap::new()));
    let mut ports = Ports::mock();
    let file_manager = Arc::new(MockFileManager::new());
    ports.file_manager = file_manager.clone();
    let stoppage = scheduler::run(graph.clone(), ports, Arc::new(MockLlm::new()), true).await;

    assert_completed(&stoppage.reason);
    assert_eq!(graph.nodes.get("note").unwrap().base.status(), Status::Complete);
    assert_eq!(file_manager.edit_note_calls(), vec![("Note".to_string(), "new".to_string(), true)]);
}

/// **Scenario**: three versioned edges carrying a for-each fan-in merge into one table, in iteration order, regardless of which one finishes first.
#[tokio::test]
async fn versioned_fan_in_renders_as_an_ordered_table() {
    let mut nodes = HashMap::new();
    nodes.insert(
        "dup0".to_string(),
        NodeObject::new("dup0", "A", NodeSubtype::Content(ContentKind::Standard), vec![], vec![], rect(), vec![]),
    );
    nodes.insert(
        "dup1".to_string(),
        NodeObject::new("dup1", "B", NodeSubtype::Content(ContentKind::Standard), vec![], vec![], rect(), vec![]),
    );
    nodes.insert(
        "dup2".to_string(),
        NodeObject::new("dup2", "C", NodeSubtype::Content(ContentKind::Standard), vec![], vec![], rect(), vec![]),
    );
    nodes.insert(
        "sink".to_string(),
        NodeObject::new(
            "sink",
            "{{upper}}",
            NodeSubtype::Content(ContentKind::Standard),
            vec![Reference::Variable("upper".to_string())],
            vec![],
            rect(),
            vec!["e0".to_string(), "e1".to_string(), "e2".to_string()],
        ),
    );

    let mut edges = HashMap::new();
    for (i, source) in ["dup0", "dup1", "dup2"].iter().enumerate() {
        let id = format!("e{i}");
        let edge = EdgeObject::new(
            id.clone(),
            EdgeSubtype::Write,
            *source,
            "sink",
            vec![],
            vec![],
            false,
            false,
            Some(EdgeModifier::Table),
            Some("upper".to_string()),
            vec![source.to_string()],
        );
        // Stamped at hydration time, before the edge ever propagates — the
        // duplicate furthest from "dup0" in the canvas isn't necessarily the
        // one whose source node happens to finish first.
        edge.load(None, vec![], vec![EdgeVersion { index: i, header: None, sub_header: None }]);
        edges.insert(id, edge);
    }

    let graph = Arc::new(CannoliGraph::new(nodes, edges, HashMap::new()));
    let stoppage = scheduler::run(graph.clone(), Ports::mock(), Arc::new(MockLlm::new()), true).await;

    assert_completed(&stoppage.reason);
    let rendered = graph.nodes.get("sink").unwrap().buffer.lock().unwrap().content.clone().unwrap();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "| # | upper |");
    assert_eq!(lines[2], "| 1 | A |");
    assert_eq!(lines[3], "| 2 | B |");
    assert_eq!(lines[4], "| 3 | C |");
}

/// **Scenario**: `StopHandle::stop` halts a run before the graph finishes, and stopping twice is harmless.
#[tokio::test]
async fn stop_handle_halts_a_run_and_is_idempotent() {
    let mut nodes = HashMap::new();
    nodes.insert(
        "call".to_string(),
        NodeObject::new("call", "go", NodeSubtype::Call(CallKind::Standard), vec![], vec!["g1".to_string()], rect(), vec![]),
    );
    let mut groups = HashMap::new();
    groups.insert(
        "g1".to_string(),
        GroupObject::new("g1", "1000000", GroupSubtype::Repeat, vec!["call".to_string()], Some(1_000_000), false, rect(), vec![]),
    );
    let graph = Arc::new(CannoliGraph::new(nodes, HashMap::new(), groups));

    let mut llm = MockLlm::new();
    for _ in 0..5 {
        llm = llm.with_response(Message::assistant("tick"));
    }

    let (join, stop) = scheduler::run_with_control(graph.clone(), Ports::mock(), Arc::new(llm), true);
    stop.stop();
    stop.stop();
    let stoppage = join.await.expect("run task should not panic");

    assert!(matches!(stoppage.reason, StoppageReason::Stopped));
}
