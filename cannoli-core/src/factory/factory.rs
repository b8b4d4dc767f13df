//! The factory orchestrator: `compile` runs canvas data through Steps A-G
//! and produces a `VerifiedGraph`, a pure data snapshot with no behavior.
//! `hydrate` turns a `VerifiedGraph` into a run-owned `object::CannoliGraph`.

use std::collections::{HashMap, HashSet};

use crate::canvas::{CanvasData, CanvasEdge, CanvasNode, CanvasNodeKind};
use crate::object::{
    CannoliGraph, EdgeModifier, EdgeObject, EdgeSubtype, EdgeVersion, GroupObject, GroupSubtype,
    NodeObject, NodeSubtype,
};
use crate::reference::parse_references;

use super::classify::{classify_edge, classify_node, refine_call_kind, EndpointRole};
use super::compile_error::CompilationError;
use super::config::FactoryConfig;
use super::crossing::compute_edge_crossing;
use super::deps::{edge_dependencies, incoming_dependencies, EdgeDependencyInput};
use super::draft::{Draft, DraftEdge, DraftGroup, DraftNode};
use super::foreach::expand_for_each;
use super::groups::{compute_containment, detect_overlaps};
use super::validate::{Diagnostic, DiagnosticKind};

#[derive(Clone, Debug)]
pub struct VerifiedNode {
    pub id: String,
    pub text: String,
    pub subtype: NodeSubtype,
    pub name: Option<String>,
    pub references: Vec<crate::reference::Reference>,
    pub groups: Vec<String>,
    pub rect: crate::canvas::Rect,
    pub dependencies: Vec<String>,
    pub original_object: Option<String>,
}

#[derive(Clone, Debug)]
pub struct VerifiedEdge {
    pub id: String,
    pub subtype: EdgeSubtype,
    pub source: String,
    pub target: String,
    pub crossing_out_groups: Vec<String>,
    pub crossing_in_groups: Vec<String>,
    pub add_messages: bool,
    pub is_reflexive: bool,
    pub modifier: Option<EdgeModifier>,
    pub label: Option<String>,
    pub version_index: Option<usize>,
    pub dependencies: Vec<String>,
    pub original_object: Option<String>,
}

#[derive(Clone, Debug)]
pub struct VerifiedGroup {
    pub id: String,
    pub text: String,
    pub subtype: GroupSubtype,
    pub members: Vec<String>,
    pub max_loops: Option<u32>,
    pub from_for_each: bool,
    pub rect: crate::canvas::Rect,
    pub dependencies: Vec<String>,
    pub original_object: Option<String>,
}

/// The compiler's complete, pure-data output: one source fact per entity,
/// plus every non-fatal diagnostic collected along the way.
#[derive(Clone, Debug, Default)]
pub struct VerifiedGraph {
    pub nodes: Vec<VerifiedNode>,
    pub edges: Vec<VerifiedEdge>,
    pub groups: Vec<VerifiedGroup>,
    pub diagnostics: Vec<Diagnostic>,
}

fn endpoint_role(id: &str, group_ids: &HashSet<String>, node_roles: &HashMap<String, EndpointRole>) -> EndpointRole {
    if group_ids.contains(id) {
        EndpointRole::Group
    } else {
        node_roles.get(id).copied().unwrap_or(EndpointRole::Content)
    }
}

fn role_of(subtype: NodeSubtype) -> EndpointRole {
    match subtype {
        NodeSubtype::Floating => EndpointRole::Floating,
        NodeSubtype::Content(_) => EndpointRole::Content,
        NodeSubtype::Call(_) => EndpointRole::Call,
    }
}

struct ExpandedEdge {
    id: String,
    raw: CanvasEdge,
    label: String,
}

fn expand_canvas_edges(canvas: &CanvasEdge) -> Vec<ExpandedEdge> {
    let labels = super::classify::expand_labels(canvas.label.as_deref().unwrap_or(""));
    if labels.len() <= 1 {
        return vec![ExpandedEdge { id: canvas.id.clone(), raw: canvas.clone(), label: labels.into_iter().next().unwrap_or_default() }];
    }
    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| ExpandedEdge { id: format!("{}-{i}", canvas.id), raw: canvas.clone(), label })
        .collect()
}

/// Compiles a `CanvasData` document into a `VerifiedGraph` (Steps A-G).
pub fn compile(canvas: &CanvasData, config: &FactoryConfig) -> Result<VerifiedGraph, CompilationError> {
    if canvas.nodes.is_empty() {
        return Err(CompilationError::EmptyCanvas);
    }

    let mut seen_ids: HashSet<String> = HashSet::new();
    for n in &canvas.nodes {
        if !seen_ids.insert(n.id.clone()) {
            return Err(CompilationError::DuplicateId(n.id.clone()));
        }
    }
    let node_ids: HashSet<String> = canvas.nodes.iter().map(|n| n.id.clone()).collect();
    for e in &canvas.edges {
        if !node_ids.contains(&e.from_node) {
            return Err(CompilationError::DanglingEdgeEndpoint { edge: e.id.clone(), node: e.from_node.clone() });
        }
        if !node_ids.contains(&e.to_node) {
            return Err(CompilationError::DanglingEdgeEndpoint { edge: e.id.clone(), node: e.to_node.clone() });
        }
    }

    let mut diagnostics = detect_overlaps(canvas);

    // Step A: multi-label edge expansion.
    let expanded: Vec<ExpandedEdge> = canvas.edges.iter().flat_map(expand_canvas_edges).collect();

    // Incidence counts feed Step B's floating/input/output heuristics.
    let mut incoming: HashMap<String, usize> = HashMap::new();
    let mut outgoing: HashMap<String, usize> = HashMap::new();
    for e in &expanded {
        *outgoing.entry(e.raw.from_node.clone()).or_insert(0) += 1;
        *incoming.entry(e.raw.to_node.clone()).or_insert(0) += 1;
    }

    let group_ids: HashSet<String> = canvas
        .nodes
        .iter()
        .filter(|n| n.kind == CanvasNodeKind::Group)
        .map(|n| n.id.clone())
        .collect();

    // Step B: node classification.
    let mut node_subtypes: HashMap<String, NodeSubtype> = HashMap::new();
    let mut node_names: HashMap<String, Option<String>> = HashMap::new();
    for n in canvas.nodes.iter().filter(|n| n.kind != CanvasNodeKind::Group) {
        let classification = classify_node(n, *incoming.get(&n.id).unwrap_or(&0), *outgoing.get(&n.id).unwrap_or(&0), config);
        node_subtypes.insert(n.id.clone(), classification.subtype);
        node_names.insert(n.id.clone(), classification.name);
    }
    let node_roles: HashMap<String, EndpointRole> =
        node_subtypes.iter().map(|(id, subtype)| (id.clone(), role_of(*subtype))).collect();

    // Step C: edge classification.
    struct ClassifiedEdge {
        id: String,
        source: String,
        target: String,
        subtype: EdgeSubtype,
        modifier: Option<EdgeModifier>,
        label: Option<String>,
        add_messages: bool,
    }
    let mut classified_edges = Vec::new();
    let mut outgoing_subtypes: HashMap<String, Vec<EdgeSubtype>> = HashMap::new();
    for e in &expanded {
        let source_role = endpoint_role(&e.raw.from_node, &group_ids, &node_roles);
        let target_role = endpoint_role(&e.raw.to_node, &group_ids, &node_roles);
        let classification = classify_edge(e.raw.color.as_ref(), &e.label, source_role, target_role, &HashMap::new());
        outgoing_subtypes.entry(e.raw.from_node.clone()).or_default().push(classification.subtype);

        if classification.subtype == EdgeSubtype::List && target_role != EndpointRole::Group {
            diagnostics.push(Diagnostic { object_id: e.id.clone(), kind: DiagnosticKind::ListEdgeOnNonGroup });
        }

        classified_edges.push(ClassifiedEdge {
            id: e.id.clone(),
            source: e.raw.from_node.clone(),
            target: e.raw.to_node.clone(),
            subtype: classification.subtype,
            modifier: classification.modifier,
            label: classification.label,
            add_messages: classification.add_messages,
        });
    }

    // Refine call nodes into choose/form using their now-known outgoing edges.
    for (id, subtype) in node_subtypes.iter_mut() {
        if let NodeSubtype::Call(_) = subtype {
            let outgoing = outgoing_subtypes.get(id).cloned().unwrap_or_default();
            *subtype = NodeSubtype::Call(refine_call_kind(&outgoing));
        }
    }

    // Step D: containment.
    let containment = compute_containment(canvas);

    // Step E: crossing.
    let mut crossing_by_edge: HashMap<String, super::crossing::EdgeCrossing> = HashMap::new();
    for ce in &classified_edges {
        crossing_by_edge.insert(ce.id.clone(), compute_edge_crossing(&ce.source, &ce.target, &containment, &group_ids));
    }

    // Assemble the draft.
    let mut draft = Draft::default();
    for n in canvas.nodes.iter().filter(|n| n.kind != CanvasNodeKind::Group) {
        let subtype = node_subtypes[&n.id];
        let text = n.classification_text().unwrap_or_default().to_string();
        draft.nodes.push(DraftNode {
            id: n.id.clone(),
            references: parse_references(&text),
            text,
            subtype,
            name: node_names.get(&n.id).cloned().flatten(),
            rect: n.rect(),
            groups: containment.enclosing.get(&n.id).cloned().unwrap_or_default(),
            original_object: None,
        });
    }
    for g in canvas.nodes.iter().filter(|n| n.kind == CanvasNodeKind::Group) {
        let label = g.classification_text().unwrap_or_default();
        let max_loops = crate::object::parse_max_loops(label);
        let subtype = if label.contains('/') {
            GroupSubtype::ForEachSignified
        } else if max_loops.is_some() {
            GroupSubtype::Repeat
        } else {
            GroupSubtype::Basic
        };
        draft.groups.push(DraftGroup {
            id: g.id.clone(),
            text: label.to_string(),
            subtype,
            members: containment.members.get(&g.id).cloned().unwrap_or_default(),
            max_loops,
            rect: g.rect(),
            groups: containment.enclosing.get(&g.id).cloned().unwrap_or_default(),
            from_for_each: false,
            original_object: None,
        });
    }
    for ce in classified_edges {
        let crossing = crossing_by_edge.remove(&ce.id).unwrap_or_default();
        draft.edges.push(DraftEdge {
            id: ce.id,
            subtype: ce.subtype,
            source: ce.source,
            target: ce.target,
            modifier: ce.modifier,
            label: ce.label,
            add_messages: ce.add_messages,
            crossing_out_groups: crossing.crossing_out_groups,
            crossing_in_groups: crossing.crossing_in_groups,
            is_reflexive: crossing.is_reflexive,
            version_index: None,
            original_object: None,
        });
    }

    // Validate for-each topology before expansion discards the original group.
    for g in draft.groups.iter().filter(|g| matches!(g.subtype, GroupSubtype::ForEachSignified)) {
        let incoming_list = draft
            .edges
            .iter()
            .filter(|e| e.crossing_in_groups.contains(&g.id) && matches!(e.subtype, EdgeSubtype::List | EdgeSubtype::Item))
            .count();
        if incoming_list != 1 {
            diagnostics.push(Diagnostic {
                object_id: g.id.clone(),
                kind: DiagnosticKind::ForEachTopology(format!("expected exactly 1 incoming list edge, found {incoming_list}")),
            });
        }
    }
    for g in draft.groups.iter().filter(|g| matches!(g.subtype, GroupSubtype::Repeat)) {
        let has_outgoing = draft.edges.iter().any(|e| e.crossing_out_groups.contains(&g.id));
        let has_incoming_list = draft
            .edges
            .iter()
            .any(|e| e.crossing_in_groups.contains(&g.id) && matches!(e.subtype, EdgeSubtype::List));
        if has_outgoing || has_incoming_list {
            diagnostics.push(Diagnostic { object_id: g.id.clone(), kind: DiagnosticKind::RepeatGroupIllegalEdge });
        }
    }
    for n in &draft.nodes {
        let in_for_each = n.groups.iter().any(|gid| {
            draft
                .groups
                .iter()
                .any(|g| &g.id == gid && matches!(g.subtype, GroupSubtype::ForEachSignified))
        });
        if in_for_each && matches!(n.subtype, NodeSubtype::Content(crate::object::ContentKind::Output)) && n.name.is_some() {
            diagnostics.push(Diagnostic { object_id: n.id.clone(), kind: DiagnosticKind::NamedOutputInForEach });
        }
    }

    // Step F: for-each duplication.
    let draft = expand_for_each(draft);

    // Step G: dependency sets.
    let edge_inputs: Vec<EdgeDependencyInput> = draft
        .edges
        .iter()
        .map(|e| EdgeDependencyInput { id: &e.id, target: &e.target, is_reflexive: e.is_reflexive })
        .collect();

    let nodes = draft
        .nodes
        .into_iter()
        .map(|n| VerifiedNode {
            dependencies: incoming_dependencies(&n.id, &edge_inputs),
            id: n.id,
            text: n.text,
            subtype: n.subtype,
            name: n.name,
            references: n.references,
            groups: n.groups,
            rect: n.rect,
            original_object: n.original_object,
        })
        .collect();

    let groups = draft
        .groups
        .into_iter()
        .map(|g| VerifiedGroup {
            dependencies: incoming_dependencies(&g.id, &edge_inputs),
            id: g.id,
            text: g.text,
            subtype: g.subtype,
            members: g.members,
            max_loops: g.max_loops,
            from_for_each: g.from_for_each,
            rect: g.rect,
            original_object: g.original_object,
        })
        .collect();

    let edges = draft
        .edges
        .into_iter()
        .map(|e| VerifiedEdge {
            dependencies: edge_dependencies(&e.source),
            id: e.id,
            subtype: e.subtype,
            source: e.source,
            target: e.target,
            crossing_out_groups: e.crossing_out_groups,
            crossing_in_groups: e.crossing_in_groups,
            add_messages: e.add_messages,
            is_reflexive: e.is_reflexive,
            modifier: e.modifier,
            label: e.label,
            version_index: e.version_index,
            original_object: e.original_object,
        })
        .collect();

    Ok(VerifiedGraph { nodes, edges, groups, diagnostics })
}

/// Hydrates a `VerifiedGraph` into a run-owned `object::CannoliGraph`.
/// Diagnostics are not applied as a status here: the scheduler consults
/// `VerifiedGraph::diagnostics` directly when deciding whether an object
/// should start in an already-rejected state.
pub fn hydrate(graph: VerifiedGraph) -> CannoliGraph {
    for diagnostic in &graph.diagnostics {
        crate::logging::log_compile_warning(&diagnostic.object_id, &diagnostic.message());
    }

    let mut nodes = HashMap::new();
    for n in graph.nodes {
        let mut object = NodeObject::new(n.id.clone(), n.text, n.subtype, n.references, n.groups, n.rect, n.dependencies)
            .with_name(n.name);
        object.base.original_object = n.original_object;
        nodes.insert(n.id, object);
    }

    let mut edges = HashMap::new();
    for e in graph.edges {
        let version = e.version_index.map(|index| EdgeVersion { index, header: None, sub_header: None });
        let mut object = EdgeObject::new(
            e.id.clone(),
            e.subtype,
            e.source,
            e.target,
            e.crossing_out_groups,
            e.crossing_in_groups,
            e.add_messages,
            e.is_reflexive,
            e.modifier,
            e.label,
            e.dependencies,
        );
        object.base.original_object = e.original_object;
        if let Some(version) = version {
            object.load(None, vec![], vec![version]);
        }
        edges.insert(e.id, object);
    }

    let mut groups = HashMap::new();
    for g in graph.groups {
        let mut object =
            GroupObject::new(g.id.clone(), g.text, g.subtype, g.members, g.max_loops, g.from_for_each, g.rect, g.dependencies);
        object.base.original_object = g.original_object;
        // A for-each duplicate's id is its pre-duplication id plus a trailing
        // `-{iteration}` (Step F). Stamp that iteration onto `current_loop`
        // so a LoopIndex reference inside the duplicate resolves to the right
        // number instead of always reading 0.
        if object.from_for_each {
            if let Some(index) = object.id().rsplit_once('-').and_then(|(_, suffix)| suffix.parse::<u32>().ok()) {
                object.set_current_loop(index);
            }
        }
        groups.insert(g.id, object);
    }

    CannoliGraph::new(nodes, edges, groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasColor;
    use std::collections::HashMap as Map;

    fn text_node(id: &str, text: &str) -> CanvasNode {
        CanvasNode {
            id: id.into(),
            kind: CanvasNodeKind::Text,
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            color: None,
            text: Some(text.to_string()),
            file: None,
            url: None,
            label: None,
            extra: Map::new(),
        }
    }

    fn call_node(id: &str, text: &str) -> CanvasNode {
        let mut n = text_node(id, text);
        n.color = Some(CanvasColor::Indexed(1));
        n
    }

    fn edge(id: &str, from: &str, to: &str, label: Option<&str>) -> CanvasEdge {
        CanvasEdge {
            id: id.into(),
            from_node: from.into(),
            from_side: None,
            to_node: to.into(),
            to_side: None,
            from_end: None,
            to_end: None,
            color: None,
            label: label.map(str::to_string),
            extra: Map::new(),
        }
    }

    /// **Scenario**: an empty canvas fails to compile.
    #[test]
    fn compile_rejects_empty_canvas() {
        let canvas = CanvasData { nodes: vec![], edges: vec![], settings: None, args: None, extra: Map::new() };
        assert!(matches!(compile(&canvas, &FactoryConfig::default()), Err(CompilationError::EmptyCanvas)));
    }

    /// **Scenario**: an edge pointing at a node id that doesn't exist is a dangling-endpoint error.
    #[test]
    fn compile_rejects_dangling_edge() {
        let canvas = CanvasData {
            nodes: vec![text_node("a", "hi")],
            edges: vec![edge("e1", "a", "ghost", None)],
            settings: None,
            args: None,
            extra: Map::new(),
        };
        assert!(matches!(
            compile(&canvas, &FactoryConfig::default()),
            Err(CompilationError::DanglingEdgeEndpoint { .. })
        ));
    }

    /// **Scenario**: a simple input -> call -> output chain compiles with the expected subtypes and dependency chain.
    #[test]
    fn compile_linear_call_chain() {
        let canvas = CanvasData {
            nodes: vec![text_node("in", "[topic]"), call_node("call", "Tell me about {{topic}}"), text_node("out", "[result]")],
            edges: vec![edge("e1", "in", "call", None), edge("e2", "call", "out", None)],
            settings: None,
            args: None,
            extra: Map::new(),
        };
        let graph = compile(&canvas, &FactoryConfig::default()).unwrap();

        let in_node = graph.nodes.iter().find(|n| n.id == "in").unwrap();
        assert_eq!(in_node.subtype, NodeSubtype::Content(crate::object::ContentKind::Input));

        let call = graph.nodes.iter().find(|n| n.id == "call").unwrap();
        assert_eq!(call.subtype, NodeSubtype::Call(crate::object::CallKind::Standard));
        assert_eq!(call.dependencies, vec!["e1".to_string()]);

        let out_node = graph.nodes.iter().find(|n| n.id == "out").unwrap();
        assert_eq!(out_node.subtype, NodeSubtype::Content(crate::object::ContentKind::Output));
        assert_eq!(out_node.dependencies, vec!["e2".to_string()]);

        let e2 = graph.edges.iter().find(|e| e.id == "e2").unwrap();
        assert_eq!(e2.dependencies, vec!["call".to_string()]);
    }

    /// **Scenario**: hydrate() turns a compiled graph into a CannoliGraph whose objects start in the right initial status.
    #[test]
    fn hydrate_produces_cannoli_graph_with_correct_initial_status() {
        let canvas = CanvasData {
            nodes: vec![text_node("in", "[topic]"), call_node("call", "Tell me about {{topic}}")],
            edges: vec![edge("e1", "in", "call", None)],
            settings: None,
            args: None,
            extra: Map::new(),
        };
        let verified = compile(&canvas, &FactoryConfig::default()).unwrap();
        let graph = hydrate(verified);

        assert_eq!(graph.nodes.get("in").unwrap().base.status(), crate::object::Status::Complete);
        assert_eq!(graph.nodes.get("call").unwrap().base.status(), crate::object::Status::Pending);
    }
}
