//! Factory Step F: for-each duplication. A `for-each-signified` group whose
//! label parses as `"k/N"` is replaced by `N` ordinary `basic` groups, each a
//! deep copy of the original's subtree with every internal id suffixed
//! `-{index}`. The group's one incoming list edge (targeting the group
//! itself, not a member) becomes `N` `item` edges, one per duplicate group,
//! each carrying that iteration's element; every other edge crossing the
//! group boundary is duplicated per iteration and stamped with that
//! iteration's version index so a downstream merge can render results in
//! order.

use std::collections::HashMap;

use crate::object::EdgeSubtype;

use super::draft::{Draft, DraftEdge, DraftGroup, DraftNode};

fn remap(id: &str, id_map: &HashMap<String, String>) -> String {
    id_map.get(id).cloned().unwrap_or_else(|| id.to_string())
}

fn remap_list(ids: &[String], id_map: &HashMap<String, String>) -> Vec<String> {
    ids.iter().map(|id| remap(id, id_map)).collect()
}

/// Expands every `for-each-signified` group in `draft` into its duplicated
/// `basic` groups. Runs to a fixed point so a for-each group nested inside
/// another for-each group is expanded once its enclosing copy exists.
pub fn expand_for_each(mut draft: Draft) -> Draft {
    loop {
        let next_id = draft
            .groups
            .iter()
            .find(|g| matches!(g.subtype, crate::object::GroupSubtype::ForEachSignified))
            .map(|g| g.id.clone());

        let Some(group_id) = next_id else { break };
        draft = expand_one(draft, &group_id);
    }
    draft
}

fn expand_one(draft: Draft, group_id: &str) -> Draft {
    let group = draft.groups.iter().find(|g| g.id == group_id).cloned().expect("group_id exists");
    let iterations = group.max_loops.unwrap_or(0) as usize;

    let subtree_node_ids: Vec<String> = draft
        .nodes
        .iter()
        .filter(|n| n.groups.contains(&group.id))
        .map(|n| n.id.clone())
        .collect();
    let subtree_group_ids: Vec<String> = draft
        .groups
        .iter()
        .filter(|g| g.id != group.id && g.groups.contains(&group.id))
        .map(|g| g.id.clone())
        .collect();

    let crossing_in: Vec<DraftEdge> = draft
        .edges
        .iter()
        .filter(|e| e.crossing_in_groups.contains(&group.id))
        .cloned()
        .collect();
    let crossing_out: Vec<DraftEdge> = draft
        .edges
        .iter()
        .filter(|e| e.crossing_out_groups.contains(&group.id))
        .cloned()
        .collect();

    // The seed list/item edge feeding the group: the sole crossing-in edge
    // whose subtype already marks it as carrying a collection to iterate.
    let list_edge_id = crossing_in
        .iter()
        .find(|e| matches!(e.subtype, EdgeSubtype::List | EdgeSubtype::Item))
        .map(|e| e.id.clone());

    let boundary_ids: Vec<String> = crossing_in
        .iter()
        .chain(crossing_out.iter())
        .map(|e| e.id.clone())
        .collect();

    // An edge is internal if both endpoints lie strictly inside the subtree
    // (nodes or nested groups). A reflexive edge directly between the
    // for-each group and one of its own members is not expected here: item
    // delivery goes through the group-targeted list edge instead.
    let internal_edge_ids: Vec<String> = draft
        .edges
        .iter()
        .filter(|e| {
            !boundary_ids.contains(&e.id)
                && (subtree_node_ids.contains(&e.source) || subtree_group_ids.contains(&e.source))
                && (subtree_node_ids.contains(&e.target) || subtree_group_ids.contains(&e.target))
        })
        .map(|e| e.id.clone())
        .collect();

    let mut new_nodes = Vec::new();
    let mut new_groups = Vec::new();
    let mut new_edges = Vec::new();

    for i in 0..iterations {
        let suffix = format!("-{i}");
        let mut id_map: HashMap<String, String> = HashMap::new();
        id_map.insert(group.id.clone(), format!("{}{suffix}", group.id));
        for id in subtree_node_ids.iter().chain(subtree_group_ids.iter()).chain(internal_edge_ids.iter()) {
            id_map.insert(id.clone(), format!("{id}{suffix}"));
        }

        for node in draft.nodes.iter().filter(|n| subtree_node_ids.contains(&n.id)) {
            let mut copy = node.clone();
            copy.id = remap(&node.id, &id_map);
            copy.groups = remap_list(&node.groups, &id_map);
            copy.original_object = Some(node.id.clone());
            new_nodes.push(copy);
        }

        for nested in draft.groups.iter().filter(|g| subtree_group_ids.contains(&g.id)) {
            let mut copy = nested.clone();
            copy.id = remap(&nested.id, &id_map);
            copy.groups = remap_list(&nested.groups, &id_map);
            copy.members = remap_list(&nested.members, &id_map);
            copy.original_object = Some(nested.id.clone());
            new_groups.push(copy);
        }

        new_groups.push(DraftGroup {
            id: remap(&group.id, &id_map),
            text: group.text.clone(),
            subtype: crate::object::GroupSubtype::Basic,
            members: remap_list(&group.members, &id_map),
            max_loops: None,
            rect: group.rect,
            groups: group.groups.clone(),
            from_for_each: true,
            original_object: Some(group.id.clone()),
        });

        for edge in draft.edges.iter().filter(|e| internal_edge_ids.contains(&e.id)) {
            let mut copy = edge.clone();
            copy.id = remap(&edge.id, &id_map);
            copy.source = remap(&edge.source, &id_map);
            copy.target = remap(&edge.target, &id_map);
            copy.crossing_in_groups = remap_list(&edge.crossing_in_groups, &id_map);
            copy.crossing_out_groups = remap_list(&edge.crossing_out_groups, &id_map);
            copy.original_object = Some(edge.id.clone());
            new_edges.push(copy);
        }

        for edge in &crossing_in {
            let is_list_edge = list_edge_id.as_deref() == Some(edge.id.as_str());
            let mut copy = edge.clone();
            copy.id = format!("{}{suffix}", edge.id);
            copy.target = remap(&edge.target, &id_map);
            copy.crossing_in_groups = remap_list(&edge.crossing_in_groups, &id_map);
            copy.version_index = Some(i);
            copy.original_object = Some(edge.id.clone());
            if is_list_edge {
                copy.subtype = EdgeSubtype::Item;
            }
            new_edges.push(copy);
        }

        for edge in &crossing_out {
            let mut copy = edge.clone();
            copy.id = format!("{}{suffix}", edge.id);
            copy.source = remap(&edge.source, &id_map);
            copy.crossing_out_groups = remap_list(&edge.crossing_out_groups, &id_map);
            copy.version_index = Some(i);
            copy.original_object = Some(edge.id.clone());
            new_edges.push(copy);
        }
    }

    let mut draft = draft;
    draft.groups.retain(|g| g.id != group.id && !subtree_group_ids.contains(&g.id));
    draft.nodes.retain(|n| !subtree_node_ids.contains(&n.id));
    draft.edges.retain(|e| !internal_edge_ids.contains(&e.id) && !boundary_ids.contains(&e.id));

    draft.groups.extend(new_groups);
    draft.nodes.extend(new_nodes);
    draft.edges.extend(new_edges);
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Rect;
    use crate::object::{ContentKind, GroupSubtype, NodeSubtype};

    fn rect() -> Rect {
        Rect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 }
    }

    fn node(id: &str, groups: &[&str]) -> DraftNode {
        DraftNode {
            id: id.to_string(),
            text: String::new(),
            subtype: NodeSubtype::Content(ContentKind::Standard),
            name: None,
            references: vec![],
            rect: rect(),
            groups: groups.iter().map(|s| s.to_string()).collect(),
            original_object: None,
        }
    }

    fn edge(
        id: &str,
        subtype: EdgeSubtype,
        source: &str,
        target: &str,
        crossing_in: &[&str],
        crossing_out: &[&str],
    ) -> DraftEdge {
        DraftEdge {
            id: id.to_string(),
            subtype,
            source: source.to_string(),
            target: target.to_string(),
            modifier: None,
            label: None,
            add_messages: false,
            crossing_in_groups: crossing_in.iter().map(|s| s.to_string()).collect(),
            crossing_out_groups: crossing_out.iter().map(|s| s.to_string()).collect(),
            is_reflexive: false,
            version_index: None,
            original_object: None,
        }
    }

    /// **Scenario**: a 3-way for-each group duplicates its member node and
    /// converts its incoming list edge into one item edge per duplicate.
    #[test]
    fn expand_for_each_duplicates_member_and_converts_list_edge() {
        let draft = Draft {
            nodes: vec![node("item_node", &["g1"])],
            edges: vec![edge("list_e", EdgeSubtype::List, "source", "g1", &["g1"], &[])],
            groups: vec![DraftGroup {
                id: "g1".to_string(),
                text: "1/3".to_string(),
                subtype: GroupSubtype::ForEachSignified,
                members: vec!["item_node".to_string()],
                max_loops: Some(3),
                rect: rect(),
                groups: vec![],
                from_for_each: false,
                original_object: None,
            }],
        };

        let expanded = expand_for_each(draft);

        assert_eq!(expanded.groups.len(), 3);
        assert!(expanded.groups.iter().all(|g| matches!(g.subtype, GroupSubtype::Basic) && g.from_for_each));
        assert_eq!(expanded.nodes.len(), 3);
        assert!(expanded.nodes.iter().any(|n| n.id == "item_node-0"));
        assert!(expanded.nodes.iter().any(|n| n.id == "item_node-2"));

        let item_edges: Vec<_> = expanded.edges.iter().filter(|e| e.subtype == EdgeSubtype::Item).collect();
        assert_eq!(item_edges.len(), 3);
        assert!(item_edges.iter().all(|e| e.source == "source"));
        assert!(item_edges.iter().any(|e| e.target == "g1-1" && e.version_index == Some(1)));
    }

    /// **Scenario**: an edge crossing out of the for-each group is duplicated once per iteration with its version stamped.
    #[test]
    fn expand_for_each_duplicates_crossing_out_edge_with_version() {
        let draft = Draft {
            nodes: vec![node("item_node", &["g1"])],
            edges: vec![
                edge("list_e", EdgeSubtype::List, "source", "g1", &["g1"], &[]),
                edge("out_e", EdgeSubtype::Write, "item_node", "sink", &[], &["g1"]),
            ],
            groups: vec![DraftGroup {
                id: "g1".to_string(),
                text: "1/2".to_string(),
                subtype: GroupSubtype::ForEachSignified,
                members: vec!["item_node".to_string()],
                max_loops: Some(2),
                rect: rect(),
                groups: vec![],
                from_for_each: false,
                original_object: None,
            }],
        };

        let expanded = expand_for_each(draft);
        let out_edges: Vec<_> = expanded.edges.iter().filter(|e| e.id.starts_with("out_e")).collect();
        assert_eq!(out_edges.len(), 2);
        assert!(out_edges.iter().any(|e| e.source == "item_node-0" && e.target == "sink" && e.version_index == Some(0)));
        assert!(out_edges.iter().any(|e| e.source == "item_node-1" && e.target == "sink" && e.version_index == Some(1)));
    }
}
