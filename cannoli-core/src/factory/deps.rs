//! Factory Step G: dependency-set computation. A node or group depends on
//! its incoming edges, not directly on their sources — the edge itself must
//! reach a terminal status (carrying or withholding its payload) before a
//! dependent can be considered. An edge depends on nothing but its own
//! source object.
//!
//! Reflexive edges (group-to-member or member-to-group) are excluded from
//! both endpoints' dependency sets: a group's loop value is handed to its
//! members directly by the scheduler each iteration, not gated through the
//! ready-queue, so counting a reflexive edge as a dependency would make a
//! group depend on an edge that can only fire once the group itself starts
//! iterating.

pub struct EdgeDependencyInput<'a> {
    pub id: &'a str,
    pub target: &'a str,
    pub is_reflexive: bool,
}

/// An edge's own dependency set: just its source.
pub fn edge_dependencies(source_id: &str) -> Vec<String> {
    vec![source_id.to_string()]
}

/// A node or group's dependency set: every non-reflexive edge targeting it.
pub fn incoming_dependencies(self_id: &str, edges: &[EdgeDependencyInput]) -> Vec<String> {
    edges
        .iter()
        .filter(|e| e.target == self_id && !e.is_reflexive)
        .map(|e| e.id.to_string())
        .collect()
}
