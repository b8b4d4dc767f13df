//! Factory Step E: crossing-in/crossing-out group computation and reflexive
//! edge detection, built on the containment chains from Step D.

use std::collections::HashSet;

use super::groups::Containment;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EdgeCrossing {
    pub crossing_out_groups: Vec<String>,
    pub crossing_in_groups: Vec<String>,
    pub is_reflexive: bool,
}

/// An edge is reflexive when one endpoint is a group that encloses the
/// other endpoint; such an edge does not cross any boundary, it reaches
/// directly into (or out of) its own group.
pub fn compute_edge_crossing(
    source: &str,
    target: &str,
    containment: &Containment,
    group_ids: &HashSet<String>,
) -> EdgeCrossing {
    let empty: Vec<String> = Vec::new();
    let source_chain = containment.enclosing.get(source).unwrap_or(&empty);
    let target_chain = containment.enclosing.get(target).unwrap_or(&empty);

    let is_reflexive = (group_ids.contains(source) && target_chain.iter().any(|g| g == source))
        || (group_ids.contains(target) && source_chain.iter().any(|g| g == target));

    if is_reflexive {
        return EdgeCrossing { is_reflexive: true, ..Default::default() };
    }

    let crossing_out_groups = source_chain.iter().filter(|g| !target_chain.contains(g)).cloned().collect();
    let crossing_in_groups = target_chain.iter().filter(|g| !source_chain.contains(g)).cloned().collect();

    EdgeCrossing { crossing_out_groups, crossing_in_groups, is_reflexive: false }
}
