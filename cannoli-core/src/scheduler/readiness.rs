//! Readiness and rejection-propagation rules for the central scheduler: when
//! an object's dependency set is satisfied enough to execute, and when it
//! should instead short-circuit straight to `Rejected` without executing at
//! all.

use crate::object::CannoliGraph;
use crate::object::Status;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// At least one dependency hasn't reached a terminal status yet.
    NotReady,
    /// Every dependency is terminal and satisfied; the object may execute.
    Ready,
    /// Every dependency is terminal, but within at least one same-label
    /// redundancy group every member rejected — the object should be
    /// rejected in turn without ever executing.
    Rejected,
}

/// Groups `id`'s dependencies by edge label (non-edge dependencies, and
/// edges with no label, are each their own singleton group) and asks
/// whether the object is ready, rejected, or still waiting.
///
/// A label grouping models value-edge redundancy: several edges carrying
/// the same label into an object are alternatives, so one rejected sibling
/// doesn't doom the object as long as another sibling in the same group
/// completed. An object is rejected outright only when every dependency in
/// some group rejected.
pub fn evaluate(graph: &CannoliGraph, id: &str) -> Readiness {
    let deps = graph.dependencies_of(id);
    if deps.is_empty() {
        return Readiness::Ready;
    }

    let mut groups: std::collections::HashMap<Option<&str>, Vec<Status>> = std::collections::HashMap::new();
    for dep in deps {
        let Some(status) = graph.status_of(dep) else { continue };
        let label = graph.edge_label(dep);
        groups.entry(label).or_default().push(status);
    }

    let mut saw_not_ready = false;
    for statuses in groups.values() {
        if statuses.iter().any(|s| !s.is_terminal()) {
            saw_not_ready = true;
            continue;
        }
        if statuses.iter().all(|s| s.is_rejected()) {
            return Readiness::Rejected;
        }
    }

    if saw_not_ready {
        Readiness::NotReady
    } else {
        Readiness::Ready
    }
}

/// A group's body is complete only once every member is terminal, in
/// addition to the group object's own (edge-derived) dependencies — members
/// aren't recorded in `dependencies` itself, since that set is computed
/// purely from incoming edges.
pub fn group_body_complete(graph: &CannoliGraph, group_id: &str) -> bool {
    let Some(group) = graph.groups.get(group_id) else { return false };
    group.members.iter().all(|member| graph.status_of(member).map(|s| s.is_terminal()).unwrap_or(true))
}
