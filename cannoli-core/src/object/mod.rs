//! Object model: in-memory entities hydrated from a `VerifiedGraph`.
//!
//! `CannoliGraph` is the run-owned, shared-read-only container: each
//! `NodeObject`/`EdgeObject`/`GroupObject` inside it exclusively owns its own
//! mutable status and buffers.

mod base;
mod edge;
mod group;
mod node;
mod status;

pub use base::{ObjectBase, ObjectKind};
pub use edge::{EdgeModifier, EdgeObject, EdgePayload, EdgeSubtype, EdgeVersion};
pub use group::{parse_max_loops, GroupObject, GroupSubtype};
pub use node::{is_reserved_name, CallKind, ContentKind, NodeBuffer, NodeObject, NodeSubtype, RESERVED_NAMES};
pub use status::Status;

use std::collections::HashMap;

/// The hydrated, run-owned graph: every node/edge/group object produced by
/// the factory, keyed by id.
pub struct CannoliGraph {
    pub nodes: HashMap<String, NodeObject>,
    pub edges: HashMap<String, EdgeObject>,
    pub groups: HashMap<String, GroupObject>,
}

impl CannoliGraph {
    pub fn new(
        nodes: HashMap<String, NodeObject>,
        edges: HashMap<String, EdgeObject>,
        groups: HashMap<String, GroupObject>,
    ) -> Self {
        Self { nodes, edges, groups }
    }

    pub fn all_ids(&self) -> Vec<String> {
        self.nodes
            .keys()
            .chain(self.edges.keys())
            .chain(self.groups.keys())
            .cloned()
            .collect()
    }

    pub fn status_of(&self, id: &str) -> Option<Status> {
        if let Some(n) = self.nodes.get(id) {
            return Some(n.base.status());
        }
        if let Some(e) = self.edges.get(id) {
            return Some(e.base.status());
        }
        if let Some(g) = self.groups.get(id) {
            return Some(g.base.status());
        }
        None
    }

    pub fn dependencies_of(&self, id: &str) -> &[String] {
        if let Some(n) = self.nodes.get(id) {
            return &n.base.dependencies;
        }
        if let Some(e) = self.edges.get(id) {
            return &e.base.dependencies;
        }
        if let Some(g) = self.groups.get(id) {
            return &g.base.dependencies;
        }
        &[]
    }

    /// Every object whose dependency set includes `id` — used to enqueue
    /// the dependents of a freshly transitioned object.
    pub fn dependents_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = String> + 'a {
        self.all_ids()
            .into_iter()
            .filter(move |other| self.dependencies_of(other).iter().any(|d| d == id))
    }

    pub fn is_all_terminal(&self) -> bool {
        self.nodes.values().all(|n| n.base.is_terminal())
            && self.edges.values().all(|e| e.base.is_terminal())
            && self.groups.values().all(|g| g.base.is_terminal())
    }

    /// The edge label that peer dependency-edges share for value-edge
    /// redundancy.
    pub fn edge_label(&self, id: &str) -> Option<&str> {
        self.edges.get(id).and_then(|e| e.label.as_deref())
    }
}
