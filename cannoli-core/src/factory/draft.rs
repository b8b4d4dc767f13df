//! The factory's intermediate representation: canvas objects after Steps
//! A-D have assigned them a subtype, enclosing groups, and (for edges)
//! crossing information, but before Step F has expanded for-each groups and
//! Step G has computed final dependency sets. `factory::factory` builds a
//! `Draft` from a `CanvasData` and folds Steps E-G over it before freezing
//! the result into a `VerifiedGraph`.

use crate::canvas::Rect;
use crate::object::{EdgeModifier, EdgeSubtype, GroupSubtype, NodeSubtype};
use crate::reference::Reference;

#[derive(Clone, Debug)]
pub struct DraftNode {
    pub id: String,
    pub text: String,
    pub subtype: NodeSubtype,
    pub name: Option<String>,
    pub references: Vec<Reference>,
    pub rect: Rect,
    /// Enclosing groups, immediate-parent-first.
    pub groups: Vec<String>,
    /// Set during Step F on a for-each duplicate to the pre-duplication id.
    pub original_object: Option<String>,
}

#[derive(Clone, Debug)]
pub struct DraftEdge {
    pub id: String,
    pub subtype: EdgeSubtype,
    pub source: String,
    pub target: String,
    pub modifier: Option<EdgeModifier>,
    pub label: Option<String>,
    pub add_messages: bool,
    pub crossing_out_groups: Vec<String>,
    pub crossing_in_groups: Vec<String>,
    pub is_reflexive: bool,
    /// Stamped during Step F on edges leaving a for-each-duplicated group.
    pub version_index: Option<usize>,
    /// Set during Step F on a for-each duplicate to the pre-duplication id.
    pub original_object: Option<String>,
}

#[derive(Clone, Debug)]
pub struct DraftGroup {
    pub id: String,
    pub text: String,
    pub subtype: GroupSubtype,
    pub members: Vec<String>,
    pub max_loops: Option<u32>,
    pub rect: Rect,
    pub groups: Vec<String>,
    /// True for a basic group produced by for-each duplication (Step F).
    pub from_for_each: bool,
    /// Set during Step F on a for-each duplicate to the pre-duplication id.
    pub original_object: Option<String>,
}

/// The full compiled-but-not-yet-dependency-resolved graph, after Steps
/// A-E (classification, containment, crossing) but before Step F
/// (for-each expansion) and Step G (dependency sets).
#[derive(Clone, Debug, Default)]
pub struct Draft {
    pub nodes: Vec<DraftNode>,
    pub edges: Vec<DraftEdge>,
    pub groups: Vec<DraftGroup>,
}
