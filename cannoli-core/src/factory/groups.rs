//! Factory Step D: geometric group membership. Containment is computed once
//! from canvas geometry and never revisited at run time.

use std::collections::HashMap;

use crate::canvas::{CanvasData, CanvasNode, CanvasNodeKind};

use super::validate::{Diagnostic, DiagnosticKind};

/// Enclosing-group chains (immediate parent first) and each group's
/// immediate children, derived purely from rectangle containment.
pub struct Containment {
    pub enclosing: HashMap<String, Vec<String>>,
    pub members: HashMap<String, Vec<String>>,
}

fn ordered_enclosing(item: &CanvasNode, groups: &[&CanvasNode]) -> Vec<String> {
    let rect = item.rect();
    let mut encl: Vec<(&str, f64)> = groups
        .iter()
        .filter(|g| g.id != item.id && g.rect().strictly_encloses(&rect))
        .map(|g| (g.id.as_str(), g.rect().area()))
        .collect();
    encl.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
    encl.into_iter().map(|(id, _)| id.to_string()).collect()
}

/// Computes, for every node (group nodes included), its ordered chain of
/// enclosing groups, and each group's immediate (non-transitive) children.
pub fn compute_containment(canvas: &CanvasData) -> Containment {
    let groups: Vec<&CanvasNode> = canvas.nodes.iter().filter(|n| n.kind == CanvasNodeKind::Group).collect();

    let mut enclosing = HashMap::new();
    for item in &canvas.nodes {
        enclosing.insert(item.id.clone(), ordered_enclosing(item, &groups));
    }

    let mut members: HashMap<String, Vec<String>> = HashMap::new();
    for (item_id, chain) in &enclosing {
        if let Some(immediate) = chain.first() {
            members.entry(immediate.clone()).or_default().push(item_id.clone());
        }
    }
    Containment { enclosing, members }
}

/// Flags rectangle pairs that overlap without one strictly enclosing the
/// other.
pub fn detect_overlaps(canvas: &CanvasData) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (i, a) in canvas.nodes.iter().enumerate() {
        for b in canvas.nodes.iter().skip(i + 1) {
            if a.rect().overlaps_without_enclosure(&b.rect()) {
                diagnostics.push(Diagnostic {
                    object_id: a.id.clone(),
                    kind: DiagnosticKind::OverlapWithoutEnclosure { other: b.id.clone() },
                });
            }
        }
    }
    diagnostics
}
