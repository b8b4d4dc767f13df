//! Group objects.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::canvas::Rect;

use super::base::{ObjectBase, ObjectKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupSubtype {
    Basic,
    Repeat,
    /// Transient: only exists between compilation's grouping and for-each
    /// passes; consumed by for-each duplication and never present in a
    /// `VerifiedGraph`.
    ForEachSignified,
}

impl GroupSubtype {
    pub fn type_name(self) -> &'static str {
        match self {
            GroupSubtype::Basic => "basic",
            GroupSubtype::Repeat => "repeat",
            GroupSubtype::ForEachSignified => "for-each-signified",
        }
    }
}

pub struct GroupObject {
    pub base: ObjectBase,
    pub subtype: GroupSubtype,
    pub members: Vec<String>,
    /// Parsed from the label (`"N"` for repeat, `"k/N"` for a for-each group
    /// pre-expansion). `None` for a plain basic group.
    pub max_loops: Option<u32>,
    current_loop: AtomicU32,
    /// True for a basic group produced by for-each duplication.
    pub from_for_each: bool,
    pub rect: Rect,
    /// Group-level HTTP config overlay (§4.5 HTTP), parsed from a `config`
    /// block attached to the group. `None` for a group with no such block.
    pub config: Option<serde_json::Value>,
}

impl GroupObject {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        subtype: GroupSubtype,
        members: Vec<String>,
        max_loops: Option<u32>,
        from_for_each: bool,
        rect: Rect,
        dependencies: Vec<String>,
    ) -> Self {
        Self {
            base: ObjectBase::new(id, text, ObjectKind::Group, subtype.type_name(), dependencies),
            subtype,
            members,
            max_loops,
            current_loop: AtomicU32::new(if from_for_each { 0 } else { 0 }),
            from_for_each,
            rect,
            config: None,
        }
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }

    pub fn id(&self) -> &str {
        &self.base.id
    }

    pub fn current_loop(&self) -> u32 {
        self.current_loop.load(Ordering::SeqCst)
    }

    pub fn set_current_loop(&self, n: u32) {
        self.current_loop.store(n, Ordering::SeqCst);
    }

    pub fn increment_loop(&self) -> u32 {
        self.current_loop.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn has_more_loops(&self) -> bool {
        match self.max_loops {
            Some(max) => self.current_loop() < max,
            None => false,
        }
    }
}

/// Parses a repeat-group label: `"N"` for a repeat group, `"k/N"` for a
/// for-each-signified group whose expansion count is `N`.
pub fn parse_max_loops(label: &str) -> Option<u32> {
    let trimmed = label.trim();
    if let Some((_, n)) = trimmed.split_once('/') {
        return n.trim().parse::<u32>().ok();
    }
    trimmed.parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 }
    }

    /// **Scenario**: a plain "3" label parses as maxLoops=3 (repeat group).
    #[test]
    fn parse_max_loops_plain_number() {
        assert_eq!(parse_max_loops("3"), Some(3));
    }

    /// **Scenario**: a "k/N" label parses maxLoops as N (for-each-signified pre-expansion).
    #[test]
    fn parse_max_loops_k_over_n() {
        assert_eq!(parse_max_loops("1/5"), Some(5));
    }

    /// **Scenario**: a non-numeric label has no maxLoops.
    #[test]
    fn parse_max_loops_invalid_label() {
        assert_eq!(parse_max_loops("not a loop"), None);
    }

    /// **Scenario**: increment_loop advances the counter and has_more_loops reflects max_loops.
    #[test]
    fn increment_loop_and_has_more_loops() {
        let g = GroupObject::new("g1", "3", GroupSubtype::Repeat, vec![], Some(3), false, rect(), vec![]);
        assert!(g.has_more_loops());
        assert_eq!(g.increment_loop(), 1);
        assert_eq!(g.increment_loop(), 2);
        assert_eq!(g.increment_loop(), 3);
        assert!(!g.has_more_loops());
    }
}
