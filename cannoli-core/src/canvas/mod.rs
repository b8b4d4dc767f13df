//! Canvas schema: the raw 2-D canvas that is the sole input to the factory.
//! This module owns no behavior — it is a direct JSON mapping of the format
//! the engine is handed, read once by the factory and never consulted again
//! at run time; geometry is used once, at compile time.
//!
//! The engine only reads geometry, color, node type, text/label, url/file,
//! and edge end markers; every other canvas key is preserved via `extra` so
//! round-tripping through a persistor does not lose authoring data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A rectangle in canvas space. Consulted only during compilation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// True if `self` strictly encloses `other`.
    pub fn strictly_encloses(&self, other: &Rect) -> bool {
        self.x < other.x
            && self.y < other.y
            && self.x + self.width > other.x + other.width
            && self.y + self.height > other.y + other.height
    }

    /// True if `self` and `other` overlap without either strictly enclosing
    /// the other — a compile-time validation error.
    pub fn overlaps_without_enclosure(&self, other: &Rect) -> bool {
        let intersects = self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y;
        intersects && !self.strictly_encloses(other) && !other.strictly_encloses(self)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Canvas color: a palette index `"1".."6"` or a literal hex string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CanvasColor {
    Indexed(u8),
    Hex(String),
}

impl CanvasColor {
    pub fn parse(raw: &str) -> Option<Self> {
        if let Ok(n) = raw.parse::<u8>() {
            if (1..=6).contains(&n) {
                return Some(CanvasColor::Indexed(n));
            }
        }
        if raw.starts_with('#') {
            return Some(CanvasColor::Hex(raw.to_string()));
        }
        None
    }
}

impl<'de> Deserialize<'de> for CanvasColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        CanvasColor::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid canvas color: {raw}")))
    }
}

impl Serialize for CanvasColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            CanvasColor::Indexed(n) => serializer.serialize_str(&n.to_string()),
            CanvasColor::Hex(h) => serializer.serialize_str(h),
        }
    }
}

/// Which side of a node rectangle an edge attaches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// Arrowhead marker at an edge endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndMarker {
    None,
    Arrow,
}

/// A raw canvas node before classification. `kind` discriminates the four
/// canvas node shapes; `text`/`url`/`file`/`label` are mutually exclusive per
/// `kind` but kept as plain fields since the factory reads them
/// unconditionally and canvas producers are not always strict about it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CanvasNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CanvasNodeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub color: Option<CanvasColor>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl CanvasNode {
    pub fn rect(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    /// The text the factory classifies on: node `text` for text nodes, the
    /// group `label` for group nodes.
    pub fn classification_text(&self) -> Option<&str> {
        match self.kind {
            CanvasNodeKind::Group => self.label.as_deref(),
            _ => self.text.as_deref(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasNodeKind {
    Text,
    File,
    Link,
    Group,
}

/// A raw canvas edge before classification.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CanvasEdge {
    pub id: String,
    #[serde(rename = "fromNode")]
    pub from_node: String,
    #[serde(rename = "fromSide", default)]
    pub from_side: Option<Side>,
    #[serde(rename = "toNode")]
    pub to_node: String,
    #[serde(rename = "toSide", default)]
    pub to_side: Option<Side>,
    #[serde(rename = "fromEnd", default)]
    pub from_end: Option<EndMarker>,
    #[serde(rename = "toEnd", default)]
    pub to_end: Option<EndMarker>,
    #[serde(default)]
    pub color: Option<CanvasColor>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// The full canvas document handed to the factory, plus the run-level
/// metadata (`settings`, `args`). Unknown top-level keys pass through via
/// `extra` rather than being rejected.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CanvasData {
    pub nodes: Vec<CanvasNode>,
    pub edges: Vec<CanvasEdge>,
    #[serde(default)]
    pub settings: Option<Value>,
    #[serde(default)]
    pub args: Option<HashMap<String, String>>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: a rectangle strictly enclosing another reports containment both ways correctly.
    #[test]
    fn rect_strictly_encloses_checks_all_four_sides() {
        let outer = Rect { x: 0.0, y: 0.0, width: 100.0, height: 100.0 };
        let inner = Rect { x: 10.0, y: 10.0, width: 10.0, height: 10.0 };
        assert!(outer.strictly_encloses(&inner));
        assert!(!inner.strictly_encloses(&outer));
    }

    /// **Scenario**: two rectangles sharing an edge (touching, not overlapping) do not enclose each other.
    #[test]
    fn rect_touching_edge_is_not_enclosure() {
        let a = Rect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        let b = Rect { x: 10.0, y: 0.0, width: 10.0, height: 10.0 };
        assert!(!a.strictly_encloses(&b));
        assert!(!a.overlaps_without_enclosure(&b));
    }

    /// **Scenario**: partial overlap with no enclosure is flagged for validation.
    #[test]
    fn rect_partial_overlap_without_enclosure_detected() {
        let a = Rect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        let b = Rect { x: 5.0, y: 5.0, width: 10.0, height: 10.0 };
        assert!(a.overlaps_without_enclosure(&b));
    }

    /// **Scenario**: color "3" parses to an indexed color; a hex string parses as Hex; garbage is rejected.
    #[test]
    fn canvas_color_parse_indexed_hex_and_invalid() {
        assert_eq!(CanvasColor::parse("3"), Some(CanvasColor::Indexed(3)));
        assert_eq!(
            CanvasColor::parse("#aabbcc"),
            Some(CanvasColor::Hex("#aabbcc".to_string()))
        );
        assert_eq!(CanvasColor::parse("7"), None);
        assert_eq!(CanvasColor::parse("not-a-color"), None);
    }

    /// **Scenario**: deserializing a minimal canvas JSON document round-trips node/edge counts.
    #[test]
    fn canvas_data_deserializes_minimal_document() {
        let json = serde_json::json!({
            "nodes": [
                {"id": "a", "type": "text", "x": 0, "y": 0, "width": 100, "height": 100, "text": "hello"}
            ],
            "edges": []
        });
        let canvas: CanvasData = serde_json::from_value(json).unwrap();
        assert_eq!(canvas.nodes.len(), 1);
        assert_eq!(canvas.nodes[0].text.as_deref(), Some("hello"));
    }

    /// **Scenario**: a group node classifies on its `label`, not `text`.
    #[test]
    fn group_node_classification_text_uses_label() {
        let node = CanvasNode {
            id: "g1".into(),
            kind: CanvasNodeKind::Group,
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            color: None,
            text: None,
            file: None,
            url: None,
            label: Some("3".into()),
            extra: HashMap::new(),
        };
        assert_eq!(node.classification_text(), Some("3"));
    }
}
