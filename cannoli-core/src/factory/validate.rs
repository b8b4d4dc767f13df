//! Validation rules: reported as an `error` status on the offending object,
//! not fatal to compilation as a whole. Collected as `Diagnostic`s during
//! compilation and applied to the hydrated objects by `factory::hydrate`.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Rectangular overlap between two vertices without one enclosing the other.
    OverlapWithoutEnclosure { other: String },
    /// A path leaves and re-enters the same group (deadlock).
    GroupReentry,
    /// A for-each group's item edges cross between parallel for-each groups,
    /// or it has != 1 incoming list/item edge.
    ForEachTopology(String),
    /// A choose node has no outgoing choice edge.
    ChooseWithoutChoiceEdge,
    /// A repeat group has an outgoing edge or an incoming list edge.
    RepeatGroupIllegalEdge,
    /// A non-group vertex has an incoming list edge.
    ListEdgeOnNonGroup,
    /// A named-output node sits inside a for-each group.
    NamedOutputInForEach,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub object_id: String,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn message(&self) -> String {
        match &self.kind {
            DiagnosticKind::OverlapWithoutEnclosure { other } => {
                format!("rectangle overlaps {other} without enclosure")
            }
            DiagnosticKind::GroupReentry => {
                "a dependency path leaves and re-enters the same group".to_string()
            }
            DiagnosticKind::ForEachTopology(detail) => format!("for-each topology error: {detail}"),
            DiagnosticKind::ChooseWithoutChoiceEdge => {
                "choose node has no outgoing choice edge".to_string()
            }
            DiagnosticKind::RepeatGroupIllegalEdge => {
                "repeat group has an outgoing edge or incoming list edge".to_string()
            }
            DiagnosticKind::ListEdgeOnNonGroup => {
                "incoming list edge on a non-group vertex".to_string()
            }
            DiagnosticKind::NamedOutputInForEach => {
                "named-output node inside a for-each group".to_string()
            }
        }
    }
}
