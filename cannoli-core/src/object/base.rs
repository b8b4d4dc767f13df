//! Shared base attributes carried by every entity in the tagged union:
//! `{id, text, status, dependencies, kind, type, original_object}`.

use std::sync::Mutex;

use super::status::Status;

/// Which of the three entity kinds an object is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Node,
    Edge,
    Group,
}

/// Fields common to nodes, edges, and groups. Each concrete object type
/// (`NodeObject`, `EdgeObject`, `GroupObject`) embeds one `ObjectBase` and
/// adds its own subtype-specific fields; each object exclusively owns its
/// status, buffered content, and iteration counter.
pub struct ObjectBase {
    pub id: String,
    pub text: String,
    pub kind: ObjectKind,
    /// Human-readable subtype name (e.g. "standard", "chat", "repeat"), used
    /// for logging and for the persistor mirror-write.
    pub type_name: String,
    status: Mutex<Status>,
    /// The dependency set computed by the factory.
    pub dependencies: Vec<String>,
    /// Set on for-each-duplicated copies: the id of the pre-duplication
    /// original this object was copied from.
    pub original_object: Option<String>,
}

impl ObjectBase {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        kind: ObjectKind,
        type_name: impl Into<String>,
        dependencies: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
            type_name: type_name.into(),
            status: Mutex::new(Status::Pending),
            dependencies,
            original_object: None,
        }
    }

    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.original_object = Some(original.into());
        self
    }

    pub fn with_initial_status(self, status: Status) -> Self {
        *self.status.lock().expect("status lock poisoned") = status;
        self
    }

    pub fn status(&self) -> Status {
        *self.status.lock().expect("status lock poisoned")
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Moves to `to`, asserting the transition is legal per the lattice. A
    /// verified graph never violates this at run time, so a violation here
    /// is an engine bug, not user input.
    pub fn set_status(&self, to: Status) {
        let mut guard = self.status.lock().expect("status lock poisoned");
        debug_assert!(
            Status::can_transition(*guard, to),
            "illegal status transition {} -> {} on {}",
            *guard,
            to,
            self.id
        );
        *guard = to;
    }
}
