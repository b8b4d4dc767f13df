//! The file-manager interface: note read/write/create and editor-selection
//! access for `reference` content nodes and `{{NOTE}}`/`{{SELECTION}}`
//! variable resolution.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::CannoliError;

#[async_trait]
pub trait FileManager: Send + Sync {
    /// Reads a note's content by name. `Ok(None)` means the note does not
    /// exist, which a reference behavior turns into a warning rather than
    /// a fatal error.
    async fn read_note(&self, name: &str) -> Result<Option<String>, CannoliError>;

    /// Creates a note, optionally under `folder`. Overwrites if one already
    /// exists at that path.
    async fn create_note(&self, name: &str, folder: Option<&str>, content: &str) -> Result<(), CannoliError>;

    /// Writes the content of an existing note; a missing note is created.
    /// Appends to any existing content when `append` is true, otherwise
    /// replaces it outright.
    async fn edit_note(&self, name: &str, content: &str, append: bool) -> Result<(), CannoliError>;

    /// The host editor's current text selection, if any.
    async fn get_selection(&self) -> Result<Option<String>, CannoliError>;

    /// Replaces the host editor's current selection.
    async fn edit_selection(&self, content: &str) -> Result<(), CannoliError>;
}

/// In-memory `FileManager` for tests and headless runs: notes live in a
/// `Mutex<HashMap>`, the selection in a `Mutex<Option<String>>`.
pub struct MockFileManager {
    notes: Mutex<HashMap<String, String>>,
    selection: Mutex<Option<String>>,
    edit_note_calls: Mutex<Vec<(String, String, bool)>>,
}

impl MockFileManager {
    pub fn new() -> Self {
        Self {
            notes: Mutex::new(HashMap::new()),
            selection: Mutex::new(None),
            edit_note_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_note(self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.notes.lock().expect("mock file manager lock poisoned").insert(name.into(), content.into());
        self
    }

    pub fn with_selection(self, content: impl Into<String>) -> Self {
        *self.selection.lock().expect("mock file manager lock poisoned") = Some(content.into());
        self
    }

    /// Every `(name, content, append)` triple passed to `edit_note`, in call order.
    pub fn edit_note_calls(&self) -> Vec<(String, String, bool)> {
        self.edit_note_calls.lock().expect("mock file manager lock poisoned").clone()
    }
}

impl Default for MockFileManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileManager for MockFileManager {
    async fn read_note(&self, name: &str) -> Result<Option<String>, CannoliError> {
        Ok(self.notes.lock().expect("mock file manager lock poisoned").get(name).cloned())
    }

    async fn create_note(&self, name: &str, _folder: Option<&str>, content: &str) -> Result<(), CannoliError> {
        self.notes
            .lock()
            .expect("mock file manager lock poisoned")
            .insert(name.to_string(), content.to_string());
        Ok(())
    }

    async fn edit_note(&self, name: &str, content: &str, append: bool) -> Result<(), CannoliError> {
        self.edit_note_calls
            .lock()
            .expect("mock file manager lock poisoned")
            .push((name.to_string(), content.to_string(), append));

        let mut notes = self.notes.lock().expect("mock file manager lock poisoned");
        if append {
            let entry = notes.entry(name.to_string()).or_default();
            entry.push_str(content);
        } else {
            notes.insert(name.to_string(), content.to_string());
        }
        Ok(())
    }

    async fn get_selection(&self) -> Result<Option<String>, CannoliError> {
        Ok(self.selection.lock().expect("mock file manager lock poisoned").clone())
    }

    async fn edit_selection(&self, content: &str) -> Result<(), CannoliError> {
        *self.selection.lock().expect("mock file manager lock poisoned") = Some(content.to_string());
        Ok(())
    }
}
