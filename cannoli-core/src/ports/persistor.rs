//! The persistor interface: a mirror-write sink the scheduler calls on
//! every status transition, so a host app can show live progress or resume
//! a run. Persistence failures never fail the run itself — a persistor is
//! best-effort observability, not a source of truth.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::object::Status;

/// One status transition, as reported to the persistor immediately after
/// it lands on the object.
#[derive(Clone, Debug)]
pub struct PersistEvent {
    pub object_id: String,
    pub type_name: String,
    pub status: Status,
    pub content: Option<String>,
}

#[async_trait]
pub trait Persistor: Send + Sync {
    async fn record(&self, event: PersistEvent);
}

/// Records every event in order, for tests that assert on run history.
pub struct MockPersistor {
    events: Mutex<Vec<PersistEvent>>,
}

impl MockPersistor {
    pub fn new() -> Self {
        Self { events: Mutex::new(Vec::new()) }
    }

    pub fn events(&self) -> Vec<PersistEvent> {
        self.events.lock().expect("mock persistor lock poisoned").clone()
    }
}

impl Default for MockPersistor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Persistor for MockPersistor {
    async fn record(&self, event: PersistEvent) {
        self.events.lock().expect("mock persistor lock poisoned").push(event);
    }
}
