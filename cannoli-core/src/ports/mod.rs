//! External interfaces: the narrow traits the engine calls out through for
//! everything that isn't pure graph execution — reading/writing files,
//! fetching URLs, persisting run state, and dispatching host-defined
//! actions. Every trait here has a `Mock*` implementation so the scheduler
//! can be exercised without a live filesystem, network, or host app.

mod actions;
mod fetcher;
mod file_manager;
mod persistor;

pub use actions::{Action, ArgCategory, ArgInfo, ArgType, Actions, MockActions};
pub use fetcher::{Fetcher, HttpFetcher, HttpRequest, HttpResponse, MockFetcher};
pub use file_manager::{FileManager, MockFileManager};
pub use persistor::{MockPersistor, Persistor};

use std::sync::Arc;

/// The bundle of external interfaces a run is wired against. Behaviors
/// borrow individual ports out of this rather than taking each trait object
/// as a separate constructor argument.
#[derive(Clone)]
pub struct Ports {
    pub file_manager: Arc<dyn FileManager>,
    pub fetcher: Arc<dyn Fetcher>,
    pub persistor: Arc<dyn Persistor>,
    pub actions: Arc<dyn Actions>,
}

impl Ports {
    pub fn mock() -> Self {
        Self {
            file_manager: Arc::new(MockFileManager::new()),
            fetcher: Arc::new(MockFetcher::new()),
            persistor: Arc::new(MockPersistor::new()),
            actions: Arc::new(MockActions::new()),
        }
    }
}
