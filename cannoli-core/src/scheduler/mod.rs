//! The scheduler (C4): drives a hydrated `CannoliGraph` to completion. A
//! central worklist, not a per-object event bus — each tick rescans every
//! non-terminal object for readiness, executes whatever is ready, and
//! propagates freshly completed nodes onto their edges. A resumed run is
//! simply a graph some of whose objects are already terminal when `run` is
//! called; the scheduler only ever looks at non-terminal objects, so there
//! is no separate resume code path.

mod engine;
mod readiness;
mod repeat;

pub use engine::{Stoppage, StoppageReason};
pub use readiness::{evaluate as evaluate_readiness, group_body_complete, Readiness};

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::context::RunContext;
use crate::llm::LlmProvider;
use crate::object::CannoliGraph;
use crate::ports::Ports;

use engine::StopFlag;

/// Lets a caller holding the other end of a `run_with_control` call ask a
/// run to stop before the graph finishes.
#[derive(Clone)]
pub struct StopHandle {
    flag: StopFlag,
}

impl StopHandle {
    pub fn stop(&self) {
        self.flag.request_stop();
    }
}

/// Runs `graph` to completion, awaiting the whole thing in the caller's own
/// task. Use `run_with_control` instead when the caller needs to be able to
/// cancel a still-running graph.
pub async fn run(graph: Arc<CannoliGraph>, ports: Ports, llm: Arc<dyn LlmProvider>, is_mock: bool) -> Stoppage {
    let ctx = RunContext::new(graph, ports, llm, is_mock);
    engine::drive(ctx, StopFlag::new()).await
}

/// Spawns the run on its own task and returns immediately with a join
/// handle for the eventual `Stoppage` and a `StopHandle` the caller can use
/// to cancel it early.
pub fn run_with_control(
    graph: Arc<CannoliGraph>,
    ports: Ports,
    llm: Arc<dyn LlmProvider>,
    is_mock: bool,
) -> (JoinHandle<Stoppage>, StopHandle) {
    let flag = StopFlag::new();
    let handle_flag = flag.clone();
    let ctx = RunContext::new(graph, ports, llm, is_mock);
    let join = tokio::spawn(async move { engine::drive(ctx, flag).await });
    (join, StopHandle { flag: handle_flag })
}
