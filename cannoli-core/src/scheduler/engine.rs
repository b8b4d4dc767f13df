//! The central scheduler loop: each tick, scan every non-terminal object
//! for readiness, execute everything that's ready (concurrently), propagate
//! freshly completed nodes onto their outgoing edges, and drive repeat
//! groups through another iteration or to completion. Ticks until the
//! graph is all-terminal, the run is stopped, or no object can make
//! progress.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;

use crate::context::RunContext;
use crate::error::CannoliError;
use crate::logging;
use crate::object::Status;
use crate::ports::PersistEvent;

use super::readiness::{self, Readiness};
use super::repeat;

/// How the run ended.
#[derive(Debug)]
pub enum StoppageReason {
    /// Every object reached a terminal status.
    Completed,
    /// `StopHandle::stop` was called before the graph finished.
    Stopped,
    /// No object could make progress and the graph wasn't all-terminal —
    /// an engine bug, since a compiled graph is expected to always drain.
    Stalled,
    /// A node behavior raised a fatal `CannoliError`.
    Error(CannoliError),
}

pub struct Stoppage {
    pub reason: StoppageReason,
}

/// Shared flag a `StopHandle` sets to ask a running engine to stop at the
/// next tick boundary.
#[derive(Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

async fn persist(ctx: &RunContext, id: &str) {
    let Some(status) = ctx.graph.status_of(id) else { return };
    let type_name = ctx
        .graph
        .nodes
        .get(id)
        .map(|n| n.base.type_name.clone())
        .or_else(|| ctx.graph.edges.get(id).map(|e| e.base.type_name.clone()))
        .or_else(|| ctx.graph.groups.get(id).map(|g| g.base.type_name.clone()))
        .unwrap_or_default();
    let content = ctx.graph.nodes.get(id).and_then(|n| n.buffer.lock().expect("node buffer lock poisoned").content.clone());
    logging::log_dependency_event(id, &format!("{status:?}"));
    ctx.ports.persistor.record(PersistEvent { object_id: id.to_string(), type_name, status, content }).await;
}

async fn run_ready_node(node_id: String, ctx: RunContext) {
    let Some(node) = ctx.graph.nodes.get(&node_id) else { return };
    logging::log_node_start(&node_id);
    crate::behaviors::execute(node, &ctx).await;
    logging::log_node_complete(&node_id, &format!("{:?}", node.base.status()));
    persist(&ctx, &node_id).await;

    for edge in ctx.graph.edges.values().filter(|e| e.source == node_id) {
        crate::edge_behaviors::propagate(edge, node, &ctx);
        persist(&ctx, edge.id()).await;
    }
}

fn classify(ctx: &RunContext, id: &str) -> Option<Readiness> {
    let status = ctx.graph.status_of(id)?;
    if status.is_terminal() {
        return None;
    }
    Some(readiness::evaluate(&ctx.graph, id))
}

/// Runs `ctx.graph` to completion. This is the engine's one entry point;
/// `scheduler::run`/`run_with_control` are thin wrappers that add the
/// public `Stoppage`/`StopHandle` surface.
pub async fn drive(ctx: RunContext, stop: StopFlag) -> Stoppage {
    logging::log_run_start(ctx.graph.all_ids().len());
    loop {
        if stop.is_stopped() {
            logging::log_run_complete("stopped");
            return Stoppage { reason: StoppageReason::Stopped };
        }
        if ctx.graph.is_all_terminal() {
            logging::log_run_complete("completed");
            return Stoppage { reason: StoppageReason::Completed };
        }

        let all_ids = ctx.graph.all_ids();
        let mut ready_nodes = Vec::new();
        let mut ready_edges = Vec::new();
        let mut ready_groups = Vec::new();
        let mut rejected = Vec::new();

        for id in &all_ids {
            match classify(&ctx, id) {
                Some(Readiness::Ready) => {
                    if ctx.graph.nodes.contains_key(id) {
                        ready_nodes.push(id.clone());
                    } else if ctx.graph.edges.contains_key(id) {
                        ready_edges.push(id.clone());
                    } else if ctx.graph.groups.contains_key(id) {
                        ready_groups.push(id.clone());
                    }
                }
                Some(Readiness::Rejected) => rejected.push(id.clone()),
                Some(Readiness::NotReady) | None => {}
            }
        }

        for id in &rejected {
            if let Some(obj_status) = ctx.graph.status_of(id) {
                if obj_status == Status::Pending {
                    if let Some(node) = ctx.graph.nodes.get(id) {
                        node.base.set_status(Status::Executing);
                        node.base.set_status(Status::Rejected);
                    } else if let Some(edge) = ctx.graph.edges.get(id) {
                        edge.base.set_status(Status::Executing);
                        edge.base.set_status(Status::Rejected);
                    } else if let Some(group) = ctx.graph.groups.get(id) {
                        group.base.set_status(Status::Executing);
                        group.base.set_status(Status::Rejected);
                    }
                    persist(&ctx, id).await;
                }
            }
        }

        for id in &ready_groups {
            if let Some(group) = ctx.graph.groups.get(id) {
                if group.base.status() == Status::Pending {
                    group.base.set_status(Status::Executing);
                    persist(&ctx, id).await;
                }
            }
        }

        for id in &ready_edges {
            if let Some(edge) = ctx.graph.edges.get(id) {
                if let Some(source) = ctx.graph.nodes.get(&edge.source) {
                    crate::edge_behaviors::propagate(edge, source, &ctx);
                    persist(&ctx, id).await;
                }
            }
        }

        let mut made_progress = !ready_edges.is_empty() || !rejected.is_empty() || !ready_groups.is_empty();

        if !ready_nodes.is_empty() {
            made_progress = true;
            let tasks = ready_nodes.iter().map(|id| run_ready_node(id.clone(), ctx.clone()));
            join_all(tasks).await;
        }

        for group in ctx.graph.groups.values() {
            if group.base.status() != Status::Executing {
                continue;
            }
            if !readiness::group_body_complete(&ctx.graph, group.id()) {
                continue;
            }
            made_progress = true;
            match repeat::advance(group) {
                repeat::RepeatOutcome::Continue { .. } => {
                    if repeat::should_pause(ctx.is_mock) {
                        tokio::time::sleep(repeat::ITERATION_PAUSE).await;
                    }
                    repeat::reset_for_next_iteration(&ctx.graph, group.id());
                }
                repeat::RepeatOutcome::Done => {
                    group.base.set_status(Status::Complete);
                }
            }
            persist(&ctx, group.id()).await;
        }

        if !made_progress {
            logging::log_run_error("no object made progress but the graph is not all-terminal");
            return Stoppage { reason: StoppageReason::Stalled };
        }
    }
}
