//! Structured logging for the compiler and scheduler.
//!
//! A small set of free functions, each gated by the `tracing` cargo feature
//! and falling back to `eprintln!` when it's off, so the engine never
//! requires a subscriber to be installed to produce useful run output.

pub fn log_run_start(graph_object_count: usize) {
    #[cfg(feature = "tracing")]
    tracing::info!(objects = graph_object_count, "run starting");
    #[cfg(not(feature = "tracing"))]
    eprintln!("[run] starting with {} objects", graph_object_count);
}

pub fn log_run_complete(reason: &str) {
    #[cfg(feature = "tracing")]
    tracing::info!(reason, "run complete");
    #[cfg(not(feature = "tracing"))]
    eprintln!("[run] complete reason={}", reason);
}

pub fn log_run_error(message: &str) {
    #[cfg(feature = "tracing")]
    tracing::error!(message, "run failed");
    #[cfg(not(feature = "tracing"))]
    eprintln!("[run] error: {}", message);
}

pub fn log_node_start(id: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(id, "node executing");
    #[cfg(not(feature = "tracing"))]
    eprintln!("[node] executing id={}", id);
}

pub fn log_node_complete(id: &str, status: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(id, status, "node settled");
    #[cfg(not(feature = "tracing"))]
    eprintln!("[node] settled id={} status={}", id, status);
}

pub fn log_dependency_event(id: &str, status: &str) {
    #[cfg(feature = "tracing")]
    tracing::trace!(id, status, "status transition");
    #[cfg(not(feature = "tracing"))]
    eprintln!("[update] id={} status={}", id, status);
}

pub fn log_compile_warning(id: &str, message: &str) {
    #[cfg(feature = "tracing")]
    tracing::warn!(id, message, "compile-time validation");
    #[cfg(not(feature = "tracing"))]
    eprintln!("[compile] warn id={}: {}", id, message);
}
