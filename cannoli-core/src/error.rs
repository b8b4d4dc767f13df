//! Engine-level error types.
//!
//! `CannoliError` covers fatal, upstream-uncaught execution-time failures.
//! Compile-time failures use the separate `CompilationError` type in
//! `factory::compile_error`, since a graph that fails compilation never
//! reaches the scheduler. Recoverable execution-time errors do not construct
//! this type at all — they become a `warning` status on the object instead
//! of an `Err`.

use thiserror::Error;

/// Fatal error raised while running a compiled graph.
#[derive(Debug, Error)]
pub enum CannoliError {
    /// An LLM provider call failed and the node has no recovery path.
    #[error("LLM call failed: {0}")]
    LlmFailed(String),

    /// An HTTP/action call failed with `catch=false` upstream routing disabled
    /// (used only when the caller asked the engine to surface it as fatal).
    #[error("HTTP call failed: {0}")]
    HttpFailed(String),

    /// A file-manager operation failed outright (not merely "not found",
    /// which is a warning).
    #[error("file operation failed: {0}")]
    FileManagerFailed(String),

    /// A sub-cannoli invocation could not be completed.
    #[error("sub-cannoli invocation failed: {0}")]
    SubCannoliFailed(String),

    /// A registered action could not be dispatched or coerced.
    #[error("action invocation failed: {0}")]
    ActionFailed(String),

    /// The run was cancelled via `stop()` while an object was executing.
    #[error("run stopped")]
    Stopped,

    /// Internal invariant violated (a bug in the engine itself, not user
    /// input — a verified graph should never trigger this).
    #[error("internal engine error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display format of LlmFailed contains the message.
    #[test]
    fn cannoli_error_display_llm_failed() {
        let err = CannoliError::LlmFailed("timeout".to_string());
        let s = err.to_string();
        assert!(s.contains("LLM call failed"));
        assert!(s.contains("timeout"));
    }

    /// **Scenario**: Stopped has a fixed display with no interpolated data.
    #[test]
    fn cannoli_error_display_stopped() {
        let err = CannoliError::Stopped;
        assert_eq!(err.to_string(), "run stopped");
    }

    /// **Scenario**: Debug format includes the variant name.
    #[test]
    fn cannoli_error_debug_format() {
        let err = CannoliError::Internal("bad state".to_string());
        let s = format!("{:?}", err);
        assert!(s.contains("Internal"));
        assert!(s.contains("bad state"));
    }
}
