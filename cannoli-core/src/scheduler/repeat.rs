//! Repeat-group loop control: once a repeat group's body completes, the
//! scheduler either resets the group (and every member) back to `Pending`
//! for another iteration, or lets the group settle at `Complete` once its
//! loop budget is exhausted.

use std::time::Duration;

use crate::object::{CannoliGraph, GroupObject, Status};

/// Pause between repeat-loop iterations so a live model provider isn't
/// hammered back-to-back and a host UI has a chance to render the
/// intermediate state. Skipped entirely against a mock provider, where
/// there is nothing to rate-limit and tests shouldn't pay the wall-clock
/// cost.
pub const ITERATION_PAUSE: Duration = Duration::from_millis(20);

/// What the scheduler should do with a repeat group whose body just
/// finished one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepeatOutcome {
    /// More iterations remain: reset the group and its members to
    /// `Pending` and re-enqueue them.
    Continue { next_loop: u32 },
    /// The loop budget is exhausted; the group settles at `Complete`.
    Done,
}

/// Advances a repeat group's loop counter and decides whether to continue.
/// Call only once the group's body is known complete
/// (`readiness::group_body_complete`). Counts the just-finished iteration
/// before deciding, so a `"3"` label runs the body exactly three times: the
/// budget is against iterations completed, not iterations started.
pub fn advance(group: &GroupObject) -> RepeatOutcome {
    let next_loop = group.increment_loop();
    if group.has_more_loops() {
        RepeatOutcome::Continue { next_loop }
    } else {
        RepeatOutcome::Done
    }
}

/// Resets a group and every one of its members back to `Pending` for
/// another iteration. Node buffers are left in place — a node's own
/// behavior overwrites them on its next run — only status moves.
pub fn reset_for_next_iteration(graph: &CannoliGraph, group_id: &str) {
    let Some(group) = graph.groups.get(group_id) else { return };
    group.base.set_status(Status::Pending);
    for member in &group.members {
        if let Some(node) = graph.nodes.get(member) {
            node.base.set_status(Status::Pending);
        }
        if let Some(nested) = graph.groups.get(member) {
            nested.base.set_status(Status::Pending);
        }
    }
}

/// Whether the scheduler should pause `ITERATION_PAUSE` between iterations.
/// A mock-backed run skips the pause so tests run at full speed.
pub fn should_pause(is_mock: bool) -> bool {
    !is_mock
}
