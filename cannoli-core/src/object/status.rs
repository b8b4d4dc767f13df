//! The status lattice.
//!
//! `Pending -> Executing -> {Complete, Rejected, Error, Warning}`. Transitions
//! are monotonic except `Pending -> Pending` (a repeat-group reset) and
//! `Complete -> Pending` (an explicit reset of a repeat body).
//! `VersionComplete` is not a resting status — it is an event a repeat group
//! emits alongside a `Pending` reset at the end of a loop iteration; see
//! `scheduler::repeat`.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Pending,
    Executing,
    Complete,
    Rejected,
    Error,
    Warning,
}

impl Status {
    /// Terminal statuses stop the scheduler from considering the object
    /// further this iteration; termination is detected when every object is
    /// terminal. `Warning` is terminal — it's a completed object carrying a
    /// textual fallback, not a retry state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Status::Complete | Status::Rejected | Status::Error | Status::Warning
        )
    }

    /// `Complete` or `Warning` both count as a satisfied dependency for
    /// downstream readiness: a warning still produced output.
    pub fn counts_as_complete(self) -> bool {
        matches!(self, Status::Complete | Status::Warning)
    }

    pub fn is_rejected(self) -> bool {
        matches!(self, Status::Rejected)
    }

    /// True if `from -> to` is a legal transition per the lattice, allowing
    /// the two documented exceptions.
    pub fn can_transition(from: Status, to: Status) -> bool {
        use Status::*;
        match (from, to) {
            (Pending, Pending) => true,
            (Complete, Pending) => true,
            (Pending, Executing) => true,
            (Executing, Complete | Rejected | Error | Warning) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Pending => "pending",
            Status::Executing => "executing",
            Status::Complete => "complete",
            Status::Rejected => "rejected",
            Status::Error => "error",
            Status::Warning => "warning",
        };
        write!(f, "{s}")
    }
}
