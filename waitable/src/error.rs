use thiserror::Error;

/// Returned by a wait that was cancelled before its predicate was satisfied.
///
/// Cancellation is local to that one wait. The cell, its value and any other pending waits are
/// unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("wait cancelled before its predicate was satisfied")]
pub struct Cancelled;
