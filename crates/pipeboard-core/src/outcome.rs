#![forbid(unsafe_code)]

//! Results of the gesture handlers.
//!
//! None of these are errors in the `Result` sense: a skipped transition is an
//! expected outcome of noisy pointer input and is absorbed by the controller.

use std::fmt;

use crate::commit::CommitNotice;
use crate::guard::GuardReason;
use crate::model::{ContainerId, ItemId};

/// A source or target container could not be found in the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// The item is not owned by any container.
    UnknownItem(ItemId),
    /// The gesture ended over nothing. Equivalent to a cancel.
    NoTarget,
    /// The drop id is neither a container nor an item on the board.
    UnknownTarget(String),
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownItem(item) => write!(f, "item {item} is not on the board"),
            Self::NoTarget => f.write_str("gesture ended without a drop target"),
            Self::UnknownTarget(over) => write!(f, "drop target {over} is not on the board"),
        }
    }
}

/// Why a transition produced no mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    Guarded(GuardReason),
    Unresolved(ResolutionFailure),
    /// The computed order equals the current order.
    Redundant,
}

impl Skip {
    /// Short machine-friendly label, used in logs and replay reports.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Guarded(_) => "guarded",
            Self::Unresolved(_) => "unresolved",
            Self::Redundant => "redundant",
        }
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guarded(reason) => write!(f, "guarded: {reason}"),
            Self::Unresolved(failure) => write!(f, "unresolved: {failure}"),
            Self::Redundant => f.write_str("redundant: order unchanged"),
        }
    }
}

impl From<GuardReason> for Skip {
    fn from(reason: GuardReason) -> Self {
        Self::Guarded(reason)
    }
}

impl From<ResolutionFailure> for Skip {
    fn from(failure: ResolutionFailure) -> Self {
        Self::Unresolved(failure)
    }
}

/// Result of [`DragSessionController::start`](crate::controller::DragSessionController::start).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started { source: ContainerId },
    Skipped(Skip),
}

impl StartOutcome {
    #[must_use]
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

/// Result of [`DragSessionController::end`](crate::controller::DragSessionController::end).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    /// Exactly one mutation intent was dispatched to the store.
    Committed(CommitNotice),
    Skipped(Skip),
}

impl EndOutcome {
    #[must_use]
    pub fn notice(&self) -> Option<&CommitNotice> {
        match self {
            Self::Committed(notice) => Some(notice),
            Self::Skipped(_) => None,
        }
    }

    #[must_use]
    pub fn skip(&self) -> Option<&Skip> {
        match self {
            Self::Committed(_) => None,
            Self::Skipped(skip) => Some(skip),
        }
    }
}
