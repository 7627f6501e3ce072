#![forbid(unsafe_code)]

//! Transient drag session state.
//!
//! ```text
//!            start (admitted)
//!   Idle ─────────────────────▶ Dragging ◀─┐
//!    ▲                            │    │    │ update_hover
//!    │         end (any result)   │    └────┘
//!    └────────────────────────────┘
//! ```
//!
//! `Idle` carries the instant the previous gesture ended so the cooldown
//! check needs no timers. There is no cancelled state: an `end` with nothing
//! to commit simply returns to `Idle`.

use web_time::Instant;

use crate::model::{ContainerId, ItemId};
use crate::placeholder::Placeholder;

/// Coarse phase of the controller, for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Dragging,
}

/// The in-progress gesture. Exists only while [`Phase::Dragging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    active_item: ItemId,
    source_container: ContainerId,
    current_over: Option<String>,
    placeholder: Option<Placeholder>,
    started_at: Instant,
}

impl DragSession {
    pub(crate) fn new(active_item: ItemId, source_container: ContainerId, now: Instant) -> Self {
        Self {
            active_item,
            source_container,
            current_over: None,
            placeholder: None,
            started_at: now,
        }
    }

    /// The item being dragged.
    #[must_use]
    pub fn active_item(&self) -> &ItemId {
        &self.active_item
    }

    /// Container that owned the item when the gesture started.
    #[must_use]
    pub fn source_container(&self) -> &ContainerId {
        &self.source_container
    }

    /// Id most recently reported by `update_hover`, if any.
    #[must_use]
    pub fn current_over(&self) -> Option<&str> {
        self.current_over.as_deref()
    }

    /// Live insertion preview.
    #[must_use]
    pub fn placeholder(&self) -> Option<&Placeholder> {
        self.placeholder.as_ref()
    }

    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub(crate) fn clear_placeholder(&mut self) {
        self.placeholder = None;
    }

    pub(crate) fn set_hover(&mut self, over: Option<&str>, placeholder: Option<Placeholder>) {
        self.current_over = over.map(str::to_owned);
        self.placeholder = placeholder;
    }
}

/// Controller state: idle (with cooldown stamp) or dragging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle { last_ended_at: Option<Instant> },
    Dragging(DragSession),
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle {
            last_ended_at: None,
        }
    }
}

impl SessionState {
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Idle { .. } => Phase::Idle,
            Self::Dragging(_) => Phase::Dragging,
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        match self {
            Self::Dragging(session) => Some(session),
            Self::Idle { .. } => None,
        }
    }

    pub(crate) fn session_mut(&mut self) -> Option<&mut DragSession> {
        match self {
            Self::Dragging(session) => Some(session),
            Self::Idle { .. } => None,
        }
    }

    /// When the last gesture ended. `None` while dragging or before the first
    /// gesture.
    #[must_use]
    pub fn last_ended_at(&self) -> Option<Instant> {
        match self {
            Self::Idle { last_ended_at } => *last_ended_at,
            Self::Dragging(_) => None,
        }
    }

    /// Close the current session, stamping `now` as the end instant.
    ///
    /// Returns `None` (and leaves the state untouched) when idle.
    pub(crate) fn finish(&mut self, now: Instant) -> Option<DragSession> {
        if matches!(self, Self::Idle { .. }) {
            return None;
        }
        match std::mem::replace(
            self,
            Self::Idle {
                last_ended_at: Some(now),
            },
        ) {
            Self::Dragging(session) => Some(session),
            Self::Idle { .. } => None,
        }
    }
}
