#![forbid(unsafe_code)]

//! Guard rules that turn re-entrant, rapid-fire, or self-targeting gesture
//! events into silent no-ops.
//!
//! # Rules
//!
//! 1. No `start` while a session is dragging.
//! 2. No `start` within the cooldown window after the previous session ended.
//! 3. No commit when the dropped id equals the active item id.
//!
//! The guard holds no state of its own: the only timestamp it consults lives
//! in [`SessionState::Idle`], and [`EventGuard::check_end`] closes the session
//! it is handed. Comparisons use the caller-supplied monotonic
//! instant, so a duplicate `end` or a pointer layer that replays `start`
//! immediately after `end` is absorbed without scheduled timers.

use std::fmt;

use web_time::{Duration, Instant};

use crate::model::ItemId;
use crate::session::{DragSession, SessionState};

/// Why a gesture event was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardReason {
    /// `start` arrived while another session is dragging.
    AlreadyDragging,
    /// `start` arrived before the cooldown window elapsed.
    CoolingDown { remaining: Duration },
    /// `end` arrived with no session in progress.
    NotDragging,
    /// The item was dropped onto itself.
    SelfDrop,
}

impl fmt::Display for GuardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyDragging => f.write_str("a drag session is already active"),
            Self::CoolingDown { remaining } => {
                write!(f, "cooling down for another {}ms", remaining.as_millis())
            }
            Self::NotDragging => f.write_str("no drag session is active"),
            Self::SelfDrop => f.write_str("item dropped onto itself"),
        }
    }
}

/// Admission checks for gesture transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventGuard {
    cooldown: Duration,
}

impl EventGuard {
    #[must_use]
    pub const fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Rules 1 and 2.
    ///
    /// A `now` earlier than the last end stamp counts as zero elapsed time and
    /// is therefore still cooling down.
    pub fn check_start(&self, state: &SessionState, now: Instant) -> Result<(), GuardReason> {
        match state {
            SessionState::Dragging(_) => Err(GuardReason::AlreadyDragging),
            SessionState::Idle {
                last_ended_at: Some(ended),
            } => {
                let elapsed = now.saturating_duration_since(*ended);
                if elapsed < self.cooldown {
                    Err(GuardReason::CoolingDown {
                        remaining: self.cooldown - elapsed,
                    })
                } else {
                    Ok(())
                }
            }
            SessionState::Idle {
                last_ended_at: None,
            } => Ok(()),
        }
    }

    /// `end` is only meaningful while dragging.
    ///
    /// On success the session is taken out of `state`, which becomes idle
    /// with `now` as its end stamp. An idle state is left untouched.
    pub fn check_end(
        &self,
        state: &mut SessionState,
        now: Instant,
    ) -> Result<DragSession, GuardReason> {
        state.finish(now).ok_or(GuardReason::NotDragging)
    }

    /// Rule 3.
    pub fn check_drop(&self, active: &ItemId, over: Option<&str>) -> Result<(), GuardReason> {
        match over {
            Some(over) if active.as_str() == over => Err(GuardReason::SelfDrop),
            _ => Ok(()),
        }
    }
}
