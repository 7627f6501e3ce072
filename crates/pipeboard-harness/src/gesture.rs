#![forbid(unsafe_code)]

//! Pointer-sensor events as plain data, for recording and replay.

use pipeboard_core::ItemId;

/// One drag-sensor callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureEvent {
    Start { item: ItemId },
    Hover { over: Option<String> },
    End { over: Option<String> },
}

impl GestureEvent {
    pub fn start(item: impl Into<ItemId>) -> Self {
        Self::Start { item: item.into() }
    }

    pub fn hover(over: Option<&str>) -> Self {
        Self::Hover {
            over: over.map(str::to_owned),
        }
    }

    pub fn end(over: Option<&str>) -> Self {
        Self::End {
            over: over.map(str::to_owned),
        }
    }

    /// Short name used in logs and reports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Hover { .. } => "hover",
            Self::End { .. } => "end",
        }
    }
}

/// A gesture event with its offset from the start of the recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedGesture {
    pub at_ms: u64,
    pub event: GestureEvent,
}

impl TimedGesture {
    #[must_use]
    pub fn new(at_ms: u64, event: GestureEvent) -> Self {
        Self { at_ms, event }
    }
}
