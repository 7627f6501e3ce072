#![forbid(unsafe_code)]

//! Replay recorded gestures against a controller.
//!
//! Offsets are added to a caller-supplied origin instant, so replay is
//! instantaneous and deterministic: the cooldown sees the recorded timing,
//! not wall-clock time.

use std::collections::BTreeMap;
use std::time::Duration;

use pipeboard_core::{
    BoardStore, CommitNotice, ContainerId, DragSessionController, EndOutcome, Placeholder, Skip,
    StartOutcome,
};
use serde::Serialize;
use web_time::Instant;

use crate::gesture::{GestureEvent, TimedGesture};

/// What the controller did with one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Started {
        source: ContainerId,
    },
    Hovered {
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<Placeholder>,
    },
    Committed {
        notice: CommitNotice,
        message: String,
    },
    Skipped {
        kind: &'static str,
        reason: String,
    },
}

impl StepOutcome {
    fn skipped(skip: &Skip) -> Self {
        Self::Skipped {
            kind: skip.kind(),
            reason: skip.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayStep {
    pub idx: usize,
    pub t_ms: u64,
    pub gesture: &'static str,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Per-event results of a replay.
#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    pub steps: Vec<ReplayStep>,
}

/// Aggregate counts for a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub events: usize,
    pub commits: usize,
    pub skips: BTreeMap<&'static str, usize>,
}

impl ReplayReport {
    pub fn notices(&self) -> impl Iterator<Item = &CommitNotice> {
        self.steps.iter().filter_map(|step| match &step.outcome {
            StepOutcome::Committed { notice, .. } => Some(notice),
            _ => None,
        })
    }

    #[must_use]
    pub fn summary(&self) -> ReplaySummary {
        let mut skips = BTreeMap::new();
        let mut commits = 0;
        for step in &self.steps {
            match &step.outcome {
                StepOutcome::Committed { .. } => commits += 1,
                StepOutcome::Skipped { kind, .. } => *skips.entry(*kind).or_insert(0) += 1,
                _ => {}
            }
        }
        ReplaySummary {
            events: self.steps.len(),
            commits,
            skips,
        }
    }

    /// One JSON object per step.
    pub fn to_jsonl(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        for step in &self.steps {
            out.push_str(&serde_json::to_string(step)?);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Feed every gesture to `ctl` at `origin + at_ms`.
pub fn replay<S: BoardStore>(
    ctl: &mut DragSessionController<S>,
    gestures: &[TimedGesture],
    origin: Instant,
) -> ReplayReport {
    let steps = gestures
        .iter()
        .enumerate()
        .map(|(idx, gesture)| {
            let now = origin + Duration::from_millis(gesture.at_ms);
            let outcome = match &gesture.event {
                GestureEvent::Start { item } => match ctl.start(item.clone(), now) {
                    StartOutcome::Started { source } => StepOutcome::Started { source },
                    StartOutcome::Skipped(skip) => StepOutcome::skipped(&skip),
                },
                GestureEvent::Hover { over } => StepOutcome::Hovered {
                    placeholder: ctl.update_hover(over.as_deref()).cloned(),
                },
                GestureEvent::End { over } => match ctl.end(over.as_deref(), now) {
                    EndOutcome::Committed(notice) => StepOutcome::Committed {
                        message: notice.describe(),
                        notice,
                    },
                    EndOutcome::Skipped(skip) => StepOutcome::skipped(&skip),
                },
            };
            ReplayStep {
                idx,
                t_ms: gesture.at_ms,
                gesture: gesture.event.name(),
                outcome,
            }
        })
        .collect();
    ReplayReport { steps }
}
