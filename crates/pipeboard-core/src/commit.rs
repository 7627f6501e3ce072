#![forbid(unsafe_code)]

//! Commit resolution: a finished gesture becomes at most one mutation intent.
//!
//! # Invariants
//!
//! - A reorder intent is only produced when the spliced order differs from
//!   the current order; otherwise resolution yields [`Skip::Redundant`].
//! - [`CommitIntent::dispatch`] consumes the intent, so each intent reaches
//!   the store exactly once.
//! - Cross-container moves carry no index. The store re-derives membership
//!   from the item's container-defining field, which always appends.
//!
//! Dispatch is fire-and-forget. Whether the store durably applies the intent
//! is not observed, and nothing is rolled back on store failure.

use std::fmt;

use crate::model::{Container, ContainerId, ItemId};
use crate::outcome::{ResolutionFailure, Skip};
use crate::placeholder::Placeholder;
use crate::store::BoardStore;

/// Direction of an intra-container reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ReorderDirection {
    Up,
    Down,
}

impl ReorderDirection {
    /// Direction implied by moving from `from` to `to`; `None` when equal.
    #[must_use]
    pub fn between(from: usize, to: usize) -> Option<Self> {
        match to.cmp(&from) {
            std::cmp::Ordering::Less => Some(Self::Up),
            std::cmp::Ordering::Greater => Some(Self::Down),
            std::cmp::Ordering::Equal => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for ReorderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Remove the element at `from` and re-insert it at `to`.
///
/// `to` is the element's index in the result and is clamped to the last
/// slot. Returns a copy of `order` when `from` is out of range.
#[must_use]
pub fn splice<T: Clone>(order: &[T], from: usize, to: usize) -> Vec<T> {
    let mut next = order.to_vec();
    if from >= next.len() {
        return next;
    }
    let moved = next.remove(from);
    let to = to.min(next.len());
    next.insert(to, moved);
    next
}

/// The single mutation a gesture resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitIntent {
    Reorder {
        container: ContainerId,
        item: ItemId,
        from_index: usize,
        to_index: usize,
        new_order: Vec<ItemId>,
        direction: ReorderDirection,
    },
    Move {
        item: ItemId,
        from: ContainerId,
        to: ContainerId,
    },
}

impl CommitIntent {
    /// Hand the intent to the store and describe what was sent.
    pub fn dispatch<S: BoardStore + ?Sized>(self, store: &S) -> CommitNotice {
        match self {
            Self::Reorder {
                container,
                item,
                new_order,
                direction,
                ..
            } => {
                store.reorder_container(&container, new_order);
                CommitNotice {
                    kind: CommitKind::Reorder,
                    item,
                    from_container: container,
                    to_container: None,
                    direction: Some(direction),
                }
            }
            Self::Move { item, from, to } => {
                store.move_item(&item, &to);
                CommitNotice {
                    kind: CommitKind::Move,
                    item,
                    from_container: from,
                    to_container: Some(to),
                    direction: None,
                }
            }
        }
    }
}

/// Which mutation was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CommitKind {
    Reorder,
    Move,
}

/// Structured description of a committed action, for toasts and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommitNotice {
    pub kind: CommitKind,
    pub item: ItemId,
    pub from_container: ContainerId,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub to_container: Option<ContainerId>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub direction: Option<ReorderDirection>,
}

impl CommitNotice {
    /// One-line human-readable summary.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.kind, &self.to_container, self.direction) {
            (CommitKind::Move, Some(to), _) => format!("Moved {} to {to}", self.item),
            (CommitKind::Reorder, _, Some(direction)) => {
                format!("Moved {} {direction} in {}", self.item, self.from_container)
            }
            _ => format!("Updated {} in {}", self.item, self.from_container),
        }
    }
}

/// Turns a finished gesture into a [`CommitIntent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitResolver;

impl CommitResolver {
    /// Resolve dragging `active` out of `source` and dropping it at
    /// `placeholder` inside `target`.
    pub fn resolve(
        source: &Container,
        target: &Container,
        active: &ItemId,
        placeholder: &Placeholder,
    ) -> Result<CommitIntent, Skip> {
        if source.id != target.id {
            return Ok(CommitIntent::Move {
                item: active.clone(),
                from: source.id.clone(),
                to: target.id.clone(),
            });
        }

        let from_index = source
            .position(active.as_str())
            .ok_or_else(|| ResolutionFailure::UnknownItem(active.clone()))?;
        let new_order = splice(&source.items, from_index, placeholder.index);

        // Compare the id sequences, not the indices: a clamped index can
        // still produce the original order.
        if new_order == source.items {
            return Err(Skip::Redundant);
        }

        let to_index = new_order
            .iter()
            .position(|id| id == active)
            .unwrap_or(placeholder.index);
        let direction = ReorderDirection::between(from_index, to_index).ok_or(Skip::Redundant)?;

        Ok(CommitIntent::Reorder {
            container: source.id.clone(),
            item: active.clone(),
            from_index,
            to_index,
            new_order,
            direction,
        })
    }
}
