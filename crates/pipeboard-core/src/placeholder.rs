#![forbid(unsafe_code)]

//! Placeholder (insertion preview) computation.
//!
//! # Index convention
//!
//! [`Placeholder::index`] is the position the dragged item will occupy in the
//! destination container *after* the commit is applied:
//!
//! - Same container, hovering an item at `hover_index`: the index is
//!   `hover_index` in both directions. Moving up, the item lands directly
//!   before the hovered item; moving down, the hovered item shifts up by one
//!   after removal and the dragged item lands directly after it. This is the
//!   remove-then-insert splice used by the commit path, so the preview and
//!   the committed order always agree.
//! - Same container, hovering the container itself: the tail slot
//!   (`len - 1`).
//! - Different container: the tail of the destination (`len`). Cross-container
//!   drops never place mid-list.
//!
//! `pixel_offset` is `index * item_height` and is only used to draw the gap.

use crate::model::{Container, ContainerId, ItemId};

/// Where the dragged item would land if dropped now.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placeholder {
    pub container_id: ContainerId,
    pub index: usize,
    pub pixel_offset: u32,
}

/// Computes [`Placeholder`]s for a fixed row height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderCalculator {
    item_height: u32,
}

impl PlaceholderCalculator {
    #[must_use]
    pub const fn new(item_height: u32) -> Self {
        Self { item_height }
    }

    #[must_use]
    pub const fn item_height(&self) -> u32 {
        self.item_height
    }

    /// Compute the placeholder for dragging `active` (owned by `source`) over
    /// `over`, which has already been resolved to `target`.
    ///
    /// Returns `None` when `active` is not in `source`, which means the
    /// snapshot changed under the gesture.
    #[must_use]
    pub fn compute(
        &self,
        source: &Container,
        active: &ItemId,
        target: &Container,
        over: &str,
    ) -> Option<Placeholder> {
        let source_index = source.position(active.as_str())?;

        let index = if source.id == target.id {
            if target.id.as_str() == over {
                target.len().saturating_sub(1)
            } else {
                match target.position(over) {
                    Some(hover_index) => hover_index,
                    None => source_index,
                }
            }
        } else {
            target.len()
        };

        Some(Placeholder {
            container_id: target.id.clone(),
            index,
            pixel_offset: self.pixel_offset(index),
        })
    }

    /// Rendering offset of the gap for a given slot.
    #[must_use]
    pub fn pixel_offset(&self, index: usize) -> u32 {
        u32::try_from(index)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.item_height)
    }
}
