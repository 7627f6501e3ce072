#![forbid(unsafe_code)]

//! The record-store seam.
//!
//! The engine reads board snapshots from a [`BoardStore`] and hands it
//! mutation intents. Stores own containers and items; they may apply intents
//! asynchronously, and may reject them, without the engine being told.
//!
//! Container ids are decoupled from the domain vocabulary that defines
//! membership (an order's status, say) through [`ContainerFieldMapping`]:
//! stores translate a destination container into a field update and back,
//! so the engine never learns what a container means.

use std::rc::Rc;
use std::sync::Arc;

use crate::model::{Board, ContainerId, ItemId};

/// External record store consumed by the drag engine.
pub trait BoardStore {
    /// Current board. A new `Arc` signals that the board changed.
    fn snapshot(&self) -> Arc<Board>;

    /// Replace the order of `container` with `order`.
    fn reorder_container(&self, container: &ContainerId, order: Vec<ItemId>);

    /// Move `item` into `destination`. Membership is re-derived by the store.
    fn move_item(&self, item: &ItemId, destination: &ContainerId);
}

impl<T: BoardStore + ?Sized> BoardStore for &T {
    fn snapshot(&self) -> Arc<Board> {
        (**self).snapshot()
    }

    fn reorder_container(&self, container: &ContainerId, order: Vec<ItemId>) {
        (**self).reorder_container(container, order);
    }

    fn move_item(&self, item: &ItemId, destination: &ContainerId) {
        (**self).move_item(item, destination);
    }
}

impl<T: BoardStore + ?Sized> BoardStore for Arc<T> {
    fn snapshot(&self) -> Arc<Board> {
        (**self).snapshot()
    }

    fn reorder_container(&self, container: &ContainerId, order: Vec<ItemId>) {
        (**self).reorder_container(container, order);
    }

    fn move_item(&self, item: &ItemId, destination: &ContainerId) {
        (**self).move_item(item, destination);
    }
}

impl<T: BoardStore + ?Sized> BoardStore for Rc<T> {
    fn snapshot(&self) -> Arc<Board> {
        (**self).snapshot()
    }

    fn reorder_container(&self, container: &ContainerId, order: Vec<ItemId>) {
        (**self).reorder_container(container, order);
    }

    fn move_item(&self, item: &ItemId, destination: &ContainerId) {
        (**self).move_item(item, destination);
    }
}

/// A single domain field write that places an item in a container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldUpdate {
    pub field: String,
    pub value: String,
}

/// Maps containers to the domain field value that defines membership.
pub trait ContainerFieldMapping {
    /// Field write that moves an item into `container`.
    fn field_update(&self, container: &ContainerId) -> Option<FieldUpdate>;

    /// Container whose members carry `value` in the mapped field.
    fn container_for(&self, value: &str) -> Option<ContainerId>;
}

/// Identity mapping: the container id *is* the field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFieldMapping {
    field: String,
}

impl IdentityFieldMapping {
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Default for IdentityFieldMapping {
    fn default() -> Self {
        Self::new("status")
    }
}

impl ContainerFieldMapping for IdentityFieldMapping {
    fn field_update(&self, container: &ContainerId) -> Option<FieldUpdate> {
        Some(FieldUpdate {
            field: self.field.clone(),
            value: container.as_str().to_owned(),
        })
    }

    fn container_for(&self, value: &str) -> Option<ContainerId> {
        Some(ContainerId::from(value))
    }
}

/// Explicit container ↔ value table, for boards whose column ids differ
/// from the stored vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableFieldMapping {
    field: String,
    entries: Vec<(ContainerId, String)>,
}

impl TableFieldMapping {
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            entries: Vec::new(),
        }
    }

    /// Add an entry. Later entries for the same container replace earlier ones.
    ///
    /// Values should be unique: a value shared by two containers maps back to
    /// whichever was added first.
    #[must_use]
    pub fn with(mut self, container: impl Into<ContainerId>, value: impl Into<String>) -> Self {
        let container = container.into();
        self.entries.retain(|(c, _)| *c != container);
        self.entries.push((container, value.into()));
        self
    }
}

impl ContainerFieldMapping for TableFieldMapping {
    fn field_update(&self, container: &ContainerId) -> Option<FieldUpdate> {
        self.entries
            .iter()
            .find(|(c, _)| c == container)
            .map(|(_, value)| FieldUpdate {
                field: self.field.clone(),
                value: value.clone(),
            })
    }

    fn container_for(&self, value: &str) -> Option<ContainerId> {
        self.entries
            .iter()
            .find(|(_, v)| v == value)
            .map(|(c, _)| c.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_mapping_round_trips() {
        let mapping = IdentityFieldMapping::default();
        let update = mapping.field_update(&"DOING".into()).unwrap();
        assert_eq!(update.field, "status");
        assert_eq!(update.value, "DOING");
        assert_eq!(mapping.container_for("DOING"), Some("DOING".into()));
    }

    #[test]
    fn table_mapping_translates_vocabulary() {
        let mapping = TableFieldMapping::new("state")
            .with("col-1", "pending")
            .with("col-2", "in_progress")
            .with("col-1", "queued");

        assert_eq!(
            mapping.field_update(&"col-1".into()),
            Some(FieldUpdate {
                field: "state".into(),
                value: "queued".into(),
            })
        );
        assert_eq!(mapping.container_for("in_progress"), Some("col-2".into()));
        assert_eq!(mapping.container_for("pending"), None);
        assert_eq!(mapping.field_update(&"col-9".into()), None);
    }
}
