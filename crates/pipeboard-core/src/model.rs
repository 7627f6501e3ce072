#![forbid(unsafe_code)]

//! Board snapshot model.
//!
//! A [`Board`] is an ordered list of [`Container`]s, each holding an ordered
//! sequence of [`ItemId`]s. The drag engine only ever reads boards; they are
//! produced and replaced by the external store.
//!
//! # Invariants
//!
//! 1. Container ids are unique within a board.
//! 2. An item id appears at most once within a container.
//! 3. An item id appears in exactly one container across the board.
//!
//! [`Board::validate`] reports the first violation it finds.

use std::borrow::Borrow;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            /// Create an id from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw id.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(
    /// Identifier of an orderable item (an order card).
    ItemId
);

string_id!(
    /// Identifier of a container (a pipeline/status column).
    ContainerId
);

/// A named, ordered bucket of items.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Container {
    pub id: ContainerId,
    pub items: Vec<ItemId>,
}

impl Container {
    /// Create a container from an id and an ordered list of item ids.
    pub fn new<I, T>(id: impl Into<ContainerId>, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        Self {
            id: id.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Position of `item` within this container.
    #[must_use]
    pub fn position(&self, item: &str) -> Option<usize> {
        self.items.iter().position(|id| id.as_str() == item)
    }

    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        self.position(item).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// An immutable snapshot of every container on the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    pub containers: Vec<Container>,
}

impl Board {
    #[must_use]
    pub fn new(containers: Vec<Container>) -> Self {
        Self { containers }
    }

    /// Builder-style helper used by fixtures and tests.
    #[must_use]
    pub fn with_container<I, T>(mut self, id: impl Into<ContainerId>, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        self.containers.push(Container::new(id, items));
        self
    }

    /// Look up a container by id.
    #[must_use]
    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.id.as_str() == id)
    }

    /// Linear-scan ownership lookup.
    ///
    /// Prefer [`ContainerIndex`](crate::container_index::ContainerIndex) on hot
    /// paths; this exists for one-off queries against a snapshot.
    #[must_use]
    pub fn container_of(&self, item: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.contains(item))
    }

    /// Total number of items across all containers.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.containers.iter().map(Container::len).sum()
    }

    /// Check the board invariants listed in the module docs.
    pub fn validate(&self) -> Result<(), BoardError> {
        let mut containers = ahash::AHashSet::with_capacity(self.containers.len());
        let mut owners: ahash::AHashMap<&str, &ContainerId> =
            ahash::AHashMap::with_capacity(self.total_items());

        for container in &self.containers {
            if !containers.insert(container.id.as_str()) {
                return Err(BoardError::DuplicateContainer(container.id.clone()));
            }
            for item in &container.items {
                if let Some(first) = owners.insert(item.as_str(), &container.id) {
                    return Err(BoardError::DuplicateItem {
                        item: item.clone(),
                        first: first.clone(),
                        second: container.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Violations of the board invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Two containers share an id.
    DuplicateContainer(ContainerId),
    /// An item appears twice, either in one container or across two.
    DuplicateItem {
        item: ItemId,
        first: ContainerId,
        second: ContainerId,
    },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateContainer(id) => write!(f, "duplicate container id: {id}"),
            Self::DuplicateItem {
                item,
                first,
                second,
            } => write!(f, "item {item} appears in both {first} and {second}"),
        }
    }
}

impl std::error::Error for BoardError {}
