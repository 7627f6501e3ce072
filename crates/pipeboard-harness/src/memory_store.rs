#![forbid(unsafe_code)]

//! In-memory [`BoardStore`] for tests, demos, and trace replay.
//!
//! Snapshots are published through [`arc_swap::ArcSwap`], so readers on any
//! thread see a consistent board without locking. Writes are serialized by a
//! mutex that also guards the per-item field records and the mutation log.
//!
//! Membership is defined the way a record store defines it: every item
//! carries a domain field value (its status, say), and a
//! [`ContainerFieldMapping`] translates between values and containers.
//! `move_item` writes the field and regroups the board; items that stay put
//! keep their order and newcomers are appended.
//!
//! # Invariants
//!
//! 1. Every published snapshot passes [`Board::validate`].
//! 2. Each mapped container's field value maps back to that container, so a
//!    regroup after `move_item` only ever moves the named item.
//! 3. A rejected mutation leaves the published snapshot untouched.
//! 4. Every mutation call produces exactly one [`StoreEvent`].
//!
//! # Failure Modes
//!
//! Rejections are recorded and logged, never propagated: the engine has
//! already returned to idle by the time a store sees the intent.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ahash::AHashMap;
use arc_swap::ArcSwap;
use pipeboard_core::{
    Board, BoardError, BoardStore, ContainerFieldMapping, ContainerId, FieldUpdate,
    IdentityFieldMapping, ItemId,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

const STORE_TARGET: &str = "pipeboard::store";

/// Why the store refused a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StoreRejection {
    #[error("injected failure")]
    Injected,

    #[error("unknown container: {container}")]
    UnknownContainer { container: ContainerId },

    #[error("unknown item: {item}")]
    UnknownItem { item: ItemId },

    #[error("container {container} has no field mapping")]
    Unmapped { container: ContainerId },

    #[error("new order for {container} is not a permutation of its items")]
    OrderMismatch { container: ContainerId },
}

/// Why a store could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreInitError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("field value {value:?} of container {container} does not map back to it")]
    AmbiguousMapping { container: ContainerId, value: String },
}

/// Require every mapped container on `board` to own its field value.
///
/// Two containers sharing a value would make membership ambiguous: the
/// first regroup would fold one into the other.
pub fn check_mapping<M: ContainerFieldMapping + ?Sized>(
    board: &Board,
    mapping: &M,
) -> Result<(), StoreInitError> {
    for container in &board.containers {
        let Some(update) = mapping.field_update(&container.id) else {
            continue;
        };
        if mapping.container_for(&update.value).as_ref() != Some(&container.id) {
            return Err(StoreInitError::AmbiguousMapping {
                container: container.id.clone(),
                value: update.value,
            });
        }
    }
    Ok(())
}

/// A mutation as the store received it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    Reorder {
        container: ContainerId,
        order: Vec<ItemId>,
    },
    Move {
        item: ItemId,
        destination: ContainerId,
    },
}

/// One entry of the store's mutation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoreEvent {
    Applied {
        mutation: Mutation,
    },
    Rejected {
        mutation: Mutation,
        rejection: StoreRejection,
    },
}

impl StoreEvent {
    #[must_use]
    pub fn mutation(&self) -> &Mutation {
        match self {
            Self::Applied { mutation } | Self::Rejected { mutation, .. } => mutation,
        }
    }

    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

#[derive(Debug, Default)]
struct Records {
    fields: AHashMap<ItemId, FieldUpdate>,
    log: Vec<StoreEvent>,
    fail_next: bool,
}

/// Thread-safe in-memory board store.
pub struct MemoryStore<M: ContainerFieldMapping = IdentityFieldMapping> {
    board: ArcSwap<Board>,
    records: Mutex<Records>,
    mapping: M,
}

impl MemoryStore<IdentityFieldMapping> {
    /// Store whose container ids double as `status` values.
    pub fn with_identity(board: Board) -> Result<Self, StoreInitError> {
        Self::new(board, IdentityFieldMapping::default())
    }
}

impl<M: ContainerFieldMapping> MemoryStore<M> {
    /// Create a store, deriving each item's field record from its container.
    ///
    /// Items in containers the mapping does not know have no record until
    /// they are moved somewhere mapped. Fails when the board is invalid or
    /// when two containers share a field value.
    pub fn new(board: Board, mapping: M) -> Result<Self, StoreInitError> {
        board.validate()?;
        check_mapping(&board, &mapping)?;
        let mut fields = AHashMap::with_capacity(board.total_items());
        for container in &board.containers {
            if let Some(update) = mapping.field_update(&container.id) {
                for item in &container.items {
                    fields.insert(item.clone(), update.clone());
                }
            }
        }
        Ok(Self {
            board: ArcSwap::from_pointee(board),
            records: Mutex::new(Records {
                fields,
                ..Records::default()
            }),
            mapping,
        })
    }

    #[must_use]
    pub fn mapping(&self) -> &M {
        &self.mapping
    }

    /// The stored field record for `item`.
    #[must_use]
    pub fn field_of(&self, item: &str) -> Option<FieldUpdate> {
        self.lock().fields.get(item).cloned()
    }

    /// Reject the next mutation with [`StoreRejection::Injected`].
    pub fn fail_next(&self) {
        self.lock().fail_next = true;
    }

    /// Every mutation received so far, in order.
    #[must_use]
    pub fn log(&self) -> Vec<StoreEvent> {
        self.lock().log.clone()
    }

    #[must_use]
    pub fn applied(&self) -> usize {
        self.lock().log.iter().filter(|e| e.is_applied()).count()
    }

    #[must_use]
    pub fn rejected(&self) -> usize {
        self.lock().log.iter().filter(|e| !e.is_applied()).count()
    }

    /// Write a domain field value directly, as another client would.
    ///
    /// The item is regrouped into whichever container the value maps to.
    pub fn set_field_value(&self, item: &ItemId, value: &str) -> Result<(), StoreRejection> {
        let destination = self
            .mapping
            .container_for(value)
            .ok_or_else(|| StoreRejection::UnknownContainer {
                container: ContainerId::from(value),
            })?;
        let mut records = self.lock();
        let board = self.board.load_full();
        check_move(&board, &self.mapping, item, &destination)?;
        self.apply_move(&mut records, &board, item, &destination);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, records: &mut Records, mutation: Mutation, result: Result<(), StoreRejection>) {
        match result {
            Ok(()) => {
                debug!(target: STORE_TARGET, ?mutation, "mutation applied");
                records.log.push(StoreEvent::Applied { mutation });
            }
            Err(rejection) => {
                warn!(target: STORE_TARGET, ?mutation, %rejection, "mutation rejected");
                records.log.push(StoreEvent::Rejected {
                    mutation,
                    rejection,
                });
            }
        }
    }

    fn apply_move(&self, records: &mut Records, board: &Board, item: &ItemId, to: &ContainerId) {
        if let Some(update) = self.mapping.field_update(to) {
            records.fields.insert(item.clone(), update);
        }
        self.board
            .store(Arc::new(regroup(board, &records.fields, &self.mapping)));
    }
}

impl<M: ContainerFieldMapping> BoardStore for MemoryStore<M> {
    fn snapshot(&self) -> Arc<Board> {
        self.board.load_full()
    }

    fn reorder_container(&self, container: &ContainerId, order: Vec<ItemId>) {
        let mut records = self.lock();
        let board = self.board.load_full();
        let result = if std::mem::take(&mut records.fail_next) {
            Err(StoreRejection::Injected)
        } else {
            check_reorder(&board, container, &order)
        };
        if result.is_ok() {
            let mut next = (*board).clone();
            if let Some(target) = next.containers.iter_mut().find(|c| c.id == *container) {
                target.items.clone_from(&order);
            }
            self.board.store(Arc::new(next));
        }
        let mutation = Mutation::Reorder {
            container: container.clone(),
            order,
        };
        self.record(&mut records, mutation, result);
    }

    fn move_item(&self, item: &ItemId, destination: &ContainerId) {
        let mut records = self.lock();
        let board = self.board.load_full();
        let result = if std::mem::take(&mut records.fail_next) {
            Err(StoreRejection::Injected)
        } else {
            check_move(&board, &self.mapping, item, destination)
        };
        if result.is_ok() {
            self.apply_move(&mut records, &board, item, destination);
        }
        let mutation = Mutation::Move {
            item: item.clone(),
            destination: destination.clone(),
        };
        self.record(&mut records, mutation, result);
    }
}

fn check_reorder(
    board: &Board,
    container: &ContainerId,
    order: &[ItemId],
) -> Result<(), StoreRejection> {
    let current = board
        .container(container.as_str())
        .ok_or_else(|| StoreRejection::UnknownContainer {
            container: container.clone(),
        })?;
    let mut expected: Vec<&ItemId> = current.items.iter().collect();
    let mut proposed: Vec<&ItemId> = order.iter().collect();
    expected.sort_unstable();
    proposed.sort_unstable();
    if expected == proposed {
        Ok(())
    } else {
        Err(StoreRejection::OrderMismatch {
            container: container.clone(),
        })
    }
}

fn check_move<M: ContainerFieldMapping>(
    board: &Board,
    mapping: &M,
    item: &ItemId,
    destination: &ContainerId,
) -> Result<(), StoreRejection> {
    if board.container_of(item.as_str()).is_none() {
        return Err(StoreRejection::UnknownItem { item: item.clone() });
    }
    if board.container(destination.as_str()).is_none() {
        return Err(StoreRejection::UnknownContainer {
            container: destination.clone(),
        });
    }
    if mapping.field_update(destination).is_none() {
        return Err(StoreRejection::Unmapped {
            container: destination.clone(),
        });
    }
    Ok(())
}

/// Re-derive membership from field records.
///
/// Items whose field maps to their current container keep their relative
/// order; items whose field now maps elsewhere are appended to that
/// container in board order. Items without a record, or whose value maps to
/// a container not on the board, stay where they are.
fn regroup<M: ContainerFieldMapping>(
    board: &Board,
    fields: &AHashMap<ItemId, FieldUpdate>,
    mapping: &M,
) -> Board {
    let home = |item: &ItemId| -> Option<ContainerId> {
        let value = &fields.get(item)?.value;
        mapping
            .container_for(value)
            .filter(|id| board.container(id.as_str()).is_some())
    };

    let mut next = board.clone();
    let mut movers: Vec<(ItemId, ContainerId)> = Vec::new();
    for container in &mut next.containers {
        container.items.retain(|item| match home(item) {
            Some(target) if target != container.id => {
                movers.push((item.clone(), target));
                false
            }
            _ => true,
        });
    }
    for (item, target) in movers {
        if let Some(container) = next.containers.iter_mut().find(|c| c.id == target) {
            container.items.push(item);
        }
    }
    next
}
