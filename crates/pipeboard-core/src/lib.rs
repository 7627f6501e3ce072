#![forbid(unsafe_code)]

//! Core: the drag-and-drop reordering engine behind a pipeline board.
//!
//! # Role in Pipeboard
//! `pipeboard-core` turns pointer-sensor gesture events into at most one
//! mutation intent per gesture. It never owns the board: containers and items
//! live in an external [`BoardStore`], and the engine only reads snapshots.
//!
//! # Primary responsibilities
//! - **ContainerIndex**: which container owns an item in a snapshot.
//! - **PlaceholderCalculator**: live insertion preview while hovering.
//! - **EventGuard**: re-entrancy, cooldown, and self-drop filtering.
//! - **CommitResolver**: reorder vs move, with a redundancy check.
//! - **DragSessionController**: the `start` / `update_hover` / `end` handlers.
//!
//! # How it fits in the system
//! The presentation layer forwards drag-sensor events to a
//! [`DragSessionController`] and renders [`DragSession`] and [`Placeholder`].
//! Committed actions surface as [`CommitNotice`]s for toast/log display.
//! `pipeboard-harness` provides an in-memory store and replay tooling.

pub mod commit;
pub mod config;
pub mod container_index;
pub mod controller;
pub mod guard;
pub mod logging;
pub mod model;
pub mod outcome;
pub mod placeholder;
pub mod session;
pub mod store;

pub use commit::{CommitIntent, CommitKind, CommitNotice, CommitResolver, ReorderDirection};
pub use config::{ConfigError, DragConfig};
pub use container_index::ContainerIndex;
pub use controller::DragSessionController;
pub use guard::{EventGuard, GuardReason};
pub use model::{Board, BoardError, Container, ContainerId, ItemId};
pub use outcome::{EndOutcome, ResolutionFailure, Skip, StartOutcome};
pub use placeholder::{Placeholder, PlaceholderCalculator};
pub use session::{DragSession, Phase, SessionState};
pub use store::{
    BoardStore, ContainerFieldMapping, FieldUpdate, IdentityFieldMapping, TableFieldMapping,
};
