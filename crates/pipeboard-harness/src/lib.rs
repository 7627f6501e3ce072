#![forbid(unsafe_code)]

//! Harness: in-memory store, fixtures, and gesture replay for Pipeboard.
//!
//! # Role in Pipeboard
//! `pipeboard-core` never owns board data. This crate supplies the pieces
//! needed to exercise it end to end without a real record store:
//!
//! - [`MemoryStore`]: an arc-swap backed [`BoardStore`](pipeboard_core::BoardStore)
//!   that derives membership from a mapped domain field.
//! - [`BoardFixture`]: JSON board fixtures.
//! - [`gesture_trace`]: JSONL recording of drag-sensor callbacks.
//! - [`gesture_storm`]: seeded generators of noisy gesture streams.
//! - [`replay`](mod@replay): deterministic replay with per-event outcomes.
//!
//! The `pipeboard-replay` binary ties these together.

pub mod cli;
pub mod error;
pub mod fixture;
pub mod gesture;
pub mod gesture_storm;
pub mod gesture_trace;
pub mod memory_store;
pub mod replay;

pub use error::{HarnessError, Result};
pub use fixture::{BoardFixture, ContainerFixture};
pub use gesture::{GestureEvent, TimedGesture};
pub use gesture_storm::{GestureStorm, StormConfig, StormPattern, generate_storm};
pub use gesture_trace::{GestureRecord, GestureTrace, GestureTraceWriter};
pub use memory_store::{
    MemoryStore, Mutation, StoreEvent, StoreInitError, StoreRejection, check_mapping,
};
pub use replay::{ReplayReport, ReplayStep, ReplaySummary, StepOutcome};
