#![forbid(unsafe_code)]

//! Drag session controller.
//!
//! [`DragSessionController`] is the only type the presentation layer talks
//! to. It owns the transient [`SessionState`], reads board snapshots from a
//! [`BoardStore`], and wires the three pointer-sensor events to the engine:
//!
//! - [`start`](DragSessionController::start): admit a new gesture (guarded).
//! - [`update_hover`](DragSessionController::update_hover): refresh the
//!   placeholder; never touches the store.
//! - [`end`](DragSessionController::end): resolve and dispatch at most one
//!   mutation, then return to idle unconditionally.
//!
//! # Invariants
//!
//! 1. At most one store mutation per started gesture.
//! 2. Every `end` that finds a session leaves the controller idle with
//!    `last_ended_at == now`.
//! 3. A placeholder handed out by [`placeholder`](DragSessionController::placeholder)
//!    or [`session`](DragSessionController::session) names a container
//!    present in the store's current snapshot. A placeholder whose container
//!    was removed by a newer board is withheld until the next hover.
//!
//! The ownership index is cached against the snapshot `Arc` and rebuilt
//! only when the store publishes a new board.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::sync::Arc;
//! use web_time::Instant;
//! use pipeboard_core::{Board, BoardStore, ContainerId, DragConfig, DragSessionController, EndOutcome, ItemId};
//!
//! struct Fixed(Arc<Board>, RefCell<Vec<String>>);
//!
//! impl BoardStore for Fixed {
//!     fn snapshot(&self) -> Arc<Board> { Arc::clone(&self.0) }
//!     fn reorder_container(&self, c: &ContainerId, _order: Vec<ItemId>) {
//!         self.1.borrow_mut().push(format!("reorder {c}"));
//!     }
//!     fn move_item(&self, item: &ItemId, to: &ContainerId) {
//!         self.1.borrow_mut().push(format!("move {item} {to}"));
//!     }
//! }
//!
//! let board = Board::default()
//!     .with_container("TODO", ["a", "b", "c"])
//!     .with_container("DOING", ["d"]);
//! let store = Fixed(Arc::new(board), RefCell::default());
//! let mut ctl = DragSessionController::new(&store, DragConfig::default());
//!
//! let t = Instant::now();
//! assert!(ctl.start("b", t).is_started());
//! ctl.update_hover(Some("DOING"));
//! let outcome = ctl.end(Some("DOING"), t);
//!
//! assert!(matches!(outcome, EndOutcome::Committed(_)));
//! assert_eq!(*store.1.borrow(), vec!["move b DOING".to_string()]);
//! ```

use std::fmt;

use tracing::{debug, debug_span, info, warn};
use web_time::Instant;

use crate::commit::{CommitIntent, CommitNotice, CommitResolver};
use crate::config::DragConfig;
use crate::container_index::ContainerIndex;
use crate::guard::EventGuard;
use crate::logging::DRAG_TARGET;
use crate::model::ItemId;
use crate::outcome::{EndOutcome, ResolutionFailure, Skip, StartOutcome};
use crate::placeholder::{Placeholder, PlaceholderCalculator};
use crate::session::{DragSession, Phase, SessionState};
use crate::store::BoardStore;

type Notifier = Box<dyn FnMut(&CommitNotice)>;

/// Orchestrates one board's drag gestures.
pub struct DragSessionController<S: BoardStore> {
    store: S,
    config: DragConfig,
    guard: EventGuard,
    calculator: PlaceholderCalculator,
    state: SessionState,
    index: Option<ContainerIndex>,
    notifier: Option<Notifier>,
    commits: u64,
}

impl<S: BoardStore> fmt::Debug for DragSessionController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragSessionController")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("commits", &self.commits)
            .finish()
    }
}

impl<S: BoardStore> DragSessionController<S> {
    /// Create an idle controller.
    #[must_use]
    pub fn new(store: S, config: DragConfig) -> Self {
        Self {
            guard: EventGuard::new(config.cooldown()),
            calculator: PlaceholderCalculator::new(config.item_height_px),
            store,
            config,
            state: SessionState::default(),
            index: None,
            notifier: None,
            commits: 0,
        }
    }

    /// Call `notify` with every dispatched commit.
    #[must_use]
    pub fn with_notifier<F>(mut self, notify: F) -> Self
    where
        F: FnMut(&CommitNotice) + 'static,
    {
        self.notifier = Some(Box::new(notify));
        self
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// The in-progress gesture, for rendering the floating preview.
    ///
    /// The returned copy carries no placeholder when the hovered container
    /// is missing from the current snapshot.
    #[must_use]
    pub fn session(&self) -> Option<DragSession> {
        let mut session = self.state.session()?.clone();
        if session.placeholder().is_some() && self.placeholder().is_none() {
            session.clear_placeholder();
        }
        Some(session)
    }

    /// Live insertion preview, checked against the current snapshot.
    #[must_use]
    pub fn placeholder(&self) -> Option<&Placeholder> {
        let placeholder = self.state.session()?.placeholder()?;
        let board = self.store.snapshot();
        board
            .container(placeholder.container_id.as_str())
            .is_some()
            .then_some(placeholder)
    }

    #[must_use]
    pub fn last_ended_at(&self) -> Option<Instant> {
        self.state.last_ended_at()
    }

    /// Number of mutations dispatched over the controller's lifetime.
    #[must_use]
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Begin dragging `item`.
    pub fn start(&mut self, item: impl Into<ItemId>, now: Instant) -> StartOutcome {
        let item = item.into();

        if let Err(reason) = self.guard.check_start(&self.state, now) {
            debug!(target: DRAG_TARGET, item = %item, %reason, "drag start ignored");
            return StartOutcome::Skipped(reason.into());
        }

        let index = Self::current_index(&mut self.index, &self.store);
        let Some(source) = index.owner_of(item.as_str()).cloned() else {
            warn!(target: DRAG_TARGET, item = %item, "drag start for item not on the board");
            return StartOutcome::Skipped(ResolutionFailure::UnknownItem(item).into());
        };

        debug!(target: DRAG_TARGET, item = %item, source = %source, "drag started");
        self.state = SessionState::Dragging(DragSession::new(item, source.clone(), now));
        StartOutcome::Started { source }
    }

    /// Refresh the placeholder for the id currently under the pointer.
    ///
    /// Clears the placeholder when `over` is `None` or unresolvable. Does
    /// nothing while idle.
    pub fn update_hover(&mut self, over: Option<&str>) -> Option<&Placeholder> {
        let session = self.state.session_mut()?;

        let placeholder = match over {
            None => None,
            Some(over) => {
                let index = Self::current_index(&mut self.index, &self.store);
                let active = session.active_item();
                match (index.owning_container(active.as_str()), index.resolve_target(over)) {
                    (Some(source), Some(target)) => {
                        self.calculator.compute(source, active, target, over)
                    }
                    _ => None,
                }
            }
        };

        debug!(
            target: DRAG_TARGET,
            item = %session.active_item(),
            over = over.unwrap_or(""),
            index = placeholder.as_ref().map(|p| p.index),
            "drag hover"
        );
        session.set_hover(over, placeholder);
        session.placeholder()
    }

    /// Finish the gesture over `over` (`None` when dropped outside any
    /// target), dispatching at most one mutation.
    pub fn end(&mut self, over: Option<&str>, now: Instant) -> EndOutcome {
        let session = match self.guard.check_end(&mut self.state, now) {
            Ok(session) => session,
            Err(reason) => {
                debug!(target: DRAG_TARGET, %reason, "drag end ignored");
                return EndOutcome::Skipped(reason.into());
            }
        };

        let span = debug_span!(
            target: DRAG_TARGET,
            "drag.end",
            item = %session.active_item(),
            over = over.unwrap_or(""),
        );
        let _guard = span.enter();

        match self.resolve(&session, over) {
            Ok(intent) => {
                let notice = intent.dispatch(&self.store);
                self.commits += 1;
                info!(
                    target: DRAG_TARGET,
                    kind = ?notice.kind,
                    item = %notice.item,
                    from = %notice.from_container,
                    to = notice.to_container.as_ref().map(|c| c.as_str()),
                    direction = notice.direction.map(|d| d.label()),
                    "drag committed"
                );
                if let Some(notify) = self.notifier.as_mut() {
                    notify(&notice);
                }
                EndOutcome::Committed(notice)
            }
            Err(skip) => {
                match &skip {
                    Skip::Unresolved(failure) if *failure != ResolutionFailure::NoTarget => {
                        warn!(target: DRAG_TARGET, %failure, "drag end could not be resolved");
                    }
                    _ => {
                        debug!(
                            target: DRAG_TARGET,
                            skip = skip.kind(),
                            reason = %skip,
                            "drag ended without commit"
                        );
                    }
                }
                EndOutcome::Skipped(skip)
            }
        }
    }

    fn resolve(&mut self, session: &DragSession, over: Option<&str>) -> Result<CommitIntent, Skip> {
        let active = session.active_item();
        self.guard.check_drop(active, over)?;
        let over = over.ok_or(ResolutionFailure::NoTarget)?;

        let index = Self::current_index(&mut self.index, &self.store);
        let source = index
            .owning_container(active.as_str())
            .ok_or_else(|| ResolutionFailure::UnknownItem(active.clone()))?;
        let target = index
            .resolve_target(over)
            .ok_or_else(|| ResolutionFailure::UnknownTarget(over.to_owned()))?;
        let placeholder = self
            .calculator
            .compute(source, active, target, over)
            .ok_or_else(|| ResolutionFailure::UnknownItem(active.clone()))?;

        CommitResolver::resolve(source, target, active, &placeholder)
    }

    fn current_index<'a>(slot: &'a mut Option<ContainerIndex>, store: &S) -> &'a ContainerIndex {
        let snapshot = store.snapshot();
        if !slot.as_ref().is_some_and(|index| index.is_snapshot(&snapshot)) {
            *slot = None;
        }
        slot.get_or_insert_with(|| ContainerIndex::new(snapshot))
    }
}
