#![forbid(unsafe_code)]

//! End-to-end gesture scenarios against a store that applies intents.
//!
//! Covers:
//! 1. Cross-container move appends to the destination
//! 2. Downward and upward reorders within one container
//! 3. Re-entrant start leaves the session untouched
//! 4. Self-drop and cooldown produce no mutations
//! 5. Duplicate or stray `end` events are absorbed
//!
//! Run:
//!   cargo test -p pipeboard-core --test drag_scenarios

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use pipeboard_core::{
    Board, BoardStore, CommitKind, ContainerId, DragConfig, DragSessionController, EndOutcome,
    GuardReason, ItemId, Phase, ReorderDirection, Skip, StartOutcome,
};
use web_time::Instant;

// ============================================================================
// Store that applies intents the way a record store would
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mutation {
    Reorder(ContainerId, Vec<ItemId>),
    Move(ItemId, ContainerId),
}

struct ApplyingStore {
    board: RefCell<Arc<Board>>,
    log: RefCell<Vec<Mutation>>,
}

impl ApplyingStore {
    fn new(board: Board) -> Self {
        Self {
            board: RefCell::new(Arc::new(board)),
            log: RefCell::default(),
        }
    }

    fn column(&self, id: &str) -> Vec<String> {
        self.board
            .borrow()
            .container(id)
            .map(|c| c.items.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    fn log(&self) -> Vec<Mutation> {
        self.log.borrow().clone()
    }
}

impl BoardStore for ApplyingStore {
    fn snapshot(&self) -> Arc<Board> {
        Arc::clone(&self.board.borrow())
    }

    fn reorder_container(&self, container: &ContainerId, order: Vec<ItemId>) {
        self.log
            .borrow_mut()
            .push(Mutation::Reorder(container.clone(), order.clone()));
        let mut next = (**self.board.borrow()).clone();
        if let Some(c) = next.containers.iter_mut().find(|c| c.id == *container) {
            c.items = order;
        }
        *self.board.borrow_mut() = Arc::new(next);
    }

    fn move_item(&self, item: &ItemId, destination: &ContainerId) {
        self.log
            .borrow_mut()
            .push(Mutation::Move(item.clone(), destination.clone()));
        let mut next = (**self.board.borrow()).clone();
        for c in &mut next.containers {
            c.items.retain(|i| i != item);
        }
        if let Some(c) = next.containers.iter_mut().find(|c| c.id == *destination) {
            c.items.push(item.clone());
        }
        *self.board.borrow_mut() = Arc::new(next);
    }
}

fn todo_doing() -> Board {
    Board::default()
        .with_container("TODO", ["a", "b", "c"])
        .with_container("DOING", ["d"])
}

fn ids(raw: &[&str]) -> Vec<ItemId> {
    raw.iter().map(|s| ItemId::from(*s)).collect()
}

const MS: Duration = Duration::from_millis(1);

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_a_cross_container_move() {
    let store = ApplyingStore::new(todo_doing());
    let mut ctl = DragSessionController::new(&store, DragConfig::default());
    let t = Instant::now();

    assert!(ctl.start("b", t).is_started());
    let placeholder = ctl.update_hover(Some("DOING")).cloned().unwrap();
    assert_eq!(placeholder.container_id, "DOING");
    assert_eq!(placeholder.index, 1);

    let outcome = ctl.end(Some("DOING"), t + 20 * MS);
    let notice = outcome.notice().unwrap();
    assert_eq!(notice.kind, CommitKind::Move);
    assert_eq!(notice.from_container, "TODO");

    assert_eq!(store.log(), vec![Mutation::Move("b".into(), "DOING".into())]);
    assert_eq!(store.column("TODO"), ["a", "c"]);
    assert_eq!(store.column("DOING"), ["d", "b"]);
}

#[test]
fn scenario_b_downward_reorder() {
    let store = ApplyingStore::new(Board::default().with_container("TODO", ["a", "b", "c"]));
    let mut ctl = DragSessionController::new(&store, DragConfig::default());
    let t = Instant::now();

    ctl.start("a", t);
    ctl.update_hover(Some("c"));
    let outcome = ctl.end(Some("c"), t + 10 * MS);

    assert_eq!(
        outcome.notice().and_then(|n| n.direction),
        Some(ReorderDirection::Down)
    );
    assert_eq!(
        store.log(),
        vec![Mutation::Reorder("TODO".into(), ids(&["b", "c", "a"]))]
    );
    assert_eq!(store.column("TODO"), ["b", "c", "a"]);
}

#[test]
fn upward_reorder_lands_before_hovered_item() {
    let store = ApplyingStore::new(Board::default().with_container("TODO", ["a", "b", "c", "d"]));
    let mut ctl = DragSessionController::new(&store, DragConfig::default());
    let t = Instant::now();

    ctl.start("d", t);
    ctl.update_hover(Some("b"));
    let outcome = ctl.end(Some("b"), t);

    assert_eq!(
        outcome.notice().map(|n| n.describe()),
        Some("Moved d up in TODO".to_string())
    );
    assert_eq!(store.column("TODO"), ["a", "d", "b", "c"]);
}

#[test]
fn scenario_c_second_start_is_guarded() {
    let store = ApplyingStore::new(todo_doing());
    let mut ctl = DragSessionController::new(&store, DragConfig::default());
    let t = Instant::now();

    ctl.start("a", t);
    ctl.update_hover(Some("DOING"));
    let before = ctl.session();

    let second = ctl.start("a", t + MS);
    assert_eq!(
        second,
        StartOutcome::Skipped(Skip::Guarded(GuardReason::AlreadyDragging))
    );
    assert_eq!(ctl.session(), before);
    assert!(store.log().is_empty());
}

#[test]
fn self_drop_emits_nothing() {
    let store = ApplyingStore::new(todo_doing());
    let mut ctl = DragSessionController::new(&store, DragConfig::default());
    let t = Instant::now();

    ctl.start("c", t);
    ctl.update_hover(Some("c"));
    assert_eq!(
        ctl.end(Some("c"), t),
        EndOutcome::Skipped(Skip::Guarded(GuardReason::SelfDrop))
    );
    assert!(store.log().is_empty());
    assert_eq!(ctl.phase(), Phase::Idle);
}

#[test]
fn start_inside_cooldown_stays_idle() {
    let store = ApplyingStore::new(todo_doing());
    let mut ctl = DragSessionController::new(&store, DragConfig::default());
    let t = Instant::now();

    ctl.start("b", t);
    ctl.end(Some("DOING"), t + 5 * MS);
    assert_eq!(store.log().len(), 1);

    let restart = ctl.start("a", t + 50 * MS);
    assert!(matches!(
        restart,
        StartOutcome::Skipped(Skip::Guarded(GuardReason::CoolingDown { .. }))
    ));
    assert_eq!(ctl.phase(), Phase::Idle);
    assert_eq!(ctl.end(Some("DOING"), t + 60 * MS).notice(), None);
    assert_eq!(store.log().len(), 1);
}

#[test]
fn stray_events_never_double_commit() {
    let store = ApplyingStore::new(todo_doing());
    let mut ctl = DragSessionController::new(&store, DragConfig::default());
    let t = Instant::now();

    // Sensor layer delivers end twice and a hover after the drop.
    ctl.start("a", t);
    ctl.update_hover(Some("d"));
    assert!(ctl.end(Some("d"), t + MS).notice().is_some());
    assert!(ctl.end(Some("d"), t + 2 * MS).notice().is_none());
    assert!(ctl.update_hover(Some("b")).is_none());

    assert_eq!(store.log(), vec![Mutation::Move("a".into(), "DOING".into())]);
    assert_eq!(store.column("DOING"), ["d", "a"]);
    assert_eq!(ctl.commits(), 1);
}

#[test]
fn consecutive_gestures_see_fresh_snapshots() {
    let store = ApplyingStore::new(todo_doing());
    let config = DragConfig::default().with_cooldown_ms(0);
    let mut ctl = DragSessionController::new(&store, config);
    let t = Instant::now();

    ctl.start("b", t);
    ctl.end(Some("DOING"), t);
    // `b` now lives in DOING; reorder it within its new container.
    assert_eq!(
        ctl.start("b", t),
        StartOutcome::Started {
            source: "DOING".into()
        }
    );
    ctl.end(Some("d"), t);

    assert_eq!(store.column("DOING"), ["b", "d"]);
    assert_eq!(store.column("TODO"), ["a", "c"]);
    assert_eq!(ctl.commits(), 2);
}
