#![forbid(unsafe_code)]

//! Structured log assertions for the drag controller.
//!
//! Covers:
//! 1. A commit emits one INFO event with kind/item/from/to fields
//! 2. A drop over an unknown id emits WARN
//! 3. Guarded and cancelled transitions stay at DEBUG
//! 4. The commit path runs inside a `drag.end` span
//!
//! Run:
//!   cargo test -p pipeboard-core --test tracing_drag_events

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pipeboard_core::logging::DRAG_TARGET;
use pipeboard_core::{Board, BoardStore, ContainerId, DragConfig, DragSessionController, ItemId};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use web_time::Instant;

// ============================================================================
// Tracing capture infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: String,
    fields: HashMap<String, String>,
    span: Option<String>,
}

struct EventCapture {
    spans: Arc<Mutex<Vec<String>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct CaptureHandle {
    spans: Arc<Mutex<Vec<String>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<String> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn at(&self, level: tracing::Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        self.spans
            .lock()
            .unwrap()
            .push(attrs.metadata().name().to_string());
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned().unwrap_or_default();
        let span = ctx
            .event_span(event)
            .map(|span| span.name().to_string());
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            fields,
            span,
        });
    }
}

fn with_captured_tracing<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let spans = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        spans: Arc::clone(&spans),
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    CaptureHandle { spans, events }
}

// ============================================================================
// Fixture store
// ============================================================================

struct Fixed(Arc<Board>, RefCell<usize>);

impl BoardStore for Fixed {
    fn snapshot(&self) -> Arc<Board> {
        Arc::clone(&self.0)
    }

    fn reorder_container(&self, _container: &ContainerId, _order: Vec<ItemId>) {
        *self.1.borrow_mut() += 1;
    }

    fn move_item(&self, _item: &ItemId, _destination: &ContainerId) {
        *self.1.borrow_mut() += 1;
    }
}

fn store() -> Fixed {
    Fixed(
        Arc::new(
            Board::default()
                .with_container("TODO", ["a", "b", "c"])
                .with_container("DOING", ["d"]),
        ),
        RefCell::new(0),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn commit_emits_single_info_event() {
    let store = store();
    let handle = with_captured_tracing(|| {
        let mut ctl = DragSessionController::new(&store, DragConfig::default());
        let t = Instant::now();
        ctl.start("b", t);
        ctl.update_hover(Some("DOING"));
        ctl.end(Some("DOING"), t);
    });

    let infos = handle.at(tracing::Level::INFO);
    assert_eq!(infos.len(), 1, "expected one INFO event, got {infos:?}");
    let commit = &infos[0];
    assert_eq!(commit.target, DRAG_TARGET);
    assert_eq!(commit.message, "drag committed");
    assert_eq!(commit.fields.get("kind").map(String::as_str), Some("Move"));
    assert_eq!(commit.fields.get("item").map(String::as_str), Some("b"));
    assert_eq!(commit.fields.get("from").map(String::as_str), Some("TODO"));
    assert_eq!(commit.fields.get("to").map(String::as_str), Some("DOING"));
    assert_eq!(commit.span.as_deref(), Some("drag.end"));
    assert!(handle.spans().iter().any(|s| s == "drag.end"));
    assert_eq!(*store.1.borrow(), 1);
}

#[test]
fn reorder_commit_records_direction() {
    let store = store();
    let handle = with_captured_tracing(|| {
        let mut ctl = DragSessionController::new(&store, DragConfig::default());
        let t = Instant::now();
        ctl.start("c", t);
        ctl.end(Some("a"), t);
    });

    let infos = handle.at(tracing::Level::INFO);
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].fields.get("kind").map(String::as_str), Some("Reorder"));
    assert_eq!(
        infos[0].fields.get("direction").map(String::as_str),
        Some("up")
    );
}

#[test]
fn unknown_drop_target_warns() {
    let store = store();
    let handle = with_captured_tracing(|| {
        let mut ctl = DragSessionController::new(&store, DragConfig::default());
        let t = Instant::now();
        ctl.start("a", t);
        ctl.end(Some("ghost"), t);
    });

    let warns = handle.at(tracing::Level::WARN);
    assert_eq!(warns.len(), 1);
    assert!(
        warns[0]
            .fields
            .get("failure")
            .is_some_and(|f| f.contains("ghost"))
    );
    assert!(handle.at(tracing::Level::INFO).is_empty());
    assert_eq!(*store.1.borrow(), 0);
}

#[test]
fn guarded_and_cancelled_stay_quiet() {
    let store = store();
    let handle = with_captured_tracing(|| {
        let mut ctl = DragSessionController::new(&store, DragConfig::default());
        let t = Instant::now();
        ctl.end(Some("a"), t);
        ctl.start("a", t);
        ctl.start("a", t);
        ctl.end(None, t);
        ctl.start("b", t);
    });

    assert!(handle.at(tracing::Level::WARN).is_empty());
    assert!(handle.at(tracing::Level::INFO).is_empty());
    let debug_messages: Vec<String> = handle
        .at(tracing::Level::DEBUG)
        .into_iter()
        .map(|e| e.message)
        .collect();
    assert!(debug_messages.iter().any(|m| m == "drag start ignored"));
    assert!(debug_messages.iter().any(|m| m == "drag end ignored"));
    assert!(debug_messages.iter().any(|m| m == "drag ended without commit"));
}
