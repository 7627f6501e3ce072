#![forbid(unsafe_code)]

//! Gesture storm generator for fault-injection testing.
//!
//! Produces deterministic streams of drag-sensor events shaped like the
//! failure modes real pointer sensors exhibit, against the ids of a given
//! board.
//!
//! # Storm Patterns
//!
//! | Pattern | Description |
//! |---------|-------------|
//! | [`StormPattern::CleanGestures`] | Well-formed gestures spaced past the cooldown |
//! | [`StormPattern::DuplicateEnds`] | Every drop delivered twice |
//! | [`StormPattern::ReentrantStarts`] | A second `start` fires mid-gesture |
//! | [`StormPattern::RapidRestarts`] | New gesture begins right after a drop |
//! | [`StormPattern::UnknownIds`] | Ids that exist nowhere on the board |
//! | [`StormPattern::Chaos`] | Unstructured mix of all of the above |
//!
//! # JSONL Schema
//!
//! Storms serialize through [`gesture_trace`](crate::gesture_trace) with the
//! storm seed in the header.

use pipeboard_core::Board;

use crate::gesture::{GestureEvent, TimedGesture};

/// Id that no board fixture uses.
pub const GHOST_ID: &str = "ghost";

/// Shape of a generated storm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StormPattern {
    CleanGestures { count: usize },
    DuplicateEnds { count: usize },
    ReentrantStarts { count: usize },
    RapidRestarts { count: usize },
    UnknownIds { count: usize },
    /// `count` individual events rather than gestures.
    Chaos { count: usize },
}

impl StormPattern {
    /// Human-readable pattern name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CleanGestures { .. } => "clean_gestures",
            Self::DuplicateEnds { .. } => "duplicate_ends",
            Self::ReentrantStarts { .. } => "reentrant_starts",
            Self::RapidRestarts { .. } => "rapid_restarts",
            Self::UnknownIds { .. } => "unknown_ids",
            Self::Chaos { .. } => "chaos",
        }
    }
}

/// Configuration for a gesture storm.
#[derive(Debug, Clone)]
pub struct StormConfig {
    pub pattern: StormPattern,
    pub seed: u64,
    /// Gap inserted between clean gestures; should exceed the drag cooldown.
    pub settle_ms: u64,
}

impl StormConfig {
    pub fn new(pattern: StormPattern, seed: u64) -> Self {
        Self {
            pattern,
            seed,
            settle_ms: 150,
        }
    }

    #[must_use]
    pub fn with_settle_ms(mut self, settle_ms: u64) -> Self {
        self.settle_ms = settle_ms;
        self
    }
}

/// Simple deterministic PRNG (xorshift64) for reproducible storms.
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    fn below(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next() % max as u64) as usize
    }

    fn pick<'a>(&mut self, pool: &'a [String]) -> &'a str {
        pool.get(self.below(pool.len()))
            .map_or(GHOST_ID, String::as_str)
    }
}

/// Generated storm with its provenance.
#[derive(Debug, Clone)]
pub struct GestureStorm {
    pub gestures: Vec<TimedGesture>,
    pub pattern_name: &'static str,
    pub seed: u64,
}

impl GestureStorm {
    /// Number of `end` events in the storm.
    #[must_use]
    pub fn end_count(&self) -> usize {
        self.gestures
            .iter()
            .filter(|g| matches!(g.event, GestureEvent::End { .. }))
            .count()
    }
}

struct Cursor<'a> {
    rng: Rng,
    items: Vec<String>,
    targets: Vec<String>,
    at_ms: u64,
    out: &'a mut Vec<TimedGesture>,
}

impl Cursor<'_> {
    fn emit(&mut self, event: GestureEvent) {
        self.out.push(TimedGesture::new(self.at_ms, event));
    }

    fn tick(&mut self, max_ms: u64) {
        self.at_ms += 1 + self.rng.next() % max_ms.max(1);
    }

    fn item(&mut self) -> String {
        self.rng.pick(&self.items).to_owned()
    }

    fn target(&mut self) -> String {
        self.rng.pick(&self.targets).to_owned()
    }

    /// start, a few hovers, end over the last hovered target.
    fn gesture(&mut self, item: &str) {
        self.emit(GestureEvent::start(item));
        for _ in 0..self.rng.below(4) {
            self.tick(24);
            let passing = self.target();
            self.emit(GestureEvent::hover(Some(&passing)));
        }
        self.tick(24);
        let over = self.target();
        self.emit(GestureEvent::hover(Some(&over)));
        self.tick(24);
        self.emit(GestureEvent::end(Some(&over)));
    }
}

/// Generate a deterministic storm against the ids on `board`.
pub fn generate_storm(config: &StormConfig, board: &Board) -> GestureStorm {
    let items: Vec<String> = board
        .containers
        .iter()
        .flat_map(|c| c.items.iter().map(ToString::to_string))
        .collect();
    let targets: Vec<String> = board
        .containers
        .iter()
        .map(|c| c.id.to_string())
        .chain(items.iter().cloned())
        .collect();

    let mut gestures = Vec::new();
    let mut cursor = Cursor {
        rng: Rng::new(config.seed),
        items,
        targets,
        at_ms: 0,
        out: &mut gestures,
    };
    let settle = config.settle_ms;

    match config.pattern {
        StormPattern::CleanGestures { count } => {
            for _ in 0..count {
                let item = cursor.item();
                cursor.gesture(&item);
                cursor.at_ms += settle;
            }
        }
        StormPattern::DuplicateEnds { count } => {
            for _ in 0..count {
                let item = cursor.item();
                cursor.gesture(&item);
                cursor.tick(4);
                let over = cursor.target();
                cursor.emit(GestureEvent::end(Some(&over)));
                cursor.at_ms += settle;
            }
        }
        StormPattern::ReentrantStarts { count } => {
            for _ in 0..count {
                let item = cursor.item();
                cursor.emit(GestureEvent::start(item.as_str()));
                cursor.tick(8);
                let other = cursor.item();
                cursor.gesture(&other);
                cursor.at_ms += settle;
            }
        }
        StormPattern::RapidRestarts { count } => {
            for _ in 0..count {
                let item = cursor.item();
                cursor.gesture(&item);
                cursor.tick(settle / 4);
            }
        }
        StormPattern::UnknownIds { count } => {
            for n in 0..count {
                if n % 2 == 0 {
                    cursor.emit(GestureEvent::start(GHOST_ID));
                    cursor.tick(8);
                    cursor.emit(GestureEvent::end(Some(GHOST_ID)));
                } else {
                    let item = cursor.item();
                    cursor.emit(GestureEvent::start(item.as_str()));
                    cursor.tick(8);
                    cursor.emit(GestureEvent::hover(Some(GHOST_ID)));
                    cursor.tick(8);
                    cursor.emit(GestureEvent::end(Some(GHOST_ID)));
                }
                cursor.at_ms += settle;
            }
        }
        StormPattern::Chaos { count } => {
            for _ in 0..count {
                let event = match cursor.rng.below(10) {
                    0..=2 => {
                        let item = if cursor.rng.below(8) == 0 {
                            GHOST_ID.to_owned()
                        } else {
                            cursor.item()
                        };
                        GestureEvent::start(item.as_str())
                    }
                    3..=6 => {
                        let over = cursor.target();
                        GestureEvent::hover((cursor.rng.below(6) != 0).then_some(over.as_str()))
                    }
                    _ => {
                        let over = cursor.target();
                        GestureEvent::end((cursor.rng.below(6) != 0).then_some(over.as_str()))
                    }
                };
                cursor.emit(event);
                cursor.tick(settle);
            }
        }
    }

    GestureStorm {
        gestures,
        pattern_name: config.pattern.name(),
        seed: config.seed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::default()
            .with_container("TODO", ["a", "b", "c"])
            .with_container("DOING", ["d"])
    }

    #[test]
    fn same_seed_same_storm() {
        let config = StormConfig::new(StormPattern::Chaos { count: 200 }, 42);
        let a = generate_storm(&config, &board());
        let b = generate_storm(&config, &board());
        assert_eq!(a.gestures, b.gestures);
        assert_eq!(a.gestures.len(), 200);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = generate_storm(&StormConfig::new(StormPattern::Chaos { count: 50 }, 1), &board());
        let b = generate_storm(&StormConfig::new(StormPattern::Chaos { count: 50 }, 2), &board());
        assert_ne!(a.gestures, b.gestures);
    }

    #[test]
    fn offsets_never_go_backwards() {
        let storm = generate_storm(
            &StormConfig::new(StormPattern::RapidRestarts { count: 30 }, 9),
            &board(),
        );
        assert!(storm.gestures.windows(2).all(|w| w[0].at_ms <= w[1].at_ms));
    }

    #[test]
    fn duplicate_ends_doubles_drops() {
        let storm = generate_storm(
            &StormConfig::new(StormPattern::DuplicateEnds { count: 10 }, 3),
            &board(),
        );
        assert_eq!(storm.end_count(), 20);
        assert_eq!(storm.pattern_name, "duplicate_ends");
    }

    #[test]
    fn empty_board_falls_back_to_ghost_ids() {
        let storm = generate_storm(
            &StormConfig::new(StormPattern::CleanGestures { count: 2 }, 5),
            &Board::default(),
        );
        assert_eq!(storm.gestures[0].event, GestureEvent::start(GHOST_ID));
    }
}
