#![forbid(unsafe_code)]

//! Property-based storm tests against the in-memory store.
//!
//! Whatever the sensor layer delivers, the store must see:
//!
//! 1. Exactly one mutation per `Committed` step and none otherwise
//! 2. No more mutations than gestures that ended
//! 3. A valid board with the original item set after every storm
//! 4. No commits at all from storms built purely from unknown ids

use std::collections::BTreeSet;

use pipeboard_core::{Board, BoardStore, DragConfig, DragSessionController};
use pipeboard_harness::replay::replay;
use pipeboard_harness::{MemoryStore, StepOutcome, StormConfig, StormPattern, generate_storm};
use proptest::prelude::*;
use web_time::Instant;

// ── Strategies ──────────────────────────────────────────────────────────

fn pattern_strategy() -> impl Strategy<Value = StormPattern> {
    (0usize..6, 1usize..40).prop_map(|(kind, count)| match kind {
        0 => StormPattern::CleanGestures { count },
        1 => StormPattern::DuplicateEnds { count },
        2 => StormPattern::ReentrantStarts { count },
        3 => StormPattern::RapidRestarts { count },
        4 => StormPattern::UnknownIds { count },
        _ => StormPattern::Chaos { count: count * 5 },
    })
}

fn board_strategy() -> impl Strategy<Value = Board> {
    prop::collection::vec(0usize..3, 1..10).prop_map(|owners| {
        let mut board = Board::default()
            .with_container("TODO", Vec::<String>::new())
            .with_container("DOING", Vec::<String>::new())
            .with_container("DONE", Vec::<String>::new());
        for (n, owner) in owners.into_iter().enumerate() {
            board.containers[owner].items.push(format!("i{n}").into());
        }
        board
    })
}

fn item_set(board: &Board) -> BTreeSet<String> {
    board
        .containers
        .iter()
        .flat_map(|c| c.items.iter().map(ToString::to_string))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// At-most-once under storms
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn storms_commit_at_most_once_per_gesture(
        board in board_strategy(),
        pattern in pattern_strategy(),
        seed in any::<u64>(),
        cooldown_ms in 0u64..200,
    ) {
        let storm = generate_storm(&StormConfig::new(pattern, seed), &board);
        let store = MemoryStore::with_identity(board.clone()).unwrap();
        let config = DragConfig::default().with_cooldown_ms(cooldown_ms);
        let mut ctl = DragSessionController::new(&store, config);
        let report = replay(&mut ctl, &storm.gestures, Instant::now());

        let commits = report
            .steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Committed { .. }))
            .count();
        prop_assert_eq!(store.log().len(), commits);
        prop_assert_eq!(store.rejected(), 0);
        prop_assert!(commits <= storm.end_count());
        prop_assert_eq!(ctl.commits() as usize, commits);

        let after = store.snapshot();
        prop_assert_eq!(after.validate(), Ok(()));
        prop_assert_eq!(item_set(&after), item_set(&board));
    }

    #[test]
    fn unknown_id_storms_never_commit(
        board in board_strategy(),
        count in 1usize..30,
        seed in any::<u64>(),
    ) {
        let storm = generate_storm(
            &StormConfig::new(StormPattern::UnknownIds { count }, seed),
            &board,
        );
        let store = MemoryStore::with_identity(board).unwrap();
        let mut ctl = DragSessionController::new(&store, DragConfig::default());
        let report = replay(&mut ctl, &storm.gestures, Instant::now());

        prop_assert_eq!(report.summary().commits, 0);
        prop_assert!(store.log().is_empty());
    }

    #[test]
    fn duplicate_ends_add_no_mutations(
        board in board_strategy(),
        count in 1usize..30,
        seed in any::<u64>(),
    ) {
        let storm = generate_storm(
            &StormConfig::new(StormPattern::DuplicateEnds { count }, seed),
            &board,
        );
        let store = MemoryStore::with_identity(board).unwrap();
        let mut ctl = DragSessionController::new(&store, DragConfig::default());
        replay(&mut ctl, &storm.gestures, Instant::now());

        // Every second end arrives while idle.
        prop_assert!(store.log().len() <= count);
    }
}
