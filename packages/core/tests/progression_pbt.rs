//! Property-Based Tests for the Progression Engine
//!
//! Tests the following invariants:
//! - Coins never go negative; overspending fails without mutation
//! - Mistakes hold at most one record per word
//! - totalStars always equals the sum of completed unit ratings
//! - Reconciliation is idempotent and never shrinks unlocked units
//! - Documents survive a JSON round-trip through the store format

use proptest::prelude::*;

use kids_core::progression::{
    add_coin, complete_unit, default_state, reconcile, record_mistake, resolve_mistake, spend_coin,
    UnlockPolicy,
};
use kids_core::state::AppState;
use kids_core::syllabus;

// ============================================================================
// Arbitrary Generators
// ============================================================================

#[derive(Debug, Clone)]
enum CoinOp {
    Add(u32),
    Spend(u32),
}

fn arb_coin_op() -> impl Strategy<Value = CoinOp> {
    prop_oneof![
        (0u32..=200).prop_map(CoinOp::Add),
        (0u32..=400).prop_map(CoinOp::Spend),
    ]
}

#[derive(Debug, Clone)]
enum MistakeOp {
    Record(String, String),
    Resolve(String),
}

fn arb_word() -> impl Strategy<Value = String> {
    prop_oneof![Just("cat"), Just("dog"), Just("Cat"), Just("pear"), Just("cave")].prop_map(String::from)
}

fn arb_mistake_op() -> impl Strategy<Value = MistakeOp> {
    prop_oneof![
        3 => (arb_word(), prop_oneof![Just("starters-1"), Just("mixed")].prop_map(String::from))
            .prop_map(|(w, u)| MistakeOp::Record(w, u)),
        1 => arb_word().prop_map(MistakeOp::Resolve),
    ]
}

fn arb_unit_id() -> impl Strategy<Value = &'static str> {
    let ids: Vec<&'static str> = syllabus::unit_ids().collect();
    proptest::sample::select(ids)
}

fn arb_policy() -> impl Strategy<Value = UnlockPolicy> {
    prop_oneof![Just(UnlockPolicy::AllUnlocked), Just(UnlockPolicy::Gated)]
}

fn arb_loaded_state() -> impl Strategy<Value = AppState> {
    (
        proptest::collection::vec(arb_unit_id(), 0..6),
        proptest::collection::vec((arb_unit_id(), 0u8..=9), 0..6),
        proptest::collection::vec(arb_word(), 0..6),
        proptest::collection::vec(prop_oneof![Just("lion"), Just("girl"), Just("")].prop_map(String::from), 0..4),
        prop_oneof![Just("lion"), Just("student"), Just("ghost"), Just("")].prop_map(String::from),
    )
        .prop_map(|(unlocked, completed, mistakes, avatars, current)| {
            let mut state = AppState::blank();
            state.progress.unlocked_units = unlocked.into_iter().map(String::from).collect();
            for (id, stars) in completed {
                state.progress.completed_units.insert(id.to_string(), stars);
            }
            for (i, word) in mistakes.into_iter().enumerate() {
                state.progress.mistakes.push(kids_core::MistakeRecord {
                    word,
                    unit_id: "starters-1".into(),
                    timestamp: i as i64,
                });
            }
            state.unlocked_avatars = avatars;
            state.current_avatar = current;
            state
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_coins_never_negative(ops in proptest::collection::vec(arb_coin_op(), 0..50)) {
        let mut state = default_state(UnlockPolicy::AllUnlocked);
        for op in ops {
            match op {
                CoinOp::Add(amount) => state = add_coin(&state, amount),
                CoinOp::Spend(amount) => match spend_coin(&state, amount) {
                    Ok(next) => {
                        prop_assert_eq!(next.coins, state.coins - amount);
                        state = next;
                    }
                    Err(_) => prop_assert!(state.coins < amount),
                },
            }
        }
    }

    #[test]
    fn prop_one_record_per_word(ops in proptest::collection::vec(arb_mistake_op(), 0..40)) {
        let mut state = default_state(UnlockPolicy::AllUnlocked);
        for (now, op) in ops.into_iter().enumerate() {
            state = match op {
                MistakeOp::Record(word, unit) => record_mistake(&state, &word, &unit, now as i64),
                MistakeOp::Resolve(word) => resolve_mistake(&state, &word),
            };
            let mut words: Vec<&str> = state.progress.mistakes.iter().map(|m| m.word.as_str()).collect();
            let total = words.len();
            words.sort();
            words.dedup();
            prop_assert_eq!(words.len(), total);
        }
    }

    #[test]
    fn prop_total_stars_matches_ratings(
        completions in proptest::collection::vec((arb_unit_id(), 0u8..=5), 0..30),
        policy in arb_policy(),
    ) {
        let mut state = default_state(policy);
        for (unit, stars) in completions {
            state = complete_unit(&state, unit, stars, policy).unwrap();
            prop_assert_eq!(state.progress.total_stars, state.progress.star_sum());
            prop_assert!(state.progress.completed_units.values().all(|&s| s <= 3));
        }
    }

    #[test]
    fn prop_reconcile_idempotent_and_monotonic(loaded in arb_loaded_state(), policy in arb_policy()) {
        let once = reconcile(&loaded, policy);
        let twice = reconcile(&once, policy);
        prop_assert_eq!(&once, &twice);
        prop_assert!(loaded.progress.unlocked_units.is_subset(&once.progress.unlocked_units));
        prop_assert!(once.owns_avatar(&once.current_avatar));
        prop_assert!(once.owns_avatar("student") && once.owns_avatar("girl"));
        prop_assert_eq!(once.progress.total_stars, once.progress.star_sum());
        if policy == UnlockPolicy::AllUnlocked {
            prop_assert!(syllabus::unit_ids().all(|id| once.progress.is_unlocked(id)));
        }
    }

    #[test]
    fn prop_document_json_round_trip(loaded in arb_loaded_state(), policy in arb_policy()) {
        let state = reconcile(&loaded, policy);
        let json = serde_json::to_string(&state).unwrap();
        let restored: AppState = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(state, restored);
    }
}
