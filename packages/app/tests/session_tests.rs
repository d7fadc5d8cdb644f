mod common;

use std::sync::Arc;

use common::{date, harness, open_with, TODAY};
use kids_app::capabilities::Capabilities;
use kids_app::session::LearnerSession;
use kids_app::store::{FileBackend, LoadSource, MemoryBackend, SaveStatus, StateStore, STORAGE_KEY};
use kids_core::progression::default_state;
use kids_core::{Action, AppState, ProgressionError, SoundEffect, UnlockPolicy};

#[test]
fn test_first_open_checks_in_and_saves() {
    let h = harness(UnlockPolicy::AllUnlocked);
    let state = h.session.state();
    assert_eq!(h.session.load_source(), LoadSource::Fresh);
    assert_eq!(state.last_login_date, TODAY);
    assert_eq!(state.streak_days, 1);
    assert_eq!(state.coins, 100);
    assert!(h.session.bonus_pending());
    assert!(matches!(h.session.save_status(), SaveStatus::Saved { .. }));

    let stored: AppState = serde_json::from_str(&h.backend.raw(STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(&stored, state);
}

#[test]
fn test_daily_bonus_is_paid_once() {
    let mut h = harness(UnlockPolicy::AllUnlocked);
    assert!(h.session.claim_daily_bonus());
    assert!(!h.session.claim_daily_bonus());
    assert_eq!(h.session.state().coins, 120);
    assert_eq!(h.sounds.count(SoundEffect::Coin), 1);

    let same_day = open_with(h.backend.clone(), UnlockPolicy::AllUnlocked, TODAY);
    assert_eq!(same_day.session.load_source(), LoadSource::Restored);
    assert!(!same_day.session.bonus_pending());
    assert_eq!(same_day.session.state().coins, 120);

    let next_day = open_with(h.backend.clone(), UnlockPolicy::AllUnlocked, "2025-03-11");
    assert!(next_day.session.bonus_pending());
    assert_eq!(next_day.session.state().streak_days, 2);

    let after_gap = open_with(h.backend, UnlockPolicy::AllUnlocked, "2025-03-20");
    assert_eq!(after_gap.session.state().streak_days, 1);
}

#[test]
fn test_failed_save_keeps_memory_state() {
    let mut h = harness(UnlockPolicy::AllUnlocked);
    let SaveStatus::Saved { at: opened_at } = h.session.save_status().clone() else {
        panic!("initial save should succeed");
    };

    h.backend.set_fail_writes(true);
    h.session.apply(Action::AddCoins(5)).unwrap();
    assert_eq!(h.session.state().coins, 105);
    match h.session.save_status() {
        SaveStatus::Failed { last_saved_at, .. } => assert_eq!(*last_saved_at, Some(opened_at)),
        other => panic!("expected failure, got {other:?}"),
    }

    h.backend.set_fail_writes(false);
    h.session.apply(Action::AddCoins(5)).unwrap();
    assert!(matches!(h.session.save_status(), SaveStatus::Saved { .. }));
    let stored: AppState = serde_json::from_str(&h.backend.raw(STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(stored.coins, 110);
}

#[test]
fn test_rejected_action_changes_nothing() {
    let mut h = harness(UnlockPolicy::AllUnlocked);
    let before = h.session.state().clone();
    let err = h.session.apply(Action::SpendCoins(500)).unwrap_err();
    assert_eq!(err, ProgressionError::InsufficientFunds { needed: 500, available: 100 });
    assert_eq!(h.session.state(), &before);

    let err = h.session.apply(Action::UnlockUnit { unit_id: "pirates-9".into() }).unwrap_err();
    assert_eq!(err, ProgressionError::UnknownUnit("pirates-9".into()));
}

#[test]
fn test_screen_actions_report_rejection() {
    let mut h = harness(UnlockPolicy::AllUnlocked);
    let before = h.session.state().clone();
    assert!(!h.session.apply_or_warn(Action::SpendCoins(500)));
    assert!(!h.session.apply_or_warn(Action::CompleteUnit { unit_id: "pirates-9".into(), stars: 3 }));
    assert_eq!(h.session.state(), &before);

    assert!(h.session.apply_or_warn(Action::AddCoins(2)));
    assert_eq!(h.session.state().coins, 102);
}

#[test]
fn test_avatar_shop_uses_catalog_price() {
    let mut h = harness(UnlockPolicy::AllUnlocked);
    h.session.buy_avatar("lion").unwrap();
    assert_eq!(h.session.state().coins, 50);
    assert_eq!(h.session.state().current_avatar, "lion");

    let err = h.session.buy_avatar("robot").unwrap_err();
    assert_eq!(err, ProgressionError::InsufficientFunds { needed: 250, available: 50 });
    assert_eq!(h.session.state().current_avatar, "lion");
    assert_eq!(h.sounds.count(SoundEffect::Wrong), 1);

    h.session.apply(Action::EquipAvatar { avatar_id: "girl".into() }).unwrap();
    h.session.buy_avatar("lion").unwrap();
    assert_eq!(h.session.state().coins, 50);
    assert_eq!(h.session.state().current_avatar, "lion");

    assert_eq!(h.session.buy_avatar("ghost"), Err(ProgressionError::UnknownAvatar("ghost".into())));
}

#[test]
fn test_gated_completion_unlocks_next_unit() {
    let mut h = harness(UnlockPolicy::Gated);
    assert!(!h.session.state().progress.is_unlocked("starters-2"));
    h.session
        .apply(Action::CompleteUnit { unit_id: "starters-1".into(), stars: 2 })
        .unwrap();
    let state = h.session.state();
    assert!(state.progress.is_unlocked("starters-2"));
    assert_eq!(state.progress.total_stars, 2);
    assert_eq!(state.coins, 120);
}

#[test]
fn test_reset_clears_storage() {
    let mut h = harness(UnlockPolicy::AllUnlocked);
    h.session
        .apply(Action::RecordMistake { word: "cat".into(), unit_id: "starters-1".into() })
        .unwrap();
    h.session.reset();
    assert!(h.backend.raw(STORAGE_KEY).is_none());
    assert_eq!(h.session.state(), &default_state(UnlockPolicy::AllUnlocked));
    assert!(!h.session.bonus_pending());
}

#[test]
fn test_corrupt_document_is_replaced() {
    let backend = Arc::new(MemoryBackend::with_entry(STORAGE_KEY, "]]garbage"));
    let h = open_with(backend.clone(), UnlockPolicy::AllUnlocked, TODAY);
    assert_eq!(h.session.load_source(), LoadSource::Recovered);
    let stored: AppState = serde_json::from_str(&backend.raw(STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(stored.coins, 100);
}

#[test]
fn test_progress_survives_restart_on_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let open = |today: &str| {
        let store = StateStore::new(Arc::new(FileBackend::new(dir.path())), UnlockPolicy::AllUnlocked);
        LearnerSession::open(store, Capabilities::default(), date(today))
    };

    let mut first = open(TODAY);
    first
        .apply(Action::CompleteUnit { unit_id: "flyers-2".into(), stars: 3 })
        .unwrap();
    first
        .apply(Action::RecordMistake { word: "cave".into(), unit_id: "flyers-2".into() })
        .unwrap();
    drop(first);

    let second = open(TODAY);
    assert_eq!(second.load_source(), LoadSource::Restored);
    assert_eq!(second.state().progress.stars_for("flyers-2"), Some(3));
    assert_eq!(second.state().coins, 130);
    assert_eq!(second.state().mistake_count(), 1);
}
