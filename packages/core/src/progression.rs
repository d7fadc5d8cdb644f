//! Progression Engine
//!
//! Pure state transitions over [`AppState`]. Every operation borrows the
//! current document and returns a new one; failures leave the caller's
//! document untouched. Nothing here performs I/O or reads the clock, so the
//! caller passes `today` / `now_ms` in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::avatars::{DEFAULT_AVATAR, DEFAULT_AVATARS};
use crate::state::{AppState, MistakeRecord};
use crate::syllabus;
use crate::types::{Level, Tab, COINS_PER_STAR, DAILY_BONUS_COINS, MAX_STARS};

pub const LOGIN_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    #[error("not enough coins: need {needed}, have {available}")]
    InsufficientFunds { needed: u32, available: u32 },
    #[error("avatar not owned: {0}")]
    NotOwned(String),
    #[error("unknown avatar: {0}")]
    UnknownAvatar(String),
    #[error("unknown unit: {0}")]
    UnknownUnit(String),
}

pub type ProgressionResult<T> = Result<T, ProgressionError>;

/// How units become accessible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnlockPolicy {
    /// Every catalog unit is open from the start (preview build behavior).
    #[default]
    AllUnlocked,
    /// First unit of each level is open; completing a unit opens the next one.
    Gated,
}

// ==================== Reconciliation ====================

/// Starting document for a new learner.
pub fn default_state(policy: UnlockPolicy) -> AppState {
    reconcile(&AppState::blank(), policy)
}

/// Repairs a loaded document against the current catalogs.
///
/// Unlocked units only ever grow. Running it twice yields the same document.
pub fn reconcile(loaded: &AppState, policy: UnlockPolicy) -> AppState {
    let mut state = loaded.clone();

    match policy {
        UnlockPolicy::AllUnlocked => {
            state
                .progress
                .unlocked_units
                .extend(syllabus::unit_ids().map(str::to_string));
        }
        UnlockPolicy::Gated => {
            for level in Level::ALL {
                if let Some(first) = syllabus::first_unit(level) {
                    state.progress.unlocked_units.insert(first.id.to_string());
                }
            }
            let completed: Vec<String> = state.progress.completed_units.keys().cloned().collect();
            for unit_id in completed {
                if let Some(next) = syllabus::next_unit(&unit_id) {
                    state.progress.unlocked_units.insert(next.id.to_string());
                }
            }
        }
    }

    for stars in state.progress.completed_units.values_mut() {
        *stars = (*stars).min(MAX_STARS);
    }
    state.progress.total_stars = state.progress.star_sum();

    let mut seen = std::collections::HashSet::new();
    state.progress.mistakes.retain(|m| seen.insert(m.word.clone()));

    let mut avatars: Vec<String> = Vec::with_capacity(state.unlocked_avatars.len() + 2);
    for id in DEFAULT_AVATARS.iter().map(|a| a.to_string()).chain(state.unlocked_avatars.drain(..)) {
        if !id.trim().is_empty() && !avatars.contains(&id) {
            avatars.push(id);
        }
    }
    state.unlocked_avatars = avatars;

    if state.current_avatar.trim().is_empty() || !state.owns_avatar(&state.current_avatar) {
        state.current_avatar = DEFAULT_AVATAR.to_string();
    }

    state
}

// ==================== Daily login ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyLogin {
    pub state: AppState,
    pub bonus_available: bool,
}

/// Advances the login streak for a session starting on `today`.
pub fn check_daily_login(state: &AppState, today: NaiveDate) -> DailyLogin {
    let today_str = today.format(LOGIN_DATE_FORMAT).to_string();
    if state.last_login_date == today_str {
        return DailyLogin { state: state.clone(), bonus_available: false };
    }

    let last = NaiveDate::parse_from_str(&state.last_login_date, LOGIN_DATE_FORMAT).ok();
    let continues_streak = matches!((last, today.pred_opt()), (Some(l), Some(y)) if l == y);

    let mut next = state.clone();
    next.streak_days = if continues_streak { state.streak_days.saturating_add(1) } else { 1 };
    next.last_login_date = today_str;

    DailyLogin { state: next, bonus_available: true }
}

/// Adds the daily reward. Streak fields are not touched.
pub fn claim_daily_bonus(state: &AppState) -> AppState {
    add_coin(state, DAILY_BONUS_COINS)
}

// ==================== Coins ====================

pub fn add_coin(state: &AppState, amount: u32) -> AppState {
    let mut next = state.clone();
    next.coins = next.coins.saturating_add(amount);
    next
}

pub fn spend_coin(state: &AppState, amount: u32) -> ProgressionResult<AppState> {
    if state.coins < amount {
        return Err(ProgressionError::InsufficientFunds { needed: amount, available: state.coins });
    }
    let mut next = state.clone();
    next.coins -= amount;
    Ok(next)
}

// ==================== Units ====================

pub fn unlock_unit(state: &AppState, unit_id: &str) -> ProgressionResult<AppState> {
    if !syllabus::is_known_unit(unit_id) {
        return Err(ProgressionError::UnknownUnit(unit_id.to_string()));
    }
    let mut next = state.clone();
    next.progress.unlocked_units.insert(unit_id.to_string());
    Ok(next)
}

/// Records a finished unit.
///
/// The rating overwrites any earlier one and `total_stars` is recomputed from
/// the ratings map, so replays never inflate it. Coins are paid for every
/// completion event.
pub fn complete_unit(
    state: &AppState,
    unit_id: &str,
    stars: u8,
    policy: UnlockPolicy,
) -> ProgressionResult<AppState> {
    if !syllabus::is_known_unit(unit_id) {
        return Err(ProgressionError::UnknownUnit(unit_id.to_string()));
    }
    let stars = stars.min(MAX_STARS);

    let mut next = state.clone();
    next.progress.completed_units.insert(unit_id.to_string(), stars);
    next.progress.total_stars = next.progress.star_sum();
    next.coins = next.coins.saturating_add(u32::from(stars) * COINS_PER_STAR);

    if policy == UnlockPolicy::Gated {
        if let Some(following) = syllabus::next_unit(unit_id) {
            next.progress.unlocked_units.insert(following.id.to_string());
        }
    }
    Ok(next)
}

// ==================== Mistakes ====================

/// Appends a mistake unless the exact word is already tracked.
pub fn record_mistake(state: &AppState, word: &str, unit_id: &str, now_ms: i64) -> AppState {
    if state.progress.has_mistake(word) {
        return state.clone();
    }
    let mut next = state.clone();
    next.progress.mistakes.push(MistakeRecord {
        word: word.to_string(),
        unit_id: unit_id.to_string(),
        timestamp: now_ms,
    });
    next
}

pub fn resolve_mistake(state: &AppState, word: &str) -> AppState {
    let mut next = state.clone();
    next.progress.mistakes.retain(|m| m.word != word);
    next
}

// ==================== Avatars ====================

/// Buys and equips an avatar. Buying one already owned only re-equips it.
pub fn purchase_avatar(state: &AppState, avatar_id: &str, price: u32) -> ProgressionResult<AppState> {
    if state.owns_avatar(avatar_id) {
        return equip_avatar(state, avatar_id);
    }
    let mut next = spend_coin(state, price)?;
    next.unlocked_avatars.push(avatar_id.to_string());
    next.current_avatar = avatar_id.to_string();
    Ok(next)
}

pub fn equip_avatar(state: &AppState, avatar_id: &str) -> ProgressionResult<AppState> {
    if !state.owns_avatar(avatar_id) {
        return Err(ProgressionError::NotOwned(avatar_id.to_string()));
    }
    let mut next = state.clone();
    next.current_avatar = avatar_id.to_string();
    Ok(next)
}

// ==================== Selectors ====================

pub fn set_level(state: &AppState, level: Level) -> AppState {
    let mut next = state.clone();
    next.level = level;
    next
}

pub fn set_tab(state: &AppState, tab: Tab) -> AppState {
    let mut next = state.clone();
    next.current_tab = tab;
    next
}

// ==================== Dispatch ====================

/// Named operations the presentation layer may request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetTab(Tab),
    SetLevel(Level),
    AddCoins(u32),
    SpendCoins(u32),
    ClaimDailyBonus,
    UnlockUnit { unit_id: String },
    CompleteUnit { unit_id: String, stars: u8 },
    RecordMistake { word: String, unit_id: String },
    ResolveMistake { word: String },
    PurchaseAvatar { avatar_id: String, price: u32 },
    EquipAvatar { avatar_id: String },
}

#[derive(Debug, Clone, Copy)]
pub struct ActionContext {
    pub policy: UnlockPolicy,
    pub now_ms: i64,
}

pub fn reduce(state: &AppState, action: &Action, ctx: ActionContext) -> ProgressionResult<AppState> {
    match action {
        Action::SetTab(tab) => Ok(set_tab(state, *tab)),
        Action::SetLevel(level) => Ok(set_level(state, *level)),
        Action::AddCoins(amount) => Ok(add_coin(state, *amount)),
        Action::SpendCoins(amount) => spend_coin(state, *amount),
        Action::ClaimDailyBonus => Ok(claim_daily_bonus(state)),
        Action::UnlockUnit { unit_id } => unlock_unit(state, unit_id),
        Action::CompleteUnit { unit_id, stars } => complete_unit(state, unit_id, *stars, ctx.policy),
        Action::RecordMistake { word, unit_id } => Ok(record_mistake(state, word, unit_id, ctx.now_ms)),
        Action::ResolveMistake { word } => Ok(resolve_mistake(state, word)),
        Action::PurchaseAvatar { avatar_id, price } => purchase_avatar(state, avatar_id, *price),
        Action::EquipAvatar { avatar_id } => equip_avatar(state, avatar_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::STARTING_COINS;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, LOGIN_DATE_FORMAT).unwrap()
    }

    fn fresh() -> AppState {
        default_state(UnlockPolicy::AllUnlocked)
    }

    #[test]
    fn test_default_state_unlocks_everything() {
        let state = fresh();
        assert_eq!(state.coins, STARTING_COINS);
        assert_eq!(state.progress.unlocked_units.len(), syllabus::all_units().len());
        assert_eq!(state.current_avatar, "student");
        assert!(state.progress.mistakes.is_empty());
    }

    #[test]
    fn test_gated_default_opens_first_unit_per_level() {
        let state = default_state(UnlockPolicy::Gated);
        let unlocked: Vec<&str> = state.progress.unlocked_units.iter().map(String::as_str).collect();
        assert_eq!(unlocked, vec!["flyers-1", "movers-1", "starters-1"]);
    }

    #[test]
    fn test_reconcile_adds_new_units_and_is_idempotent() {
        let mut old = AppState::blank();
        old.progress.unlocked_units.insert("starters-1".into());
        old.progress.unlocked_units.insert("retired-unit".into());

        let once = reconcile(&old, UnlockPolicy::AllUnlocked);
        let twice = reconcile(&once, UnlockPolicy::AllUnlocked);
        assert_eq!(once, twice);
        assert!(syllabus::unit_ids().all(|id| once.progress.is_unlocked(id)));
        // Never shrinks, even for ids the catalog no longer lists.
        assert!(once.progress.is_unlocked("retired-unit"));
    }

    #[test]
    fn test_reconcile_repairs_avatars_and_stars() {
        let mut old = AppState::blank();
        old.unlocked_avatars = vec!["lion".into(), "lion".into()];
        old.current_avatar = "robot".into();
        old.progress.completed_units.insert("starters-1".into(), 7);
        old.progress.total_stars = 40;

        let state = reconcile(&old, UnlockPolicy::Gated);
        assert_eq!(state.unlocked_avatars, vec!["student", "girl", "lion"]);
        assert_eq!(state.current_avatar, "student");
        assert_eq!(state.progress.stars_for("starters-1"), Some(3));
        assert_eq!(state.progress.total_stars, 3);
        assert!(state.progress.is_unlocked("starters-2"));
    }

    #[test]
    fn test_daily_login_same_day_is_noop() {
        let mut state = fresh();
        state.last_login_date = "2025-03-10".into();
        state.streak_days = 5;
        let login = check_daily_login(&state, date("2025-03-10"));
        assert!(!login.bonus_available);
        assert_eq!(login.state, state);
    }

    #[test]
    fn test_daily_login_yesterday_extends_streak() {
        let mut state = fresh();
        state.last_login_date = "2025-02-28".into();
        state.streak_days = 5;
        let login = check_daily_login(&state, date("2025-03-01"));
        assert!(login.bonus_available);
        assert_eq!(login.state.streak_days, 6);
        assert_eq!(login.state.last_login_date, "2025-03-01");
        assert_eq!(login.state.coins, state.coins);
    }

    #[test]
    fn test_daily_login_gap_resets_streak() {
        let mut state = fresh();
        state.last_login_date = "2025-03-01".into();
        state.streak_days = 9;
        let login = check_daily_login(&state, date("2025-03-11"));
        assert!(login.bonus_available);
        assert_eq!(login.state.streak_days, 1);

        let first_run = check_daily_login(&fresh(), date("2025-03-11"));
        assert_eq!(first_run.state.streak_days, 1);
        assert!(first_run.bonus_available);
    }

    #[test]
    fn test_claim_bonus_leaves_streak() {
        let login = check_daily_login(&fresh(), date("2025-03-11"));
        let claimed = claim_daily_bonus(&login.state);
        assert_eq!(claimed.coins, STARTING_COINS + DAILY_BONUS_COINS);
        assert_eq!(claimed.streak_days, login.state.streak_days);
        assert_eq!(claimed.last_login_date, login.state.last_login_date);
    }

    #[test]
    fn test_spend_beyond_balance_fails_without_change() {
        let state = fresh();
        let err = spend_coin(&state, 101).unwrap_err();
        assert_eq!(err, ProgressionError::InsufficientFunds { needed: 101, available: 100 });
        assert_eq!(spend_coin(&state, 100).unwrap().coins, 0);
    }

    #[test]
    fn test_complete_unit_on_fresh_progress() {
        let state = complete_unit(&fresh(), "starters-1", 3, UnlockPolicy::AllUnlocked).unwrap();
        assert_eq!(state.progress.stars_for("starters-1"), Some(3));
        assert_eq!(state.progress.total_stars, 3);
        assert_eq!(state.coins, 130);
    }

    #[test]
    fn test_replaying_unit_overwrites_rating() {
        let once = complete_unit(&fresh(), "starters-1", 3, UnlockPolicy::AllUnlocked).unwrap();
        let again = complete_unit(&once, "starters-1", 1, UnlockPolicy::AllUnlocked).unwrap();
        assert_eq!(again.progress.stars_for("starters-1"), Some(1));
        assert_eq!(again.progress.total_stars, 1);
        assert_eq!(again.coins, 140);
    }

    #[test]
    fn test_complete_unit_gated_unlocks_next() {
        let state = default_state(UnlockPolicy::Gated);
        assert!(!state.progress.is_unlocked("movers-2"));
        let state = complete_unit(&state, "movers-1", 2, UnlockPolicy::Gated).unwrap();
        assert!(state.progress.is_unlocked("movers-2"));
        assert!(complete_unit(&state, "space-9", 3, UnlockPolicy::Gated).is_err());
    }

    #[test]
    fn test_record_mistake_is_idempotent_per_word() {
        let state = record_mistake(&fresh(), "cow", "starters-1", 1);
        let state = record_mistake(&state, "cow", "mixed", 2);
        assert_eq!(state.progress.mistakes.len(), 1);
        assert_eq!(state.progress.mistakes[0].unit_id, "starters-1");

        let state = record_mistake(&state, "Cow", "starters-1", 3);
        assert_eq!(state.progress.mistakes.len(), 2);
    }

    #[test]
    fn test_resolve_then_record_refreshes_timestamp() {
        let state = record_mistake(&fresh(), "pear", "starters-2", 10);
        let state = resolve_mistake(&state, "pear");
        assert!(state.progress.mistakes.is_empty());
        let state = record_mistake(&state, "pear", "starters-2", 20);
        assert_eq!(state.progress.mistakes.len(), 1);
        assert_eq!(state.progress.mistakes[0].timestamp, 20);
        assert_eq!(resolve_mistake(&state, "plum"), state);
    }

    #[test]
    fn test_purchase_avatar_charges_once() {
        let state = purchase_avatar(&fresh(), "lion", 50).unwrap();
        assert_eq!(state.coins, 50);
        assert!(state.owns_avatar("lion"));
        assert_eq!(state.current_avatar, "lion");

        let equipped_other = equip_avatar(&state, "girl").unwrap();
        let again = purchase_avatar(&equipped_other, "lion", 50).unwrap();
        assert_eq!(again.coins, 50);
        assert_eq!(again.current_avatar, "lion");
        assert_eq!(again.unlocked_avatars.iter().filter(|a| *a == "lion").count(), 1);
    }

    #[test]
    fn test_purchase_without_funds_is_rejected() {
        let err = purchase_avatar(&fresh(), "robot", 250).unwrap_err();
        assert!(matches!(err, ProgressionError::InsufficientFunds { needed: 250, available: 100 }));
    }

    #[test]
    fn test_equip_requires_ownership() {
        let err = equip_avatar(&fresh(), "dino").unwrap_err();
        assert_eq!(err, ProgressionError::NotOwned("dino".into()));
    }

    #[test]
    fn test_reduce_dispatches() {
        let ctx = ActionContext { policy: UnlockPolicy::AllUnlocked, now_ms: 99 };
        let state = reduce(&fresh(), &Action::SetLevel(Level::Flyers), ctx).unwrap();
        let state = reduce(
            &state,
            &Action::RecordMistake { word: "cave".into(), unit_id: "flyers-2".into() },
            ctx,
        )
        .unwrap();
        assert_eq!(state.level, Level::Flyers);
        assert_eq!(state.progress.mistakes[0].timestamp, 99);
        assert!(reduce(&state, &Action::SpendCoins(1_000), ctx).is_err());
    }
}
