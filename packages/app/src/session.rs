//! Learner session
//!
//! Owns the one live [`AppState`]. Screens change it only through
//! [`LearnerSession::apply`], which runs the progression reducer and then
//! persists the full document. A failed save never rolls back the in-memory
//! state; it only shows up in the save indicator.

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use kids_core::avatars::find_avatar;
use kids_core::progression::{self, check_daily_login, default_state, ProgressionResult};
use kids_core::{Action, ActionContext, AppState, ProgressionError, SoundEffect, UnlockPolicy};

use crate::capabilities::Capabilities;
use crate::store::{LoadSource, SaveIndicator, SaveStatus, StateStore};

pub struct LearnerSession {
    state: AppState,
    store: StateStore,
    policy: UnlockPolicy,
    capabilities: Capabilities,
    indicator: SaveIndicator,
    source: LoadSource,
    bonus_pending: bool,
}

impl LearnerSession {
    /// Loads, reconciles, runs the daily check-in for `today` and saves.
    pub fn open(store: StateStore, capabilities: Capabilities, today: NaiveDate) -> Self {
        let policy = store.policy();
        let loaded = store.load();
        let login = check_daily_login(&loaded.state, today);

        let mut session = Self {
            state: login.state,
            store,
            policy,
            capabilities,
            indicator: SaveIndicator::new(),
            source: loaded.source,
            bonus_pending: login.bonus_available,
        };
        info!(
            source = ?session.source,
            streak = session.state.streak_days,
            bonus = session.bonus_pending,
            "learner session opened"
        );
        session.persist();
        session
    }

    /// [`open`](Self::open) with the local calendar date.
    pub fn open_today(store: StateStore, capabilities: Capabilities) -> Self {
        Self::open(store, capabilities, chrono::Local::now().date_naive())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn policy(&self) -> UnlockPolicy {
        self.policy
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn load_source(&self) -> LoadSource {
        self.source
    }

    pub fn bonus_pending(&self) -> bool {
        self.bonus_pending
    }

    pub fn save_status(&self) -> &SaveStatus {
        self.indicator.status()
    }

    pub fn speak(&self, text: &str) {
        self.capabilities.speak(text);
    }

    pub fn play(&self, effect: SoundEffect) {
        self.capabilities.play(effect);
    }

    /// Applies one progression operation and persists the result.
    pub fn apply(&mut self, action: Action) -> ProgressionResult<&AppState> {
        let ctx = ActionContext { policy: self.policy, now_ms: Utc::now().timestamp_millis() };
        let next = progression::reduce(&self.state, &action, ctx)?;
        if next != self.state {
            self.state = next;
            self.persist();
        }
        Ok(&self.state)
    }

    /// Applies a reward or bookkeeping action raised by a screen. A rejected
    /// action is logged and leaves the state untouched.
    pub fn apply_or_warn(&mut self, action: Action) -> bool {
        match self.apply(action.clone()) {
            Ok(_) => true,
            Err(err) => {
                warn!(?action, error = %err, "progression action rejected");
                false
            }
        }
    }

    /// Pays the daily reward once per check-in. Returns whether coins were added.
    pub fn claim_daily_bonus(&mut self) -> bool {
        if !self.bonus_pending {
            return false;
        }
        if self.apply(Action::ClaimDailyBonus).is_err() {
            return false;
        }
        self.bonus_pending = false;
        self.play(SoundEffect::Coin);
        true
    }

    /// Buys (or re-equips) a catalog avatar at its listed price.
    pub fn buy_avatar(&mut self, avatar_id: &str) -> ProgressionResult<()> {
        let avatar = find_avatar(avatar_id).ok_or_else(|| ProgressionError::UnknownAvatar(avatar_id.to_string()))?;
        let already_owned = self.state.owns_avatar(avatar_id);
        let purchase = Action::PurchaseAvatar { avatar_id: avatar.id.to_string(), price: avatar.price };
        match self.apply(purchase).map(|_| ()) {
            Ok(()) => {
                self.play(if already_owned { SoundEffect::Click } else { SoundEffect::Coin });
                Ok(())
            }
            Err(err) => {
                self.play(SoundEffect::Wrong);
                Err(err)
            }
        }
    }

    /// Drops the stored document and starts over from defaults.
    pub fn reset(&mut self) {
        if let Err(err) = self.store.reset() {
            warn!(error = %err, "failed to clear stored progress");
        }
        self.state = default_state(self.policy);
        self.bonus_pending = false;
        info!("learner progress reset");
    }

    fn persist(&mut self) {
        let seq = self.indicator.begin();
        let outcome = self.store.save(&self.state).map_err(|err| {
            warn!(error = %err, "failed to save progress, keeping in-memory state");
            err.to_string()
        });
        self.indicator.complete(seq, outcome, Utc::now());
    }
}
