use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::encounter::{AttackOutcome, AttackTier, EncounterSession};
use crate::error::StorageError;
use crate::progression::{ProgressionState, XpWallet};
use crate::storage::ProgressStorage;
use crate::ChapterId;

/// Owns the player's [`ProgressionState`] and writes it through to storage.
///
/// Every mutation updates memory first, so reads always see the latest write. A failed
/// save is logged and remembered; the next mutation or [`ProgressionStore::flush`] retries it.
#[derive(Debug)]
pub struct ProgressionStore<S: ProgressStorage> {
    state: ProgressionState,
    storage: S,
    starting_xp: u32,
    dirty: bool,
}

impl<S: ProgressStorage> ProgressionStore<S> {
    /// Load saved progress, or start fresh with `starting_xp` and chapter 1 unlocked.
    pub fn open(mut storage: S, starting_xp: u32) -> Result<Self, StorageError> {
        let loaded = storage.load()?;
        let fresh = loaded.is_none();
        let state = loaded.unwrap_or_else(|| ProgressionState::new(starting_xp));
        let mut store = Self {
            state,
            storage,
            starting_xp,
            dirty: fresh,
        };
        if fresh {
            info!(starting_xp, "[STORE] new progression created");
            store.persist();
        }
        Ok(store)
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn starting_xp(&self) -> u32 {
        self.starting_xp
    }

    pub fn xp_balance(&self) -> u32 {
        self.state.xp_balance()
    }

    pub fn unlocked_chapters(&self) -> &BTreeSet<ChapterId> {
        self.state.unlocked_chapters()
    }

    pub fn is_unlocked(&self, chapter: ChapterId) -> bool {
        self.state.is_unlocked(chapter)
    }

    /// True while a mutation has not reached storage.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn credit(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        let before = self.state.xp_balance();
        self.state.credit(amount);
        debug!(amount, before, after = self.state.xp_balance(), "[XP] credit");
        self.persist();
    }

    pub fn debit(&mut self, amount: u32) -> u32 {
        if amount == 0 {
            return 0;
        }
        let before = self.state.xp_balance();
        let taken = self.state.debit(amount);
        debug!(amount, taken, before, after = self.state.xp_balance(), "[XP] debit");
        self.persist();
        taken
    }

    pub fn unlock(&mut self, chapter: ChapterId) -> bool {
        let added = self.state.unlock(chapter);
        if added {
            info!(%chapter, "[UNLOCK] chapter unlocked");
            self.persist();
        }
        added
    }

    pub fn reset(&mut self) {
        self.state.reset(self.starting_xp);
        info!(starting_xp = self.starting_xp, "[STORE] progression reset");
        self.persist();
    }

    pub fn active_encounter(&self) -> Option<&EncounterSession> {
        self.state.active_encounter()
    }

    /// Make `session` the encounter that [`ProgressionStore::attack_active`] advances,
    /// replacing any earlier one.
    pub fn track_encounter(&mut self, session: EncounterSession) {
        info!(
            chapter = %session.chapter(),
            villain = %session.adversary().name,
            "[STORE] encounter tracked"
        );
        self.state.set_active_encounter(Some(session));
        self.persist();
    }

    /// Attack the tracked encounter. The XP debit and the new adversary health are saved
    /// together. `None` when no encounter is tracked.
    pub fn attack_active(&mut self, tier: AttackTier) -> Option<AttackOutcome> {
        let outcome = self.state.attack_active(tier)?;
        debug!(
            tier = tier.label(),
            accepted = outcome.is_accepted(),
            after = self.state.xp_balance(),
            "[XP] attack"
        );
        self.persist();
        Some(outcome)
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.state.set_player_name(name);
        self.persist();
    }

    pub fn set_avatar(&mut self, avatar: Option<String>) {
        self.state.set_avatar(avatar);
        self.persist();
    }

    /// Retry any save that previously failed.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if self.dirty {
            self.storage.save(&self.state)?;
            self.dirty = false;
        }
        Ok(())
    }

    fn persist(&mut self) {
        match self.storage.save(&self.state) {
            Ok(()) => self.dirty = false,
            Err(e) => {
                warn!(error = %e, "[STORE] save failed; change kept in memory");
                self.dirty = true;
            }
        }
    }
}

impl<S: ProgressStorage> XpWallet for ProgressionStore<S> {
    fn balance(&self) -> u32 {
        self.xp_balance()
    }

    fn credit(&mut self, amount: u32) {
        ProgressionStore::credit(self, amount);
    }

    fn debit(&mut self, amount: u32) -> u32 {
        ProgressionStore::debit(self, amount)
    }
}
