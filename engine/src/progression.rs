use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::encounter::{AttackOutcome, AttackTier, EncounterSession};
use crate::ChapterId;

pub const DEFAULT_STARTING_XP: u32 = 100;
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Anything XP can be spent from or paid into.
pub trait XpWallet {
    fn balance(&self) -> u32;

    fn credit(&mut self, amount: u32);

    /// Remove up to `amount` XP, never going below zero. Returns what was actually removed.
    fn debit(&mut self, amount: u32) -> u32;
}

/// Durable campaign progress for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "StoredProgression")]
pub struct ProgressionState {
    xp_balance: u32,
    unlocked_chapters: BTreeSet<ChapterId>,
    player_name: String,
    avatar: Option<String>,
    /// The fight in progress, or the last one won. Only the engine advances it.
    #[serde(skip_serializing_if = "Option::is_none")]
    active_encounter: Option<EncounterSession>,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
struct StoredProgression {
    xp_balance: u32,
    #[serde(default)]
    unlocked_chapters: BTreeSet<ChapterId>,
    #[serde(default = "default_player_name")]
    player_name: String,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    active_encounter: Option<EncounterSession>,
}

fn default_player_name() -> String {
    DEFAULT_PLAYER_NAME.to_string()
}

impl From<StoredProgression> for ProgressionState {
    fn from(stored: StoredProgression) -> Self {
        let mut unlocked_chapters = stored.unlocked_chapters;
        // Chapter 1 is always playable, even if an older save forgot it.
        unlocked_chapters.insert(ChapterId::FIRST);
        Self {
            xp_balance: stored.xp_balance,
            unlocked_chapters,
            player_name: stored.player_name,
            avatar: stored.avatar,
            active_encounter: stored.active_encounter,
        }
    }
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_XP)
    }
}

impl ProgressionState {
    pub fn new(starting_xp: u32) -> Self {
        Self {
            xp_balance: starting_xp,
            unlocked_chapters: BTreeSet::from([ChapterId::FIRST]),
            player_name: default_player_name(),
            avatar: None,
            active_encounter: None,
        }
    }

    pub fn xp_balance(&self) -> u32 {
        self.xp_balance
    }

    pub fn unlocked_chapters(&self) -> &BTreeSet<ChapterId> {
        &self.unlocked_chapters
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn credit(&mut self, amount: u32) {
        self.xp_balance = self.xp_balance.saturating_add(amount);
    }

    pub fn debit(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.xp_balance);
        self.xp_balance -= taken;
        taken
    }

    /// Returns true when the chapter was not unlocked before.
    pub fn unlock(&mut self, chapter: ChapterId) -> bool {
        self.unlocked_chapters.insert(chapter)
    }

    pub fn is_unlocked(&self, chapter: ChapterId) -> bool {
        self.unlocked_chapters.contains(&chapter)
    }

    /// Back to `{ xp_balance: starting_xp, unlocked: {1} }` with no encounter. Profile
    /// fields are kept.
    pub fn reset(&mut self, starting_xp: u32) {
        self.xp_balance = starting_xp;
        self.unlocked_chapters = BTreeSet::from([ChapterId::FIRST]);
        self.active_encounter = None;
    }

    pub fn active_encounter(&self) -> Option<&EncounterSession> {
        self.active_encounter.as_ref()
    }

    /// Replace the active encounter.
    pub fn set_active_encounter(&mut self, session: Option<EncounterSession>) {
        self.active_encounter = session;
    }

    /// Attack the active encounter, paying from this state's balance.
    /// `None` when no encounter was started.
    pub fn attack_active(&mut self, tier: AttackTier) -> Option<AttackOutcome> {
        let mut session = self.active_encounter.take()?;
        let outcome = session.attack(tier, self);
        self.active_encounter = Some(session);
        Some(outcome)
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = name.into();
    }

    pub fn set_avatar(&mut self, avatar: Option<String>) {
        self.avatar = avatar;
    }
}

impl XpWallet for ProgressionState {
    fn balance(&self) -> u32 {
        self.xp_balance
    }

    fn credit(&mut self, amount: u32) {
        ProgressionState::credit(self, amount);
    }

    fn debit(&mut self, amount: u32) -> u32 {
        ProgressionState::debit(self, amount)
    }
}
