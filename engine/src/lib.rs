use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod campaign;
pub mod catalogue;
pub mod config;
pub mod encounter;
pub mod error;
pub mod progression;
pub mod quests;
pub mod storage;
pub mod store;
pub mod story;

pub use campaign::{begin_encounter, chapter_access, CampaignPolicy, ChapterAccess, EntryRefusal, NextStep};
pub use catalogue::{AdversaryLookup, Catalogue, Chapter, Narrative, Villain};
pub use config::EngineConfig;
pub use encounter::{
    Adversary, AttackOutcome, AttackTier, ChapterCompleted, EncounterSession, EncounterState,
    Refusal,
};
pub use error::{CatalogueError, EncounterError, InvalidChapterId, StorageError};
pub use progression::{ProgressionState, XpWallet};
pub use quests::{Quest, QuestBoard, QuestOutcome};
pub use storage::{JsonFileStorage, MemoryStorage, ProgressStorage};
pub use store::ProgressionStore;
pub use story::NarrativeCursor;

/// Identifier of a story chapter. Chapters are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterId(NonZeroU32);

impl ChapterId {
    pub const FIRST: ChapterId = ChapterId(NonZeroU32::MIN);

    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The chapter that follows this one, if the id space allows it.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChapterId {
    type Err = InvalidChapterId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(ChapterId::new)
            .ok_or_else(|| InvalidChapterId(s.to_string()))
    }
}

impl TryFrom<u32> for ChapterId {
    type Error = InvalidChapterId;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        ChapterId::new(value).ok_or_else(|| InvalidChapterId(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_zero_is_rejected() {
        assert!(ChapterId::new(0).is_none());
        assert_eq!("0".parse::<ChapterId>(), Err(InvalidChapterId("0".into())));
        assert!("-3".parse::<ChapterId>().is_err());
    }

    #[test]
    fn next_chapter_counts_up() {
        assert_eq!(ChapterId::FIRST.get(), 1);
        assert_eq!(ChapterId::FIRST.next(), ChapterId::new(2));
        assert_eq!(ChapterId::new(u32::MAX).and_then(ChapterId::next), None);
    }
}
