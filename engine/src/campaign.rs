use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::catalogue::{AdversaryLookup, Catalogue, Chapter};
use crate::encounter::{ChapterCompleted, EncounterSession};
use crate::error::EncounterError;
use crate::storage::ProgressStorage;
use crate::store::ProgressionStore;
use crate::ChapterId;

pub const DEFAULT_COMPLETION_BONUS: u32 = 50;

/// What the player is offered after winning a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "chapter", rename_all = "snake_case")]
pub enum NextStep {
    Chapter(ChapterId),
    CampaignComplete,
}

/// Reward rules applied when an encounter reports [`ChapterCompleted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignPolicy {
    pub completion_bonus: u32,
    pub final_chapter: ChapterId,
}

impl CampaignPolicy {
    pub fn new(final_chapter: ChapterId) -> Self {
        Self {
            completion_bonus: DEFAULT_COMPLETION_BONUS,
            final_chapter,
        }
    }

    /// Unlock the following chapter, pay the bonus, and say where to go next.
    pub fn apply<S: ProgressStorage>(
        &self,
        store: &mut ProgressionStore<S>,
        done: ChapterCompleted,
    ) -> NextStep {
        let next = done.chapter.next();
        if let Some(next) = next {
            store.unlock(next);
        }
        store.credit(self.completion_bonus);
        info!(
            chapter = %done.chapter,
            bonus = self.completion_bonus,
            balance = store.xp_balance(),
            "[CAMPAIGN] chapter rewarded"
        );
        match next {
            Some(next) if done.chapter < self.final_chapter => NextStep::Chapter(next),
            _ => NextStep::CampaignComplete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChapterAccess {
    Unlocked,
    /// Not unlocked yet, but the balance meets the chapter's requirement.
    Unlockable,
    Locked { required_xp: u32, missing_xp: u32 },
}

impl ChapterAccess {
    pub fn is_enterable(self) -> bool {
        !matches!(self, ChapterAccess::Locked { .. })
    }
}

pub fn chapter_access<S: ProgressStorage>(store: &ProgressionStore<S>, chapter: &Chapter) -> ChapterAccess {
    if store.is_unlocked(chapter.id) {
        return ChapterAccess::Unlocked;
    }
    let balance = store.xp_balance();
    if balance >= chapter.required_xp {
        ChapterAccess::Unlockable
    } else {
        ChapterAccess::Locked {
            required_xp: chapter.required_xp,
            missing_xp: chapter.required_xp - balance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryRefusal {
    #[error("chapter {chapter} does not exist")]
    UnknownChapter { chapter: ChapterId },
    #[error("chapter {chapter} is locked: {required_xp} XP required, {missing_xp} more needed")]
    Locked {
        chapter: ChapterId,
        required_xp: u32,
        missing_xp: u32,
    },
    #[error("chapter {chapter} has no villain to fight")]
    NoAdversary { chapter: ChapterId },
    #[error("chapter {chapter} cannot be fought: {reason}")]
    InvalidAdversary {
        chapter: ChapterId,
        reason: EncounterError,
    },
}

/// Open an encounter for `chapter` if the player may enter it, and track it in the store.
///
/// Entering an unlockable chapter unlocks it for good.
pub fn begin_encounter<S: ProgressStorage>(
    store: &mut ProgressionStore<S>,
    catalogue: &Catalogue,
    chapter: ChapterId,
) -> Result<EncounterSession, EntryRefusal> {
    let info = catalogue
        .chapter(chapter)
        .ok_or(EntryRefusal::UnknownChapter { chapter })?;
    let access = chapter_access(store, info);
    if let ChapterAccess::Locked {
        required_xp,
        missing_xp,
    } = access
    {
        return Err(EntryRefusal::Locked {
            chapter,
            required_xp,
            missing_xp,
        });
    }
    let AdversaryLookup::Found(adversary) = catalogue.adversary(chapter) else {
        return Err(EntryRefusal::NoAdversary { chapter });
    };
    let session = EncounterSession::new(chapter, adversary)
        .map_err(|reason| EntryRefusal::InvalidAdversary { chapter, reason })?;
    if access == ChapterAccess::Unlockable {
        store.unlock(chapter);
    }
    store.track_encounter(session.clone());
    Ok(session)
}
