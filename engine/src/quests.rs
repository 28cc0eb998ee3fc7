use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalogue::Catalogue;
use crate::progression::XpWallet;

/// A real-world action that earns XP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Quest {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub impact: String,
    pub xp_reward: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestOutcome {
    Credited { xp: u32 },
    AlreadyCompleted,
    UnknownQuest,
}

/// One day's quests; each pays out at most once per board.
#[derive(Debug, Clone, Default)]
pub struct QuestBoard {
    quests: IndexMap<u32, Quest>,
    completed: BTreeSet<u32>,
}

impl QuestBoard {
    pub fn new(quests: impl IntoIterator<Item = Quest>) -> Self {
        Self {
            quests: quests.into_iter().map(|q| (q.id, q)).collect(),
            completed: BTreeSet::new(),
        }
    }

    /// The catalogue's daily quests, none completed yet.
    pub fn daily(catalogue: &Catalogue) -> Self {
        Self::new(catalogue.quests().iter().cloned())
    }

    /// Rebuild a board whose completions were tracked elsewhere. Unknown ids are ignored.
    pub fn with_completed(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        for id in ids {
            if self.quests.contains_key(&id) {
                self.completed.insert(id);
            }
        }
        self
    }

    pub fn quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    pub fn is_completed(&self, id: u32) -> bool {
        self.completed.contains(&id)
    }

    pub fn completed(&self) -> &BTreeSet<u32> {
        &self.completed
    }

    /// XP still on offer from quests not yet completed.
    pub fn remaining_xp(&self) -> u32 {
        self.quests
            .values()
            .filter(|q| !self.completed.contains(&q.id))
            .map(|q| q.xp_reward)
            .fold(0u32, u32::saturating_add)
    }

    pub fn complete<W: XpWallet + ?Sized>(&mut self, id: u32, wallet: &mut W) -> QuestOutcome {
        let Some(quest) = self.quests.get(&id) else {
            return QuestOutcome::UnknownQuest;
        };
        if !self.completed.insert(id) {
            return QuestOutcome::AlreadyCompleted;
        }
        wallet.credit(quest.xp_reward);
        debug!(quest = id, xp = quest.xp_reward, "[QUEST] completed");
        QuestOutcome::Credited {
            xp: quest.xp_reward,
        }
    }
}
