use std::{fs, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::encounter::Adversary;
use crate::error::CatalogueError;
use crate::quests::Quest;
use crate::ChapterId;

const BUILTIN_CAMPAIGN: &str = include_str!("../content/campaign.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Balance at which a locked chapter may be entered.
    #[serde(default)]
    pub required_xp: u32,
    #[serde(default)]
    pub reward: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Villain {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub max_health: u32,
    #[serde(default)]
    pub weakness: String,
}

impl Villain {
    /// A fresh adversary at full health.
    pub fn to_adversary(&self) -> Adversary {
        Adversary {
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            weakness: self.weakness.clone(),
            max_health: self.max_health,
            current_health: self.max_health,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub title: String,
    pub pages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdversaryLookup {
    Found(Adversary),
    NotFound,
}

impl AdversaryLookup {
    pub fn found(self) -> Option<Adversary> {
        match self {
            AdversaryLookup::Found(adversary) => Some(adversary),
            AdversaryLookup::NotFound => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CampaignFile {
    chapters: Vec<Chapter>,
    #[serde(default)]
    villains: Vec<VillainEntry>,
    #[serde(default)]
    narratives: Vec<NarrativeEntry>,
    #[serde(default)]
    quests: Vec<Quest>,
}

#[derive(Debug, Deserialize)]
struct VillainEntry {
    chapter: ChapterId,
    #[serde(flatten)]
    villain: Villain,
}

#[derive(Debug, Deserialize)]
struct NarrativeEntry {
    chapter: ChapterId,
    #[serde(flatten)]
    narrative: Narrative,
}

/// Campaign content: chapters, their villains and story pages, and the daily quests.
#[derive(Debug, Clone)]
pub struct Catalogue {
    chapters: IndexMap<ChapterId, Chapter>,
    villains: IndexMap<ChapterId, Villain>,
    narratives: IndexMap<ChapterId, Narrative>,
    quests: Vec<Quest>,
}

impl Catalogue {
    /// The campaign compiled into the engine.
    pub fn builtin() -> Result<Self, CatalogueError> {
        Self::from_json(BUILTIN_CAMPAIGN)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CatalogueError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogueError> {
        let file: CampaignFile = serde_json::from_str(text)?;
        Self::from_file(file)
    }

    fn from_file(file: CampaignFile) -> Result<Self, CatalogueError> {
        if file.chapters.is_empty() {
            return Err(CatalogueError::Empty);
        }
        let expected_last = file.chapters.len();
        let mut chapters = IndexMap::new();
        for (position, chapter) in file.chapters.into_iter().enumerate() {
            let id = chapter.id;
            if chapters.contains_key(&id) {
                return Err(CatalogueError::DuplicateChapter(id));
            }
            if id.get() as usize != position + 1 {
                return Err(CatalogueError::ChapterOrder {
                    expected_last,
                    found: id,
                    position: position + 1,
                });
            }
            chapters.insert(id, chapter);
        }

        let mut villains = IndexMap::new();
        for VillainEntry { chapter, villain } in file.villains {
            if !chapters.contains_key(&chapter) {
                return Err(CatalogueError::OrphanVillain {
                    name: villain.name,
                    chapter,
                });
            }
            if villain.max_health == 0 {
                return Err(CatalogueError::ZeroHealth(villain.name));
            }
            villains.insert(chapter, villain);
        }
        villains.sort_keys();

        let mut narratives = IndexMap::new();
        for NarrativeEntry { chapter, narrative } in file.narratives {
            if !chapters.contains_key(&chapter) {
                return Err(CatalogueError::OrphanNarrative {
                    title: narrative.title,
                    chapter,
                });
            }
            if narrative.pages.is_empty() {
                return Err(CatalogueError::EmptyNarrative(chapter));
            }
            narratives.insert(chapter, narrative);
        }

        let mut quest_ids = std::collections::HashSet::new();
        for quest in &file.quests {
            if !quest_ids.insert(quest.id) {
                return Err(CatalogueError::DuplicateQuest(quest.id));
            }
        }

        Ok(Self {
            chapters,
            villains,
            narratives,
            quests: file.quests,
        })
    }

    pub fn chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.values()
    }

    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.get(&id)
    }

    pub fn villain(&self, id: ChapterId) -> Option<&Villain> {
        self.villains.get(&id)
    }

    pub fn narrative(&self, id: ChapterId) -> Option<&Narrative> {
        self.narratives.get(&id)
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn adversary(&self, id: ChapterId) -> AdversaryLookup {
        match self.villains.get(&id) {
            Some(villain) => AdversaryLookup::Found(villain.to_adversary()),
            None => AdversaryLookup::NotFound,
        }
    }

    /// Lenient lookup: an unknown chapter gets the first villain instead.
    /// `None` only when the catalogue has no villains at all.
    pub fn adversary_or_default(&self, id: ChapterId) -> Option<Adversary> {
        if let AdversaryLookup::Found(adversary) = self.adversary(id) {
            return Some(adversary);
        }
        let (fallback, villain) = self.villains.first()?;
        warn!(requested = %id, %fallback, "[CATALOGUE] no villain for chapter; using fallback");
        Some(villain.to_adversary())
    }

    /// Last chapter that can actually be fought.
    pub fn final_playable_chapter(&self) -> Option<ChapterId> {
        self.villains.keys().next_back().copied()
    }
}
