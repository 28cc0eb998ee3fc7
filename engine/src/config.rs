use std::{fs, path::Path, path::PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::campaign::{CampaignPolicy, DEFAULT_COMPLETION_BONUS};
use crate::catalogue::Catalogue;
use crate::error::CatalogueError;
use crate::progression::DEFAULT_STARTING_XP;
use crate::ChapterId;

/// Tunables for a campaign. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct EngineConfig {
    /// Balance for a new player and after `reset`.
    pub starting_xp: u32,
    pub completion_bonus: u32,
    pub save_path: Option<PathBuf>,
    /// Campaign JSON to use instead of the built-in content.
    pub content_path: Option<PathBuf>,
    /// Overrides the last playable chapter of the catalogue.
    pub final_chapter: Option<ChapterId>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_xp: DEFAULT_STARTING_XP,
            completion_bonus: DEFAULT_COMPLETION_BONUS,
            save_path: None,
            content_path: None,
            final_chapter: None,
        }
    }
}

impl EngineConfig {
    /// Read a `.json`, `.yaml` or `.yml` config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let cfg: EngineConfig = match ext.as_deref() {
            Some("json") => serde_json::from_str(&text)
                .with_context(|| format!("failed to parse config JSON: {}", path.display()))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse config YAML: {}", path.display()))?,
            _ => bail!(
                "unsupported config format: {} (expected .json, .yaml or .yml)",
                path.display()
            ),
        };
        Ok(cfg)
    }

    pub fn catalogue(&self) -> Result<Catalogue, CatalogueError> {
        match &self.content_path {
            Some(path) => Catalogue::from_path(path),
            None => Catalogue::builtin(),
        }
    }

    pub fn campaign_policy(&self, catalogue: &Catalogue) -> CampaignPolicy {
        let final_chapter = self
            .final_chapter
            .or_else(|| catalogue.final_playable_chapter())
            .unwrap_or(ChapterId::FIRST);
        CampaignPolicy {
            completion_bonus: self.completion_bonus,
            final_chapter,
        }
    }
}
