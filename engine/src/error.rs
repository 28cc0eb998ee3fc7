use std::{io, path::PathBuf};

use thiserror::Error;

use crate::ChapterId;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid chapter id '{0}': expected a positive integer")]
pub struct InvalidChapterId(pub String);

/// Failures at the persistence boundary of the progression store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read save file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write save file {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("save file {path:?} does not hold valid progression JSON")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode progression state")]
    Encode(#[from] serde_json::Error),
    #[error("storage is unavailable")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("failed to read campaign content {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("campaign content is not valid JSON")]
    Parse(#[from] serde_json::Error),
    #[error("campaign content declares no chapters")]
    Empty,
    #[error("chapter {0} is declared more than once")]
    DuplicateChapter(ChapterId),
    #[error("chapters must be numbered 1..={expected_last} in order; found chapter {found} at position {position}")]
    ChapterOrder {
        expected_last: usize,
        found: ChapterId,
        position: usize,
    },
    #[error("villain '{name}' belongs to unknown chapter {chapter}")]
    OrphanVillain { name: String, chapter: ChapterId },
    #[error("narrative '{title}' belongs to unknown chapter {chapter}")]
    OrphanNarrative { title: String, chapter: ChapterId },
    #[error("villain '{0}' must have max_health > 0")]
    ZeroHealth(String),
    #[error("narrative for chapter {0} has no pages")]
    EmptyNarrative(ChapterId),
    #[error("quest {0} is declared more than once")]
    DuplicateQuest(u32),
}

/// An encounter that could not be started or restored.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncounterError {
    #[error("adversary '{name}' has no health pool")]
    NoHealth { name: String },
    #[error("adversary '{name}' health {current_health} exceeds max {max_health}")]
    HealthAboveMax {
        name: String,
        current_health: u32,
        max_health: u32,
    },
    #[error("encounter state does not match adversary health {current_health}")]
    StateMismatch { current_health: u32 },
}
