//! High-score table persisted as JSON.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Number of entries kept on the board.
pub(crate) const MAX_ENTRIES: usize = 10;

/// One recorded score.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ScoreEntry {
    pub(crate) name: String,
    pub(crate) score: u32,
}

/// Best scores sorted from highest to lowest.
#[derive(Debug)]
pub(crate) struct ScoreBoard {
    path: PathBuf,
    entries: Vec<ScoreEntry>,
}

impl ScoreBoard {
    /// Opens the board stored at `path`; a missing file yields an empty board.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse score file at {}", path.display()))?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read score file at {}", path.display()))
            }
        };
        let mut board = Self { path, entries };
        board.normalize();
        Ok(board)
    }

    /// Entries from best to worst.
    pub(crate) fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts a score and returns its one-based rank, or `None` when it
    /// did not make the board.
    pub(crate) fn record_score(&mut self, name: &str, score: u32) -> Option<usize> {
        let rank = self
            .entries
            .iter()
            .position(|entry| entry.score < score)
            .unwrap_or(self.entries.len());
        if rank >= MAX_ENTRIES {
            return None;
        }
        self.entries.insert(
            rank,
            ScoreEntry {
                name: name.to_owned(),
                score,
            },
        );
        self.entries.truncate(MAX_ENTRIES);
        Some(rank + 1)
    }

    /// Writes the board back to its file.
    pub(crate) fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json =
            serde_json::to_string_pretty(&self.entries).context("failed to serialise scores")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write score file at {}", self.path.display()))
    }

    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
    }
}
