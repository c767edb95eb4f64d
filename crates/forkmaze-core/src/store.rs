//! Saved-game persistence contract
//!
//! A [`SavedGame`] is a plain serde record of everything needed to resume:
//! the puzzle, every layer, the undo slot and a little session bookkeeping.
//! Backends implement [`GameStore`]; this crate ships the in-memory one, the
//! CLI adds a file-backed one.

use crate::grid::{Grid, Pos};
use crate::layers::{ForkAnchor, UndoSnapshot};
use crate::rng::Seed;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

/// Bumped whenever the saved layout changes incompatibly.
pub const SAVE_VERSION: u32 = 1;

/// Everything needed to resume a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGame {
    pub version: u32,
    pub size: usize,
    /// Absent for puzzles built from a fixed grid
    #[serde(default)]
    pub seed: Option<Seed>,
    pub solution: Grid,
    pub layers: Vec<Grid>,
    /// Index of the active layer
    pub current: usize,
    pub row_targets: Vec<usize>,
    pub col_targets: Vec<usize>,
    pub anchors: Vec<Option<ForkAnchor>>,
    pub dead_ends: Vec<Pos>,
    pub vault: Option<Pos>,
    #[serde(default)]
    pub undo: Option<UndoSnapshot>,
    #[serde(default)]
    pub elapsed_secs: u64,
    #[serde(default)]
    pub moves: u32,
    #[serde(default)]
    pub win_streak: u32,
}

/// Session bookkeeping carried alongside the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub elapsed_secs: u64,
    pub win_streak: u32,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode saved game: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A place to keep one saved game.
pub trait GameStore: Send + Sync {
    fn save(&self, game: &SavedGame) -> StoreResult<()>;

    /// The saved game, or `None` when there is none or it cannot be read.
    fn load(&self) -> Option<SavedGame>;

    fn clear(&self) -> StoreResult<()>;

    /// Backend name for display
    fn backend_name(&self) -> &'static str;
}

pub fn encode(game: &SavedGame) -> StoreResult<String> {
    Ok(serde_json::to_string_pretty(game)?)
}

/// Parse a saved game; unreadable or future-version data yields `None`.
pub fn decode(json: &str) -> Option<SavedGame> {
    let game: SavedGame = serde_json::from_str(json).ok()?;
    (game.version == SAVE_VERSION).then_some(game)
}

// ==================== In-memory Backend ====================

/// Keeps the encoded game in memory; for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored text verbatim.
    pub fn put_raw(&self, json: impl Into<String>) {
        *self.slot.lock().unwrap() = Some(json.into());
    }
}

impl GameStore for MemoryStore {
    fn save(&self, game: &SavedGame) -> StoreResult<()> {
        let json = encode(game)?;
        *self.slot.lock().unwrap() = Some(json);
        Ok(())
    }

    fn load(&self) -> Option<SavedGame> {
        let slot = self.slot.lock().unwrap();
        slot.as_deref().and_then(decode)
    }

    fn clear(&self) -> StoreResult<()> {
        *self.slot.lock().unwrap() = None;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SavedGame {
        SavedGame {
            version: SAVE_VERSION,
            size: 4,
            seed: Some("ZXN8YB".parse().unwrap()),
            solution: Grid::from_ascii(".#..\n.#.#\n...#\n#.##").unwrap(),
            layers: vec![Grid::new(4)],
            current: 0,
            row_targets: vec![1, 2, 1, 3],
            col_targets: vec![1, 2, 0, 3],
            anchors: vec![None],
            dead_ends: vec![Pos::new(0, 0), Pos::new(0, 3), Pos::new(3, 1)],
            vault: None,
            undo: None,
            elapsed_secs: 12,
            moves: 3,
            win_streak: 2,
        }
    }

    #[test]
    fn test_memory_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().is_none());
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), Some(sample()));
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_corrupt_data_loads_as_none() {
        let store = MemoryStore::new();
        store.put_raw("{\"version\": 1, \"size\": ");
        assert!(store.load().is_none());
        store.put_raw("not json at all");
        assert!(store.load().is_none());
    }

    #[test]
    fn test_other_versions_are_ignored() {
        let mut game = sample();
        game.version = SAVE_VERSION + 1;
        let json = serde_json::to_string(&game).unwrap();
        assert!(decode(&json).is_none());
    }

    #[test]
    fn test_bad_seed_is_rejected() {
        let json = encode(&sample()).unwrap().replace("ZXN8YB", "ZXN8Y0");
        assert!(decode(&json).is_none());
    }
}
