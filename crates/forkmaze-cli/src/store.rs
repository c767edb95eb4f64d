use forkmaze_core::store::{decode, encode, StoreResult};
use forkmaze_core::{GameStore, SavedGame};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SAVE_FILE: &str = "save.json";
const STATS_FILE: &str = "stats.json";

// ==================== Saved Game ====================

/// Keeps the current game as a JSON file under the data directory.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(home: &Path) -> Self {
        Self {
            path: home.join(SAVE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GameStore for FileStore {
    fn save(&self, game: &SavedGame) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = encode(game)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "game saved");
        Ok(())
    }

    fn load(&self) -> Option<SavedGame> {
        let json = fs::read_to_string(&self.path).ok()?;
        let game = decode(&json);
        if game.is_none() {
            debug!(path = %self.path.display(), "ignoring unreadable save");
        }
        game
    }

    fn clear(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "File"
    }
}

// ==================== Player Stats ====================

/// Totals that outlive any one game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub games_won: u32,
    pub win_streak: u32,
    pub best_streak: u32,
    /// Fastest win in seconds
    pub best_time_secs: Option<u64>,
}

impl PlayerStats {
    fn path(home: &Path) -> PathBuf {
        home.join(STATS_FILE)
    }

    /// Load stats, starting fresh if the file is missing or unreadable.
    pub fn load(home: &Path) -> Self {
        match fs::read_to_string(Self::path(home)) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, home: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(home)?;
        fs::write(Self::path(home), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn record_win(&mut self, elapsed_secs: u64) {
        self.games_won += 1;
        self.win_streak += 1;
        self.best_streak = self.best_streak.max(self.win_streak);
        self.best_time_secs = Some(self.best_time_secs.map_or(elapsed_secs, |t| t.min(elapsed_secs)));
    }

    /// An abandoned game breaks the streak.
    pub fn record_abandon(&mut self) {
        self.win_streak = 0;
    }
}
