use crate::store::{FileStore, PlayerStats};
use anyhow::{anyhow, Result};
use forkmaze_core::{GameStore, HintEngine, PuzzleState, Seed, SessionStats};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// One run of the binary: the stored game (if any), the player's totals,
/// and the clock for this invocation.
pub struct Session {
    home: PathBuf,
    store: FileStore,
    engine: HintEngine,
    game: Option<PuzzleState>,
    player: PlayerStats,
    /// Play time carried over from earlier invocations
    elapsed_before: u64,
    started: Instant,
}

/// What happened when the session was saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Saved,
    Won { elapsed_secs: u64, streak: u32 },
}

impl Session {
    pub fn open(home: &Path, engine: HintEngine) -> Self {
        let store = FileStore::new(home);
        let mut elapsed_before = 0;
        let game = store.load().and_then(|saved| match PuzzleState::restore(&saved) {
            Ok((state, stats)) => {
                elapsed_before = stats.elapsed_secs;
                Some(state)
            }
            Err(e) => {
                warn!(error = %e, "saved game is inconsistent, ignoring it");
                None
            }
        });

        Self {
            home: home.to_path_buf(),
            store,
            engine,
            game,
            player: PlayerStats::load(home),
            elapsed_before,
            started: Instant::now(),
        }
    }

    pub fn engine(&self) -> &HintEngine {
        &self.engine
    }

    pub fn player(&self) -> &PlayerStats {
        &self.player
    }

    pub fn has_game(&self) -> bool {
        self.game.is_some()
    }

    pub fn game(&self) -> Result<&PuzzleState> {
        self.game
            .as_ref()
            .ok_or_else(|| anyhow!("no game in progress; start one with `forkmaze new`"))
    }

    pub fn game_mut(&mut self) -> Result<&mut PuzzleState> {
        self.game
            .as_mut()
            .ok_or_else(|| anyhow!("no game in progress; start one with `forkmaze new`"))
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_before + self.started.elapsed().as_secs()
    }

    /// Replace whatever is in progress with a freshly generated puzzle.
    pub fn new_game(&mut self, seed: Option<Seed>, size: usize) -> Result<&PuzzleState> {
        if self.game.as_ref().is_some_and(|g| !g.is_win()) {
            self.player.record_abandon();
            self.player.save(&self.home)?;
        }
        let seed = seed.unwrap_or_else(Seed::random);
        let state = PuzzleState::generate(seed, size);
        info!(%seed, size = state.size(), "new game");

        self.elapsed_before = 0;
        self.started = Instant::now();
        Ok(self.game.insert(state))
    }

    /// Persist the game, or settle it if it has just been won.
    pub fn save(&mut self) -> Result<Outcome> {
        let elapsed_secs = self.elapsed_secs();
        let game = self.game()?;
        if game.is_win() {
            self.player.record_win(elapsed_secs);
            self.player.save(&self.home)?;
            self.store.clear()?;
            self.game = None;
            return Ok(Outcome::Won {
                elapsed_secs,
                streak: self.player.win_streak,
            });
        }

        let stats = SessionStats {
            elapsed_secs,
            win_streak: self.player.win_streak,
        };
        self.store.save(&game.snapshot(stats))?;
        Ok(Outcome::Saved)
    }
}

/// `mm:ss`, or `h:mm:ss` past an hour.
pub fn format_time(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkmaze_core::{Cell, Pos};
    use tempfile::TempDir;

    fn seed() -> Seed {
        "ZXN8YB".parse().unwrap()
    }

    #[test]
    fn test_game_persists_between_sessions() {
        let tmp = TempDir::new().unwrap();
        let mut first = Session::open(tmp.path(), HintEngine::new());
        assert!(first.game().is_err());
        first.new_game(Some(seed()), 4).unwrap();
        let hint = first.game().unwrap().next_hint().unwrap();
        let pos = hint.cells[0];
        let value: Cell = hint.value.unwrap().into();
        first.game_mut().unwrap().apply_move(pos, value).unwrap();
        assert_eq!(first.save().unwrap(), Outcome::Saved);

        let second = Session::open(tmp.path(), HintEngine::new());
        let game = second.game().unwrap();
        assert_eq!(game.seed(), Some(seed()));
        assert_eq!(game.cell(pos), value);
        assert_eq!(game.moves(), 1);
    }

    #[test]
    fn test_win_clears_save_and_counts_streak() {
        let tmp = TempDir::new().unwrap();
        let mut session = Session::open(tmp.path(), HintEngine::new());
        session.new_game(Some(seed()), 4).unwrap();

        let solution = session.game().unwrap().puzzle().solution().clone();
        let game = session.game_mut().unwrap();
        for pos in solution.positions() {
            if solution.get(pos).is_wall() && !game.is_win() {
                game.apply_move(pos, Cell::Wall).unwrap();
            }
        }
        assert!(matches!(session.save().unwrap(), Outcome::Won { streak: 1, .. }));
        assert!(!session.has_game());

        let reopened = Session::open(tmp.path(), HintEngine::new());
        assert!(!reopened.has_game());
        assert_eq!(reopened.player().games_won, 1);
        assert_eq!(reopened.player().win_streak, 1);
    }

    #[test]
    fn test_abandoning_breaks_streak() {
        let tmp = TempDir::new().unwrap();
        let mut stats = PlayerStats::default();
        stats.record_win(30);
        stats.save(tmp.path()).unwrap();

        let mut session = Session::open(tmp.path(), HintEngine::new());
        session.new_game(Some(seed()), 4).unwrap();
        session.game_mut().unwrap().apply_move(Pos::new(1, 1), Cell::Wall).ok();
        session.new_game(Some(seed()), 5).unwrap();
        assert_eq!(session.player().win_streak, 0);
        assert_eq!(session.player().best_streak, 1);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(3725), "1:02:05");
    }
}
