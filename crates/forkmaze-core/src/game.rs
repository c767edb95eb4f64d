//! The playable puzzle: clues plus the player's layer stack.

use crate::generator::Generator;
use crate::grid::{Cell, Grid, Line, Mark, Pos, Puzzle, MAX_SIZE, MIN_SIZE};
use crate::hints::{self, Board, Highlight, Hint};
use crate::layers::LayerStack;
use crate::rng::Seed;
use crate::store::{SavedGame, SessionStats, SAVE_VERSION};
use crate::validator::is_valid_for;
use crate::view::BoardView;
use thiserror::Error;
use tracing::debug;

/// Why a move was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("that position is off the board")]
    OutOfBounds,
    #[error("{0} is fixed and cannot be changed")]
    Fixed(Pos),
    #[error("{0} was decided in an earlier layer")]
    Locked(Pos),
    #[error("the puzzle is already solved")]
    Finished,
    #[error("nothing to change")]
    Unchanged,
}

/// Why a saved game could not be resumed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestoreError {
    #[error("unsupported save version {0}")]
    Version(u32),
    #[error("board size {0} is out of range")]
    Size(usize),
    #[error("solution grid is incomplete or the wrong size")]
    Solution,
    #[error("clues do not match the solution")]
    Clues,
    #[error("dead ends or vault do not match the solution")]
    Fixed,
    #[error("layers do not fit together")]
    Layers,
}

/// One puzzle in play.
#[derive(Debug, Clone)]
pub struct PuzzleState {
    puzzle: Puzzle,
    seed: Option<Seed>,
    stack: LayerStack,
    moves: u32,
    won: bool,
}

/// Generate a fresh puzzle with the default generator.
pub fn generate(seed: Seed, size: usize) -> PuzzleState {
    PuzzleState::generate(seed, size)
}

impl PuzzleState {
    pub fn generate(seed: Seed, size: usize) -> Self {
        Self::with_generator(&Generator::new(), seed, size)
    }

    pub fn with_generator(generator: &Generator, seed: Seed, size: usize) -> Self {
        let mut state = Self::from_puzzle(generator.generate(seed, size));
        state.seed = Some(seed);
        state
    }

    /// Play a hand-made puzzle.
    pub fn from_puzzle(puzzle: Puzzle) -> Self {
        let stack = LayerStack::new(puzzle.size());
        Self {
            puzzle,
            seed: None,
            stack,
            moves: 0,
            won: false,
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn seed(&self) -> Option<Seed> {
        self.seed
    }

    pub fn size(&self) -> usize {
        self.puzzle.size()
    }

    pub fn layers(&self) -> &LayerStack {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Accepted moves so far.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn can_undo(&self) -> bool {
        !self.won && self.stack.can_undo()
    }

    /// The merged value of a cell; fixed cells are always paths.
    pub fn cell(&self, pos: Pos) -> Cell {
        if self.puzzle.is_fixed(pos) {
            Cell::Path
        } else {
            self.stack.merged(pos)
        }
    }

    pub fn board(&self) -> Board<'_> {
        Board::new(
            &self.puzzle,
            self.stack.merged_grid(),
            self.stack.depth(),
            self.stack.active_anchor(),
        )
    }

    pub fn is_win(&self) -> bool {
        self.won
    }

    /// Set, change or clear (`Cell::Empty`) one cell on the active layer.
    pub fn apply_move(&mut self, pos: Pos, value: Cell) -> Result<(), MoveError> {
        if self.won {
            return Err(MoveError::Finished);
        }
        if pos.row >= self.size() || pos.col >= self.size() {
            return Err(MoveError::OutOfBounds);
        }
        if self.puzzle.is_fixed(pos) {
            return Err(MoveError::Fixed(pos));
        }
        if self.stack.is_locked(pos) {
            return Err(MoveError::Locked(pos));
        }
        if !self.stack.apply(pos, value) {
            return Err(MoveError::Unchanged);
        }
        self.moves += 1;
        self.refresh();
        Ok(())
    }

    /// Fill every open, editable cell of a line.
    pub fn apply_line(&mut self, line: Line, mark: Mark) -> Result<(), MoveError> {
        if self.won {
            return Err(MoveError::Finished);
        }
        if line.index() >= self.size() {
            return Err(MoveError::OutOfBounds);
        }
        let puzzle = &self.puzzle;
        if !self.stack.apply_line(line, mark.into(), |p| !puzzle.is_fixed(p)) {
            return Err(MoveError::Unchanged);
        }
        self.moves += 1;
        self.refresh();
        Ok(())
    }

    pub fn fork(&mut self) -> bool {
        !self.won && self.stack.fork()
    }

    pub fn commit(&mut self) -> bool {
        if self.won || !self.stack.commit() {
            return false;
        }
        self.refresh();
        true
    }

    pub fn discard(&mut self) -> bool {
        if self.won || !self.stack.discard() {
            return false;
        }
        self.refresh();
        true
    }

    pub fn undo(&mut self) -> bool {
        if self.won || !self.stack.undo() {
            return false;
        }
        self.refresh();
        true
    }

    /// Clear every layer and start over on the same puzzle.
    pub fn reset(&mut self) {
        self.stack = LayerStack::new(self.size());
        self.moves = 0;
        self.won = false;
    }

    fn refresh(&mut self) {
        self.won = self.check_win();
        if self.won {
            debug!(moves = self.moves, depth = self.depth(), "puzzle solved");
        }
    }

    /// Every wall matches the answer, or the board is some other valid
    /// completion of the clues.
    fn check_win(&self) -> bool {
        let board = self.board();
        let grid = board.grid();
        let solution = self.puzzle.solution();
        let exact = grid
            .positions()
            .all(|p| grid.get(p).is_wall() == solution.get(p).is_wall());
        exact || is_valid_for(grid, &self.puzzle)
    }

    pub fn next_hint(&self) -> Option<Hint> {
        hints::next_hint(self)
    }

    pub fn hint_for_cell(&self, pos: Pos) -> Option<Hint> {
        hints::hint_for_cell(self, pos)
    }

    pub fn view(&self, highlight: Highlight) -> BoardView {
        let size = self.size();
        let board = self.board();
        let grid = board.grid();
        let walls = |line: Line| grid.count_in(line, Cell::Wall);
        BoardView {
            size,
            cells: grid.cells().to_vec(),
            row_targets: self.puzzle.row_targets().to_vec(),
            col_targets: self.puzzle.col_targets().to_vec(),
            row_walls: (0..size).map(|r| walls(Line::Row(r))).collect(),
            col_walls: (0..size).map(|c| walls(Line::Col(c))).collect(),
            dead_ends: self.puzzle.dead_ends().collect(),
            vault: self.puzzle.vault(),
            depth: self.depth(),
            anchor: self.stack.active_anchor(),
            locked: grid.positions().map(|p| self.stack.is_locked(p)).collect(),
            highlight,
            won: self.won,
        }
    }

    pub fn snapshot(&self, stats: SessionStats) -> SavedGame {
        SavedGame {
            version: SAVE_VERSION,
            size: self.size(),
            seed: self.seed,
            solution: self.puzzle.solution().clone(),
            layers: self.stack.layers().to_vec(),
            current: self.stack.depth(),
            row_targets: self.puzzle.row_targets().to_vec(),
            col_targets: self.puzzle.col_targets().to_vec(),
            anchors: self.stack.anchors().to_vec(),
            dead_ends: self.puzzle.dead_ends().collect(),
            vault: self.puzzle.vault(),
            undo: self.stack.undo_snapshot().cloned(),
            elapsed_secs: stats.elapsed_secs,
            moves: self.moves,
            win_streak: stats.win_streak,
        }
    }

    /// Rebuild a game from a snapshot, checking that its parts agree.
    pub fn restore(saved: &SavedGame) -> Result<(Self, SessionStats), RestoreError> {
        if saved.version != SAVE_VERSION {
            return Err(RestoreError::Version(saved.version));
        }
        let size = saved.size;
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(RestoreError::Size(size));
        }
        let solution: &Grid = &saved.solution;
        if solution.size() != size
            || solution.cells().len() != size * size
            || solution.cells().iter().any(|c| c.is_empty())
        {
            return Err(RestoreError::Solution);
        }
        if let Some(vault) = saved.vault {
            if !solution.contains(vault) || !solution.get(vault).is_path() {
                return Err(RestoreError::Fixed);
            }
        }

        let puzzle = Puzzle::new(solution.clone(), saved.vault);
        if puzzle.row_targets() != saved.row_targets.as_slice() || puzzle.col_targets() != saved.col_targets.as_slice() {
            return Err(RestoreError::Clues);
        }
        let mut dead_ends = saved.dead_ends.clone();
        dead_ends.sort();
        if puzzle.dead_ends().collect::<Vec<_>>() != dead_ends {
            return Err(RestoreError::Fixed);
        }

        if saved.layers.len() != saved.current + 1 || saved.layers.iter().any(|l| l.size() != size) {
            return Err(RestoreError::Layers);
        }
        let stack = LayerStack::from_parts(saved.layers.clone(), saved.anchors.clone(), saved.undo.clone())
            .ok_or(RestoreError::Layers)?;

        let mut state = Self {
            puzzle,
            seed: saved.seed,
            stack,
            moves: saved.moves,
            won: false,
        };
        state.refresh();
        let stats = SessionStats {
            elapsed_secs: saved.elapsed_secs,
            win_streak: saved.win_streak,
        };
        Ok((state, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PuzzleState {
        PuzzleState::from_puzzle(
            Puzzle::from_ascii(
                "
                .#..
                .#.#
                ...#
                #.##
                ",
            )
            .unwrap(),
        )
    }

    const WALLS: [(usize, usize); 7] = [(0, 1), (1, 1), (1, 3), (2, 3), (3, 0), (3, 2), (3, 3)];

    #[test]
    fn test_move_rejections() {
        let mut s = state();
        assert_eq!(s.apply_move(Pos::new(4, 0), Cell::Wall), Err(MoveError::OutOfBounds));
        assert_eq!(s.apply_move(Pos::new(0, 0), Cell::Wall), Err(MoveError::Fixed(Pos::new(0, 0))));
        assert_eq!(s.apply_move(Pos::new(1, 0), Cell::Empty), Err(MoveError::Unchanged));

        s.apply_move(Pos::new(1, 1), Cell::Wall).unwrap();
        assert!(s.fork());
        assert_eq!(s.apply_move(Pos::new(1, 1), Cell::Path), Err(MoveError::Locked(Pos::new(1, 1))));
        assert_eq!(s.moves(), 1);
    }

    #[test]
    fn test_placing_every_wall_wins() {
        let mut s = state();
        for (r, c) in WALLS {
            assert!(!s.is_win());
            s.apply_move(Pos::new(r, c), Cell::Wall).unwrap();
        }
        assert!(s.is_win());
        assert_eq!(s.apply_move(Pos::new(1, 0), Cell::Path), Err(MoveError::Finished));
        assert!(!s.undo());
        assert!(!s.can_undo());
    }

    #[test]
    fn test_win_inside_fork() {
        let mut s = state();
        for (r, c) in &WALLS[..6] {
            s.apply_move(Pos::new(*r, *c), Cell::Wall).unwrap();
        }
        assert!(s.fork());
        s.apply_move(Pos::new(3, 3), Cell::Wall).unwrap();
        assert!(s.is_win());
    }

    #[test]
    fn test_line_skips_fixed_cells() {
        let mut s = state();
        s.apply_line(Line::Row(0), Mark::Path).unwrap();
        assert_eq!(s.layers().layers()[0].get(Pos::new(0, 0)), Cell::Empty);
        assert_eq!(s.cell(Pos::new(0, 1)), Cell::Path);
        assert_eq!(s.apply_line(Line::Row(0), Mark::Path), Err(MoveError::Unchanged));
        assert_eq!(s.apply_line(Line::Col(9), Mark::Wall), Err(MoveError::OutOfBounds));
    }

    #[test]
    fn test_stack_operations_refresh_win() {
        let mut s = state();
        for (r, c) in &WALLS[..6] {
            s.apply_move(Pos::new(*r, *c), Cell::Wall).unwrap();
        }
        assert!(s.fork());
        s.apply_move(Pos::new(3, 3), Cell::Path).unwrap();
        assert!(!s.is_win());
        assert!(s.discard());
        assert!(s.fork());
        s.apply_move(Pos::new(3, 3), Cell::Wall).unwrap();
        assert!(s.is_win());
        assert!(!s.commit());
    }

    #[test]
    fn test_reset() {
        let mut s = state();
        s.apply_move(Pos::new(1, 1), Cell::Wall).unwrap();
        s.fork();
        s.reset();
        assert_eq!(s.depth(), 0);
        assert_eq!(s.moves(), 0);
        assert_eq!(s.cell(Pos::new(1, 1)), Cell::Empty);
    }

    #[test]
    fn test_view_counts() {
        let mut s = state();
        s.apply_move(Pos::new(3, 0), Cell::Wall).unwrap();
        let view = s.view(Highlight::Line(Line::Row(3)));
        assert_eq!(view.wall_progress(Line::Row(3)), (1, 3));
        assert_eq!(view.wall_progress(Line::Col(0)), (1, 1));
        assert!(view.is_fixed(Pos::new(3, 1)));
        assert_eq!(view.cell(Pos::new(3, 1)), Cell::Path);
        assert!(view.highlight.covers(Pos::new(3, 2)));
    }

    #[test]
    fn test_restore_checks_shape() {
        let mut s = state();
        s.apply_move(Pos::new(1, 1), Cell::Wall).unwrap();
        let saved = s.snapshot(SessionStats::default());

        let (back, _) = PuzzleState::restore(&saved).unwrap();
        assert!(back.layers().same_board(s.layers()));

        let mut bad = saved.clone();
        bad.row_targets[0] = 3;
        assert_eq!(PuzzleState::restore(&bad).unwrap_err(), RestoreError::Clues);

        let mut bad = saved.clone();
        bad.current = 2;
        assert_eq!(PuzzleState::restore(&bad).unwrap_err(), RestoreError::Layers);

        let mut bad = saved.clone();
        bad.dead_ends.pop();
        assert_eq!(PuzzleState::restore(&bad).unwrap_err(), RestoreError::Fixed);

        let mut bad = saved;
        bad.size = 40;
        assert_eq!(PuzzleState::restore(&bad).unwrap_err(), RestoreError::Size(40));
    }
}
