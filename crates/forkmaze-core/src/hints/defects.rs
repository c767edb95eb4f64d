//! Structural problems visible on a partially filled board.
//!
//! Every defect here is a certainty: no way of filling the remaining empty
//! cells can repair it. The hint cascade uses them to report mistakes and
//! fork contradictions, and the hypothetical rules use them to refute guesses.

use super::board::Board;
use super::types::Highlight;
use crate::grid::{Cell, Line, Pos};
use crate::terms::Terminology;
use crate::validator::open_components;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Defect {
    /// More walls than the line's target
    TooManyWalls(Line),
    /// More paths than the line has room for
    TooManyPaths(Line),
    /// Four paths in a 2×2 square outside the vault room (top-left corner)
    OpenSquare([Pos; 4]),
    /// A marked dead end with more than one way out
    DeadEndExits(Pos),
    /// A path boxed in on three sides that is not a marked dead end
    FalseDeadEnd(Pos),
    /// Paths that can no longer reach the rest of the maze
    CutOff(Vec<Pos>),
}

impl Defect {
    /// Whether a player can spot this without reasoning about connectivity.
    pub fn is_obvious(&self) -> bool {
        !matches!(self, Defect::CutOff(_))
    }

    pub fn highlight(&self) -> Highlight {
        match self {
            Defect::TooManyWalls(line) | Defect::TooManyPaths(line) => Highlight::Line(*line),
            Defect::OpenSquare(cells) => Highlight::Cells(cells.to_vec()),
            Defect::DeadEndExits(pos) | Defect::FalseDeadEnd(pos) => Highlight::Cell(*pos),
            Defect::CutOff(cells) => Highlight::Cells(cells.clone()),
        }
    }

    pub fn describe(&self, board: &Board, terms: &dyn Terminology) -> String {
        match self {
            Defect::TooManyWalls(line) => format!(
                "{line} has more {} than its clue of {}",
                terms.walls(),
                board.target_walls(*line)
            ),
            Defect::TooManyPaths(line) => format!(
                "{line} has more {} than its clue allows ({})",
                terms.paths(),
                board.target_paths(*line)
            ),
            Defect::OpenSquare(cells) => format!(
                "the 2×2 block at {} is all {}",
                cells[0],
                terms.paths()
            ),
            Defect::DeadEndExits(pos) => format!(
                "the {} at {pos} has more than one exit",
                terms.dead_end()
            ),
            Defect::FalseDeadEnd(pos) => format!(
                "the {} at {pos} is boxed in like a {} but isn't one",
                terms.path(),
                terms.dead_end()
            ),
            Defect::CutOff(cells) => format!(
                "the {} around {} are cut off from the rest of the maze",
                terms.paths(),
                cells[0]
            ),
        }
    }
}

/// The first defect on the board, checked in a fixed order: line counts,
/// 2×2 blocks, dead-end exits, false dead ends, then connectivity.
pub fn find_defect(board: &Board) -> Option<Defect> {
    let size = board.size();

    for line in Line::all(size) {
        let counts = board.counts(line);
        if counts.walls > board.target_walls(line) {
            return Some(Defect::TooManyWalls(line));
        }
        if counts.paths > board.target_paths(line) {
            return Some(Defect::TooManyPaths(line));
        }
    }

    let grid = board.grid();
    let vault = board.puzzle().vault();
    for top in grid.positions() {
        if let Some(square) = grid.square(top) {
            if square.iter().all(|&p| grid.get(p).is_path()) && !grid.open_room_covers(vault, &square) {
                return Some(Defect::OpenSquare(square));
            }
        }
    }

    for pos in board.puzzle().dead_ends() {
        if board.around(pos).paths.len() > 1 {
            return Some(Defect::DeadEndExits(pos));
        }
    }

    for pos in grid.positions() {
        if grid.get(pos).is_path() && !board.is_dead_end(pos) && grid.closed_sides(pos) >= 3 {
            return Some(Defect::FalseDeadEnd(pos));
        }
    }

    // Paths must share one region of non-wall cells.
    let regions = open_components(grid, Cell::is_open);
    let mut with_paths: Vec<Vec<Pos>> = regions
        .into_iter()
        .map(|region| region.into_iter().filter(|&p| grid.get(p).is_path()).collect::<Vec<_>>())
        .filter(|paths| !paths.is_empty())
        .collect();
    if with_paths.len() > 1 {
        with_paths.sort_by_key(Vec::len);
        let mut smallest = with_paths.swap_remove(0);
        smallest.sort();
        return Some(Defect::CutOff(smallest));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, Puzzle};

    fn puzzle() -> Puzzle {
        Puzzle::from_ascii(
            "
            .#...
            .#.#.
            ...#.
            ##.#.
            ...#.
            ",
        )
        .unwrap()
    }

    fn board<'a>(puzzle: &'a Puzzle, art: &str) -> Board<'a> {
        Board::new(puzzle, Grid::from_ascii(art).unwrap(), 0, None)
    }

    #[test]
    fn test_clean_board_has_no_defect() {
        let puzzle = puzzle();
        let b = board(&puzzle, "_____\n_____\n_____\n_____\n_____");
        assert_eq!(find_defect(&b), None);
        let solved = Board::new(&puzzle, puzzle.solution().clone(), 0, None);
        assert_eq!(find_defect(&solved), None);
    }

    #[test]
    fn test_line_overflow() {
        let puzzle = puzzle();
        let b = board(&puzzle, "_##__\n_____\n_____\n_____\n_____");
        assert_eq!(find_defect(&b), Some(Defect::TooManyWalls(Line::Row(0))));
        let b = board(&puzzle, "_____\n_____\n_____\n._._.\n_____");
        assert_eq!(find_defect(&b), Some(Defect::TooManyPaths(Line::Row(3))));
    }

    #[test]
    fn test_open_square() {
        let puzzle = puzzle();
        let b = board(&puzzle, "_____\n_..__\n_..__\n_____\n_____");
        assert!(matches!(find_defect(&b), Some(Defect::OpenSquare(_))));
    }

    #[test]
    fn test_dead_end_exits() {
        let puzzle = puzzle();
        // (0,0) is a dead end; opening both sides breaks it.
        let b = board(&puzzle, "_.___\n.____\n_____\n_____\n_____");
        assert_eq!(find_defect(&b), Some(Defect::DeadEndExits(Pos::new(0, 0))));
    }

    #[test]
    fn test_false_dead_end() {
        let puzzle = puzzle();
        let b = board(&puzzle, "_____\n.#___\n#____\n_____\n_____");
        assert_eq!(find_defect(&b), Some(Defect::FalseDeadEnd(Pos::new(1, 0))));
    }

    #[test]
    fn test_cut_off_paths() {
        let puzzle = puzzle();
        let b = board(&puzzle, "_____\n_____\n_____\n#____\n_#___");
        let defect = find_defect(&b);
        assert_eq!(defect, Some(Defect::CutOff(vec![Pos::new(4, 0)])));
        assert!(!defect.unwrap().is_obvious());
    }
}
