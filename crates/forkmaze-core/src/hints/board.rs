use crate::grid::{Cell, Grid, Line, Mark, Pos, Puzzle};
use crate::layers::ForkAnchor;

/// Wall/path/empty tallies for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCounts {
    pub walls: usize,
    pub paths: usize,
    pub empty: usize,
}

/// What surrounds a cell.
#[derive(Debug, Clone, Default)]
pub struct Around {
    pub paths: Vec<Pos>,
    pub empties: Vec<Pos>,
    /// Walls plus off-board sides
    pub closed: usize,
}

/// The merged board as the hint rules see it: the puzzle, the visible cells
/// with fixed cells always reading as paths, and where the fork stack stands.
#[derive(Debug, Clone)]
pub struct Board<'a> {
    puzzle: &'a Puzzle,
    grid: Grid,
    depth: usize,
    anchor: Option<ForkAnchor>,
}

impl<'a> Board<'a> {
    pub fn new(puzzle: &'a Puzzle, mut grid: Grid, depth: usize, anchor: Option<ForkAnchor>) -> Self {
        for pos in puzzle.solution().positions() {
            if puzzle.is_fixed(pos) {
                grid.set(pos, Cell::Path);
            }
        }
        Self {
            puzzle,
            grid,
            depth,
            anchor,
        }
    }

    pub fn puzzle(&self) -> &'a Puzzle {
        self.puzzle
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn in_fork(&self) -> bool {
        self.depth > 0
    }

    pub fn anchor(&self) -> Option<ForkAnchor> {
        self.anchor
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Cell {
        self.grid.get(pos)
    }

    pub fn set(&mut self, pos: Pos, cell: Cell) {
        self.grid.set(pos, cell);
    }

    pub fn is_dead_end(&self, pos: Pos) -> bool {
        self.puzzle.is_dead_end(pos)
    }

    pub fn target_walls(&self, line: Line) -> usize {
        self.puzzle.target(line)
    }

    pub fn target_paths(&self, line: Line) -> usize {
        self.size() - self.puzzle.target(line)
    }

    pub fn counts(&self, line: Line) -> LineCounts {
        let mut counts = LineCounts {
            walls: 0,
            paths: 0,
            empty: 0,
        };
        for pos in line.cells(self.size()) {
            match self.get(pos) {
                Cell::Wall => counts.walls += 1,
                Cell::Path => counts.paths += 1,
                Cell::Empty => counts.empty += 1,
            }
        }
        counts
    }

    pub fn empties_in(&self, line: Line) -> Vec<Pos> {
        line.cells(self.size()).filter(|&p| self.get(p).is_empty()).collect()
    }

    pub fn empties(&self) -> Vec<Pos> {
        self.grid.positions().filter(|&p| self.get(p).is_empty()).collect()
    }

    pub fn is_full(&self) -> bool {
        self.grid.empty_count() == 0
    }

    pub fn around(&self, pos: Pos) -> Around {
        let mut around = Around {
            closed: 4 - self.grid.neighbors(pos).count(),
            ..Around::default()
        };
        for n in self.grid.neighbors(pos) {
            match self.get(n) {
                Cell::Wall => around.closed += 1,
                Cell::Path => around.paths.push(n),
                Cell::Empty => around.empties.push(n),
            }
        }
        around
    }

    /// A copy with `cells` set to `mark`.
    pub fn with(&self, cells: &[Pos], mark: Mark) -> Board<'a> {
        let mut next = self.clone();
        for &pos in cells {
            next.grid.set(pos, mark.into());
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_cells_read_as_path() {
        let puzzle = Puzzle::from_ascii(
            "
            .#..
            .#.#
            ...#
            #.##
            ",
        )
        .unwrap();
        let board = Board::new(&puzzle, Grid::new(4), 0, None);
        assert_eq!(board.get(Pos::new(3, 1)), Cell::Path);
        assert_eq!(board.get(Pos::new(0, 3)), Cell::Path);
        assert_eq!(board.get(Pos::new(1, 0)), Cell::Empty);

        let counts = board.counts(Line::Row(3));
        assert_eq!(counts, LineCounts { walls: 0, paths: 1, empty: 3 });

        let around = board.around(Pos::new(0, 0));
        assert_eq!(around.closed, 2);
        assert_eq!(around.empties.len(), 2);
    }
}
