//! Read-only board snapshot for renderers.

use crate::grid::{Cell, Line, Pos};
use crate::hints::Highlight;
use crate::layers::ForkAnchor;

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub size: usize,
    /// Merged cells, row-major; fixed cells read as `Path`
    pub cells: Vec<Cell>,
    pub row_targets: Vec<usize>,
    pub col_targets: Vec<usize>,
    /// Walls currently placed per row
    pub row_walls: Vec<usize>,
    /// Walls currently placed per column
    pub col_walls: Vec<usize>,
    pub dead_ends: Vec<Pos>,
    pub vault: Option<Pos>,
    /// Number of open forks
    pub depth: usize,
    pub anchor: Option<ForkAnchor>,
    /// Cells a lower layer has decided
    pub locked: Vec<bool>,
    pub highlight: Highlight,
    pub won: bool,
}

impl BoardView {
    pub fn cell(&self, pos: Pos) -> Cell {
        self.cells[pos.row * self.size + pos.col]
    }

    pub fn is_locked(&self, pos: Pos) -> bool {
        self.locked[pos.row * self.size + pos.col]
    }

    pub fn is_dead_end(&self, pos: Pos) -> bool {
        self.dead_ends.contains(&pos)
    }

    pub fn is_fixed(&self, pos: Pos) -> bool {
        self.is_dead_end(pos) || self.vault == Some(pos)
    }

    /// Placed walls against the clue for a line.
    pub fn wall_progress(&self, line: Line) -> (usize, usize) {
        match line {
            Line::Row(r) => (self.row_walls[r], self.row_targets[r]),
            Line::Col(c) => (self.col_walls[c], self.col_targets[c]),
        }
    }
}

/// A front end that can draw a [`BoardView`].
pub trait Renderer {
    fn render(&mut self, view: &BoardView) -> std::io::Result<()>;
}
