//! Cells, positions, grids and the immutable puzzle record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest supported board edge.
pub const MIN_SIZE: usize = 4;
/// Largest supported board edge.
pub const MAX_SIZE: usize = 16;

/// State of one square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Wall,
    Path,
}

impl Cell {
    pub fn is_wall(self) -> bool {
        self == Cell::Wall
    }

    pub fn is_path(self) -> bool {
        self == Cell::Path
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// Anything that is not a wall.
    pub fn is_open(self) -> bool {
        self != Cell::Wall
    }

    fn symbol(self) -> char {
        match self {
            Cell::Empty => '_',
            Cell::Wall => '#',
            Cell::Path => '.',
        }
    }
}

/// A value the player (or a hint) can commit to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    Wall,
    Path,
}

impl Mark {
    pub fn opposite(self) -> Mark {
        match self {
            Mark::Wall => Mark::Path,
            Mark::Path => Mark::Wall,
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::Wall => Cell::Wall,
            Mark::Path => Cell::Path,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Wall => write!(f, "wall"),
            Mark::Path => write!(f, "path"),
        }
    }
}

/// A position on the grid (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Step by a signed offset, staying inside a `size × size` board.
    pub fn offset(self, dr: isize, dc: isize, size: usize) -> Option<Pos> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < size && col < size).then_some(Pos { row, col })
    }

    /// Orthogonal neighbours that lie on the board.
    pub fn neighbors(self, size: usize) -> impl Iterator<Item = Pos> {
        DIRS.into_iter()
            .filter_map(move |(dr, dc)| self.offset(dr, dc, size))
    }

    pub fn manhattan(self, other: Pos) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row + 1, self.col + 1)
    }
}

/// Up, down, left, right.
pub const DIRS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A whole row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Line {
    Row(usize),
    Col(usize),
}

impl Line {
    pub fn index(self) -> usize {
        match self {
            Line::Row(i) | Line::Col(i) => i,
        }
    }

    pub fn cells(self, size: usize) -> impl Iterator<Item = Pos> {
        (0..size).map(move |k| match self {
            Line::Row(r) => Pos::new(r, k),
            Line::Col(c) => Pos::new(k, c),
        })
    }

    pub fn contains(self, pos: Pos) -> bool {
        match self {
            Line::Row(r) => pos.row == r,
            Line::Col(c) => pos.col == c,
        }
    }

    /// Every row then every column of a board.
    pub fn all(size: usize) -> impl Iterator<Item = Line> {
        (0..size).map(Line::Row).chain((0..size).map(Line::Col))
    }

    /// True for the first and last row/column.
    pub fn is_edge(self, size: usize) -> bool {
        let i = self.index();
        i == 0 || i + 1 == size
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Row(r) => write!(f, "row {}", r + 1),
            Line::Col(c) => write!(f, "column {}", c + 1),
        }
    }
}

/// A square board of cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GridData")]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

/// Wire form of [`Grid`], checked before a grid is built from it.
#[derive(Deserialize)]
struct GridData {
    size: usize,
    cells: Vec<Cell>,
}

impl TryFrom<GridData> for Grid {
    type Error = String;

    fn try_from(data: GridData) -> Result<Self, Self::Error> {
        let GridData { size, cells } = data;
        let found = cells.len();
        Grid::from_cells(size, cells).ok_or_else(|| format!("a {size}×{size} grid cannot hold {found} cells"))
    }
}

impl Grid {
    /// An all-empty board.
    pub fn new(size: usize) -> Self {
        Self::filled(size, Cell::Empty)
    }

    pub fn filled(size: usize, cell: Cell) -> Self {
        Self {
            size,
            cells: vec![cell; size * size],
        }
    }

    pub fn from_cells(size: usize, cells: Vec<Cell>) -> Option<Self> {
        (size.checked_mul(size) == Some(cells.len())).then_some(Self { size, cells })
    }

    /// Parse rows of `#` (wall), `.` (path) and `_` (empty); blank lines
    /// and surrounding whitespace are ignored.
    pub fn from_ascii(art: &str) -> Option<Self> {
        let rows: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for row in &rows {
            if row.chars().count() != size {
                return None;
            }
            for ch in row.chars() {
                cells.push(match ch {
                    '#' => Cell::Wall,
                    '.' | 'V' => Cell::Path,
                    '_' => Cell::Empty,
                    _ => return None,
                });
            }
        }
        Self::from_cells(size, cells)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn index(&self, pos: Pos) -> usize {
        pos.row * self.size + pos.col
    }

    #[inline]
    pub fn pos(&self, index: usize) -> Pos {
        Pos::new(index / self.size, index % self.size)
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Cell {
        self.cells[self.index(pos)]
    }

    #[inline]
    pub fn set(&mut self, pos: Pos, cell: Cell) {
        let idx = self.index(pos);
        self.cells[idx] = cell;
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let size = self.size;
        (0..size * size).map(move |i| Pos::new(i / size, i % size))
    }

    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> {
        pos.neighbors(self.size)
    }

    /// Walls plus off-board sides around a cell.
    pub fn closed_sides(&self, pos: Pos) -> usize {
        let on_board = self.neighbors(pos).count();
        let walls = self.neighbors(pos).filter(|&n| self.get(n).is_wall()).count();
        (4 - on_board) + walls
    }

    pub fn count_in(&self, line: Line, cell: Cell) -> usize {
        line.cells(self.size).filter(|&p| self.get(p) == cell).count()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }

    /// The four cells of the 2×2 square whose top-left corner is `top`.
    pub fn square(&self, top: Pos) -> Option<[Pos; 4]> {
        (top.row + 1 < self.size && top.col + 1 < self.size).then(|| {
            [
                top,
                Pos::new(top.row, top.col + 1),
                Pos::new(top.row + 1, top.col),
                Pos::new(top.row + 1, top.col + 1),
            ]
        })
    }

    /// Top-left corners of every 2×2 square containing `pos`.
    pub fn squares_touching(&self, pos: Pos) -> impl Iterator<Item = [Pos; 4]> + '_ {
        [(-1, -1), (-1, 0), (0, -1), (0, 0)]
            .into_iter()
            .filter_map(move |(dr, dc)| pos.offset(dr, dc, self.size))
            .filter_map(move |top| self.square(top))
    }

    /// Whether some 3×3 window containing `vault`, free of walls, covers all
    /// of `cells`. Open 2×2 squares are allowed only under such a window.
    pub fn open_room_covers(&self, vault: Option<Pos>, cells: &[Pos]) -> bool {
        let Some(vault) = vault else {
            return false;
        };
        Room::around(vault, self.size).into_iter().any(|room| {
            cells.iter().all(|&p| room.contains(p)) && room.cells().all(|p| self.get(p).is_open())
        })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                write!(f, "{}", self.get(Pos::new(row, col)).symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A 3×3 room addressed by its top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    pub top: usize,
    pub left: usize,
}

impl Room {
    pub const SPAN: usize = 3;

    pub fn new(top: usize, left: usize) -> Self {
        Self { top, left }
    }

    /// Every in-bounds room containing `pos`.
    pub fn around(pos: Pos, size: usize) -> Vec<Room> {
        let mut rooms = Vec::new();
        if size < Self::SPAN {
            return rooms;
        }
        let max = size - Self::SPAN;
        for top in pos.row.saturating_sub(Self::SPAN - 1)..=pos.row.min(max) {
            for left in pos.col.saturating_sub(Self::SPAN - 1)..=pos.col.min(max) {
                rooms.push(Room::new(top, left));
            }
        }
        rooms
    }

    pub fn contains(&self, pos: Pos) -> bool {
        (self.top..self.top + Self::SPAN).contains(&pos.row)
            && (self.left..self.left + Self::SPAN).contains(&pos.col)
    }

    pub fn cells(&self) -> impl Iterator<Item = Pos> {
        let (top, left) = (self.top, self.left);
        (0..Self::SPAN * Self::SPAN).map(move |i| Pos::new(top + i / Self::SPAN, left + i % Self::SPAN))
    }

    /// In-bounds cells orthogonally bordering the room from outside.
    pub fn perimeter(&self, size: usize) -> Vec<Pos> {
        let mut cells = Vec::with_capacity(12);
        for k in 0..Self::SPAN {
            if self.top > 0 {
                cells.push(Pos::new(self.top - 1, self.left + k));
            }
            if self.top + Self::SPAN < size {
                cells.push(Pos::new(self.top + Self::SPAN, self.left + k));
            }
            if self.left > 0 {
                cells.push(Pos::new(self.top + k, self.left - 1));
            }
            if self.left + Self::SPAN < size {
                cells.push(Pos::new(self.top + k, self.left + Self::SPAN));
            }
        }
        cells
    }

    /// The cell beyond a perimeter cell, facing away from the room.
    pub fn outward(&self, door: Pos, size: usize) -> Option<Pos> {
        if door.row + 1 == self.top {
            door.offset(-1, 0, size)
        } else if door.row == self.top + Self::SPAN {
            door.offset(1, 0, size)
        } else if door.col + 1 == self.left {
            door.offset(0, -1, size)
        } else if door.col == self.left + Self::SPAN {
            door.offset(0, 1, size)
        } else {
            None
        }
    }

    pub fn touches_edge(&self, size: usize) -> bool {
        self.top == 0 || self.left == 0 || self.top + Self::SPAN == size || self.left + Self::SPAN == size
    }
}

/// The immutable answer and clues of one puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    solution: Grid,
    row_targets: Vec<usize>,
    col_targets: Vec<usize>,
    dead_ends: Vec<bool>,
    vault: Option<Pos>,
}

impl Puzzle {
    /// Derive clues and dead ends from a finished wall/path grid.
    pub fn new(solution: Grid, vault: Option<Pos>) -> Self {
        let size = solution.size();
        let row_targets = (0..size).map(|r| solution.count_in(Line::Row(r), Cell::Wall)).collect();
        let col_targets = (0..size).map(|c| solution.count_in(Line::Col(c), Cell::Wall)).collect();
        let dead_ends = solution
            .positions()
            .map(|p| solution.get(p).is_path() && Some(p) != vault && solution.closed_sides(p) >= 3)
            .collect();
        Self {
            solution,
            row_targets,
            col_targets,
            dead_ends,
            vault,
        }
    }

    /// Build from ASCII art; `V` marks the vault cell (a path).
    pub fn from_ascii(art: &str) -> Option<Self> {
        let solution = Grid::from_ascii(art)?;
        if solution.cells().iter().any(|c| c.is_empty()) {
            return None;
        }
        let vault = art
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .enumerate()
            .find_map(|(r, l)| l.chars().position(|ch| ch == 'V').map(|c| Pos::new(r, c)));
        Some(Self::new(solution, vault))
    }

    pub fn size(&self) -> usize {
        self.solution.size()
    }

    pub fn solution(&self) -> &Grid {
        &self.solution
    }

    pub fn row_targets(&self) -> &[usize] {
        &self.row_targets
    }

    pub fn col_targets(&self) -> &[usize] {
        &self.col_targets
    }

    pub fn target(&self, line: Line) -> usize {
        match line {
            Line::Row(r) => self.row_targets[r],
            Line::Col(c) => self.col_targets[c],
        }
    }

    pub fn vault(&self) -> Option<Pos> {
        self.vault
    }

    pub fn is_dead_end(&self, pos: Pos) -> bool {
        self.dead_ends[self.solution.index(pos)]
    }

    pub fn dead_ends(&self) -> impl Iterator<Item = Pos> + '_ {
        self.solution.positions().filter(|&p| self.is_dead_end(p))
    }

    /// Dead ends and the vault: pre-revealed and never editable.
    pub fn is_fixed(&self, pos: Pos) -> bool {
        self.is_dead_end(pos) || self.vault == Some(pos)
    }

    /// The room the generator carved around the vault, if any.
    pub fn vault_room(&self) -> Option<Room> {
        let vault = self.vault?;
        Room::around(vault, self.size())
            .into_iter()
            .find(|room| room.cells().all(|p| self.solution.get(p).is_path()))
    }
}
