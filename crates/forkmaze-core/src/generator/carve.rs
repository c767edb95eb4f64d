//! Carving primitives shared by both generation strategies.
//!
//! A [`Carver`] tracks which cells are open and how expensive each closed
//! cell is to dig through. Every dig goes through [`Carver::open`], which
//! seals the fourth cell of any 2×2 square that now has three open cells, so
//! no fully open square can appear outside the vault room.

use super::GeneratorConfig;
use crate::grid::{Cell, Grid, Line, Pos, DIRS};
use crate::rng::SeededRng;
use crate::validator::open_components;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Per-step costs, in hundredths, so the search stays integer-only.
const COST_OPEN: u32 = 40;
const COST_WALL: u32 = 100;
const COST_RELAXED: u32 = 10_000;
const COST_TURN: u32 = 5;

/// Direction slot used for the search origin (no previous heading).
const NO_DIR: usize = 4;
const DIR_SLOTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tile {
    Open,
    /// Untouched rock.
    Wall,
    /// Formerly sealed, now diggable at a high price.
    Relaxed,
    /// Never dug.
    Sealed,
}

#[derive(Debug, Clone)]
pub(crate) struct Carver {
    size: usize,
    tiles: Vec<Tile>,
    /// Cells sealed to keep carved endpoints from branching.
    endpoint_seals: Vec<Pos>,
}

impl Carver {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            size,
            tiles: vec![Tile::Wall; size * size],
            endpoint_seals: Vec::new(),
        }
    }

    pub(crate) fn from_open(size: usize, open: &[bool]) -> Self {
        Self {
            size,
            tiles: open
                .iter()
                .map(|&o| if o { Tile::Open } else { Tile::Wall })
                .collect(),
            endpoint_seals: Vec::new(),
        }
    }

    #[inline]
    fn idx(&self, pos: Pos) -> usize {
        pos.row * self.size + pos.col
    }

    #[inline]
    fn pos(&self, idx: usize) -> Pos {
        Pos::new(idx / self.size, idx % self.size)
    }

    pub(crate) fn tile(&self, pos: Pos) -> Tile {
        self.tiles[self.idx(pos)]
    }

    pub(crate) fn is_open(&self, pos: Pos) -> bool {
        self.tile(pos) == Tile::Open
    }

    pub(crate) fn open_mask(&self) -> Vec<bool> {
        self.tiles.iter().map(|&t| t == Tile::Open).collect()
    }

    pub(crate) fn to_grid(&self) -> Grid {
        let cells = self
            .tiles
            .iter()
            .map(|&t| if t == Tile::Open { Cell::Path } else { Cell::Wall })
            .collect();
        Grid::from_cells(self.size, cells).unwrap_or_else(|| Grid::filled(self.size, Cell::Wall))
    }

    fn positions(&self) -> impl Iterator<Item = Pos> {
        let size = self.size;
        (0..size * size).map(move |i| Pos::new(i / size, i % size))
    }

    fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> {
        pos.neighbors(self.size)
    }

    fn open_neighbors(&self, pos: Pos) -> usize {
        self.neighbors(pos).filter(|&n| self.is_open(n)).count()
    }

    /// The other three cells of each 2×2 square that contains `pos`.
    fn square_mates(&self, pos: Pos) -> impl Iterator<Item = [Pos; 3]> + '_ {
        [(-1, -1), (-1, 0), (0, -1), (0, 0)]
            .into_iter()
            .filter_map(move |(dr, dc)| {
                let top = pos.offset(dr, dc, self.size)?;
                let right = top.offset(0, 1, self.size)?;
                let below = top.offset(1, 0, self.size)?;
                let diag = top.offset(1, 1, self.size)?;
                let square = [top, right, below, diag];
                let mut mates = [pos; 3];
                let mut k = 0;
                for p in square {
                    if p != pos {
                        mates[k] = p;
                        k += 1;
                    }
                }
                Some(mates)
            })
    }

    /// Opening `pos` would complete a fully open 2×2 square.
    pub(crate) fn would_block(&self, pos: Pos) -> bool {
        self.square_mates(pos)
            .any(|mates| mates.iter().all(|&m| self.is_open(m)))
    }

    /// Dig a cell and seal whatever would now complete an open square.
    pub(crate) fn open(&mut self, pos: Pos) {
        let idx = self.idx(pos);
        self.tiles[idx] = Tile::Open;
        let to_seal: Vec<Pos> = self
            .square_mates(pos)
            .filter_map(|mates| {
                let closed: Vec<Pos> = mates.iter().copied().filter(|&m| !self.is_open(m)).collect();
                (closed.len() == 1).then(|| closed[0])
            })
            .collect();
        for p in to_seal {
            self.seal(p);
        }
    }

    /// Dig without any square bookkeeping (vault room interior and door).
    pub(crate) fn force_open(&mut self, pos: Pos) {
        let idx = self.idx(pos);
        self.tiles[idx] = Tile::Open;
    }

    /// Close a cell for good. Also used to wall in the vault room, which may
    /// overwrite cells that were already dug.
    pub(crate) fn seal(&mut self, pos: Pos) {
        let idx = self.idx(pos);
        self.tiles[idx] = Tile::Sealed;
    }

    fn step_cost(&self, pos: Pos) -> Option<u32> {
        match self.tile(pos) {
            Tile::Open => Some(COST_OPEN),
            Tile::Wall => Some(COST_WALL),
            Tile::Relaxed => Some(COST_RELAXED),
            Tile::Sealed => None,
        }
    }

    /// Cheapest route from `from` to `to`, both inclusive, with a small
    /// penalty for every change of heading.
    pub(crate) fn astar(&self, from: Pos, to: Pos) -> Option<Vec<Pos>> {
        let n = self.size * self.size;
        let heuristic = |p: Pos| p.manhattan(to) as u32 * COST_OPEN;

        let mut best = vec![u32::MAX; n * DIR_SLOTS];
        let mut prev: Vec<Option<usize>> = vec![None; n * DIR_SLOTS];
        let mut heap = BinaryHeap::new();
        let mut seq = 0u32;

        let origin = self.idx(from) * DIR_SLOTS + NO_DIR;
        best[origin] = 0;
        heap.push(Reverse((heuristic(from), 0u32, seq, origin)));

        while let Some(Reverse((_, g, _, state))) = heap.pop() {
            if g > best[state] {
                continue;
            }
            let pos = self.pos(state / DIR_SLOTS);
            let heading = state % DIR_SLOTS;
            if pos == to {
                let mut route = Vec::new();
                let mut cursor = Some(state);
                while let Some(s) = cursor {
                    route.push(self.pos(s / DIR_SLOTS));
                    cursor = prev[s];
                }
                route.reverse();
                return Some(route);
            }

            for (dir, &(dr, dc)) in DIRS.iter().enumerate() {
                let Some(next) = pos.offset(dr, dc, self.size) else {
                    continue;
                };
                let Some(step) = self.step_cost(next) else {
                    continue;
                };
                let turn = if heading != NO_DIR && heading != dir { COST_TURN } else { 0 };
                let cost = g + step + turn;
                let next_state = self.idx(next) * DIR_SLOTS + dir;
                if cost < best[next_state] {
                    best[next_state] = cost;
                    prev[next_state] = Some(state);
                    seq += 1;
                    heap.push(Reverse((cost + heuristic(next), cost, seq, next_state)));
                }
            }
        }
        None
    }

    /// Dig a route between two cells, re-planning from the last dug cell
    /// whenever the planned route runs into a cell that can no longer be
    /// opened.
    pub(crate) fn carve_path(&mut self, from: Pos, to: Pos, replan_limit: usize) -> bool {
        if self.tile(from) == Tile::Sealed || (!self.is_open(from) && self.would_block(from)) {
            return false;
        }
        let mut replans = 0;
        let mut origin = from;

        'plan: loop {
            let Some(route) = self.astar(origin, to) else {
                return false;
            };
            let mut last = origin;
            for pos in route {
                if self.is_open(pos) {
                    last = pos;
                    continue;
                }
                if self.tile(pos) == Tile::Sealed || self.would_block(pos) {
                    self.seal(pos);
                    replans += 1;
                    if replans > replan_limit || pos == to {
                        return false;
                    }
                    origin = last;
                    continue 'plan;
                }
                self.open(pos);
                last = pos;
            }
            return true;
        }
    }

    /// A closed cell with at most one open neighbour, not boxed in by seals.
    fn is_endpoint_candidate(&self, pos: Pos) -> bool {
        if !matches!(self.tile(pos), Tile::Wall | Tile::Relaxed) {
            return false;
        }
        let on_board: Vec<Pos> = self.neighbors(pos).collect();
        let closed_sides = (4 - on_board.len()) + on_board.iter().filter(|&&n| !self.is_open(n)).count();
        let all_sealed = on_board.iter().all(|&n| self.tile(n) == Tile::Sealed);
        closed_sides >= 3 && !all_sealed && !self.would_block(pos)
    }

    pub(crate) fn pick_endpoint(&self, rng: &mut SeededRng, other: Option<Pos>) -> Option<Pos> {
        let candidates: Vec<Pos> = self
            .positions()
            .filter(|&p| self.is_endpoint_candidate(p))
            .filter(|&p| other.map_or(true, |o| p.manhattan(o) >= 2))
            .collect();
        rng.pick(&candidates).copied()
    }

    /// Seal every closed neighbour of a route endpoint.
    pub(crate) fn seal_endpoint(&mut self, pos: Pos) {
        let closed: Vec<Pos> = self.neighbors(pos).filter(|&n| !self.is_open(n)).collect();
        for n in closed {
            if self.tile(n) != Tile::Sealed {
                self.seal(n);
                self.endpoint_seals.push(n);
            }
        }
    }

    /// Let endpoint seals be dug again at a high price where that cannot
    /// complete an open square.
    pub(crate) fn relax_endpoint_seals(&mut self) -> usize {
        let seals = std::mem::take(&mut self.endpoint_seals);
        let mut relaxed = 0;
        for pos in seals {
            if self.tile(pos) == Tile::Sealed && !self.would_block(pos) {
                let idx = self.idx(pos);
                self.tiles[idx] = Tile::Relaxed;
                relaxed += 1;
            }
        }
        relaxed
    }

    pub(crate) fn components(&self) -> Vec<Vec<Pos>> {
        open_components(&self.to_grid(), |c| c.is_path())
    }

    /// Join every open region to the largest one.
    pub(crate) fn repair(&mut self, config: &GeneratorConfig) -> bool {
        for _ in 0..self.size * self.size {
            let components = self.components();
            if components.len() <= 1 {
                return true;
            }
            let (Some(smallest), Some(largest)) = (
                components.iter().min_by_key(|c| c.len()),
                components.iter().max_by_key(|c| c.len()),
            ) else {
                return true;
            };

            let mut bridge = None;
            for &a in smallest {
                for &b in largest {
                    let d = a.manhattan(b);
                    if bridge.map_or(true, |(_, _, best)| d < best) {
                        bridge = Some((a, b, d));
                    }
                }
            }
            let Some((from, to, _)) = bridge else {
                return false;
            };
            if !self.carve_path(from, to, config.replan_limit) {
                return false;
            }
        }
        self.components().len() <= 1
    }

    /// Open one cell in every all-wall row and column, next to an existing
    /// path and away from `protected` cells.
    pub(crate) fn fix_full_lines(&mut self, rng: &mut SeededRng, protected: &[bool]) -> bool {
        for line in Line::all(self.size) {
            if line.cells(self.size).any(|p| self.is_open(p)) {
                continue;
            }
            let mut candidates: Vec<Pos> = line
                .cells(self.size)
                .filter(|&p| !protected.get(self.idx(p)).copied().unwrap_or(false))
                .filter(|&p| self.open_neighbors(p) > 0)
                .collect();
            rng.shuffle(&mut candidates);
            match candidates.into_iter().find(|&p| !self.would_block(p)) {
                Some(pos) => self.open(pos),
                None => return false,
            }
        }
        true
    }
}

/// Randomized depth-first carving: a wall is dug only while it touches
/// exactly one dug cell, which keeps the result a tree with no open squares.
pub(crate) fn dfs(rng: &mut SeededRng, size: usize) -> Carver {
    let mut carver = Carver::new(size);
    let start = Pos::new(rng.next_below(size), rng.next_below(size));
    carver.open(start);
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let candidates: Vec<Pos> = carver
            .neighbors(current)
            .filter(|&n| !carver.is_open(n) && carver.open_neighbors(n) == 1)
            .collect();
        match rng.pick(&candidates).copied() {
            Some(next) => {
                carver.open(next);
                stack.push(next);
            }
            None => {
                stack.pop();
            }
        }
    }
    carver
}

/// Carve `pairs` weighted routes between dead-end-shaped endpoints, then
/// relax, reconnect and fix all-wall lines. `None` when any step fails.
pub(crate) fn weighted(rng: &mut SeededRng, size: usize, pairs: usize, config: &GeneratorConfig) -> Option<Carver> {
    let mut carver = Carver::new(size);

    for _ in 0..pairs {
        let start = carver.pick_endpoint(rng, None)?;
        let end = carver.pick_endpoint(rng, Some(start))?;
        if !carver.carve_path(start, end, config.replan_limit) {
            return None;
        }
        carver.seal_endpoint(start);
        carver.seal_endpoint(end);
    }

    carver.relax_endpoint_seals();
    if !carver.repair(config) {
        return None;
    }
    let unprotected = vec![false; size * size];
    if !carver.fix_full_lines(rng, &unprotected) {
        return None;
    }
    Some(carver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{first_open_square, is_connected};

    fn seeded(n: u32) -> SeededRng {
        SeededRng::new(n.wrapping_mul(2_654_435_761))
    }

    fn no_full_lines(grid: &Grid) -> bool {
        Line::all(grid.size()).all(|l| grid.count_in(l, Cell::Wall) < grid.size())
    }

    #[test]
    fn test_dfs_invariants() {
        for size in 4..=12 {
            for n in 0..10 {
                let grid = dfs(&mut seeded(n), size).to_grid();
                assert!(is_connected(&grid), "size {size} seed {n}\n{grid}");
                assert_eq!(first_open_square(&grid, None), None, "size {size} seed {n}\n{grid}");
                assert!(no_full_lines(&grid), "size {size} seed {n}\n{grid}");
            }
        }
    }

    #[test]
    fn test_open_seals_fourth_cell() {
        let mut carver = Carver::new(4);
        carver.open(Pos::new(0, 0));
        carver.open(Pos::new(0, 1));
        carver.open(Pos::new(1, 0));
        assert_eq!(carver.tile(Pos::new(1, 1)), Tile::Sealed);
        assert!(carver.would_block(Pos::new(1, 1)));
    }

    #[test]
    fn test_astar_prefers_straight_routes() {
        let carver = Carver::new(5);
        let route = carver.astar(Pos::new(2, 0), Pos::new(2, 4)).unwrap();
        assert_eq!(route.len(), 5);
        assert!(route.iter().all(|p| p.row == 2));
    }

    #[test]
    fn test_astar_avoids_sealed() {
        let mut carver = Carver::new(3);
        carver.seal(Pos::new(0, 1));
        carver.seal(Pos::new(1, 1));
        carver.seal(Pos::new(2, 1));
        assert!(carver.astar(Pos::new(0, 0), Pos::new(0, 2)).is_none());
    }

    #[test]
    fn test_relaxation_skips_square_completing_cells() {
        let mut carver = Carver::new(4);
        carver.open(Pos::new(0, 0));
        carver.seal_endpoint(Pos::new(0, 0));
        assert_eq!(carver.relax_endpoint_seals(), 2);
        assert_eq!(carver.tile(Pos::new(0, 1)), Tile::Relaxed);
    }

    #[test]
    fn test_repair_joins_regions() {
        let mut carver = Carver::new(5);
        carver.open(Pos::new(0, 0));
        carver.open(Pos::new(4, 4));
        assert_eq!(carver.components().len(), 2);
        assert!(carver.repair(&GeneratorConfig::default()));
        assert_eq!(carver.components().len(), 1);
        assert_eq!(first_open_square(&carver.to_grid(), None), None);
    }

    #[test]
    fn test_weighted_invariants_when_successful() {
        let config = GeneratorConfig::default();
        let mut produced = 0;
        for n in 0..20 {
            if let Some(carver) = weighted(&mut seeded(n), 8, 4, &config) {
                produced += 1;
                let grid = carver.to_grid();
                assert!(is_connected(&grid), "{grid}");
                assert_eq!(first_open_square(&grid, None), None, "{grid}");
                assert!(no_full_lines(&grid), "{grid}");
            }
        }
        assert!(produced > 0);
    }
}
