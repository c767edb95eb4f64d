mod carve;

use crate::grid::{Cell, Grid, Pos, Puzzle, Room, MAX_SIZE, MIN_SIZE};
use crate::rng::{Seed, SeededRng};
use carve::Carver;
use tracing::{debug, warn};

/// Carving strategy chosen by the seed's first coin flip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Randomized depth-first tree
    DepthFirst,
    /// Weighted A* routes between dead-end endpoints
    WeightedRoutes,
}

/// Configuration for puzzle generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Probability of picking depth-first carving
    pub depth_first_bias: f64,
    /// Attempts per route count before trying fewer routes
    pub pair_retries: usize,
    /// Re-plans allowed while digging one route
    pub replan_limit: usize,
    /// Smallest board that gets a vault room
    pub vault_min_size: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            depth_first_bias: 0.5,
            pair_retries: 10,
            replan_limit: 8,
            vault_min_size: 7,
        }
    }
}

impl GeneratorConfig {
    /// Never place a vault room.
    pub fn without_vault() -> Self {
        Self {
            vault_min_size: usize::MAX,
            ..Self::default()
        }
    }
}

/// Puzzle generator
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Create a new generator with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator with custom configuration
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Build a puzzle for `seed`. Sizes outside the supported range are
    /// clamped. Always returns a structurally valid puzzle.
    pub fn generate(&self, seed: Seed, size: usize) -> Puzzle {
        let size = size.clamp(MIN_SIZE, MAX_SIZE);
        let mut rng = seed.rng();

        let strategy = if rng.chance(self.config.depth_first_bias) {
            Strategy::DepthFirst
        } else {
            Strategy::WeightedRoutes
        };
        debug!(%seed, size, ?strategy, "carving");

        let carver = match strategy {
            Strategy::DepthFirst => carve::dfs(&mut rng, size),
            Strategy::WeightedRoutes => self.carve_weighted(&mut rng, size),
        };
        let mut open = carver.open_mask();

        let mut vault = None;
        if size >= self.config.vault_min_size {
            match self.place_vault(&mut rng, size, &open) {
                Some((with_room, cell)) => {
                    debug!(%seed, vault = %cell, "vault placed");
                    open = with_room;
                    vault = Some(cell);
                }
                None => debug!(%seed, "no vault placement fit"),
            }
        }

        let cells = open
            .iter()
            .map(|&o| if o { Cell::Path } else { Cell::Wall })
            .collect();
        let solution = Grid::from_cells(size, cells).unwrap_or_else(|| carve::dfs(&mut rng, size).to_grid());
        Puzzle::new(solution, vault)
    }

    /// Try ever fewer routes, each count a bounded number of times, then
    /// fall back to depth-first carving.
    fn carve_weighted(&self, rng: &mut SeededRng, size: usize) -> Carver {
        let mut pairs = size.saturating_sub(2).max(1);
        loop {
            for attempt in 0..self.config.pair_retries {
                if let Some(carver) = carve::weighted(rng, size, pairs, &self.config) {
                    debug!(pairs, attempt, "weighted carving succeeded");
                    return carver;
                }
            }
            if pairs == 1 {
                break;
            }
            pairs = (pairs * 2 / 3).min(pairs - 1).max(1);
        }
        warn!(size, "weighted carving exhausted, falling back to depth-first");
        carve::dfs(rng, size)
    }

    /// Embed a 3×3 all-path room with one door. Corner and edge positions
    /// are tried before interior ones.
    fn place_vault(&self, rng: &mut SeededRng, size: usize, open: &[bool]) -> Option<(Vec<bool>, Pos)> {
        let max = size.checked_sub(Room::SPAN)?;
        let mut rim = Vec::new();
        let mut inner = Vec::new();
        for top in 0..=max {
            for left in 0..=max {
                let room = Room::new(top, left);
                if room.touches_edge(size) {
                    rim.push(room);
                } else {
                    inner.push(room);
                }
            }
        }
        rng.shuffle(&mut rim);
        rng.shuffle(&mut inner);

        for room in rim.into_iter().chain(inner) {
            if let Some(with_room) = self.try_room(rng, size, open, room) {
                let cells: Vec<Pos> = room.cells().collect();
                let vault = *rng.pick(&cells)?;
                return Some((with_room, vault));
            }
        }
        None
    }

    fn try_room(&self, rng: &mut SeededRng, size: usize, open: &[bool], room: Room) -> Option<Vec<bool>> {
        let idx = |p: Pos| p.row * size + p.col;
        let perimeter = room.perimeter(size);

        // Door candidates are read off the untouched maze.
        let doors: Vec<Pos> = perimeter
            .iter()
            .copied()
            .filter(|&d| room.outward(d, size).is_some_and(|o| open[idx(o)]))
            .collect();
        let door = *rng.pick(&doors)?;

        let mut carver = Carver::from_open(size, open);
        for &p in &perimeter {
            carver.seal(p);
        }
        for p in room.cells() {
            carver.force_open(p);
        }
        carver.force_open(door);

        if !carver.repair(&self.config) {
            return None;
        }

        let grid = carver.to_grid();
        let stray_square = grid.positions().filter_map(|top| grid.square(top)).any(|sq| {
            sq.iter().all(|&p| grid.get(p).is_path()) && !sq.iter().all(|&p| room.contains(p))
        });
        if stray_square {
            return None;
        }

        let mut protected = vec![false; size * size];
        for p in perimeter.iter().copied().chain(room.cells()) {
            protected[idx(p)] = true;
        }
        if !carver.fix_full_lines(rng, &protected) {
            return None;
        }
        Some(carver.open_mask())
    }
}

/// Generate with the default configuration.
pub fn generate_puzzle(seed: Seed, size: usize) -> Puzzle {
    Generator::new().generate(seed, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Line;
    use crate::validator::{first_open_square, is_connected, is_valid_for};

    fn seeds() -> impl Iterator<Item = Seed> {
        let symbols = b"ABCDEFGHJK";
        (0..symbols.len()).flat_map(move |a| {
            (0..4).map(move |b| {
                let text = format!("QZ{}{}W{}", symbols[a] as char, symbols[(a + b) % symbols.len()] as char, b + 2);
                text.parse().unwrap()
            })
        })
    }

    fn assert_structure(puzzle: &Puzzle, label: &str) {
        let grid = puzzle.solution();
        let size = grid.size();
        assert!(is_connected(grid), "{label}: disconnected\n{grid}");
        assert_eq!(first_open_square(grid, puzzle.vault()), None, "{label}: open square\n{grid}");
        for line in Line::all(size) {
            assert!(grid.count_in(line, Cell::Wall) < size, "{label}: {line} all wall\n{grid}");
        }
        assert!(is_valid_for(grid, puzzle), "{label}\n{grid}");
        if let Some(room) = puzzle.vault_room() {
            let doors = room.perimeter(size).into_iter().filter(|&p| grid.get(p).is_path()).count();
            assert_eq!(doors, 1, "{label}: doors\n{grid}");
        }
    }

    #[test]
    fn test_generated_structure() {
        let generator = Generator::new();
        for size in [4, 5, 6, 7, 9, 12] {
            for seed in seeds().take(12) {
                let puzzle = generator.generate(seed, size);
                assert_eq!(puzzle.size(), size);
                assert_structure(&puzzle, &format!("{seed}/{size}"));
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        for seed in seeds().take(8) {
            for size in [4, 8, 11] {
                assert_eq!(generate_puzzle(seed, size), generate_puzzle(seed, size));
            }
        }
    }

    #[test]
    fn test_small_boards_have_no_vault() {
        for seed in seeds().take(10) {
            assert_eq!(generate_puzzle(seed, 6).vault(), None);
        }
    }

    #[test]
    fn test_large_boards_usually_get_a_vault() {
        let placed = seeds().take(20).filter(|&s| generate_puzzle(s, 9).vault().is_some()).count();
        assert!(placed > 0);
    }

    #[test]
    fn test_vault_sits_in_its_room() {
        for seed in seeds().take(20) {
            let puzzle = generate_puzzle(seed, 10);
            if let Some(vault) = puzzle.vault() {
                let room = puzzle.vault_room().expect("vault without room");
                assert!(room.contains(vault));
                assert!(puzzle.is_fixed(vault));
            }
        }
    }

    #[test]
    fn test_each_strategy_is_valid() {
        for seed in seeds().take(10) {
            for bias in [0.0, 1.0] {
                let generator = Generator::with_config(GeneratorConfig {
                    depth_first_bias: bias,
                    ..GeneratorConfig::default()
                });
                let puzzle = generator.generate(seed, 8);
                assert_structure(&puzzle, &format!("{seed} bias {bias}"));
            }
        }
    }

    #[test]
    fn test_size_is_clamped() {
        let seed: Seed = "ZXN8YB".parse().unwrap();
        assert_eq!(generate_puzzle(seed, 1).size(), MIN_SIZE);
        assert_eq!(generate_puzzle(seed, 99).size(), MAX_SIZE);
    }
}
