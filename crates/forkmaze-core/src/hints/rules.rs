//! The deduction rules, one type per technique.
//!
//! [`cascade`] lists them in priority order. Each rule reports every finding
//! it can see on the board; the engine takes the first one that passes its
//! checks.

use super::board::Board;
use super::defects::find_defect;
use super::types::{Highlight, Hint, HintKind};
use crate::grid::{Cell, Line, Mark, Pos, Room};
use crate::terms::Terminology;
use crate::validator::is_valid_completion;

/// Trial propagation only runs once the board is this empty or emptier.
pub const TRIAL_LIMIT: usize = 64;

pub trait Rule: Send + Sync {
    fn kind(&self) -> HintKind;

    /// Whether the rule runs at this fork depth.
    fn applies(&self, _board: &Board) -> bool {
        true
    }

    fn findings(&self, board: &Board, terms: &dyn Terminology) -> Vec<Hint>;
}

/// Every rule, highest priority first.
pub fn cascade() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ForkContradiction),
        Box::new(Mistakes),
        Box::new(LineSaturation),
        Box::new(DeadEndClosure),
        Box::new(SquareCompletion),
        Box::new(ForcedExtension),
        Box::new(VaultPlacement),
        Box::new(EdgeArithmetic),
        Box::new(Lookahead),
        Box::new(DualHypothesis),
        Box::new(TrialPropagation),
    ]
}

fn capitalize(text: String) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => text,
    }
}

fn list(cells: &[Pos]) -> String {
    cells.iter().map(Pos::to_string).collect::<Vec<_>>().join(", ")
}

/// Inside a fork: any certain defect means the fork's assumption is wrong.
pub struct ForkContradiction;

impl Rule for ForkContradiction {
    fn kind(&self) -> HintKind {
        HintKind::ForkContradiction
    }

    fn applies(&self, board: &Board) -> bool {
        board.in_fork()
    }

    fn findings(&self, board: &Board, terms: &dyn Terminology) -> Vec<Hint> {
        let Some(defect) = find_defect(board) else {
            return Vec::new();
        };
        let problem = capitalize(defect.describe(board, terms));
        let hint = match board.anchor() {
            Some(anchor) => Hint::notice(
                self.kind(),
                format!(
                    "{problem}. The guess this {fork} started from ({anchor}) can't be right; discard the {fork}.",
                    fork = terms.fork()
                ),
                anchor.into(),
            ),
            None => Hint::notice(
                self.kind(),
                format!(
                    "{problem}. This {} is still blank, so the trouble comes from a layer below it.",
                    terms.fork()
                ),
                defect.highlight(),
            ),
        };
        vec![hint]
    }
}

/// On the base layer: broken structure, or a cell that disagrees with the
/// answer.
pub struct Mistakes;

impl Rule for Mistakes {
    fn kind(&self) -> HintKind {
        HintKind::Mistake
    }

    fn applies(&self, board: &Board) -> bool {
        !board.in_fork()
    }

    fn findings(&self, board: &Board, terms: &dyn Terminology) -> Vec<Hint> {
        let vague = || {
            Hint::notice(
                self.kind(),
                format!(
                    "Something on the board doesn't add up. Look over your recent {} and {}.",
                    terms.walls(),
                    terms.paths()
                ),
                Highlight::None,
            )
        };

        if let Some(defect) = find_defect(board) {
            let hint = if defect.is_obvious() {
                Hint::notice(
                    self.kind(),
                    format!("{}.", capitalize(defect.describe(board, terms))),
                    defect.highlight(),
                )
            } else {
                vague()
            };
            return vec![hint];
        }

        let solution = board.puzzle().solution();
        let wrong = board.grid().positions().any(|p| {
            let cell = board.get(p);
            !cell.is_empty() && cell != solution.get(p)
        });
        if wrong {
            vec![vague()]
        } else {
            Vec::new()
        }
    }
}

/// A line that has all its walls (or all its paths) fills in the rest.
pub struct LineSaturation;

impl Rule for LineSaturation {
    fn kind(&self) -> HintKind {
        HintKind::LineSaturation
    }

    fn findings(&self, board: &Board, terms: &dyn Terminology) -> Vec<Hint> {
        let mut hints = Vec::new();
        for line in Line::all(board.size()) {
            let counts = board.counts(line);
            if counts.empty == 0 {
                continue;
            }
            let target = board.target_walls(line);
            let empties = board.empties_in(line);
            let name = capitalize(line.to_string());

            if counts.walls == target {
                let message = if target == 0 {
                    format!("{name} has no {} at all, so every cell in it is a {}.", terms.walls(), terms.path())
                } else {
                    format!(
                        "{name} already has all {target} of its {}; the rest are {}.",
                        terms.walls(),
                        terms.paths()
                    )
                };
                hints.push(Hint::forcing(self.kind(), message, Highlight::Line(line), empties, Mark::Path));
            } else if counts.paths == board.target_paths(line) {
                let message = format!(
                    "{name} already has all {} of its {}; the rest are {}.",
                    counts.paths,
                    terms.paths(),
                    terms.walls()
                );
                hints.push(Hint::forcing(self.kind(), message, Highlight::Line(line), empties, Mark::Wall));
            }
        }
        hints
    }
}

/// A dead end has exactly one open side.
pub struct DeadEndClosure;

impl Rule for DeadEndClosure {
    fn kind(&self) -> HintKind {
        HintKind::DeadEndClosure
    }

    fn findings(&self, board: &Board, terms: &dyn Terminology) -> Vec<Hint> {
        let mut hints = Vec::new();
        for pos in board.puzzle().dead_ends() {
            let around = board.around(pos);
            if around.empties.is_empty() {
                continue;
            }
            if around.paths.len() == 1 {
                let message = format!(
                    "The {} at {pos} already has its exit at {}, so its other sides are {}.",
                    terms.dead_end(),
                    around.paths[0],
                    terms.walls()
                );
                hints.push(Hint::forcing(self.kind(), message, Highlight::Cell(pos), around.empties, Mark::Wall));
            } else if around.paths.is_empty() && around.closed == 3 {
                let message = format!(
                    "The {} at {pos} is closed on three sides, so {} must be its exit.",
                    terms.dead_end(),
                    around.empties[0]
                );
                hints.push(Hint::forcing(self.kind(), message, Highlight::Cell(pos), around.empties, Mark::Path));
            }
        }
        hints
    }
}

/// Three paths in a 2×2 block force a wall in the fourth cell.
pub struct SquareCompletion;

impl Rule for SquareCompletion {
    fn kind(&self) -> HintKind {
        HintKind::SquareCompletion
    }

    fn findings(&self, board: &Board, terms: &dyn Terminology) -> Vec<Hint> {
        let grid = board.grid();
        let vault = board.puzzle().vault();
        let mut hints = Vec::new();
        for top in grid.positions() {
            let Some(square) = grid.square(top) else {
                continue;
            };
            let paths = square.iter().filter(|&&p| grid.get(p).is_path()).count();
            let empties: Vec<Pos> = square.iter().copied().filter(|&p| grid.get(p).is_empty()).collect();
            if paths != 3 || empties.len() != 1 || grid.open_room_covers(vault, &square) {
                continue;
            }
            let message = format!(
                "Three cells of the 2×2 block at {top} are {}; the fourth, {}, must be a {}.",
                terms.paths(),
                empties[0],
                terms.wall()
            );
            hints.push(Hint::forcing(
                self.kind(),
                message,
                Highlight::Cells(square.to_vec()),
                empties,
                Mark::Wall,
            ));
        }
        hints
    }
}

/// A path that is not a dead end needs two open sides; when exactly that
/// many remain they open, and the corridor is followed while each new cell
/// has a single way on.
pub struct ForcedExtension;

impl Rule for ForcedExtension {
    fn kind(&self) -> HintKind {
        HintKind::ForcedExtension
    }

    fn findings(&self, board: &Board, terms: &dyn Terminology) -> Vec<Hint> {
        let mut hints = Vec::new();
        for pos in board.grid().positions() {
            if !board.get(pos).is_path() || board.is_dead_end(pos) {
                continue;
            }
            let around = board.around(pos);
            if around.paths.len() >= 2 || around.empties.is_empty() {
                continue;
            }
            let needed = 2 - around.paths.len();
            if around.empties.len() != needed {
                continue;
            }

            let mut forced = around.empties.clone();
            if needed == 1 {
                let mut walk = board.with(&forced, Mark::Path);
                let mut current = forced[0];
                loop {
                    let next = walk.around(current);
                    if next.paths.len() != 1 || next.empties.len() != 1 {
                        break;
                    }
                    current = next.empties[0];
                    walk.set(current, Cell::Path);
                    forced.push(current);
                }
            }

            let message = if forced.len() > needed {
                format!(
                    "The {} at {pos} can only go one way; following that corridor fixes {} cells: {}.",
                    terms.path(),
                    forced.len(),
                    list(&forced)
                )
            } else if needed == 2 {
                format!(
                    "The {} at {pos} needs two exits and only {} are left open.",
                    terms.path(),
                    list(&forced)
                )
            } else {
                format!(
                    "The {} at {pos} needs another way out, and {} is its only open side.",
                    terms.path(),
                    forced[0]
                )
            };
            hints.push(Hint::forcing(self.kind(), message, Highlight::Cell(pos), forced, Mark::Path));
        }
        hints
    }
}

/// The vault sits in a 3×3 room of paths with exactly one door.
pub struct VaultPlacement;

impl VaultPlacement {
    /// Door candidates if `room` can still be the vault room.
    fn fit(board: &Board, room: Room) -> Option<Vec<Pos>> {
        let size = board.size();
        if room.cells().any(|p| board.get(p).is_wall() || board.is_dead_end(p)) {
            return None;
        }

        // A door has to lead on past the ring, either straight out or round a
        // ring corner, to a cell that is neither a wall nor a dead end.
        let perimeter = room.perimeter(size);
        let leads_out = |p: Pos| {
            p.neighbors(size).any(|o| {
                !room.contains(o) && !perimeter.contains(&o) && !board.get(o).is_wall() && !board.is_dead_end(o)
            })
        };
        let doors: Vec<Pos> = perimeter
            .iter()
            .copied()
            .filter(|&p| !board.get(p).is_wall() && leads_out(p))
            .collect();
        let open: Vec<Pos> = perimeter.iter().copied().filter(|&p| board.get(p).is_path()).collect();
        match open.as_slice() {
            [] => {}
            [door] if doors.contains(door) => {}
            _ => return None,
        }
        if doors.is_empty() {
            return None;
        }

        // Fill in what this room implies and look for trouble.
        let cells: Vec<Pos> = room.cells().collect();
        let mut hypothesis = board.with(&cells, Mark::Path);
        let door = open.first().copied().or_else(|| (doors.len() == 1).then(|| doors[0]));
        for &p in &perimeter {
            if Some(p) == door {
                hypothesis.set(p, Cell::Path);
            } else if door.is_some() || !doors.contains(&p) {
                hypothesis.set(p, Cell::Wall);
            }
        }
        find_defect(&hypothesis).is_none().then_some(doors)
    }
}

impl Rule for VaultPlacement {
    fn kind(&self) -> HintKind {
        HintKind::VaultPlacement
    }

    fn findings(&self, board: &Board, terms: &dyn Terminology) -> Vec<Hint> {
        let Some(vault) = board.puzzle().vault() else {
            return Vec::new();
        };
        let size = board.size();
        let fits: Vec<(Room, Vec<Pos>)> = Room::around(vault, size)
            .into_iter()
            .filter_map(|room| Self::fit(board, room).map(|doors| (room, doors)))
            .collect();
        let Some((first, _)) = fits.first() else {
            return Vec::new();
        };

        let mut hints = Vec::new();
        let common: Vec<Pos> = first
            .cells()
            .filter(|&p| board.get(p).is_empty() && fits.iter().all(|(room, _)| room.contains(p)))
            .collect();
        if !common.is_empty() {
            let message = format!(
                "Every way the {vault} room can fit around {vault_pos} covers {}, so those cells are {}.",
                list(&common),
                terms.paths(),
                vault = terms.vault(),
                vault_pos = vault
            );
            hints.push(Hint::forcing(
                self.kind(),
                message,
                Highlight::Cells(common.clone()),
                common,
                Mark::Path,
            ));
        }

        if let [(room, doors)] = fits.as_slice() {
            let perimeter = room.perimeter(size);
            let door = perimeter.iter().copied().find(|&p| board.get(p).is_path());
            let closing: Vec<Pos> = perimeter
                .iter()
                .copied()
                .filter(|&p| board.get(p).is_empty())
                .filter(|&p| match door {
                    Some(door) => p != door,
                    None => !doors.contains(&p),
                })
                .collect();
            if !closing.is_empty() {
                let message = match door {
                    Some(door) => format!(
                        "The {} room's door is at {door}; the rest of its edge is {}.",
                        terms.vault(),
                        terms.walls()
                    ),
                    None => format!(
                        "{} can't be the {} room's door, so they close its edge as {}.",
                        list(&closing),
                        terms.vault(),
                        terms.walls()
                    ),
                };
                hints.push(Hint::forcing(
                    self.kind(),
                    message,
                    Highlight::Cells(closing.clone()),
                    closing,
                    Mark::Wall,
                ));
            }
            if let (None, [only]) = (door, doors.as_slice()) {
                if board.get(*only).is_empty() {
                    let message = format!("Only {only} can be the door of the {} room.", terms.vault());
                    hints.push(Hint::forcing(
                        self.kind(),
                        message,
                        Highlight::Cell(*only),
                        vec![*only],
                        Mark::Path,
                    ));
                }
            }
        }
        hints
    }
}

/// Counting along the outer rows and columns, plus corners boxed in by two
/// dead ends.
pub struct EdgeArithmetic;

impl Rule for EdgeArithmetic {
    fn kind(&self) -> HintKind {
        HintKind::EdgeArithmetic
    }

    fn findings(&self, board: &Board, terms: &dyn Terminology) -> Vec<Hint> {
        let size = board.size();
        let mut hints = Vec::new();

        let last = size - 1;
        for corner in [Pos::new(0, 0), Pos::new(0, last), Pos::new(last, 0), Pos::new(last, last)] {
            if !board.get(corner).is_empty() {
                continue;
            }
            if corner.neighbors(size).all(|n| board.is_dead_end(n)) {
                let message = format!(
                    "The corner {corner} sits between two {}; opening it would seal them off together, so it is a {}.",
                    terms.dead_ends(),
                    terms.wall()
                );
                hints.push(Hint::forcing(self.kind(), message, Highlight::Cell(corner), vec![corner], Mark::Wall));
            }
        }

        for line in Line::all(size).filter(|l| l.is_edge(size)) {
            let counts = board.counts(line);
            if board.target_walls(line) != counts.walls + 1 {
                continue;
            }
            for end in line.cells(size).filter(|&p| board.is_dead_end(p)) {
                let around = board.around(end);
                if !around.paths.is_empty() {
                    continue;
                }
                let (inside, outside): (Vec<Pos>, Vec<Pos>) =
                    around.empties.iter().copied().partition(|&p| line.contains(p));
                // Three closed sides; exactly one must still come from this line.
                if inside.is_empty() || around.closed + outside.len() != 2 {
                    continue;
                }
                let name = capitalize(line.to_string());
                if let [wall] = inside.as_slice() {
                    let message = format!(
                        "{name} needs one more {}, and the {} at {end} needs it at {wall}.",
                        terms.wall(),
                        terms.dead_end()
                    );
                    hints.push(Hint::forcing(self.kind(), message, Highlight::Line(line), vec![*wall], Mark::Wall));
                }
                let rest: Vec<Pos> = board
                    .empties_in(line)
                    .into_iter()
                    .filter(|p| !inside.contains(p))
                    .collect();
                if !rest.is_empty() {
                    let message = format!(
                        "{name}'s last {} has to sit beside the {} at {end}, so the rest of the line is {}.",
                        terms.wall(),
                        terms.dead_end(),
                        terms.paths()
                    );
                    hints.push(Hint::forcing(self.kind(), message, Highlight::Line(line), rest, Mark::Path));
                }
            }
        }
        hints
    }
}

/// A line one wall (or one path) short: try each empty cell as that last
/// one and see whether the finished line breaks something.
pub struct Lookahead;

impl Rule for Lookahead {
    fn kind(&self) -> HintKind {
        HintKind::Lookahead
    }

    fn findings(&self, board: &Board, terms: &dyn Terminology) -> Vec<Hint> {
        let mut hints = Vec::new();
        for line in Line::all(board.size()) {
            let counts = board.counts(line);
            if counts.empty < 2 {
                continue;
            }
            let scarce = if board.target_walls(line) == counts.walls + 1 {
                Mark::Wall
            } else if board.target_paths(line) == counts.paths + 1 {
                Mark::Path
            } else {
                continue;
            };

            let empties = board.empties_in(line);
            for &cell in &empties {
                let others: Vec<Pos> = empties.iter().copied().filter(|&p| p != cell).collect();
                let trial = board.with(&[cell], scarce).with(&others, scarce.opposite());
                if let Some(defect) = find_defect(&trial) {
                    let message = format!(
                        "If {cell} were the last {} of {line}, the line would be finished and {}. So {cell} is a {}.",
                        terms.mark(scarce),
                        defect.describe(&trial, terms),
                        terms.mark(scarce.opposite())
                    );
                    hints.push(Hint::forcing(
                        self.kind(),
                        message,
                        Highlight::Cell(cell),
                        vec![cell],
                        scarce.opposite(),
                    ));
                }
            }
        }
        hints
    }
}

/// Four empty cells left and exactly two fillings that satisfy every clue:
/// either one is a correct finish.
pub struct DualHypothesis;

impl Rule for DualHypothesis {
    fn kind(&self) -> HintKind {
        HintKind::DualHypothesis
    }

    fn findings(&self, board: &Board, terms: &dyn Terminology) -> Vec<Hint> {
        let empties = board.empties();
        if empties.len() != 4 {
            return Vec::new();
        }
        let puzzle = board.puzzle();

        let survivors = passing_fillings(board, &empties);
        if survivors.len() != 2 {
            return Vec::new();
        }

        let chosen = if board.in_fork() {
            survivors.first()
        } else {
            let solution = puzzle.solution();
            survivors
                .iter()
                .find(|walls| walls.iter().all(|&p| solution.get(p).is_wall()))
        };
        let Some(walls) = chosen else {
            return Vec::new();
        };

        let message = format!(
            "Only four cells are left and two different fillings satisfy every clue. Either finishes the maze; this one puts {} at {} and {}.",
            terms.walls(),
            walls[0],
            walls[1]
        );
        vec![Hint::forcing(
            self.kind(),
            message,
            Highlight::Cells(empties),
            walls.to_vec(),
            Mark::Wall,
        )]
    }
}

/// Wall pairs among `cells` that, with the other cells as paths, give a
/// valid completion. Row and column counts leave at most two.
fn passing_fillings(board: &Board, cells: &[Pos]) -> Vec<[Pos; 2]> {
    let puzzle = board.puzzle();
    let mut passing = Vec::new();
    for i in 0..cells.len() {
        for j in i + 1..cells.len() {
            let mut grid = board.grid().clone();
            for (k, &pos) in cells.iter().enumerate() {
                let cell = if k == i || k == j { Cell::Wall } else { Cell::Path };
                grid.set(pos, cell);
            }
            if is_valid_completion(&grid, puzzle.row_targets(), puzzle.col_targets(), puzzle.vault()) {
                passing.push([cells[i], cells[j]]);
            }
        }
    }
    passing
}

/// Suppose a value for one empty cell, apply the direct rules until nothing
/// changes, and refute the supposition if the board breaks.
pub struct TrialPropagation;

impl Rule for TrialPropagation {
    fn kind(&self) -> HintKind {
        HintKind::TrialPropagation
    }

    fn findings(&self, board: &Board, terms: &dyn Terminology) -> Vec<Hint> {
        let empties = board.empties();
        if empties.is_empty() || empties.len() > TRIAL_LIMIT {
            return Vec::new();
        }
        let mut hints = Vec::new();
        for cell in empties {
            for guess in [Mark::Wall, Mark::Path] {
                if let Err(reason) = propagate(board.with(&[cell], guess), terms) {
                    let message = format!(
                        "Suppose {cell} were a {}. Following the forced moves from there, {reason}. So {cell} is a {}.",
                        terms.mark(guess),
                        terms.mark(guess.opposite())
                    );
                    hints.push(Hint::forcing(
                        self.kind(),
                        message,
                        Highlight::Cell(cell),
                        vec![cell],
                        guess.opposite(),
                    ));
                    break;
                }
            }
        }
        hints
    }
}

/// Apply the direct rules until nothing changes. Fails with a description of
/// the first defect or conflicting requirement reached.
pub fn propagate<'a>(mut board: Board<'a>, terms: &dyn Terminology) -> Result<Board<'a>, String> {
    let direct: [&dyn Rule; 4] = [&LineSaturation, &DeadEndClosure, &SquareCompletion, &ForcedExtension];
    loop {
        if let Some(defect) = find_defect(&board) {
            return Err(defect.describe(&board, terms));
        }
        let mut changed = false;
        for rule in direct {
            for hint in rule.findings(&board, terms) {
                let Some(mark) = hint.value else {
                    continue;
                };
                for pos in hint.cells {
                    match board.get(pos) {
                        Cell::Empty => {
                            board.set(pos, mark.into());
                            changed = true;
                        }
                        cell if cell == Cell::from(mark) => {}
                        _ => {
                            return Err(format!(
                                "{pos} would have to be both a {} and a {}",
                                terms.wall(),
                                terms.path()
                            ))
                        }
                    }
                }
            }
        }
        if !changed {
            return Ok(board);
        }
    }
}
