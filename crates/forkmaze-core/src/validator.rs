//! Structural check of a finished board.
//!
//! A board is a valid completion when every row and column carries exactly its
//! wall target, no 2×2 square is fully open (except inside the vault room),
//! and the open cells form a single orthogonally connected region. Empty
//! cells count as open, so a player who has placed every wall correctly has
//! finished.

use crate::grid::{Cell, Grid, Line, Pos, Puzzle};
use std::collections::VecDeque;

/// True iff `board` satisfies the clues and the structure rules.
pub fn is_valid_completion(
    board: &Grid,
    row_targets: &[usize],
    col_targets: &[usize],
    vault: Option<Pos>,
) -> bool {
    let size = board.size();
    if row_targets.len() != size || col_targets.len() != size {
        return false;
    }

    let counts_match = (0..size).all(|i| {
        board.count_in(Line::Row(i), Cell::Wall) == row_targets[i]
            && board.count_in(Line::Col(i), Cell::Wall) == col_targets[i]
    });

    counts_match && first_open_square(board, vault).is_none() && is_connected(board)
}

/// [`is_valid_completion`] against a puzzle's own clues.
pub fn is_valid_for(board: &Grid, puzzle: &Puzzle) -> bool {
    is_valid_completion(board, puzzle.row_targets(), puzzle.col_targets(), puzzle.vault())
}

/// Top-left corner of the first fully open 2×2 square that the vault room
/// does not excuse.
pub fn first_open_square(board: &Grid, vault: Option<Pos>) -> Option<Pos> {
    board.positions().find(|&top| {
        board.square(top).is_some_and(|sq| {
            sq.iter().all(|&p| board.get(p).is_open()) && !board.open_room_covers(vault, &sq)
        })
    })
}

/// Whether every open cell reaches every other through open cells.
pub fn is_connected(board: &Grid) -> bool {
    open_components(board, |c| c.is_open()).len() <= 1
}

/// Groups of cells matching `open`, 4-connected, in row-major discovery order.
pub fn open_components(board: &Grid, open: impl Fn(Cell) -> bool) -> Vec<Vec<Pos>> {
    let mut seen = vec![false; board.size() * board.size()];
    let mut components = Vec::new();

    for start in board.positions() {
        if seen[board.index(start)] || !open(board.get(start)) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        seen[board.index(start)] = true;
        while let Some(pos) = queue.pop_front() {
            component.push(pos);
            for next in board.neighbors(pos) {
                let idx = board.index(next);
                if !seen[idx] && open(board.get(next)) {
                    seen[idx] = true;
                    queue.push_back(next);
                }
            }
        }
        components.push(component);
    }
    components
}
