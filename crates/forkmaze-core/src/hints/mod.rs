//! Hint engine
//!
//! Runs the deduction rules in priority order over the merged board and
//! returns the first finding. On the base layer every forcing finding is
//! checked against the stored answer before it is shown; inside a fork the
//! player is reasoning about a guess, so findings are only required to follow
//! from the board.

mod board;
mod defects;
mod rules;
mod types;

pub use board::{Around, Board, LineCounts};
pub use defects::{find_defect, Defect};
pub use rules::{cascade, propagate, Rule, TRIAL_LIMIT};
pub use types::{Highlight, Hint, HintKind};

use crate::game::PuzzleState;
use crate::grid::Pos;
use crate::terms::{StandardTerms, Terminology};
use tracing::{trace, warn};

pub struct HintEngine {
    rules: Vec<Box<dyn Rule>>,
    terms: Box<dyn Terminology>,
}

impl Default for HintEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HintEngine {
    pub fn new() -> Self {
        Self::with_terms(Box::new(StandardTerms))
    }

    /// Use custom wording in every message this engine produces.
    pub fn with_terms(terms: Box<dyn Terminology>) -> Self {
        Self {
            rules: cascade(),
            terms,
        }
    }

    /// The highest-priority finding, a "no deduction" notice when nothing
    /// applies, or `None` once the puzzle is solved.
    pub fn next_hint(&self, state: &PuzzleState) -> Option<Hint> {
        if state.is_win() {
            return None;
        }
        let board = state.board();
        self.first_finding(&board, None).or_else(|| Some(self.no_deduction()))
    }

    /// A hint that forces `pos`, for a cell the player is pointing at.
    /// Mistake and contradiction notices still take precedence. `None` for
    /// fixed or filled cells and when no rule decides this one.
    pub fn hint_for_cell(&self, state: &PuzzleState, pos: Pos) -> Option<Hint> {
        if state.is_win() || pos.row >= state.size() || pos.col >= state.size() {
            return None;
        }
        let board = state.board();
        if state.puzzle().is_fixed(pos) || !board.get(pos).is_empty() {
            return None;
        }
        self.first_finding(&board, Some(pos))
    }

    fn first_finding(&self, board: &Board, focus: Option<Pos>) -> Option<Hint> {
        let terms = self.terms.as_ref();
        for rule in &self.rules {
            if !rule.applies(board) {
                continue;
            }
            for hint in rule.findings(board, terms) {
                if !hint.is_forcing() {
                    return Some(hint);
                }
                if focus.is_some_and(|pos| !hint.forces(pos)) {
                    continue;
                }
                if !board.in_fork() && !agrees_with_solution(board, &hint) {
                    // Drop the rest of this rule's findings.
                    warn!(rule = %rule.kind(), cells = hint.cells.len(), "finding contradicts the solution");
                    break;
                }
                trace!(rule = %rule.kind(), cells = hint.cells.len(), "hint found");
                return Some(hint);
            }
        }
        None
    }

    fn no_deduction(&self) -> Hint {
        Hint::notice(
            HintKind::NoDeduction,
            format!(
                "No further deduction is available. Open a {} and test a guess.",
                self.terms.fork()
            ),
            Highlight::None,
        )
    }
}

fn agrees_with_solution(board: &Board, hint: &Hint) -> bool {
    let Some(mark) = hint.value else {
        return true;
    };
    let solution = board.puzzle().solution();
    hint.cells.iter().all(|&p| solution.get(p) == mark.into())
}

/// [`HintEngine::next_hint`] with the standard wording.
pub fn next_hint(state: &PuzzleState) -> Option<Hint> {
    HintEngine::new().next_hint(state)
}

/// [`HintEngine::hint_for_cell`] with the standard wording.
pub fn hint_for_cell(state: &PuzzleState, pos: Pos) -> Option<Hint> {
    HintEngine::new().hint_for_cell(state, pos)
}
