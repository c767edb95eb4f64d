use crate::grid::{Line, Mark, Pos};
use crate::layers::ForkAnchor;
use serde::{Deserialize, Serialize};

/// Which rule produced a hint, in cascade order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HintKind {
    // Checks (nothing forced)
    ForkContradiction,
    Mistake,

    // Direct counting
    LineSaturation,
    DeadEndClosure,
    SquareCompletion,
    ForcedExtension,

    // Structure
    VaultPlacement,
    EdgeArithmetic,

    // Hypothetical
    Lookahead,
    DualHypothesis,
    TrialPropagation,

    NoDeduction,
}

impl std::fmt::Display for HintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HintKind::ForkContradiction => write!(f, "Fork Contradiction"),
            HintKind::Mistake => write!(f, "Mistake"),
            HintKind::LineSaturation => write!(f, "Line Saturation"),
            HintKind::DeadEndClosure => write!(f, "Dead-End Closure"),
            HintKind::SquareCompletion => write!(f, "2×2 Completion"),
            HintKind::ForcedExtension => write!(f, "Forced Extension"),
            HintKind::VaultPlacement => write!(f, "Vault Placement"),
            HintKind::EdgeArithmetic => write!(f, "Edge Arithmetic"),
            HintKind::Lookahead => write!(f, "Lookahead"),
            HintKind::DualHypothesis => write!(f, "Dual Hypothesis"),
            HintKind::TrialPropagation => write!(f, "Trial Propagation"),
            HintKind::NoDeduction => write!(f, "No Deduction"),
        }
    }
}

/// Region a front end should draw attention to
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Highlight {
    #[default]
    None,
    Cell(Pos),
    Cells(Vec<Pos>),
    Line(Line),
}

impl Highlight {
    pub fn covers(&self, pos: Pos) -> bool {
        match self {
            Highlight::None => false,
            Highlight::Cell(p) => *p == pos,
            Highlight::Cells(cells) => cells.contains(&pos),
            Highlight::Line(line) => line.contains(pos),
        }
    }
}

impl From<ForkAnchor> for Highlight {
    fn from(anchor: ForkAnchor) -> Self {
        match anchor {
            ForkAnchor::Cell(pos) => Highlight::Cell(pos),
            ForkAnchor::Line(line) => Highlight::Line(line),
        }
    }
}

/// A hint for the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    /// The rule that found this hint
    pub kind: HintKind,
    /// Explanation of the hint
    pub message: String,
    /// Where to look
    pub highlight: Highlight,
    /// Cells whose value is forced (empty for checks and the fallback)
    pub cells: Vec<Pos>,
    /// The forced value
    pub value: Option<Mark>,
}

impl Hint {
    pub fn forcing(kind: HintKind, message: String, highlight: Highlight, cells: Vec<Pos>, mark: Mark) -> Self {
        Self {
            kind,
            message,
            highlight,
            cells,
            value: Some(mark),
        }
    }

    pub fn notice(kind: HintKind, message: String, highlight: Highlight) -> Self {
        Self {
            kind,
            message,
            highlight,
            cells: Vec::new(),
            value: None,
        }
    }

    /// Carries at least one forced cell.
    pub fn is_forcing(&self) -> bool {
        self.value.is_some() && !self.cells.is_empty()
    }

    pub fn forces(&self, pos: Pos) -> bool {
        self.is_forcing() && self.cells.contains(&pos)
    }
}
