//! Speculative fork layers over the player's board.
//!
//! Layer 0 is the committed board. `fork` opens a fresh layer on top; moves
//! go to the top layer only and may not touch a cell that any lower layer has
//! already decided. `commit` folds the top layer down, `discard` throws it
//! away. A single undo snapshot is kept.

use crate::grid::{Cell, Grid, Line, Pos};
use serde::{Deserialize, Serialize};

/// Maximum number of stacked layers, including the base layer.
pub const MAX_LAYERS: usize = 4;

/// What the player first touched after opening a fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForkAnchor {
    Cell(Pos),
    Line(Line),
}

impl std::fmt::Display for ForkAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForkAnchor::Cell(pos) => write!(f, "cell {}", pos),
            ForkAnchor::Line(line) => write!(f, "{}", line),
        }
    }
}

/// State restored by `undo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoSnapshot {
    pub layers: Vec<Grid>,
    pub anchors: Vec<Option<ForkAnchor>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStack {
    layers: Vec<Grid>,
    /// Parallel to `layers`; entry 0 is always `None`.
    anchors: Vec<Option<ForkAnchor>>,
    undo: Option<UndoSnapshot>,
}

impl LayerStack {
    pub fn new(size: usize) -> Self {
        Self {
            layers: vec![Grid::new(size)],
            anchors: vec![None],
            undo: None,
        }
    }

    /// Rebuild from persisted parts; `None` if they do not fit together.
    pub fn from_parts(
        layers: Vec<Grid>,
        anchors: Vec<Option<ForkAnchor>>,
        undo: Option<UndoSnapshot>,
    ) -> Option<Self> {
        let shape_ok = |layers: &[Grid], anchors: &[Option<ForkAnchor>]| {
            !layers.is_empty()
                && layers.len() <= MAX_LAYERS
                && layers.len() == anchors.len()
                && anchors[0].is_none()
                && layers.iter().all(|l| l.size() == layers[0].size())
        };
        if !shape_ok(&layers, &anchors) {
            return None;
        }
        if let Some(snap) = &undo {
            if !shape_ok(&snap.layers, &snap.anchors) || snap.layers[0].size() != layers[0].size() {
                return None;
            }
        }
        Some(Self { layers, anchors, undo })
    }

    pub fn size(&self) -> usize {
        self.layers[0].size()
    }

    /// Index of the active layer.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    pub fn layers(&self) -> &[Grid] {
        &self.layers
    }

    pub fn anchors(&self) -> &[Option<ForkAnchor>] {
        &self.anchors
    }

    /// Anchor of the active fork, if one is open and has been acted on.
    pub fn active_anchor(&self) -> Option<ForkAnchor> {
        self.anchors[self.depth()]
    }

    pub fn undo_snapshot(&self) -> Option<&UndoSnapshot> {
        self.undo.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.is_some()
    }

    /// Wall beats path beats empty across every layer up to the active one.
    pub fn merged(&self, pos: Pos) -> Cell {
        let mut seen_path = false;
        for layer in &self.layers {
            match layer.get(pos) {
                Cell::Wall => return Cell::Wall,
                Cell::Path => seen_path = true,
                Cell::Empty => {}
            }
        }
        if seen_path {
            Cell::Path
        } else {
            Cell::Empty
        }
    }

    pub fn merged_grid(&self) -> Grid {
        let size = self.size();
        let mut grid = Grid::new(size);
        for pos in self.layers[0].positions() {
            grid.set(pos, self.merged(pos));
        }
        grid
    }

    /// A lower layer already decided this cell.
    pub fn is_locked(&self, pos: Pos) -> bool {
        self.layers[..self.depth()]
            .iter()
            .any(|layer| !layer.get(pos).is_empty())
    }

    /// Value the active layer holds for `pos`.
    pub fn active_value(&self, pos: Pos) -> Cell {
        self.layers[self.depth()].get(pos)
    }

    fn remember(&mut self) {
        self.undo = Some(UndoSnapshot {
            layers: self.layers.clone(),
            anchors: self.anchors.clone(),
        });
    }

    fn touch_anchor(&mut self, anchor: ForkAnchor) {
        let depth = self.depth();
        if depth > 0 && self.anchors[depth].is_none() {
            self.anchors[depth] = Some(anchor);
        }
    }

    pub fn fork(&mut self) -> bool {
        if self.layers.len() >= MAX_LAYERS {
            return false;
        }
        self.remember();
        self.layers.push(Grid::new(self.size()));
        self.anchors.push(None);
        true
    }

    pub fn commit(&mut self) -> bool {
        if self.depth() == 0 {
            return false;
        }
        self.remember();
        let Some(top) = self.layers.pop() else {
            return false;
        };
        self.anchors.pop();
        let below = self.layers.len() - 1;
        for pos in top.positions() {
            let value = top.get(pos);
            if !value.is_empty() {
                self.layers[below].set(pos, value);
            }
        }
        true
    }

    pub fn discard(&mut self) -> bool {
        if self.depth() == 0 {
            return false;
        }
        self.remember();
        self.layers.pop();
        self.anchors.pop();
        true
    }

    pub fn undo(&mut self) -> bool {
        match self.undo.take() {
            Some(snap) => {
                self.layers = snap.layers;
                self.anchors = snap.anchors;
                true
            }
            None => false,
        }
    }

    /// Set one cell of the active layer. Rejected when locked or unchanged.
    pub fn apply(&mut self, pos: Pos, value: Cell) -> bool {
        if self.is_locked(pos) || self.active_value(pos) == value {
            return false;
        }
        self.remember();
        let depth = self.depth();
        self.layers[depth].set(pos, value);
        self.touch_anchor(ForkAnchor::Cell(pos));
        true
    }

    /// Set every cell of `line` accepted by `editable` that is still empty in
    /// the merged view. Rejected if nothing would change.
    pub fn apply_line(&mut self, line: Line, value: Cell, editable: impl Fn(Pos) -> bool) -> bool {
        let targets: Vec<Pos> = line
            .cells(self.size())
            .filter(|&p| editable(p) && !self.is_locked(p) && self.merged(p).is_empty())
            .filter(|&p| self.active_value(p) != value)
            .collect();
        if targets.is_empty() {
            return false;
        }
        self.remember();
        let depth = self.depth();
        for pos in targets {
            self.layers[depth].set(pos, value);
        }
        self.touch_anchor(ForkAnchor::Line(line));
        true
    }

    /// Same layers, depth and anchors (ignores the undo slot).
    pub fn same_board(&self, other: &LayerStack) -> bool {
        self.layers == other.layers && self.anchors == other.anchors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_precedence() {
        let mut stack = LayerStack::new(4);
        let p = Pos::new(1, 1);
        assert!(stack.apply(p, Cell::Wall));
        assert!(stack.fork());
        // locked by layer 0
        assert!(!stack.apply(p, Cell::Path));
        assert_eq!(stack.merged(p), Cell::Wall);
    }

    #[test]
    fn test_merge_keeps_wall_over_later_path() {
        let mut stack = LayerStack::new(4);
        stack.fork();
        let p = Pos::new(0, 0);
        stack.apply(p, Cell::Path);
        let raw = LayerStack::from_parts(
            vec![Grid::from_ascii("#___\n____\n____\n____").unwrap(), stack.layers()[1].clone()],
            vec![None, None],
            None,
        )
        .unwrap();
        assert_eq!(raw.layers()[1].get(p), Cell::Path);
        assert_eq!(raw.merged(p), Cell::Wall);
    }

    #[test]
    fn test_lock_invariant_across_depths() {
        let mut stack = LayerStack::new(5);
        let a = Pos::new(0, 0);
        let b = Pos::new(2, 3);
        stack.apply(a, Cell::Path);
        stack.fork();
        stack.apply(b, Cell::Wall);
        stack.fork();
        for value in [Cell::Empty, Cell::Wall, Cell::Path] {
            assert!(!stack.apply(a, value));
            assert!(!stack.apply(b, value));
        }
        assert!(stack.apply(Pos::new(4, 4), Cell::Wall));
    }

    #[test]
    fn test_fork_depth_limit() {
        let mut stack = LayerStack::new(4);
        assert!(stack.fork());
        assert!(stack.fork());
        assert!(stack.fork());
        assert_eq!(stack.depth(), 3);
        assert!(!stack.fork());
        assert_eq!(stack.depth(), 3);
    }

    #[test]
    fn test_fork_commit_round_trip() {
        let mut stack = LayerStack::new(4);
        stack.apply(Pos::new(0, 1), Cell::Wall);
        let before = stack.clone();
        assert!(stack.fork());
        assert!(stack.commit());
        assert!(stack.same_board(&before));
    }

    #[test]
    fn test_commit_folds_non_empty() {
        let mut stack = LayerStack::new(4);
        stack.apply(Pos::new(0, 0), Cell::Wall);
        stack.fork();
        stack.apply(Pos::new(3, 3), Cell::Path);
        assert_eq!(stack.active_anchor(), Some(ForkAnchor::Cell(Pos::new(3, 3))));
        assert!(stack.commit());
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.layers()[0].get(Pos::new(0, 0)), Cell::Wall);
        assert_eq!(stack.layers()[0].get(Pos::new(3, 3)), Cell::Path);
    }

    #[test]
    fn test_discard_drops_layer() {
        let mut stack = LayerStack::new(4);
        stack.fork();
        stack.apply(Pos::new(2, 2), Cell::Wall);
        assert!(stack.discard());
        assert_eq!(stack.merged(Pos::new(2, 2)), Cell::Empty);
        assert!(!stack.discard());
        assert!(!stack.commit());
    }

    #[test]
    fn test_single_undo() {
        let mut stack = LayerStack::new(4);
        stack.apply(Pos::new(0, 0), Cell::Wall);
        stack.apply(Pos::new(0, 1), Cell::Wall);
        assert!(stack.undo());
        assert_eq!(stack.merged(Pos::new(0, 0)), Cell::Wall);
        assert_eq!(stack.merged(Pos::new(0, 1)), Cell::Empty);
        // only one level is kept
        assert!(!stack.undo());
    }

    #[test]
    fn test_rejected_move_keeps_undo_slot() {
        let mut stack = LayerStack::new(4);
        stack.apply(Pos::new(0, 0), Cell::Wall);
        assert!(!stack.apply(Pos::new(0, 0), Cell::Wall));
        assert!(stack.undo());
        assert_eq!(stack.merged(Pos::new(0, 0)), Cell::Empty);
    }

    #[test]
    fn test_apply_line_anchors_line() {
        let mut stack = LayerStack::new(4);
        stack.apply(Pos::new(1, 0), Cell::Wall);
        stack.fork();
        assert!(stack.apply_line(Line::Row(1), Cell::Path, |_| true));
        assert_eq!(stack.active_anchor(), Some(ForkAnchor::Line(Line::Row(1))));
        assert_eq!(stack.merged(Pos::new(1, 0)), Cell::Wall);
        assert_eq!(stack.merged(Pos::new(1, 3)), Cell::Path);
        assert!(!stack.apply_line(Line::Row(1), Cell::Path, |_| true));
    }

    #[test]
    fn test_from_parts_rejects_bad_shapes() {
        assert!(LayerStack::from_parts(vec![], vec![], None).is_none());
        assert!(LayerStack::from_parts(vec![Grid::new(4)], vec![None, None], None).is_none());
        assert!(LayerStack::from_parts(
            vec![Grid::new(4), Grid::new(5)],
            vec![None, None],
            None
        )
        .is_none());
        assert!(LayerStack::from_parts(vec![Grid::new(4); 5], vec![None; 5], None).is_none());
    }
}
