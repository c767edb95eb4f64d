use crate::theme::Theme;
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};
use forkmaze_core::{BoardView, Cell, Highlight, Hint, Line, Pos, Renderer, Terminology};
use std::cmp::Ordering;
use std::io::{self, Write};

/// Prints the board as colored text, one line per row.
pub struct TextRenderer<W: Write> {
    out: W,
    theme: Theme,
    terms: Box<dyn Terminology>,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, theme: Theme, terms: Box<dyn Terminology>) -> Self {
        Self { out, theme, terms }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&mut self, fg: Color, bg: Option<Color>, text: &str) -> io::Result<()> {
        if self.theme.is_mono() {
            return queue!(self.out, Print(text));
        }
        if let Some(bg) = bg {
            queue!(self.out, SetBackgroundColor(bg))?;
        }
        queue!(self.out, SetForegroundColor(fg), Print(text), ResetColor)
    }

    fn clue_color(&self, placed: usize, target: usize) -> Color {
        match placed.cmp(&target) {
            Ordering::Less => self.theme.clue,
            Ordering::Equal => self.theme.clue_done,
            Ordering::Greater => self.theme.error,
        }
    }

    fn glyph(view: &BoardView, pos: Pos) -> char {
        if view.vault == Some(pos) {
            'V'
        } else if view.is_dead_end(pos) {
            'o'
        } else {
            match view.cell(pos) {
                Cell::Wall => '#',
                Cell::Path => '.',
                Cell::Empty => '_',
            }
        }
    }

    fn cell_color(&self, view: &BoardView, pos: Pos) -> Color {
        if view.vault == Some(pos) {
            self.theme.vault
        } else if view.is_dead_end(pos) {
            self.theme.dead_end
        } else if view.is_locked(pos) {
            self.theme.locked
        } else {
            match view.cell(pos) {
                Cell::Wall => self.theme.wall,
                Cell::Path => self.theme.path,
                Cell::Empty => self.theme.empty,
            }
        }
    }

    fn render_header(&mut self, view: &BoardView) -> io::Result<()> {
        queue!(self.out, Print("    "))?;
        for c in 0..view.size {
            let (placed, target) = view.wall_progress(Line::Col(c));
            let color = self.clue_color(placed, target);
            self.paint(color, None, &format!("{target:^3}"))?;
        }
        queue!(self.out, Print("\n"))?;
        let border = format!("   +{}+\n", "-".repeat(view.size * 3));
        self.paint(self.theme.border, None, &border)
    }

    fn render_row(&mut self, view: &BoardView, row: usize) -> io::Result<()> {
        queue!(self.out, Print(format!("{:>2} ", row + 1)))?;
        self.paint(self.theme.border, None, "|")?;
        for col in 0..view.size {
            let pos = Pos::new(row, col);
            let glyph = Self::glyph(view, pos);
            let color = self.cell_color(view, pos);
            if view.highlight.covers(pos) {
                let text = if self.theme.is_mono() {
                    format!("[{glyph}]")
                } else {
                    format!(" {glyph} ")
                };
                self.paint(color, Some(self.theme.highlight_bg), &text)?;
            } else {
                self.paint(color, None, &format!(" {glyph} "))?;
            }
        }
        self.paint(self.theme.border, None, "|")?;

        let (placed, target) = view.wall_progress(Line::Row(row));
        let color = self.clue_color(placed, target);
        self.paint(color, None, &format!(" {target}"))?;
        queue!(self.out, Print("\n"))
    }

    fn render_status(&mut self, view: &BoardView) -> io::Result<()> {
        if view.won {
            return self.paint(self.theme.success, None, "Solved!\n");
        }
        let mut status = match view.depth {
            0 => "Base layer".to_string(),
            depth => format!("{} depth {depth}", self.terms.fork()),
        };
        if let Some(anchor) = view.anchor {
            status.push_str(&format!(", started at {anchor}"));
        }
        let empty = view.cells.iter().filter(|c| c.is_empty()).count();
        status.push_str(&format!(", {empty} cells open\n"));
        self.paint(self.theme.info, None, &status)
    }

    /// Print a hint message under the board.
    pub fn render_hint(&mut self, hint: &Hint) -> io::Result<()> {
        self.paint(self.theme.info, None, &format!("[{}] ", hint.kind))?;
        queue!(self.out, Print(&hint.message), Print("\n"))?;
        self.out.flush()
    }

    /// Print a one-line message in the theme's colors.
    pub fn message(&mut self, text: &str, is_error: bool) -> io::Result<()> {
        let color = if is_error { self.theme.error } else { self.theme.info };
        self.paint(color, None, &format!("{text}\n"))?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, view: &BoardView) -> io::Result<()> {
        self.render_header(view)?;
        for row in 0..view.size {
            self.render_row(view, row)?;
        }
        let border = format!("   +{}+\n", "-".repeat(view.size * 3));
        self.paint(self.theme.border, None, &border)?;
        self.render_status(view)?;
        self.out.flush()
    }
}

/// Highlight to draw for a hint, if any.
pub fn highlight_of(hint: Option<&Hint>) -> Highlight {
    hint.map(|h| h.highlight.clone()).unwrap_or_default()
}
