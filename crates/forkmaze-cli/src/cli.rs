use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use forkmaze_core::{Cell, Mark};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "forkmaze")]
#[command(author, version, about = "Wall and path maze puzzles with speculative forks")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory for the saved game and stats
    #[arg(long, global = true, env = "FORKMAZE_HOME")]
    pub home: Option<PathBuf>,

    /// Color theme
    #[arg(long, global = true, value_enum, default_value_t = ThemeName::Dark)]
    pub theme: ThemeName,

    /// Wording used in hints
    #[arg(long, global = true, value_enum, default_value_t = TermsName::Standard)]
    pub terms: TermsName,

    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new puzzle, replacing any game in progress
    New {
        /// Six-character seed (random if omitted)
        #[arg(long)]
        seed: Option<String>,

        /// Board size
        #[arg(long, default_value_t = 6)]
        size: usize,
    },

    /// Print the board
    Show,

    /// Set or clear one cell (1-based row and column)
    Mark {
        row: usize,
        col: usize,
        #[arg(value_enum)]
        value: CellArg,
    },

    /// Fill every open cell of a row or column
    Line {
        #[arg(value_enum)]
        kind: LineKind,
        /// 1-based row or column number
        index: usize,
        #[arg(value_enum)]
        value: MarkArg,
    },

    /// Open a new layer for a guess
    Fork,

    /// Fold the top layer into the one below
    Commit,

    /// Throw away the top layer
    Discard,

    /// Take back the last change
    Undo,

    /// Explain the next deduction, or one for a given cell
    Hint {
        #[arg(requires = "col")]
        row: Option<usize>,
        col: Option<usize>,
    },

    /// Look for mistakes without revealing a deduction
    Check,

    /// Clear every layer and start the same puzzle over
    Reset,

    /// Show win totals
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeName {
    Dark,
    Light,
    Mono,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TermsName {
    Standard,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CellArg {
    Wall,
    Path,
    Clear,
}

impl From<CellArg> for Cell {
    fn from(arg: CellArg) -> Self {
        match arg {
            CellArg::Wall => Cell::Wall,
            CellArg::Path => Cell::Path,
            CellArg::Clear => Cell::Empty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarkArg {
    Wall,
    Path,
}

impl From<MarkArg> for Mark {
    fn from(arg: MarkArg) -> Self {
        match arg {
            MarkArg::Wall => Mark::Wall,
            MarkArg::Path => Mark::Path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LineKind {
    Row,
    Col,
}
