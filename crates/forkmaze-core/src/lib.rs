//! Wall/path grid puzzle engine
//!
//! Players mark every cell of a square grid as wall or path so that each row
//! and column carries its clued number of walls, the paths form one connected
//! maze without open 2×2 blocks, and the revealed dead ends stay dead ends.
//! This crate provides:
//! - seeded, reproducible puzzle generation (optionally with a hidden vault room)
//! - speculative fork layers with commit, discard and single-step undo
//! - a prioritized cascade of explained deductions, including contradiction
//!   detection inside forks
//! - a serde snapshot format and a storage trait for resuming games

pub mod game;
pub mod generator;
pub mod grid;
pub mod hints;
pub mod layers;
pub mod rng;
pub mod store;
pub mod terms;
pub mod validator;
pub mod view;


pub use game::{generate, MoveError, PuzzleState, RestoreError};
pub use generator::{generate_puzzle, Generator, GeneratorConfig, Strategy};
pub use grid::{Cell, Grid, Line, Mark, Pos, Puzzle, Room, MAX_SIZE, MIN_SIZE};
pub use hints::{hint_for_cell, next_hint, Highlight, Hint, HintEngine, HintKind};
pub use layers::{ForkAnchor, LayerStack, MAX_LAYERS};
pub use rng::{Seed, SeedError, SeededRng};
pub use store::{GameStore, MemoryStore, SavedGame, SessionStats, StoreError};
pub use terms::{StandardTerms, Terminology};
pub use view::{BoardView, Renderer};
