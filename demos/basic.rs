//! Basic example of using the forkmaze engine

use forkmaze_core::{generate, Cell, Line, Mark, Pos, Seed};

fn main() {
    // Generate a puzzle
    let seed: Seed = "ZXN8YB".parse().expect("valid seed");
    println!("Generating a 6×6 puzzle from seed {seed}...\n");
    let mut state = generate(seed, 6);

    let puzzle = state.puzzle();
    println!("Row clues:    {:?}", puzzle.row_targets());
    println!("Column clues: {:?}", puzzle.col_targets());
    println!("Dead ends:    {:?}", puzzle.dead_ends().map(|p| p.to_string()).collect::<Vec<_>>());
    println!("Answer:\n{}", puzzle.solution());

    // Try a guess in a fork, then throw it away
    println!("--- Forking ---\n");
    state.fork();
    if state.apply_line(Line::Row(0), Mark::Wall).is_ok() {
        if let Some(hint) = state.next_hint() {
            println!("[{}] {}\n", hint.kind, hint.message);
        }
    }
    state.discard();

    // Let the hints play the game
    println!("--- Following hints ---\n");
    while let Some(hint) = state.next_hint() {
        println!("[{}] {}", hint.kind, hint.message);
        let Some(mark) = hint.value else {
            break;
        };
        for pos in hint.cells {
            if state.is_win() {
                break;
            }
            if let Err(e) = state.apply_move(pos, Cell::from(mark)) {
                println!("  {pos}: {e}");
            }
        }
    }

    println!("\nSolved: {} after {} moves", state.is_win(), state.moves());
    println!("Cell {} is {:?}", Pos::new(0, 0), state.cell(Pos::new(0, 0)));
}
