//! Times a search for both sides from the opening position.
//!
//! Usage: `search-stats [depth...]`

use std::time::{Duration, Instant};

use anyhow::{ensure, Context};
use checkers::{
    config::MAX_SEARCH_DEPTH,
    engine::{
        minimax::{Minimax, SearchStats},
        FirstTieBreak,
    },
    Move, Result, Side, START_BOARD,
};

const DEFAULT_DEPTHS: [u32; 4] = [1, 3, 5, 6];

fn main() -> Result<()> {
    let mut depths = std::env::args()
        .skip(1)
        .map(|arg| {
            arg.parse::<u32>()
                .with_context(|| format!("invalid search depth {arg:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if depths.is_empty() {
        depths = DEFAULT_DEPTHS.to_vec();
    }
    for &depth in &depths {
        ensure!(
            depth <= MAX_SEARCH_DEPTH,
            "search depth must be at most {MAX_SEARCH_DEPTH}, got {depth}"
        );
    }

    println!(
        "{:>5} {:>5} {:>12} {:>12} {:>12} {:>12}  best move",
        "depth", "side", "time", "positions", "scored", "chains"
    );
    for depth in depths {
        for side in Side::ALL_SIDES {
            let (best_move, elapsed, stats) = time_search(depth, side);
            print_row(depth, side, best_move, elapsed, stats);
        }
    }
    Ok(())
}

fn time_search(depth: u32, side: Side) -> (Option<Move>, Duration, SearchStats) {
    let mut engine = Minimax::new(depth, FirstTieBreak);
    let start = Instant::now();
    let best_move = engine.search(&START_BOARD, side);
    (best_move, start.elapsed(), engine.stats())
}

fn print_row(depth: u32, side: Side, best_move: Option<Move>, elapsed: Duration, stats: SearchStats) {
    let best_move = best_move.map_or_else(|| "-".to_string(), |mve| mve.to_string());
    println!(
        "{depth:>5} {:>5} {:>12} {:>12} {:>12} {:>12}  {best_move}",
        side.to_string(),
        format!("{elapsed:.2?}"),
        stats.positions_checked,
        stats.boards_scored,
        stats.chain_continuations,
    );
}
