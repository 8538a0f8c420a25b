//! Configuration of a game.

use anyhow::ensure;

use crate::{Result, Side, INITIAL_ROWS};

/// The search depth for the automated side. Bigger is harder (and slower).
pub const DEFAULT_SEARCH_DEPTH: u32 = 5;

/// Searches grow exponentially, anything above this does not finish in
/// reasonable time.
pub const MAX_SEARCH_DEPTH: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub search_depth: u32,
    /// rows filled with pieces per side at the start
    pub initial_rows: u8,
    /// the side played by a person, the other side is played by the engine
    pub human_side: Side,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            search_depth: DEFAULT_SEARCH_DEPTH,
            initial_rows: INITIAL_ROWS,
            human_side: Side::Black,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (1..=INITIAL_ROWS).contains(&self.initial_rows),
            "initial rows must be between 1 and {INITIAL_ROWS}, got {}",
            self.initial_rows
        );
        ensure!(
            self.search_depth <= MAX_SEARCH_DEPTH,
            "search depth must be at most {MAX_SEARCH_DEPTH}, got {}",
            self.search_depth
        );
        Ok(())
    }
}
