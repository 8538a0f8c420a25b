use rand::{rngs::ThreadRng, thread_rng, Rng};

use crate::{Board, Move, Side};

use self::minimax::Minimax;

pub trait Engine {
    /// picks the move `side` plays on `board` out of `options`.
    /// Returns `None` if `options` is empty.
    fn choose_move(&mut self, board: &Board, side: Side, options: Vec<Move>) -> Option<Move>;
}

/// Source used to pick one of several equally good moves.
pub trait TieBreak {
    /// returns an index in `0..count`. `count` is never 0.
    fn pick(&mut self, count: usize) -> usize;
}

impl<T: TieBreak + ?Sized> TieBreak for &mut T {
    fn pick(&mut self, count: usize) -> usize {
        (**self).pick(count)
    }
}

/// Picks uniformly at random.
#[derive(Debug, Clone)]
pub struct RandomTieBreak<R>(pub R);

impl<R: Rng> TieBreak for RandomTieBreak<R> {
    fn pick(&mut self, count: usize) -> usize {
        self.0.gen_range(0..count)
    }
}

impl Default for RandomTieBreak<ThreadRng> {
    fn default() -> Self {
        RandomTieBreak(thread_rng())
    }
}

/// Always picks the first candidate in generation order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstTieBreak;

impl TieBreak for FirstTieBreak {
    fn pick(&mut self, _count: usize) -> usize {
        0
    }
}

impl Board {
    /// Searches `depth` plies deep for the best move of `side`.
    /// Black minimizes [Board::score], red maximizes it.
    ///
    /// Returns `None` if `side` has no legal move, which means it lost.
    pub fn optimal_move(&self, side: Side, depth: u32, tie_break: impl TieBreak) -> Option<Move> {
        Minimax::new(depth, tie_break).search(self, side)
    }

    /// Like [Board::optimal_move], but only considers `options`, e.g. the
    /// moves that continue a capture chain.
    pub fn optimal_move_among(
        &self,
        side: Side,
        options: Vec<Move>,
        depth: u32,
        tie_break: impl TieBreak,
    ) -> Option<Move> {
        Minimax::new(depth, tie_break).search_among(self, side, options)
    }
}

pub mod minimax;

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::{FirstTieBreak, RandomTieBreak, TieBreak};
    use crate::{Side, START_BOARD};

    #[test]
    fn random_tie_break_stays_in_range() {
        let mut tie_break = RandomTieBreak(StdRng::seed_from_u64(123456789));
        for count in 1..20 {
            for _ in 0..10 {
                assert!(tie_break.pick(count) < count);
            }
        }
        assert_eq!(FirstTieBreak.pick(5), 0);
    }

    #[test]
    fn seeded_searches_repeat() {
        for side in Side::ALL_SIDES {
            let first =
                START_BOARD.optimal_move(side, 2, RandomTieBreak(StdRng::seed_from_u64(42)));
            let second =
                START_BOARD.optimal_move(side, 2, RandomTieBreak(StdRng::seed_from_u64(42)));
            assert!(first.is_some());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn borrowed_tie_break() {
        let mut tie_break = RandomTieBreak(StdRng::seed_from_u64(7));
        let options = START_BOARD.all_moves(Side::Red);
        for _ in 0..5 {
            let mve = START_BOARD.optimal_move(Side::Red, 1, &mut tie_break).unwrap();
            assert!(options.contains(&mve));
        }
    }
}
