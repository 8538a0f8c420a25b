use super::{Engine, TieBreak};
use crate::{config::GameConfig, Board, Move, Side};

/// Which direction of [Board::score] is good for a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Minimize,
    Maximize,
}

impl Objective {
    pub fn for_side(side: Side) -> Self {
        match side {
            Side::Black => Objective::Minimize,
            Side::Red => Objective::Maximize,
        }
    }

    /// `true` if `score` is strictly better than `best`
    #[inline]
    pub fn improves(self, score: f32, best: f32) -> bool {
        match self {
            Objective::Minimize => score < best,
            Objective::Maximize => score > best,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub positions_checked: u64,
    pub boards_scored: u64,
    pub chain_continuations: u64,
}

/// Fixed depth search over every legal move without any pruning.
///
/// Every candidate is scored after the best reply of the opponent (found by
/// searching one ply less) has been played on top of it. Captures that can be
/// continued by the same piece are searched for the same side instead.
pub struct Minimax<T> {
    depth: u32,
    tie_break: T,
    stats: SearchStats,
}

impl<T: TieBreak> Minimax<T> {
    pub fn new(depth: u32, tie_break: T) -> Self {
        Minimax {
            depth,
            tie_break,
            stats: SearchStats::default(),
        }
    }

    pub fn from_config(config: &GameConfig, tie_break: T) -> Self {
        Self::new(config.search_depth, tie_break)
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// statistics of all searches since creation or the last [Minimax::reset_stats]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }

    pub fn search(&mut self, board: &Board, side: Side) -> Option<Move> {
        let options = board.all_moves(side);
        self.search_recursive(board, side, options, self.depth)
    }

    pub fn search_among(&mut self, board: &Board, side: Side, options: Vec<Move>) -> Option<Move> {
        self.search_recursive(board, side, options, self.depth)
    }

    fn search_recursive(
        &mut self,
        board: &Board,
        side: Side,
        options: Vec<Move>,
        depth: u32,
    ) -> Option<Move> {
        self.stats.positions_checked += 1;

        let objective = Objective::for_side(side);
        let mut best_score: Option<f32> = None;
        let mut best_moves = Vec::new();

        for mve in options {
            let mut next_board = board.apply_move(mve);

            if depth > 0 {
                let chain = if mve.is_capture() {
                    mve.to.capture_moves(&next_board)
                } else {
                    Vec::new()
                };
                let reply = if chain.is_empty() {
                    let replies = next_board.all_moves(!side);
                    self.search_recursive(&next_board, !side, replies, depth - 1)
                } else {
                    self.stats.chain_continuations += 1;
                    self.search_recursive(&next_board, side, chain, depth - 1)
                };
                if let Some(reply) = reply {
                    next_board = next_board.apply_move(reply);
                }
            }

            let score = next_board.score();
            self.stats.boards_scored += 1;

            match best_score {
                Some(best) if score == best => best_moves.push(mve),
                Some(best) if !objective.improves(score, best) => {}
                _ => {
                    best_score = Some(score);
                    best_moves.clear();
                    best_moves.push(mve);
                }
            }
        }

        if best_moves.is_empty() {
            return None;
        }
        let index = self.tie_break.pick(best_moves.len());
        Some(best_moves[index])
    }
}

impl<T: TieBreak> Engine for Minimax<T> {
    fn choose_move(&mut self, board: &Board, side: Side, options: Vec<Move>) -> Option<Move> {
        self.search_among(board, side, options)
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::{Minimax, Objective};
    use crate::{
        engine::{FirstTieBreak, RandomTieBreak, TieBreak},
        Board, Move, Piece, Side, START_BOARD,
    };

    /// red king on (3,4) can take the black king on (4,5) or the man on (2,3)
    const RED_KING_CHOICE: &[&str] = &[
        ". . . . ",
        " . . . .",
        ". . B . ",
        " . R . .",
        ". b . . ",
        " . . . .",
        ". . . . ",
        " . . . b",
    ];

    /// black king on (3,4) can take the red king on (4,5) or the man on (2,3)
    const BLACK_KING_CHOICE: &[&str] = &[
        "r . . . ",
        " . . . .",
        ". . R . ",
        " . B . .",
        ". r . . ",
        " . . . .",
        ". . . . ",
        " . . . .",
    ];

    /// red on (5,6) has a double jump, red on (7,2) a single jump that
    /// promotes but gets answered by a black capture
    const RED_CHAIN: &[&str] = &[
        ". . . . ",
        " . . r .",
        ". . b . ",
        " . . . .",
        ". b . . ",
        " . . . r",
        ". . . b ",
        " . . . .",
    ];

    /// red king on (3,4) can take either man on row 3 or the king on (4,5)
    const RED_KING_OR_MEN: &[&str] = &[
        ". . . . ",
        " . . . .",
        ". . B . ",
        " . R . .",
        ". b b . ",
        " . . . .",
        ". . . . ",
        " . . . .",
    ];

    fn board(rows: &[&str]) -> Board {
        Board::from_layout(rows).unwrap()
    }

    /// remembers every `count` it was asked to pick from
    #[derive(Default)]
    struct CountRecorder(Vec<usize>);

    impl TieBreak for CountRecorder {
        fn pick(&mut self, count: usize) -> usize {
            self.0.push(count);
            0
        }
    }

    #[test]
    fn objective_direction() {
        assert_eq!(Objective::for_side(Side::Black), Objective::Minimize);
        assert_eq!(Objective::for_side(Side::Red), Objective::Maximize);
        assert!(Objective::Minimize.improves(0.5, 1.0));
        assert!(!Objective::Minimize.improves(1.0, 1.0));
        assert!(Objective::Maximize.improves(2.0, 1.0));
        assert!(!Objective::Maximize.improves(0.5, 1.0));
    }

    #[test]
    fn red_takes_the_king() {
        let board = board(RED_KING_CHOICE);
        assert_eq!(board.all_moves(Side::Red).len(), 2);

        let mve = board.optimal_move(Side::Red, 0, FirstTieBreak).unwrap();
        assert_eq!(
            mve,
            Move::capture(
                Piece::king(3, 4, Side::Red),
                Piece::king(5, 6, Side::Red),
                Piece::king(4, 5, Side::Black)
            )
        );
    }

    #[test]
    fn black_takes_the_king() {
        let board = board(BLACK_KING_CHOICE);
        let mve = board.optimal_move(Side::Black, 0, FirstTieBreak).unwrap();
        assert_eq!(mve.captured, Some(Piece::king(4, 5, Side::Red)));
        assert_eq!(mve.to, Piece::king(5, 6, Side::Black));
    }

    #[test]
    fn prefers_capture_chain() {
        let board = board(RED_CHAIN);
        assert_eq!(board.all_moves(Side::Red).len(), 2);

        let mut minimax = Minimax::new(1, FirstTieBreak);
        let mve = minimax.search(&board, Side::Red).unwrap();
        assert_eq!(
            mve,
            Move::capture(
                Piece::new(5, 6, Side::Red),
                Piece::new(3, 4, Side::Red),
                Piece::new(4, 5, Side::Black)
            )
        );
        let stats = minimax.stats();
        assert_eq!(stats.chain_continuations, 1);
        // root, chain continuation, black reply to the promotion
        assert_eq!(stats.positions_checked, 3);
        assert_eq!(stats.boards_scored, 4);

        minimax.reset_stats();
        assert_eq!(minimax.stats().positions_checked, 0);
    }

    #[test]
    fn chain_continuation_among_options() {
        let board = board(RED_CHAIN);
        let first = board.all_moves(Side::Red)[1];
        assert_eq!(first.from, Piece::new(5, 6, Side::Red));
        let board = board.apply_move(first);

        let options = first.to.capture_moves(&board);
        assert_eq!(options.len(), 1);
        let mve = board
            .optimal_move_among(Side::Red, options.clone(), 3, FirstTieBreak)
            .unwrap();
        assert_eq!(mve, options[0]);
        assert_eq!(
            board.optimal_move_among(Side::Red, vec![], 3, FirstTieBreak),
            None
        );
    }

    #[test]
    fn tie_break_sees_all_equal_moves() {
        // no capture in the opening, every move keeps the balance
        let mut recorder = CountRecorder::default();
        let mve = START_BOARD.optimal_move(Side::Black, 0, &mut recorder);
        assert_eq!(mve, Some(START_BOARD.all_moves(Side::Black)[0]));
        assert_eq!(recorder.0, vec![7]);

        // the two man captures tie first, the king capture replaces them
        let board = board(RED_KING_OR_MEN);
        assert_eq!(board.all_moves(Side::Red).len(), 3);
        let mut recorder = CountRecorder::default();
        let mve = board.optimal_move(Side::Red, 0, &mut recorder).unwrap();
        assert_eq!(mve.captured, Some(Piece::king(4, 5, Side::Black)));
        assert_eq!(recorder.0, vec![1]);
    }

    #[test]
    fn no_moves_no_result() {
        // black stuck on the last row without being a king, no red pieces
        let stuck = Board::from_pieces([Piece::new(1, 7, Side::Black)]).unwrap();
        assert_eq!(stuck.all_moves(Side::Black), vec![]);
        assert_eq!(stuck.optimal_move(Side::Black, 3, FirstTieBreak), None);
        assert_eq!(stuck.optimal_move(Side::Red, 3, FirstTieBreak), None);
        assert_eq!(Board::empty().optimal_move(Side::Red, 0, FirstTieBreak), None);
    }

    #[test]
    fn result_is_a_legal_move() {
        let boards = [
            START_BOARD.clone(),
            board(RED_KING_CHOICE),
            board(BLACK_KING_CHOICE),
            board(RED_CHAIN),
        ];
        let mut rng = StdRng::seed_from_u64(123456789);
        for board in boards {
            for side in Side::ALL_SIDES {
                let legal = board.all_moves(side);
                for depth in 0..3 {
                    let mve = board.optimal_move(side, depth, RandomTieBreak(&mut rng));
                    match mve {
                        Some(mve) => assert!(legal.contains(&mve), "{mve} is not legal"),
                        None => assert!(legal.is_empty()),
                    }
                }
            }
        }
    }
}
