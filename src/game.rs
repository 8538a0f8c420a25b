use anyhow::{bail, ensure};

use crate::{config::GameConfig, engine::Engine, Board, Move, Piece, Result, Side};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TurnState {
    /// any piece of the side to move may be used
    #[default]
    AwaitingSelection,
    /// `piece` just captured and has to continue with one of `moves`
    ChainLocked { piece: Piece, moves: Vec<Move> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyOutcome {
    /// the same side has to capture again with the same piece
    ChainContinues,
    /// the other side is to move
    TurnPassed,
    GameOver { winner: Side },
}

/// Keeps track of the current board, whose turn it is and of capture chains.
pub struct Game<E> {
    board: Board,
    to_move: Side,
    state: TurnState,
    winner: Option<Side>,
    config: GameConfig,
    engine: E,
    engine_last_moves: Vec<Move>,
}

impl<E: Engine> Game<E> {
    /// Starts a game from the opening position, black moves first.
    pub fn new(config: GameConfig, engine: E) -> Result<Self> {
        config.validate()?;
        let board = Board::initial(config.initial_rows);
        Ok(Self::from_board(board, Side::Black, config, engine))
    }

    pub fn from_board(board: Board, to_move: Side, config: GameConfig, engine: E) -> Self {
        let mut game = Game {
            board,
            to_move,
            state: TurnState::AwaitingSelection,
            winner: None,
            config,
            engine,
            engine_last_moves: Vec::new(),
        };
        game.check_for_winner();
        game
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn to_move(&self) -> Side {
        self.to_move
    }

    #[inline]
    pub fn state(&self) -> &TurnState {
        &self.state
    }

    #[inline]
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn is_engine_turn(&self) -> bool {
        !self.is_over() && self.to_move != self.config.human_side
    }

    /// the moves of the last turn played by the engine
    pub fn engine_last_moves(&self) -> &[Move] {
        &self.engine_last_moves
    }

    /// All moves the side to move may play right now.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_over() {
            return vec![];
        }
        match &self.state {
            TurnState::AwaitingSelection => self.board.all_moves(self.to_move),
            TurnState::ChainLocked { moves, .. } => moves.clone(),
        }
    }

    /// The legal moves of the piece at (`x`, `y`). Empty if there is no piece,
    /// it belongs to the other side or another piece is locked in a chain.
    pub fn moves_from(&self, x: u8, y: u8) -> Vec<Move> {
        let mut moves = self.legal_moves();
        moves.retain(|m| m.from.position() == (x, y));
        moves
    }

    /// Plays `mve` for the side to move. Fails on the engine's turn, use
    /// [Game::play_engine_turn] for that.
    pub fn play(&mut self, mve: Move) -> Result<PlyOutcome> {
        if let Some(winner) = self.winner {
            bail!("the game is over, {winner} won");
        }
        ensure!(
            !self.is_engine_turn(),
            "{} is played by the engine",
            self.to_move
        );
        ensure!(
            self.legal_moves().contains(&mve),
            "{mve} is not a legal move for {}",
            self.to_move
        );
        Ok(self.apply(mve))
    }

    /// Lets the engine play the whole turn of the side to move, including
    /// all captures of a chain.
    pub fn play_engine_turn(&mut self) -> Result<PlyOutcome> {
        if let Some(winner) = self.winner {
            bail!("the game is over, {winner} won");
        }
        let side = self.to_move;
        self.engine_last_moves.clear();
        loop {
            let options = self.legal_moves();
            let Some(mve) = self.engine.choose_move(&self.board, side, options) else {
                let winner = !side;
                self.winner = Some(winner);
                return Ok(PlyOutcome::GameOver { winner });
            };
            ensure!(
                self.legal_moves().contains(&mve),
                "engine chose illegal move {mve}"
            );
            self.engine_last_moves.push(mve);
            match self.apply(mve) {
                PlyOutcome::ChainContinues => continue,
                outcome => return Ok(outcome),
            }
        }
    }

    fn apply(&mut self, mve: Move) -> PlyOutcome {
        self.board = self.board.apply_move(mve);

        if mve.is_capture() {
            let moves = mve.to.capture_moves(&self.board);
            if !moves.is_empty() {
                self.state = TurnState::ChainLocked {
                    piece: mve.to,
                    moves,
                };
                return PlyOutcome::ChainContinues;
            }
        }

        self.state = TurnState::AwaitingSelection;
        self.to_move = !self.to_move;
        self.check_for_winner();
        match self.winner {
            Some(winner) => PlyOutcome::GameOver { winner },
            None => PlyOutcome::TurnPassed,
        }
    }

    /// A side without any legal move has lost.
    fn check_for_winner(&mut self) {
        if self.board.all_moves(self.to_move).is_empty() {
            self.winner = Some(!self.to_move);
        }
    }
}
