use core::fmt;
use std::{
    fmt::Display,
    ops::{Index, Not},
    str::FromStr,
};

use anyhow::{bail, ensure};
use lazy_static::lazy_static;

pub use anyhow::Result;

pub mod config;
pub mod engine;
pub mod game;

pub const BOARD_SIZE: u8 = 8;

/// Number of rows each side fills at the start of a standard game.
pub const INITIAL_ROWS: u8 = 3;

/// Score of a board without any red pieces.
pub const BLACK_WINS_SCORE: f32 = -1.0e10;
/// Score of a board without any black pieces.
pub const RED_WINS_SCORE: f32 = 1.0e10;

const BLACK_STEPS: &[(i8, i8)] = &[(1, 1), (-1, 1)];
const RED_STEPS: &[(i8, i8)] = &[(1, -1), (-1, -1)];
const KING_STEPS: &[(i8, i8)] = &[(1, -1), (-1, -1), (1, 1), (-1, 1)];

lazy_static! {
    pub static ref START_BOARD: Board = Board::initial(INITIAL_ROWS);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Black,
    Red,
}

impl Side {
    pub const ALL_SIDES: [Side; 2] = [Side::Black, Side::Red];

    /// the row on which a piece of this side becomes a king
    pub const fn promotion_row(self) -> u8 {
        match self {
            Side::Black => BOARD_SIZE - 1,
            Side::Red => 0,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Black => f.write_str("Black"),
            Side::Red => f.write_str("Red"),
        }
    }
}

impl Not for Side {
    type Output = Side;

    fn not(self) -> Self::Output {
        match self {
            Side::Black => Side::Red,
            Side::Red => Side::Black,
        }
    }
}

/// Converts a signed coordinate into a board coordinate, `None` if it is
/// outside of the board.
fn board_coord<T: TryInto<u8>>(value: T) -> Option<u8> {
    // try into checks for < 0
    let value = value.try_into().ok()?;
    (value < BOARD_SIZE).then_some(value)
}

/// Dark cells are the only ones pieces ever stand on.
pub fn is_dark_cell(x: u8, y: u8) -> bool {
    x % 2 != y % 2
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    x: u8,
    y: u8,
    side: Side,
    king: bool,
}

impl Piece {
    pub fn new(x: u8, y: u8, side: Side) -> Self {
        Self::with_king(x, y, side, false)
    }

    pub fn king(x: u8, y: u8, side: Side) -> Self {
        Self::with_king(x, y, side, true)
    }

    fn with_king(x: u8, y: u8, side: Side, king: bool) -> Self {
        assert!(
            x < BOARD_SIZE && y < BOARD_SIZE,
            "piece outside of the board: ({x}, {y})"
        );
        Piece { x, y, side, king }
    }

    #[inline]
    pub fn x(&self) -> u8 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> u8 {
        self.y
    }

    #[inline]
    pub fn position(&self) -> (u8, u8) {
        (self.x, self.y)
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn is_king(&self) -> bool {
        self.king
    }

    pub fn layout_char(&self) -> char {
        match (self.side, self.king) {
            (Side::Black, false) => 'b',
            (Side::Black, true) => 'B',
            (Side::Red, false) => 'r',
            (Side::Red, true) => 'R',
        }
    }

    /// The diagonal unit steps this piece may move along.
    pub fn allowed_steps(&self) -> &'static [(i8, i8)] {
        if self.king {
            return KING_STEPS;
        }
        match self.side {
            Side::Black => BLACK_STEPS,
            Side::Red => RED_STEPS,
        }
    }

    /// Creates the piece moved by the given offset, promoted to a king if it
    /// reaches its promotion row. Returns `None` if the target is not on the
    /// board.
    pub fn translate(&self, dx: i8, dy: i8) -> Option<Piece> {
        let x = board_coord(i16::from(self.x) + i16::from(dx))?;
        let y = board_coord(i16::from(self.y) + i16::from(dy))?;
        let king = self.king || y == self.side.promotion_row();
        Some(Piece {
            x,
            y,
            side: self.side,
            king,
        })
    }

    /// All non-capturing moves of this piece on `board`.
    pub fn normal_moves(&self, board: &Board) -> Vec<Move> {
        self.collect_normal_moves(board, Vec::with_capacity(4))
    }

    /// All capturing moves of this piece on `board`. After a capture this is
    /// also the list of moves that continue the capture chain.
    pub fn capture_moves(&self, board: &Board) -> Vec<Move> {
        self.collect_capture_moves(board, Vec::with_capacity(4))
    }

    fn collect_normal_moves(&self, board: &Board, mut moves: Vec<Move>) -> Vec<Move> {
        for &(dx, dy) in self.allowed_steps() {
            if let Some(next) = self.translate(dx, dy) {
                if board.piece_at(next.x, next.y).is_none() {
                    moves.push(Move::new(*self, next));
                }
            }
        }
        moves
    }

    fn collect_capture_moves(&self, board: &Board, mut moves: Vec<Move>) -> Vec<Move> {
        for &(dx, dy) in self.allowed_steps() {
            let Some(landing) = self.translate(2 * dx, 2 * dy) else {
                continue;
            };
            if board.piece_at(landing.x, landing.y).is_some() {
                continue;
            }
            let jumped = self
                .translate(dx, dy)
                .and_then(|cell| board.piece_at(cell.x, cell.y));
            if let Some(jumped) = jumped {
                if jumped.side != self.side {
                    moves.push(Move::capture(*self, landing, jumped));
                }
            }
        }
        moves
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.layout_char(), self.x, self.y)
    }
}

/// A single ply. `to` is the moved piece after promotion, `captured` the
/// jumped piece of a capturing move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Piece,
    pub to: Piece,
    pub captured: Option<Piece>,
}

impl Move {
    pub fn new(from: Piece, to: Piece) -> Self {
        debug_assert_eq!(from.side, to.side);
        Move {
            from,
            to,
            captured: None,
        }
    }

    pub fn capture(from: Piece, to: Piece, captured: Piece) -> Self {
        debug_assert_eq!(from.side, to.side);
        debug_assert_ne!(from.side, captured.side, "can't capture own piece");
        Move {
            from,
            to,
            captured: Some(captured),
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.is_capture() { 'x' } else { '-' };
        write!(
            f,
            "{} {separator} ({}, {})",
            self.from, self.to.x, self.to.y
        )?;
        if self.to.king && !self.from.king {
            f.write_str(" (king)")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardStats {
    pub blacks: u32,
    pub reds: u32,
    pub black_kings: u32,
    pub red_kings: u32,
}

/// Snapshot of all pieces on the board. Boards are never changed once built,
/// applying a move creates a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    fields: [Option<Piece>; 64],
}

impl Board {
    pub fn empty() -> Self {
        Board { fields: [None; 64] }
    }

    /// Standard opening position with `rows` rows of pieces per side.
    pub fn initial(rows: u8) -> Self {
        assert!(
            rows <= BOARD_SIZE / 2,
            "{rows} initial rows would overlap"
        );
        let mut board = Board::empty();
        for y in 0..BOARD_SIZE {
            let side = if y < rows {
                Side::Black
            } else if y >= BOARD_SIZE - rows {
                Side::Red
            } else {
                continue;
            };
            for x in (0..BOARD_SIZE).filter(|&x| is_dark_cell(x, y)) {
                board.fields[Self::index(x, y)] = Some(Piece::new(x, y, side));
            }
        }
        board
    }

    /// Builds a board from pieces, failing if two of them share a cell.
    pub fn from_pieces(pieces: impl IntoIterator<Item = Piece>) -> Result<Self> {
        let mut board = Board::empty();
        for piece in pieces {
            let field = &mut board.fields[Self::index(piece.x, piece.y)];
            if let Some(other) = field {
                bail!("{piece} and {other} share the same cell");
            }
            *field = Some(piece);
        }
        Ok(board)
    }

    /// Parses the text layout of a board.
    ///
    /// `rows` must contain 8 rows of 8 characters, the first row being row 7.
    /// `b`/`B` are black pieces/kings, `r`/`R` red pieces/kings, `.` and
    /// `' '` are empty cells.
    pub fn from_layout(rows: &[&str]) -> Result<Self> {
        ensure!(
            rows.len() == BOARD_SIZE as usize,
            "expected {BOARD_SIZE} rows, got {}",
            rows.len()
        );
        let mut board = Board::empty();
        for (row_index, row) in rows.iter().enumerate() {
            let y = BOARD_SIZE - 1 - row_index as u8;
            ensure!(
                row.chars().count() == BOARD_SIZE as usize,
                "row {y} ({row:?}) must be {BOARD_SIZE} characters long"
            );
            for (x, char) in row.chars().enumerate() {
                let x = x as u8;
                let piece = match char {
                    'b' => Piece::new(x, y, Side::Black),
                    'B' => Piece::king(x, y, Side::Black),
                    'r' => Piece::new(x, y, Side::Red),
                    'R' => Piece::king(x, y, Side::Red),
                    '.' | ' ' => continue,
                    other => bail!("unexpected character {other:?} at ({x}, {y})"),
                };
                board.fields[Self::index(x, y)] = Some(piece);
            }
        }
        Ok(board)
    }

    #[inline]
    fn index(x: u8, y: u8) -> usize {
        debug_assert!(x < BOARD_SIZE && y < BOARD_SIZE);
        y as usize * BOARD_SIZE as usize + x as usize
    }

    pub fn piece_at(&self, x: u8, y: u8) -> Option<Piece> {
        if x >= BOARD_SIZE || y >= BOARD_SIZE {
            return None;
        }
        self.fields[Self::index(x, y)]
    }

    /// Iterates all pieces, row by row starting at row 0.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.fields.iter().flatten().copied()
    }

    fn pieces_of(&self, side: Side) -> impl Iterator<Item = Piece> + '_ {
        self.pieces().filter(move |piece| piece.side == side)
    }

    /// All moves `side` may play. Captures are mandatory, so this only
    /// contains normal moves if no capture exists.
    pub fn all_moves(&self, side: Side) -> Vec<Move> {
        let captures = self.capture_moves(side);
        if !captures.is_empty() {
            return captures;
        }
        self.normal_moves(side)
    }

    pub fn normal_moves(&self, side: Side) -> Vec<Move> {
        let mut moves = Vec::with_capacity(32);
        for piece in self.pieces_of(side) {
            moves = piece.collect_normal_moves(self, moves);
        }
        moves
    }

    pub fn capture_moves(&self, side: Side) -> Vec<Move> {
        let mut moves = Vec::new();
        for piece in self.pieces_of(side) {
            moves = piece.collect_capture_moves(self, moves);
        }
        moves
    }

    pub fn stats(&self) -> BoardStats {
        let mut stats = BoardStats::default();
        for piece in self.pieces() {
            match piece.side {
                Side::Black => {
                    stats.blacks += 1;
                    stats.black_kings += u32::from(piece.king);
                }
                Side::Red => {
                    stats.reds += 1;
                    stats.red_kings += u32::from(piece.king);
                }
            }
        }
        stats
    }

    /// Material balance of the board. Below 1 favors black, above 1 favors
    /// red. A side without pieces has lost, which is scored with
    /// [BLACK_WINS_SCORE] or [RED_WINS_SCORE].
    pub fn score(&self) -> f32 {
        let stats = self.stats();
        if stats.reds == 0 {
            return BLACK_WINS_SCORE;
        }
        if stats.blacks == 0 {
            return RED_WINS_SCORE;
        }
        (stats.reds + 2 * stats.red_kings) as f32 / (stats.blacks + 2 * stats.black_kings) as f32
    }

    /// Returns the board after `mve` was played.
    ///
    /// `mve` must have been generated from this board.
    pub fn apply_move(&self, mve: Move) -> Board {
        debug_assert_eq!(
            self.piece_at(mve.from.x, mve.from.y),
            Some(mve.from),
            "move {mve} was not generated from this board"
        );
        let mut next = self.clone();
        next.fields[Self::index(mve.from.x, mve.from.y)] = None;
        if let Some(captured) = mve.captured {
            debug_assert_eq!(self.piece_at(captured.x, captured.y), Some(captured));
            next.fields[Self::index(captured.x, captured.y)] = None;
        }
        next.fields[Self::index(mve.to.x, mve.to.y)] = Some(mve.to);
        next
    }
}

impl Index<(u8, u8)> for Board {
    type Output = Option<Piece>;

    fn index(&self, (x, y): (u8, u8)) -> &Self::Output {
        &self.fields[Self::index(x, y)]
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..BOARD_SIZE).rev() {
            for x in 0..BOARD_SIZE {
                let char = match self.piece_at(x, y) {
                    Some(piece) => piece.layout_char(),
                    None if is_dark_cell(x, y) => '.',
                    None => ' ',
                };
                write!(f, "{char}")?;
            }
            if y > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let rows: Vec<&str> = s.lines().collect();
        Board::from_layout(&rows)
    }
}
