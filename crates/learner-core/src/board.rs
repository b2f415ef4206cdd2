//! Board snapshot types supplied by the owning application.
//!
//! The learner never mutates a board; it only reads placements to build keys,
//! summaries and pattern tags.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Single-character marker (`w` / `b`).
    pub fn marker(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }

    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    /// Parse `white`/`black` (case-insensitive) or the `w`/`b` markers.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Some(Color::White),
            "black" | "b" => Some(Color::Black),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Lowercase piece letter (`p n b r q k`).
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Two-character code: color marker followed by the piece letter, e.g. `wk`.
    pub fn code(self) -> [char; 2] {
        [self.color.marker(), self.kind.letter()]
    }

    /// FEN-style letter: uppercase for white, lowercase for black.
    pub fn fen_letter(self) -> char {
        match self.color {
            Color::White => self.kind.letter().to_ascii_uppercase(),
            Color::Black => self.kind.letter(),
        }
    }
}

pub const BOARD_SIZE: usize = 8;

/// An 8x8 grid indexed `[rank][file]`, rank 0 first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    pub squares: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Standard starting position with black's back rank at rank 0.
    pub fn starting_position() -> Self {
        use PieceKind::*;
        let back = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        let mut board = Self::empty();
        for (file, kind) in back.iter().enumerate() {
            board.squares[0][file] = Some(Piece::new(Color::Black, *kind));
            board.squares[1][file] = Some(Piece::new(Color::Black, Pawn));
            board.squares[6][file] = Some(Piece::new(Color::White, Pawn));
            board.squares[7][file] = Some(Piece::new(Color::White, *kind));
        }
        board
    }

    pub fn get(&self, rank: usize, file: usize) -> Option<Piece> {
        self.squares.get(rank)?.get(file).copied().flatten()
    }

    pub fn set(&mut self, rank: usize, file: usize, piece: Option<Piece>) {
        if rank < BOARD_SIZE && file < BOARD_SIZE {
            self.squares[rank][file] = piece;
        }
    }

    /// All occupied squares as `(rank, file, piece)`, rank by rank.
    pub fn pieces(&self) -> impl Iterator<Item = (usize, usize, Piece)> + '_ {
        self.squares.iter().enumerate().flat_map(|(rank, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(file, cell)| cell.map(|piece| (rank, file, piece)))
        })
    }

    pub fn count(&self, color: Color, kind: PieceKind) -> usize {
        self.pieces()
            .filter(|(_, _, p)| p.color == color && p.kind == kind)
            .count()
    }

    pub fn king_square(&self, color: Color) -> Option<(usize, usize)> {
        self.pieces()
            .find(|(_, _, p)| p.color == color && p.kind == PieceKind::King)
            .map(|(rank, file, _)| (rank, file))
    }
}
