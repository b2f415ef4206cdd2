//! Canonical position keys and compact board summaries.
//!
//! The key is an approximation: the placement string is base64-encoded, cut to
//! a fixed length and filtered to ASCII alphanumerics. Stripping `+`, `/` and
//! `=` is lossy, so two different boards can in rare cases share a key. The
//! store treats a shared key as the same position.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::board::{Board, Color};

/// Upper bound on the encoded key length before filtering.
///
/// A full board renders to at most 137 bytes (16 per rank, 7 separators, the
/// two-byte side suffix), which base64-encodes to 184 characters.
pub const CANONICAL_KEY_LEN: usize = 184;

const RANK_SEPARATOR: char = '/';
const SIDE_SEPARATOR: char = ':';

/// Run-length-encoded placement string with a side-to-move marker,
/// e.g. `brbnbbbqbkbbbnbr/bpbpbpbpbpbpbpbp/8/.../wrwnwbwqwkwbwnwr:w`.
pub fn placement_string(board: &Board, side_to_move: Color) -> String {
    let mut out = String::with_capacity(64);
    for (rank, row) in board.squares.iter().enumerate() {
        if rank > 0 {
            out.push(RANK_SEPARATOR);
        }
        let mut empty = 0u8;
        for cell in row {
            match cell {
                Some(piece) => {
                    if empty > 0 {
                        out.push_str(&empty.to_string());
                        empty = 0;
                    }
                    out.extend(piece.code());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push_str(&empty.to_string());
        }
    }
    out.push(SIDE_SEPARATOR);
    out.push(side_to_move.marker());
    out
}

/// Map a board and side to move to a short, stable, printable key.
pub fn canonicalize(board: &Board, side_to_move: Color) -> String {
    let encoded = STANDARD.encode(placement_string(board, side_to_move));
    encoded
        .chars()
        .take(CANONICAL_KEY_LEN)
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// FEN-style placement summary followed by the side to move, e.g.
/// `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w`.
///
/// Lossy: castling rights, en passant and move counters are not kept.
pub fn board_summary(board: &Board, side_to_move: Color) -> String {
    let mut out = String::with_capacity(72);
    for (rank, row) in board.squares.iter().enumerate() {
        if rank > 0 {
            out.push('/');
        }
        let mut empty = 0u8;
        for cell in row {
            match cell {
                Some(piece) => {
                    if empty > 0 {
                        out.push((b'0' + empty) as char);
                        empty = 0;
                    }
                    out.push(piece.fen_letter());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push((b'0' + empty) as char);
        }
    }
    out.push(' ');
    out.push(side_to_move.marker());
    out
}

/// Side to move recorded at the end of a board summary.
pub fn summary_side(summary: &str) -> Option<Color> {
    let (_, side) = summary.rsplit_once(' ')?;
    let mut chars = side.chars();
    let marker = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Color::from_marker(marker)
}
