#![allow(dead_code)]

use learner_core::{AnalyzerConfig, Board, Color, GameResult, Learner, MemoryBackend, Piece, PieceKind, Players};

/// Learner over a fresh in-memory backend.
pub fn memory_learner() -> Learner<MemoryBackend> {
    Learner::new(MemoryBackend::new(), AnalyzerConfig::default())
}

/// Board with only the given pieces, as `(rank, file, color, kind)`.
pub fn board_with(pieces: &[(usize, usize, Color, PieceKind)]) -> Board {
    let mut board = Board::empty();
    for &(rank, file, color, kind) in pieces {
        board.set(rank, file, Some(Piece::new(color, kind)));
    }
    board
}

/// Two bare kings, a stand-in for a distinct position per `file`.
pub fn kings_board(file: usize) -> Board {
    board_with(&[
        (0, file, Color::Black, PieceKind::King),
        (7, 4, Color::White, PieceKind::King),
    ])
}

/// Play `plies` (board, side, move) as one game and end it with `result`.
pub fn play_game(
    learner: &mut Learner<MemoryBackend>,
    plies: &[(Board, Color, Option<&str>)],
    result: GameResult,
) {
    learner.start_game(Players::default());
    for (board, side, mv) in plies {
        learner.record_position(board, *side, *mv);
    }
    learner
        .end_game(result)
        .expect("game should be in progress");
}
