//! Replay parsed games through shakmaty and fold them into a learner.

use learner_core::{
    Board, Color, GameRecord, Learner, Piece, PieceKind, Players, StorageBackend,
};
use shakmaty::{san::San, Chess, File, Position, Rank, Role, Square};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::game_data::GameData;
use crate::pgn;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Game has no final result: {0}")]
    UnfinishedGame(String),

    #[error("Invalid SAN at ply {ply}: {san}")]
    InvalidSan { ply: usize, san: String },

    #[error("Illegal move at ply {ply}: {san}")]
    IllegalMove { ply: usize, san: String },

    #[error("Learner has no game in progress")]
    NotRecorded,
}

fn convert_color(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

fn convert_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

/// Board snapshot of a shakmaty position, eighth rank first.
pub fn snapshot(pos: &Chess) -> (Board, Color) {
    let mut board = Board::empty();
    for row in 0..8u32 {
        for file in 0..8u32 {
            let sq = Square::from_coords(File::new(file), Rank::new(7 - row));
            if let Some(piece) = pos.board().piece_at(sq) {
                board.set(
                    row as usize,
                    file as usize,
                    Some(Piece::new(convert_color(piece.color), convert_role(piece.role))),
                );
            }
        }
    }
    (board, convert_color(pos.turn()))
}

/// Every position of the game with the move played from it; the final
/// position carries no move.
pub fn replay_positions(moves: &[String]) -> Result<Vec<(Board, Color, Option<String>)>, ReplayError> {
    let mut pos = Chess::default();
    let mut plies = Vec::with_capacity(moves.len() + 1);

    for (ply, move_san) in moves.iter().enumerate() {
        let san: San = move_san
            .trim_end_matches(|c: char| c == '+' || c == '#')
            .parse()
            .map_err(|_| ReplayError::InvalidSan {
                ply,
                san: move_san.clone(),
            })?;
        let mv = san.to_move(&pos).map_err(|_| ReplayError::IllegalMove {
            ply,
            san: move_san.clone(),
        })?;

        let (board, side) = snapshot(&pos);
        plies.push((board, side, Some(move_san.clone())));
        pos.play_unchecked(mv);
    }

    let (board, side) = snapshot(&pos);
    plies.push((board, side, None));
    Ok(plies)
}

/// Record a whole game, fold it into the learner and persist.
///
/// The game is replayed before anything is recorded, so an illegal move
/// leaves the learner untouched.
pub fn replay_into<B: StorageBackend>(
    learner: &mut Learner<B>,
    game: &GameData,
) -> Result<GameRecord, ReplayError> {
    let record = fold_game_data(learner, game)?;
    learner.save();
    Ok(record)
}

fn fold_game_data<B: StorageBackend>(
    learner: &mut Learner<B>,
    game: &GameData,
) -> Result<GameRecord, ReplayError> {
    let result = game
        .metadata
        .game_result()
        .ok_or_else(|| ReplayError::UnfinishedGame(game.metadata.result.clone()))?;
    let plies = replay_positions(&game.moves)?;

    learner.start_game(Players::default());
    for (board, side, mv) in &plies {
        learner.record_position(board, *side, mv.as_deref());
    }
    learner
        .end_game_unsaved(result)
        .ok_or(ReplayError::NotRecorded)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub folded: usize,
    pub skipped: usize,
    /// Whether the folded games reached the backend.
    pub saved: bool,
}

/// Parse every game in a PGN text and fold the playable ones.
///
/// The store is written once after the whole batch; nothing is written when
/// no game was folded.
pub fn ingest_pgn<B: StorageBackend>(learner: &mut Learner<B>, text: &str) -> IngestReport {
    let mut report = IngestReport::default();

    for (index, chunk) in pgn::split_games(text).iter().enumerate() {
        let Some(game) = pgn::parse_pgn(chunk) else {
            warn!(index, "Skipping unparsable PGN game");
            report.skipped += 1;
            continue;
        };
        match fold_game_data(learner, &game) {
            Ok(record) => {
                report.folded += 1;
                debug!(
                    index,
                    game_id = %record.id,
                    white = %game.metadata.white,
                    black = %game.metadata.black,
                    "Folded PGN game"
                );
            }
            Err(e) => {
                warn!(index, error = %e, "Skipping PGN game");
                report.skipped += 1;
            }
        }
    }

    if report.folded > 0 {
        report.saved = learner.save();
    }
    info!(
        folded = report.folded,
        skipped = report.skipped,
        saved = report.saved,
        "PGN batch folded"
    );
    report
}
