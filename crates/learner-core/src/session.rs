//! Tracker for the single in-progress game.
//!
//! `NotStarted -> InProgress -> Ended`, with `start()` leading from either
//! resting state into a fresh game. Recording while not started starts a game.

use chrono::Utc;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::board::{Board, Color};
use crate::canonical::canonicalize;
use crate::store::{GameRecord, GameResult, Players, PlyRecord, StatsStore};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    NotStarted,
    InProgress(GameRecord),
    Ended,
}

#[derive(Debug, Default)]
pub struct GameSession {
    state: SessionState,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::InProgress(_))
    }

    /// The game being recorded, if any.
    pub fn current(&self) -> Option<&GameRecord> {
        match &self.state {
            SessionState::InProgress(game) => Some(game),
            _ => None,
        }
    }

    /// Begin a new game and return its id. An unfinished game is discarded.
    pub fn start(&mut self, players: Players) -> String {
        if let SessionState::InProgress(previous) = &self.state {
            warn!(game_id = %previous.id, plies = previous.positions.len(), "Discarding unfinished game");
        }
        let game = GameRecord::new(Ulid::new().to_string(), players);
        let id = game.id.clone();
        info!(game_id = %id, "Game started");
        self.state = SessionState::InProgress(game);
        id
    }

    /// Record the position reached and, optionally, the move played from it.
    ///
    /// The store sees the visit immediately. Returns the canonical key.
    pub fn record_position(
        &mut self,
        store: &mut StatsStore,
        board: &Board,
        side_to_move: Color,
        mv: Option<&str>,
    ) -> String {
        if !self.is_active() {
            self.start(Players::default());
        }
        let hash = canonicalize(board, side_to_move);

        if let SessionState::InProgress(game) = &mut self.state {
            game.positions.push(PlyRecord {
                hash: hash.clone(),
                mv: mv.map(str::to_string),
                player: side_to_move,
                timestamp: Utc::now(),
            });
            if let Some(mv) = mv {
                game.moves.push(mv.to_string());
            }
            debug!(game_id = %game.id, ply = game.positions.len(), hash = %hash, "Position recorded");
        }

        store.get_or_create(&hash, board, side_to_move);
        hash
    }

    /// Finish the current game and fold it into the store.
    ///
    /// Returns `None` when no game is in progress.
    pub fn end(&mut self, store: &mut StatsStore, result: GameResult) -> Option<GameRecord> {
        let mut game = match std::mem::take(&mut self.state) {
            SessionState::InProgress(game) => game,
            other => {
                self.state = other;
                return None;
            }
        };

        game.end_time = Some(Utc::now());
        game.result = Some(result);
        info!(game_id = %game.id, ?result, plies = game.positions.len(), "Game ended");

        store.complete_game(game.clone());
        self.state = SessionState::Ended;
        Some(game)
    }

    /// Drop the current game without folding it.
    pub fn abort(&mut self) -> Option<GameRecord> {
        match std::mem::take(&mut self.state) {
            SessionState::InProgress(game) => {
                info!(game_id = %game.id, "Game aborted");
                Some(game)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Return to `NotStarted`, dropping any game in progress.
    pub fn clear(&mut self) {
        self.state = SessionState::NotStarted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, PieceKind};

    #[test]
    fn test_end_without_game_is_noop() {
        let mut store = StatsStore::new();
        let mut session = GameSession::new();
        assert!(session.end(&mut store, GameResult::White).is_none());
        assert_eq!(session.state(), &SessionState::NotStarted);
        assert!(store.games().is_empty());
    }

    #[test]
    fn test_record_auto_starts() {
        let mut store = StatsStore::new();
        let mut session = GameSession::new();
        let board = Board::starting_position();

        let hash = session.record_position(&mut store, &board, Color::White, Some("e4"));
        assert!(session.is_active());
        let game = session.current().unwrap();
        assert_eq!(game.positions.len(), 1);
        assert_eq!(game.positions[0].hash, hash);
        assert_eq!(game.moves, vec!["e4".to_string()]);
        assert_eq!(store.position(&hash).unwrap().popularity, 1);
    }

    #[test]
    fn test_repeat_position_counts_once_per_game() {
        let mut store = StatsStore::new();
        let mut session = GameSession::new();
        let board = Board::starting_position();

        session.start(Players::default());
        let hash = session.record_position(&mut store, &board, Color::White, Some("Nf3"));
        session.record_position(&mut store, &board, Color::White, Some("Nc3"));
        let game = session.end(&mut store, GameResult::White).unwrap();

        assert_eq!(game.result, Some(GameResult::White));
        assert!(game.end_time.is_some());
        let record = store.position(&hash).unwrap();
        assert_eq!(record.total_games, 1);
        assert_eq!(record.outcomes.white, 1);
        assert_eq!(record.popularity, 2);
        assert_eq!(session.state(), &SessionState::Ended);
        assert!(session.end(&mut store, GameResult::Black).is_none());
    }

    #[test]
    fn test_start_after_end_gets_fresh_id() {
        let mut store = StatsStore::new();
        let mut session = GameSession::new();
        let board = Board::starting_position();

        let first = session.start(Players::default());
        session.record_position(&mut store, &board, Color::White, None);
        session.end(&mut store, GameResult::Draw);

        let second = session.start(Players {
            white: crate::store::PlayerKind::Human,
            black: crate::store::PlayerKind::Computer,
        });
        assert_ne!(first, second);
        assert!(session.current().unwrap().positions.is_empty());
    }

    #[test]
    fn test_abort_does_not_fold() {
        let mut store = StatsStore::new();
        let mut session = GameSession::new();
        let mut board = Board::empty();
        board.set(0, 0, Some(Piece::new(Color::Black, PieceKind::King)));

        let hash = session.record_position(&mut store, &board, Color::Black, None);
        assert!(session.abort().is_some());
        assert!(!session.is_active());
        assert_eq!(store.position(&hash).unwrap().total_games, 0);
        assert!(store.games().is_empty());
    }
}
