//! Position-keyed statistics store.
//!
//! One in-memory document holds every position record, the completed games and
//! the global metadata. The document is what gets persisted, exported and
//! imported; the pattern tagger stays with the store and is never serialized.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::board::{Board, Color};
use crate::canonical::{board_summary, summary_side};
use crate::error::LearnerError;
use crate::patterns::PatternTagger;

pub const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    White,
    Black,
    Draw,
}

impl GameResult {
    pub fn winner(self) -> Option<Color> {
        match self {
            GameResult::White => Some(Color::White),
            GameResult::Black => Some(Color::Black),
            GameResult::Draw => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcomes {
    pub white: u64,
    pub black: u64,
    pub draw: u64,
}

impl Outcomes {
    pub fn record(&mut self, result: GameResult) {
        match result {
            GameResult::White => self.white += 1,
            GameResult::Black => self.black += 1,
            GameResult::Draw => self.draw += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.white + self.black + self.draw
    }
}

/// Results of one move, from the point of view of the side that played it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStats {
    pub played: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
}

impl MoveStats {
    pub fn record(&mut self, mover: Color, result: GameResult) {
        self.played += 1;
        match result.winner() {
            None => self.draws += 1,
            Some(winner) if winner == mover => self.wins += 1,
            Some(_) => self.losses += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    pub hash: String,
    pub board_summary: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Distinct completed games that reached this position.
    pub total_games: u64,
    pub outcomes: Outcomes,
    pub moves: BTreeMap<String, MoveStats>,
    pub patterns: BTreeSet<String>,
    /// Every recorded visit, repeats within one game included.
    pub popularity: u64,
}

impl PositionRecord {
    fn new(hash: &str, summary: String, patterns: BTreeSet<String>, now: DateTime<Utc>) -> Self {
        Self {
            hash: hash.to_string(),
            board_summary: summary,
            first_seen: now,
            last_seen: now,
            total_games: 0,
            outcomes: Outcomes::default(),
            moves: BTreeMap::new(),
            patterns,
            popularity: 1,
        }
    }

    /// Side that moves from this position, read back from the summary.
    pub fn side_to_move(&self) -> Option<Color> {
        summary_side(&self.board_summary)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    #[default]
    Human,
    Computer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub white: PlayerKind,
    pub black: PlayerKind,
}

/// One recorded ply: the position reached and the move played from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlyRecord {
    pub hash: String,
    #[serde(rename = "move")]
    pub mv: Option<String>,
    pub player: Color,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// `None` while the game is in progress.
    pub result: Option<GameResult>,
    pub players: Players,
    pub positions: Vec<PlyRecord>,
    pub moves: Vec<String>,
}

impl GameRecord {
    pub fn new(id: String, players: Players) -> Self {
        Self {
            id,
            start_time: Utc::now(),
            end_time: None,
            result: None,
            players,
            positions: Vec::new(),
            moves: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    pub total_games: u64,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            last_updated: Utc::now(),
            total_games: 0,
        }
    }
}

/// The persisted document: `{ positions, games, metadata }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub positions: BTreeMap<String, PositionRecord>,
    pub games: Vec<GameRecord>,
    pub metadata: Metadata,
}

impl StoreDocument {
    /// Check the aggregate invariants a well-formed document satisfies.
    pub fn validate(&self) -> Result<(), LearnerError> {
        for (key, record) in &self.positions {
            if *key != record.hash {
                return Err(LearnerError::InvalidDocument(format!(
                    "position key {key} does not match hash {}",
                    record.hash
                )));
            }
            if record.outcomes.total() != record.total_games {
                return Err(LearnerError::InvalidDocument(format!(
                    "position {key}: outcomes sum to {} but totalGames is {}",
                    record.outcomes.total(),
                    record.total_games
                )));
            }
            if record.popularity < record.total_games {
                return Err(LearnerError::InvalidDocument(format!(
                    "position {key}: popularity {} below totalGames {}",
                    record.popularity, record.total_games
                )));
            }
            for (mv, stats) in &record.moves {
                if stats.wins + stats.losses + stats.draws != stats.played {
                    return Err(LearnerError::InvalidDocument(format!(
                        "position {key}: move {mv} results do not add up to plays"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct StatsStore {
    doc: StoreDocument,
    tagger: PatternTagger,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tagger(tagger: PatternTagger) -> Self {
        Self {
            doc: StoreDocument::default(),
            tagger,
        }
    }

    pub fn document(&self) -> &StoreDocument {
        &self.doc
    }

    /// Swap in a whole document, returning the previous one.
    pub fn replace_document(&mut self, doc: StoreDocument) -> StoreDocument {
        std::mem::replace(&mut self.doc, doc)
    }

    pub fn position(&self, key: &str) -> Option<&PositionRecord> {
        self.doc.positions.get(key)
    }

    pub fn positions(&self) -> impl Iterator<Item = &PositionRecord> {
        self.doc.positions.values()
    }

    pub fn position_count(&self) -> usize {
        self.doc.positions.len()
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.doc.games
    }

    pub fn metadata(&self) -> &Metadata {
        &self.doc.metadata
    }

    pub(crate) fn touch_metadata(&mut self, at: DateTime<Utc>) {
        self.doc.metadata.last_updated = at;
    }

    /// Return the record for `key`, creating it on first sight.
    ///
    /// A new record is tagged and summarized from `board`, and its creating
    /// visit counts towards `popularity`. A known record only has `last_seen`
    /// advanced and `popularity` incremented.
    pub fn get_or_create(
        &mut self,
        key: &str,
        board: &Board,
        side_to_move: Color,
    ) -> &mut PositionRecord {
        let now = Utc::now();
        match self.doc.positions.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                let record = entry.into_mut();
                record.last_seen = now;
                record.popularity += 1;
                record
            }
            Entry::Vacant(entry) => {
                let patterns = self.tagger.tag(board, side_to_move);
                debug!(hash = %key, tags = patterns.len(), "New position");
                entry.insert(PositionRecord::new(
                    key,
                    board_summary(board, side_to_move),
                    patterns,
                    now,
                ))
            }
        }
    }

    /// Apply a finished game's result to every distinct position it reached.
    ///
    /// Only the first occurrence of a hash within the game counts, including
    /// the move recorded with that occurrence.
    pub fn fold_game(&mut self, game: &GameRecord) {
        let Some(result) = game.result else {
            warn!(game_id = %game.id, "Skipping fold of unfinished game");
            return;
        };

        let mut seen: HashSet<&str> = HashSet::new();
        for ply in &game.positions {
            if !seen.insert(ply.hash.as_str()) {
                continue;
            }
            let Some(record) = self.doc.positions.get_mut(&ply.hash) else {
                warn!(game_id = %game.id, hash = %ply.hash, "Position missing from store, not folded");
                continue;
            };

            record.total_games += 1;
            record.outcomes.record(result);
            if let Some(mv) = &ply.mv {
                record
                    .moves
                    .entry(mv.clone())
                    .or_default()
                    .record(ply.player, result);
            }
        }
    }

    /// Store a finished game, bump the global counter and fold it.
    pub fn complete_game(&mut self, game: GameRecord) {
        self.fold_game(&game);
        self.doc.metadata.total_games += 1;
        self.doc.metadata.last_updated = Utc::now();
        self.doc.games.push(game);
    }

    /// Drop every position and game and zero the counters.
    pub fn reset(&mut self) {
        self.doc = StoreDocument::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, PieceKind};
    use crate::canonical::canonicalize;

    fn ply(hash: &str, mv: Option<&str>, player: Color) -> PlyRecord {
        PlyRecord {
            hash: hash.to_string(),
            mv: mv.map(str::to_string),
            player,
            timestamp: Utc::now(),
        }
    }

    fn finished(plies: Vec<PlyRecord>, result: GameResult) -> GameRecord {
        let mut game = GameRecord::new("g".into(), Players::default());
        game.moves = plies.iter().filter_map(|p| p.mv.clone()).collect();
        game.positions = plies;
        game.result = Some(result);
        game.end_time = Some(Utc::now());
        game
    }

    #[test]
    fn test_get_or_create_counts_visits() {
        let mut store = StatsStore::new();
        let board = Board::starting_position();
        let key = canonicalize(&board, Color::White);

        let first_seen = store.get_or_create(&key, &board, Color::White).first_seen;
        let record = store.get_or_create(&key, &board, Color::White);
        assert_eq!(record.popularity, 2);
        assert_eq!(record.total_games, 0);
        assert_eq!(record.first_seen, first_seen);
        assert!(record.last_seen >= first_seen);
        assert_eq!(
            record.board_summary,
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w"
        );
        assert!(record.patterns.contains("white_bishop_pair"));
    }

    #[test]
    fn test_patterns_fixed_at_first_sight() {
        let mut store = StatsStore::new();
        let board = Board::starting_position();
        store.get_or_create("k", &board, Color::White);

        let mut other = Board::empty();
        other.set(4, 4, Some(Piece::new(Color::White, PieceKind::Queen)));
        let record = store.get_or_create("k", &other, Color::White);
        assert!(record.patterns.contains("white_king_safety"));
        assert!(!record.patterns.contains("white_center_control"));
    }

    #[test]
    fn test_fold_dedups_repeated_positions() {
        let mut store = StatsStore::new();
        let board = Board::starting_position();
        store.get_or_create("a", &board, Color::White);
        store.get_or_create("b", &board, Color::Black);
        store.get_or_create("a", &board, Color::White);

        let game = finished(
            vec![
                ply("a", Some("Nf3"), Color::White),
                ply("b", Some("Nf6"), Color::Black),
                ply("a", Some("Ng1"), Color::White),
            ],
            GameResult::White,
        );
        store.complete_game(game);

        let a = store.position("a").unwrap();
        assert_eq!(a.total_games, 1);
        assert_eq!(a.outcomes.white, 1);
        assert_eq!(a.popularity, 2);
        assert_eq!(a.moves["Nf3"].wins, 1);
        assert!(!a.moves.contains_key("Ng1"));

        let b = store.position("b").unwrap();
        assert_eq!(b.moves["Nf6"].losses, 1);
        assert_eq!(store.metadata().total_games, 1);
        assert_eq!(store.games().len(), 1);
    }

    #[test]
    fn test_fold_creates_first_move_stats_and_draws() {
        let mut store = StatsStore::new();
        let board = Board::starting_position();
        store.get_or_create("a", &board, Color::White);
        store.fold_game(&finished(vec![ply("a", Some("e4"), Color::White)], GameResult::Draw));

        let a = store.position("a").unwrap();
        assert_eq!(
            a.moves["e4"],
            MoveStats {
                played: 1,
                wins: 0,
                losses: 0,
                draws: 1
            }
        );
        assert_eq!(a.outcomes.draw, 1);
    }

    #[test]
    fn test_fold_skips_unfinished_and_unknown() {
        let mut store = StatsStore::new();
        let board = Board::starting_position();
        store.get_or_create("a", &board, Color::White);

        let mut open = finished(vec![ply("a", None, Color::White)], GameResult::White);
        open.result = None;
        store.fold_game(&open);
        assert_eq!(store.position("a").unwrap().total_games, 0);

        store.fold_game(&finished(vec![ply("zz", None, Color::White)], GameResult::Black));
        assert!(store.position("zz").is_none());
    }

    #[test]
    fn test_outcomes_match_total_games() {
        let mut store = StatsStore::new();
        let board = Board::starting_position();
        for result in [GameResult::White, GameResult::Black, GameResult::Draw, GameResult::White] {
            store.get_or_create("a", &board, Color::White);
            store.complete_game(finished(vec![ply("a", Some("d4"), Color::White)], result));
        }
        let a = store.position("a").unwrap();
        assert_eq!(a.outcomes.total(), a.total_games);
        assert_eq!(a.total_games, 4);
        assert!(a.popularity >= a.total_games);
        assert!(store.document().validate().is_ok());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = StatsStore::new();
        let board = Board::starting_position();
        store.get_or_create("a", &board, Color::White);
        store.complete_game(finished(vec![ply("a", None, Color::White)], GameResult::White));

        store.reset();
        assert_eq!(store.position_count(), 0);
        assert!(store.games().is_empty());
        assert_eq!(store.metadata().total_games, 0);
        assert_eq!(store.metadata().version, SCHEMA_VERSION);
    }

    #[test]
    fn test_validate_rejects_broken_counters() {
        let mut store = StatsStore::new();
        store.get_or_create("a", &Board::starting_position(), Color::White);
        let mut doc = store.document().clone();
        doc.positions.get_mut("a").unwrap().total_games = 3;
        assert!(matches!(
            doc.validate(),
            Err(LearnerError::InvalidDocument(_))
        ));
    }
}
