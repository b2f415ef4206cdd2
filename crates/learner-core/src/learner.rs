//! The learner facade: one store, one game session and one storage backend.
//!
//! Nothing here is fatal. Persistence failures are logged and reported as
//! `false`; the in-memory store stays authoritative either way.

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::analysis::{
    Analyzer, Inconsistency, LearningSummary, MoveSuggestion, OpeningLine, PositionStats,
};
use crate::board::{Board, Color};
use crate::config::AnalyzerConfig;
use crate::error::LearnerError;
use crate::opening_tree::build_opening_tree;
use crate::persistence::{decode_document, encode_document, DocumentView, StorageBackend, STORAGE_KEY};
use crate::session::GameSession;
use crate::store::{GameRecord, GameResult, Metadata, Players, StatsStore, StoreDocument};

#[derive(Debug)]
pub struct Learner<B: StorageBackend> {
    store: StatsStore,
    session: GameSession,
    analyzer: Analyzer,
    backend: B,
}

impl<B: StorageBackend> Learner<B> {
    /// Create a learner over an empty store without reading the backend.
    pub fn new(backend: B, config: AnalyzerConfig) -> Self {
        Self {
            store: StatsStore::new(),
            session: GameSession::new(),
            analyzer: Analyzer::new(config),
            backend,
        }
    }

    /// Create a learner and load whatever the backend holds.
    ///
    /// An absent document opens empty. Unreadable or invalid data is an
    /// error, so a caller never saves an empty store over it.
    pub fn open(backend: B, config: AnalyzerConfig) -> Result<Self, LearnerError> {
        let mut learner = Self::new(backend, config);
        learner.try_load()?;
        Ok(learner)
    }

    pub fn with_store(mut self, store: StatsStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn store(&self) -> &StatsStore {
        &self.store
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    /// Replace the in-memory store with the persisted document.
    ///
    /// An absent document loads as empty. On a read or parse failure the
    /// current store is kept and `false` is returned.
    pub fn load(&mut self) -> bool {
        match self.try_load() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to load learner data, keeping in-memory state");
                false
            }
        }
    }

    fn try_load(&mut self) -> Result<(), LearnerError> {
        let doc = match self.backend.get(STORAGE_KEY)? {
            Some(text) => decode_document(&text)?,
            None => {
                info!("No learner data found, starting empty");
                StoreDocument::default()
            }
        };
        info!(
            positions = doc.positions.len(),
            games = doc.games.len(),
            "Learner data loaded"
        );
        self.store.replace_document(doc);
        Ok(())
    }

    /// Persist the store. The store is only touched once the write succeeded.
    pub fn save(&mut self) -> bool {
        match self.try_save() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to save learner data");
                false
            }
        }
    }

    fn try_save(&mut self) -> Result<(), LearnerError> {
        let now = Utc::now();
        let doc = self.store.document();
        let view = DocumentView {
            positions: &doc.positions,
            games: &doc.games,
            metadata: Metadata {
                last_updated: now,
                ..doc.metadata.clone()
            },
        };
        let text = serde_json::to_string(&view)?;
        self.backend.set(STORAGE_KEY, &text)?;
        self.store.touch_metadata(now);
        Ok(())
    }

    /// The full document as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, LearnerError> {
        encode_document(self.store.document())
    }

    /// Replace the store with an exported document and persist it.
    ///
    /// Returns `false` when the input is malformed or inconsistent, or when
    /// the imported document cannot be saved. The store is unchanged in
    /// both cases.
    pub fn import_json(&mut self, text: &str) -> bool {
        let doc = match decode_document(text) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "Rejected learner import");
                return false;
            }
        };
        info!(positions = doc.positions.len(), games = doc.games.len(), "Importing learner data");
        let previous = self.store.replace_document(doc);
        if self.save() {
            return true;
        }
        warn!("Import not persisted, restoring previous learner data");
        self.store.replace_document(previous);
        false
    }

    /// Clear all positions, games and counters, drop any game in progress
    /// and persist the empty store.
    pub fn reset(&mut self) -> bool {
        self.store.reset();
        self.session.clear();
        info!("Learner data reset");
        self.save()
    }

    // ---------------------------------------------------------------------
    // Game tracking
    // ---------------------------------------------------------------------

    pub fn start_game(&mut self, players: Players) -> String {
        self.session.start(players)
    }

    /// Record a position and the move about to be played from it.
    pub fn record_position(&mut self, board: &Board, side_to_move: Color, mv: Option<&str>) -> String {
        self.session
            .record_position(&mut self.store, board, side_to_move, mv)
    }

    /// Finish the current game, fold it and persist.
    pub fn end_game(&mut self, result: GameResult) -> Option<GameRecord> {
        let game = self.end_game_unsaved(result)?;
        self.save();
        Some(game)
    }

    /// Finish and fold the current game without writing the backend.
    ///
    /// For bulk ingestion; the caller saves once when the batch is done.
    pub fn end_game_unsaved(&mut self, result: GameResult) -> Option<GameRecord> {
        self.session.end(&mut self.store, result)
    }

    pub fn abort_game(&mut self) -> Option<GameRecord> {
        self.session.abort()
    }

    // ---------------------------------------------------------------------
    // Analysis
    // ---------------------------------------------------------------------

    pub fn suggest_moves(&self, key: &str, side: Color) -> Vec<MoveSuggestion> {
        self.analyzer.suggest_moves(&self.store, key, side)
    }

    pub fn find_inconsistencies(&self, threshold: f64) -> Vec<Inconsistency> {
        self.analyzer.find_inconsistencies(&self.store, threshold)
    }

    pub fn opening_lines(&self, depth: usize) -> Vec<OpeningLine> {
        self.analyzer.opening_lines(&self.store, depth)
    }

    pub fn opening_tree(&self, depth: usize) -> JsonValue {
        build_opening_tree(self.store.games(), depth)
    }

    pub fn position_stats(&self, key: &str) -> Option<PositionStats> {
        self.analyzer.position_stats(&self.store, key)
    }

    pub fn learning_summary(&self) -> LearningSummary {
        self.analyzer.learning_summary(&self.store)
    }
}
