//! Read-only analysis over the statistics store.
//!
//! Move scoring and the inconsistency baseline are strategies, so stronger
//! models can replace the defaults without touching the store or tracker.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::board::Color;
use crate::config::AnalyzerConfig;
use crate::store::{GameRecord, GameResult, MoveStats, Outcomes, PositionRecord, StatsStore};

/// Scores a move given its win rate from the requesting side's point of view.
pub trait MoveScorer: Send + Sync {
    fn score(&self, win_rate: f64, stats: &MoveStats) -> f64;
}

/// Win rate plus a bonus that shrinks linearly to zero at `threshold` plays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplorationScorer {
    pub k: f64,
    pub threshold: u64,
}

impl ExplorationScorer {
    pub fn bonus(&self, played: u64) -> f64 {
        if self.threshold == 0 {
            return 0.0;
        }
        self.k * (1.0 - played as f64 / self.threshold as f64).max(0.0)
    }
}

impl MoveScorer for ExplorationScorer {
    fn score(&self, win_rate: f64, stats: &MoveStats) -> f64 {
        win_rate + self.bonus(stats.played)
    }
}

/// Expected white score for a position.
pub trait ExpectationModel: Send + Sync {
    fn expected(&self, record: &PositionRecord) -> f64;
}

/// Every position is expected to be an even game.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvenBaseline;

impl ExpectationModel for EvenBaseline {
    fn expected(&self, _record: &PositionRecord) -> f64 {
        0.5
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSuggestion {
    #[serde(rename = "move")]
    pub mv: String,
    pub played: u64,
    pub win_rate: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inconsistency {
    pub hash: String,
    pub board_summary: String,
    pub total_games: u64,
    pub expected: f64,
    pub actual: f64,
    /// `actual - expected`
    pub deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpeningLine {
    pub moves: Vec<String>,
    pub games: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionStats {
    pub hash: String,
    pub board_summary: String,
    pub total_games: u64,
    pub popularity: u64,
    pub white_rate: f64,
    pub black_rate: f64,
    pub draw_rate: f64,
    pub patterns: Vec<String>,
    pub move_count: usize,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularPosition {
    pub hash: String,
    pub board_summary: String,
    pub popularity: u64,
    pub total_games: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningSummary {
    pub total_positions: usize,
    pub total_games: u64,
    pub results: Outcomes,
    pub most_popular: Vec<PopularPosition>,
}

fn rate(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

pub struct Analyzer {
    config: AnalyzerConfig,
    scorer: Box<dyn MoveScorer>,
    expectation: Box<dyn ExpectationModel>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer").field("config", &self.config).finish()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let scorer = ExplorationScorer {
            k: config.exploration_bonus,
            threshold: config.experience_threshold,
        };
        Self {
            config,
            scorer: Box::new(scorer),
            expectation: Box::new(EvenBaseline),
        }
    }

    pub fn with_scorer(mut self, scorer: Box<dyn MoveScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_expectation(mut self, expectation: Box<dyn ExpectationModel>) -> Self {
        self.expectation = expectation;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Rank the moves played from `key`, best first, for `side`.
    ///
    /// Win rates are relative to the side that played the move; asking from
    /// the other side's perspective uses the complementary loss rate. Equal
    /// scores keep move-key order.
    pub fn suggest_moves(&self, store: &StatsStore, key: &str, side: Color) -> Vec<MoveSuggestion> {
        let Some(record) = store.position(key) else {
            return Vec::new();
        };
        let mover = record.side_to_move().unwrap_or(side);

        let mut suggestions: Vec<MoveSuggestion> = record
            .moves
            .iter()
            .filter(|(_, stats)| stats.played > 0)
            .map(|(mv, stats)| {
                let favourable = if side == mover { stats.wins } else { stats.losses };
                let win_rate = rate(favourable, stats.played);
                MoveSuggestion {
                    mv: mv.clone(),
                    played: stats.played,
                    win_rate,
                    score: self.scorer.score(win_rate, stats),
                }
            })
            .collect();

        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        suggestions
    }

    /// Positions whose white score strays from the expectation by more than
    /// `threshold`, largest deviation first.
    pub fn find_inconsistencies(&self, store: &StatsStore, threshold: f64) -> Vec<Inconsistency> {
        let mut found: Vec<Inconsistency> = store
            .positions()
            .filter(|record| record.total_games >= self.config.min_sample_games)
            .filter_map(|record| {
                let expected = self.expectation.expected(record);
                let actual = rate(record.outcomes.white, record.total_games);
                let deviation = actual - expected;
                (deviation.abs() > threshold).then(|| Inconsistency {
                    hash: record.hash.clone(),
                    board_summary: record.board_summary.clone(),
                    total_games: record.total_games,
                    expected,
                    actual,
                    deviation,
                })
            })
            .collect();

        found.sort_by(|a, b| b.deviation.abs().total_cmp(&a.deviation.abs()));
        found
    }

    /// The most frequent `depth`-move prefixes among completed games.
    pub fn opening_lines(&self, store: &StatsStore, depth: usize) -> Vec<OpeningLine> {
        opening_lines(store.games(), depth, self.config.opening_line_limit)
    }

    pub fn position_stats(&self, store: &StatsStore, key: &str) -> Option<PositionStats> {
        let record = store.position(key)?;
        let total = record.total_games;
        Some(PositionStats {
            hash: record.hash.clone(),
            board_summary: record.board_summary.clone(),
            total_games: total,
            popularity: record.popularity,
            white_rate: rate(record.outcomes.white, total),
            black_rate: rate(record.outcomes.black, total),
            draw_rate: rate(record.outcomes.draw, total),
            patterns: record.patterns.iter().cloned().collect(),
            move_count: record.moves.len(),
            first_seen: record.first_seen,
            last_seen: record.last_seen,
        })
    }

    pub fn learning_summary(&self, store: &StatsStore) -> LearningSummary {
        let mut results = Outcomes::default();
        for result in store.games().iter().filter_map(|g| g.result) {
            results.record(result);
        }

        let mut popular: Vec<&PositionRecord> = store.positions().collect();
        popular.sort_by(|a, b| b.popularity.cmp(&a.popularity));

        LearningSummary {
            total_positions: store.position_count(),
            total_games: store.metadata().total_games,
            results,
            most_popular: popular
                .into_iter()
                .take(self.config.popular_limit)
                .map(|record| PopularPosition {
                    hash: record.hash.clone(),
                    board_summary: record.board_summary.clone(),
                    popularity: record.popularity,
                    total_games: record.total_games,
                })
                .collect(),
        }
    }
}

/// Group completed games by their first `depth` moves.
///
/// Shorter games are left out. Wins count white wins and losses black wins.
/// Lines are ordered by game count, then by first appearance.
pub fn opening_lines(games: &[GameRecord], depth: usize, limit: usize) -> Vec<OpeningLine> {
    let mut index: HashMap<&[String], usize> = HashMap::new();
    let mut lines: Vec<OpeningLine> = Vec::new();

    for game in games {
        let Some(result) = game.result else {
            continue;
        };
        if game.moves.len() < depth {
            continue;
        }
        let prefix = &game.moves[..depth];
        let slot = *index.entry(prefix).or_insert_with(|| {
            lines.push(OpeningLine {
                moves: prefix.to_vec(),
                games: 0,
                wins: 0,
                losses: 0,
                draws: 0,
            });
            lines.len() - 1
        });

        let line = &mut lines[slot];
        line.games += 1;
        match result {
            GameResult::White => line.wins += 1,
            GameResult::Black => line.losses += 1,
            GameResult::Draw => line.draws += 1,
        }
    }

    lines.sort_by(|a, b| b.games.cmp(&a.games));
    lines.truncate(limit);
    lines
}
