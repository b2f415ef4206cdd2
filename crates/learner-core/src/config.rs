//! Analyzer tunables

/// Default exploration bonus weight (`k`).
pub const DEFAULT_EXPLORATION_BONUS: f64 = 0.1;

/// Plays after which a move no longer earns an exploration bonus.
pub const DEFAULT_EXPERIENCE_THRESHOLD: u64 = 20;

/// Completed games a position needs before it can be flagged as inconsistent.
pub const DEFAULT_MIN_SAMPLE_GAMES: u64 = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct AnalyzerConfig {
    pub exploration_bonus: f64,
    pub experience_threshold: u64,
    pub min_sample_games: u64,
    /// Maximum number of lines returned by the opening summary.
    pub opening_line_limit: usize,
    /// Maximum number of positions listed in the learning summary.
    pub popular_limit: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            exploration_bonus: DEFAULT_EXPLORATION_BONUS,
            experience_threshold: DEFAULT_EXPERIENCE_THRESHOLD,
            min_sample_games: DEFAULT_MIN_SAMPLE_GAMES,
            opening_line_limit: 20,
            popular_limit: 10,
        }
    }
}
