use std::env;
use std::path::PathBuf;

use learner_core::config::{
    AnalyzerConfig, DEFAULT_EXPERIENCE_THRESHOLD, DEFAULT_EXPLORATION_BONUS,
    DEFAULT_MIN_SAMPLE_GAMES,
};

#[derive(Clone, Debug)]
pub struct Config {
    /// Directory holding the persisted learner document.
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub analyzer: AnalyzerConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let analyzer = AnalyzerConfig {
            exploration_bonus: env_or("EXPLORATION_BONUS", DEFAULT_EXPLORATION_BONUS),
            experience_threshold: env_or("EXPERIENCE_THRESHOLD", DEFAULT_EXPERIENCE_THRESHOLD),
            min_sample_games: env_or("MIN_SAMPLE_GAMES", DEFAULT_MIN_SAMPLE_GAMES),
            ..AnalyzerConfig::default()
        };

        Self {
            data_dir: env::var("LEARNER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 8000),
            analyzer,
        }
    }
}
