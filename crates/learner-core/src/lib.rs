//! Position-keyed game statistics.
//!
//! Completed games are folded into per-position and per-move statistics keyed
//! by a canonical position hash. The aggregate drives move suggestions with an
//! exploration bonus, flags positions whose results look lopsided and
//! summarizes frequent opening lines. The main entry point is [`Learner`].

pub mod analysis;
pub mod board;
pub mod canonical;
pub mod config;
pub mod error;
pub mod learner;
pub mod opening_tree;
pub mod patterns;
pub mod persistence;
pub mod session;
pub mod store;

pub use analysis::Analyzer;
pub use board::{Board, Color, Piece, PieceKind};
pub use canonical::canonicalize;
pub use config::AnalyzerConfig;
pub use error::{LearnerError, StorageError};
pub use learner::Learner;
pub use persistence::{FileBackend, MemoryBackend, StorageBackend};
pub use store::{GameRecord, GameResult, PlayerKind, Players, StatsStore};
