//! PGN parsing and game replay for the position learner.
//!
//! `shakmaty` supplies move legality; each replayed ply is handed to the
//! learner as a board snapshot plus the SAN played from it.

pub mod game_data;
pub mod pgn;
pub mod replay;
