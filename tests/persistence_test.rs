//! File-backed persistence: reopening, corrupted files and rejected imports.

mod common;

use std::fs;

use common::kings_board;
use learner_core::persistence::STORAGE_KEY;
use learner_core::{
    AnalyzerConfig, Board, Color, FileBackend, GameResult, Learner, Players, StorageBackend,
};

fn play<B: StorageBackend>(learner: &mut Learner<B>, mv: &str, result: GameResult) {
    learner.start_game(Players::default());
    learner.record_position(&Board::starting_position(), Color::White, Some(mv));
    learner.record_position(&kings_board(2), Color::Black, None);
    learner.end_game(result).unwrap();
}

#[test]
fn test_reopen_restores_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut learner = Learner::open(FileBackend::new(dir.path()), AnalyzerConfig::default()).unwrap();
    assert_eq!(learner.store().position_count(), 0);

    play(&mut learner, "e4", GameResult::White);
    play(&mut learner, "d4", GameResult::Draw);
    assert!(dir.path().join("position_learner.json").exists());

    let reopened = Learner::open(FileBackend::new(dir.path()), AnalyzerConfig::default()).unwrap();
    assert_eq!(reopened.store().metadata().total_games, 2);
    assert_eq!(reopened.store().games(), learner.store().games());
    assert_eq!(
        reopened.store().document().positions,
        learner.store().document().positions
    );

    let key = learner_core::canonicalize(&Board::starting_position(), Color::White);
    let suggestions = reopened.suggest_moves(&key, Color::White);
    assert_eq!(suggestions[0].mv, "e4");
}

#[test]
fn test_corrupted_file_keeps_memory_state() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FileBackend::new(dir.path());
    let mut learner = Learner::open(backend.clone(), AnalyzerConfig::default()).unwrap();
    play(&mut learner, "e4", GameResult::Black);

    fs::write(backend.path_for(STORAGE_KEY), "{ truncated").unwrap();
    let before = learner.store().document().clone();
    assert!(!learner.load());
    assert_eq!(learner.store().document(), &before);

    // Opening over the broken file fails and leaves it for inspection
    assert!(Learner::open(backend.clone(), AnalyzerConfig::default()).is_err());
    assert_eq!(
        fs::read_to_string(backend.path_for(STORAGE_KEY)).unwrap(),
        "{ truncated"
    );
}

#[test]
fn test_ingest_refused_over_unreadable_store() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FileBackend::new(dir.path());
    let original = r#"{"positions": {}, "games": [], "metadata": {"totalGames": 500"#;
    fs::write(backend.path_for(STORAGE_KEY), original).unwrap();

    let ingested = Learner::open(backend.clone(), AnalyzerConfig::default()).map(|mut learner| {
        chess_core::replay::ingest_pgn(&mut learner, "[Result \"1-0\"]\n\n1. e4 e5 1-0\n")
    });
    assert!(ingested.is_err());
    assert_eq!(fs::read_to_string(backend.path_for(STORAGE_KEY)).unwrap(), original);
}

#[test]
fn test_import_validates_before_replacing() {
    let dir = tempfile::tempdir().unwrap();
    let mut learner = Learner::open(FileBackend::new(dir.path()), AnalyzerConfig::default()).unwrap();
    play(&mut learner, "e4", GameResult::White);
    let exported = learner.export_json().unwrap();
    let before = learner.store().document().clone();

    // Outcomes that no longer add up to totalGames
    let mut tampered: serde_json::Value = serde_json::from_str(&exported).unwrap();
    let key = learner_core::canonicalize(&Board::starting_position(), Color::White);
    tampered["positions"][key.as_str()]["totalGames"] = serde_json::json!(7);
    assert!(!learner.import_json(&tampered.to_string()));

    assert!(!learner.import_json("[]"));
    assert!(!learner.import_json(""));
    assert_eq!(learner.store().document(), &before);

    // Importing into a second directory persists it there
    let other = tempfile::tempdir().unwrap();
    let mut target = Learner::open(FileBackend::new(other.path()), AnalyzerConfig::default()).unwrap();
    assert!(target.import_json(&exported));
    let reopened = Learner::open(FileBackend::new(other.path()), AnalyzerConfig::default()).unwrap();
    assert_eq!(reopened.store().document().positions, before.positions);
}

#[test]
fn test_reset_persists_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut learner = Learner::open(FileBackend::new(dir.path()), AnalyzerConfig::default()).unwrap();
    play(&mut learner, "e4", GameResult::White);
    assert!(learner.reset());

    let reopened = Learner::open(FileBackend::new(dir.path()), AnalyzerConfig::default()).unwrap();
    assert_eq!(reopened.store().position_count(), 0);
    assert!(reopened.store().games().is_empty());
    assert_eq!(reopened.store().metadata().total_games, 0);
    assert_eq!(reopened.store().metadata().version, "1.0");
}
