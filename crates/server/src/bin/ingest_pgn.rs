//! Fold every finished game of a PGN file into the learner store.
//!
//! Usage: cargo run --bin ingest-pgn -- games.pgn
//!
//! The store lives in LEARNER_DATA_DIR (default `data`).

use anyhow::Context;
use server::config::Config;
use server::state;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: ingest-pgn <file.pgn>")?;
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;

    let config = Config::from_env();
    let learner = state::open_learner(&config).with_context(|| {
        format!("could not load learner data from {}", config.data_dir.display())
    })?;
    let mut learner = state::lock(&learner)?;

    println!("Ingesting {}...", path);
    let report = chess_core::replay::ingest_pgn(&mut *learner, &text);
    let summary = learner.learning_summary();

    println!();
    println!("Ingest complete!");
    println!("  Folded:    {}", report.folded);
    println!("  Skipped:   {}", report.skipped);
    println!("  Saved:     {}", report.saved);
    println!("  Positions: {}", summary.total_positions);
    println!("  Games:     {}", summary.total_games);
    println!("  Data dir:  {}", config.data_dir.display());

    if report.folded > 0 && !report.saved {
        anyhow::bail!("folded games could not be saved to {}", config.data_dir.display());
    }
    Ok(())
}
