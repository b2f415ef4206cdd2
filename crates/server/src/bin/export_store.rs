//! Export the learner document as JSON.
//!
//! Usage: cargo run --bin export-store -- [out.json]
//!
//! Writes to stdout when no output path is given.

use std::fs;
use std::path::Path;

use anyhow::Context;
use learner_core::{FileBackend, Learner};
use server::config::Config;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    let mut learner = Learner::new(FileBackend::new(&config.data_dir), config.analyzer.clone());
    if !learner.load() {
        anyhow::bail!("could not load learner data from {}", config.data_dir.display());
    }
    let text = learner.export_json()?;

    match std::env::args().nth(1) {
        Some(out) => {
            if let Some(parent) = Path::new(&out).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(&out, &text).with_context(|| format!("writing {out}"))?;
            let summary = learner.learning_summary();
            eprintln!("Export complete!");
            eprintln!("  Positions: {}", summary.total_positions);
            eprintln!("  Games:     {}", summary.total_games);
            eprintln!("  Path:      {}", out);
        }
        None => println!("{text}"),
    }

    Ok(())
}
