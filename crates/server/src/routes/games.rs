use axum::{Extension, Json};
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::state::{lock, SharedLearner};

/// POST /api/games/pgn
/// Body is PGN text with one or more games. Finished games are folded into
/// the learner; unparsable, illegal or unfinished games are skipped.
pub async fn ingest_pgn(
    Extension(learner): Extension<SharedLearner>,
    body: String,
) -> Result<Json<JsonValue>, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::BadRequest("PGN body is empty".into()));
    }

    let mut learner = lock(&learner)?;
    let report = chess_core::replay::ingest_pgn(&mut *learner, &body);
    tracing::info!(folded = report.folded, skipped = report.skipped, "PGN ingested");

    Ok(Json(serde_json::json!({
        "folded": report.folded,
        "skipped": report.skipped,
        "saved": report.saved,
        "totalGames": learner.store().metadata().total_games,
    })))
}
