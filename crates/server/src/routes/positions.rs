use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use learner_core::analysis::PositionStats;
use learner_core::Color;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::state::{lock, SharedLearner};

#[derive(Deserialize)]
pub struct SuggestionQuery {
    pub side: String,
}

/// GET /api/positions/{hash}
pub async fn get_position(
    Extension(learner): Extension<SharedLearner>,
    Path(hash): Path<String>,
) -> Result<Json<PositionStats>, AppError> {
    let learner = lock(&learner)?;
    learner
        .position_stats(&hash)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Position {hash} not found")))
}

/// GET /api/positions/{hash}/suggestions?side=white
/// Unseen positions return an empty list.
pub async fn get_suggestions(
    Extension(learner): Extension<SharedLearner>,
    Path(hash): Path<String>,
    Query(q): Query<SuggestionQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let side = Color::parse(&q.side)
        .ok_or_else(|| AppError::BadRequest("Side must be 'white' or 'black'".into()))?;

    let learner = lock(&learner)?;
    let suggestions = learner.suggest_moves(&hash, side);

    Ok(Json(serde_json::json!({
        "hash": hash,
        "side": side.as_str(),
        "suggestions": suggestions,
    })))
}
