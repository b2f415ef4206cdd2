use axum::{
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::{json, Value as JsonValue};

use crate::error::AppError;
use crate::state::{lock, SharedLearner};

/// GET /api/export
/// The whole learner document as a JSON attachment.
pub async fn export_store(
    Extension(learner): Extension<SharedLearner>,
) -> Result<Response, AppError> {
    let learner = lock(&learner)?;
    let text = learner.export_json()?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"position_learner.json\"",
            ),
        ],
        text,
    )
        .into_response())
}

/// POST /api/import
/// Replaces the learner document. Documents that are malformed or cannot be
/// saved are rejected and the current data is kept.
pub async fn import_store(
    Extension(learner): Extension<SharedLearner>,
    body: String,
) -> Result<Json<JsonValue>, AppError> {
    let mut learner = lock(&learner)?;
    if !learner.import_json(&body) {
        return Err(AppError::BadRequest(
            "Import rejected: document is malformed or could not be saved".into(),
        ));
    }

    Ok(Json(json!({
        "positions": learner.store().position_count(),
        "games": learner.store().games().len(),
    })))
}

/// POST /api/reset
pub async fn reset_store(
    Extension(learner): Extension<SharedLearner>,
) -> Result<Json<JsonValue>, AppError> {
    let mut learner = lock(&learner)?;
    let saved = learner.reset();
    Ok(Json(json!({ "reset": true, "saved": saved })))
}
