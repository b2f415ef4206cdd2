use axum::{extract::Query, Extension, Json};
use learner_core::analysis::LearningSummary;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::state::{lock, SharedLearner};

const DEFAULT_THRESHOLD: f64 = 0.2;
const DEFAULT_LINE_DEPTH: usize = 4;
const DEFAULT_TREE_DEPTH: usize = 6;
const MAX_DEPTH: usize = 30;

#[derive(Deserialize)]
pub struct InconsistencyQuery {
    pub threshold: Option<f64>,
}

#[derive(Deserialize)]
pub struct DepthQuery {
    pub depth: Option<usize>,
}

fn checked_depth(depth: Option<usize>, default: usize) -> Result<usize, AppError> {
    let depth = depth.unwrap_or(default);
    if depth == 0 || depth > MAX_DEPTH {
        return Err(AppError::BadRequest(format!(
            "Depth must be between 1 and {MAX_DEPTH}"
        )));
    }
    Ok(depth)
}

/// GET /api/inconsistencies?threshold=0.2
pub async fn get_inconsistencies(
    Extension(learner): Extension<SharedLearner>,
    Query(q): Query<InconsistencyQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let threshold = q.threshold.unwrap_or(DEFAULT_THRESHOLD);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AppError::BadRequest(
            "Threshold must be between 0 and 1".into(),
        ));
    }

    let learner = lock(&learner)?;
    let found = learner.find_inconsistencies(threshold);

    Ok(Json(serde_json::json!({
        "threshold": threshold,
        "count": found.len(),
        "positions": found,
    })))
}

/// GET /api/openings?depth=4
/// Most frequent opening lines of the given length.
pub async fn get_openings(
    Extension(learner): Extension<SharedLearner>,
    Query(q): Query<DepthQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let depth = checked_depth(q.depth, DEFAULT_LINE_DEPTH)?;
    let learner = lock(&learner)?;

    Ok(Json(serde_json::json!({
        "depth": depth,
        "lines": learner.opening_lines(depth),
    })))
}

/// GET /api/opening-tree?depth=6
pub async fn get_opening_tree(
    Extension(learner): Extension<SharedLearner>,
    Query(q): Query<DepthQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let depth = checked_depth(q.depth, DEFAULT_TREE_DEPTH)?;
    let learner = lock(&learner)?;

    Ok(Json(serde_json::json!({
        "depth": depth,
        "tree": learner.opening_tree(depth),
    })))
}

/// GET /api/summary
pub async fn get_summary(
    Extension(learner): Extension<SharedLearner>,
) -> Result<Json<LearningSummary>, AppError> {
    let learner = lock(&learner)?;
    Ok(Json(learner.learning_summary()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{shared_learner, SAMPLE_PGN};

    #[tokio::test]
    async fn test_openings_and_tree() {
        let dir = tempfile::tempdir().unwrap();
        let learner = shared_learner(&dir);
        {
            let mut guard = lock(&learner).unwrap();
            chess_core::replay::ingest_pgn(&mut *guard, SAMPLE_PGN);
        }

        let Json(body) = get_openings(Extension(learner.clone()), Query(DepthQuery { depth: Some(1) }))
            .await
            .unwrap();
        let lines = body["lines"].as_array().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["games"], 2);
        assert_eq!(lines[0]["wins"], 1);
        assert_eq!(lines[0]["losses"], 1);

        let Json(body) = get_opening_tree(Extension(learner.clone()), Query(DepthQuery { depth: None }))
            .await
            .unwrap();
        assert_eq!(body["depth"], 6);
        assert_eq!(body["tree"]["children"][0]["move"], "e4");

        let Json(summary) = get_summary(Extension(learner)).await.unwrap();
        assert_eq!(summary.total_games, 2);
        assert_eq!(summary.results.white, 1);
    }

    #[tokio::test]
    async fn test_rejects_bad_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let learner = shared_learner(&dir);

        let err = get_openings(Extension(learner.clone()), Query(DepthQuery { depth: Some(0) }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = get_inconsistencies(
            Extension(learner.clone()),
            Query(InconsistencyQuery { threshold: Some(3.0) }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let Json(body) = get_inconsistencies(Extension(learner), Query(InconsistencyQuery { threshold: None }))
            .await
            .unwrap();
        assert_eq!(body["count"], 0);
    }
}
