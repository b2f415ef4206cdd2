use server::config;
use server::routes;
use server::state;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env();

    tracing::info!(data_dir = %config.data_dir.display(), "Opening learner data...");
    let learner = match state::open_learner(&config) {
        Ok(learner) => learner,
        Err(e) => {
            tracing::error!(error = %e, "Learner data is unreadable, refusing to start");
            std::process::exit(1);
        }
    };

    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Positions
        .route("/api/positions/{hash}", get(routes::positions::get_position))
        .route(
            "/api/positions/{hash}/suggestions",
            get(routes::positions::get_suggestions),
        )
        // Analysis
        .route("/api/inconsistencies", get(routes::analysis::get_inconsistencies))
        .route("/api/openings", get(routes::analysis::get_openings))
        .route("/api/opening-tree", get(routes::analysis::get_opening_tree))
        .route("/api/summary", get(routes::analysis::get_summary))
        // Games
        .route("/api/games/pgn", post(routes::games::ingest_pgn))
        // Data
        .route("/api/export", get(routes::data::export_store))
        .route("/api/import", post(routes::data::import_store))
        .route("/api/reset", post(routes::data::reset_store))
        // Shared state
        .layer(Extension(learner))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
