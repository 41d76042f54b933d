//! HTTP layer -- axum router, handlers, and shared state.
//!
//! The dashboard page itself is a static document rendered entirely by the
//! browser; this module only exposes the JSON API it talks to.

mod routes;
pub mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::Router;
use axum::response::Html;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::info;

use self::state::AppState;
use crate::config::Config;
use crate::runner;

/// Build the application router with the dashboard page and all API routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .nest("/api", routes::api_routes())
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dashboard() -> Html<&'static str> {
    Html(include_str!("assets/dashboard.html"))
}

async fn fallback() -> (axum::http::StatusCode, &'static str) {
    (axum::http::StatusCode::NOT_FOUND, "not found")
}

/// Start the dashboard server: construct the runner, bind, serve forever.
pub async fn serve(port: u16, project: PathBuf, config: Config) -> Result<()> {
    let runner = runner::detect(project.clone(), &config)
        .context("failed to initialize test runner")?;
    let state = AppState::new(runner, project);
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "pytest-dash listening");
    axum::serve(listener, app).await?;
    Ok(())
}
