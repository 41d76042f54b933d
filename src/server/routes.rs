//! API route definitions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

use super::state::AppState;
use crate::error::ErrorClass;
use crate::models::RunResult;
use crate::runner::pytest::describe_exit_code;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/files", get(list_files))
        .route("/run", post(run_tests))
}

async fn health() -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        },
        "meta": {
            "runner": "pytest"
        }
    }))
}

async fn list_files(State(state): State<AppState>) -> Response {
    match state.runner.discover().await {
        Ok(files) => {
            let paths: Vec<String> = files
                .iter()
                .map(|f| {
                    f.path
                        .strip_prefix(&state.project)
                        .unwrap_or(&f.path)
                        .to_string_lossy()
                        .to_string()
                })
                .collect();
            let total = paths.len();
            Json(json!({ "data": paths, "meta": { "total": total } })).into_response()
        }
        Err(e) => {
            error!(error = %e, "test discovery failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": { "message": e.to_string() } })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    /// pytest `-k` keyword filter, passed through unmodified.
    #[serde(default)]
    pub keyword: Option<String>,
    /// Bypass the memoized result and re-run.
    #[serde(default)]
    pub force: bool,
}

async fn run_tests(State(state): State<AppState>, Json(req): Json<RunRequest>) -> Response {
    let keyword = req
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());

    if !req.force && let Some(cached) = state.cached(keyword) {
        return run_response(&state, keyword, &cached, true);
    }

    match state.runner.run(keyword).await {
        Ok(run) => {
            let run = state.store(keyword, run);
            run_response(&state, keyword, &run, false)
        }
        Err(e) => {
            error!(error = %e, "test run failed");
            let (status, class) = match e.class() {
                ErrorClass::Environment => (StatusCode::SERVICE_UNAVAILABLE, "environment"),
                ErrorClass::Execution => (StatusCode::INTERNAL_SERVER_ERROR, "execution"),
            };
            (
                status,
                Json(json!({
                    "error": { "class": class, "message": e.to_string() }
                })),
            )
                .into_response()
        }
    }
}

fn run_response(
    state: &AppState,
    keyword: Option<&str>,
    run: &RunResult,
    cached: bool,
) -> Response {
    Json(json!({
        "data": {
            "summary": run.summary(),
            "results": &run.results,
            "stdout": &run.stdout,
            "stderr": &run.stderr,
            "exit_code": run.exit_code,
            "exit_code_meaning": describe_exit_code(run.exit_code),
            "report_error": &run.report_error,
        },
        "meta": {
            "project": state.project.display().to_string(),
            "keyword": keyword,
            "cached": cached,
        }
    }))
    .into_response()
}
