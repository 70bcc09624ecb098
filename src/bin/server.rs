use std::time::Duration;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use roll_cutter::backend::MicroLpBackend;
use roll_cutter::error::CutError;
use roll_cutter::solver::{Comparison, Formulation, Solver};
use roll_cutter::types::{OrderType, Pattern, PatternUsage, ProblemData};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct InstanceRequest {
    raw_width: u32,
    order_types: Vec<OrderType>,
    #[serde(default)]
    patterns: Vec<Pattern>,
}

#[derive(Deserialize, Serialize)]
struct SolveRequest {
    #[serde(flatten)]
    instance: InstanceRequest,
    #[serde(default)]
    formulation: Formulation,
    #[serde(default = "default_true")]
    integral: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Serialize)]
struct SolveResponse {
    objective: f64,
    pattern_usage: Vec<PatternUsage>,
    roll_count: f64,
}

type ApiError = (StatusCode, String);

fn status_for(err: &CutError) -> StatusCode {
    match err {
        CutError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CutError::Infeasible | CutError::Unbounded => StatusCode::UNPROCESSABLE_ENTITY,
        CutError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(err: CutError) -> ApiError {
    tracing::warn!(error = %err, "request failed");
    (status_for(&err), err.to_string())
}

impl InstanceRequest {
    fn into_data(self) -> Result<ProblemData, ApiError> {
        ProblemData::new(self.raw_width, self.order_types, self.patterns).map_err(api_error)
    }
}

const DEFAULT_TIME_LIMIT_SECS: u64 = 30;

/// Backend bounded by `SOLVE_TIME_LIMIT_SECS` (default 30, `0` disables the limit).
fn backend() -> MicroLpBackend {
    let secs = std::env::var("SOLVE_TIME_LIMIT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIME_LIMIT_SECS);
    if secs == 0 {
        MicroLpBackend::new()
    } else {
        MicroLpBackend::with_time_limit(Duration::from_secs(secs))
    }
}

/// Runs a blocking solve off the async runtime.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CutError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("solver task failed: {e}"),
            )
        })?
        .map_err(api_error)
}

async fn solve(Json(req): Json<SolveRequest>) -> Result<Json<SolveResponse>, ApiError> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /solve"
    );

    let formulation = req.formulation;
    let integral = req.integral;
    let data = req.instance.into_data()?;

    let result = run_blocking(move || {
        Solver::new(&data, backend()).solve(formulation, integral)
    })
    .await?;

    Ok(Json(SolveResponse {
        objective: result.objective,
        roll_count: result.roll_count(),
        pattern_usage: result.usage_entries(),
    }))
}

async fn compare(Json(req): Json<InstanceRequest>) -> Result<Json<Comparison>, ApiError> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /compare"
    );

    let data = req.into_data()?;
    let comparison = run_blocking(move || Solver::new(&data, backend()).compare()).await?;
    Ok(Json(comparison))
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/solve", post(solve))
        .route("/compare", post(compare))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
