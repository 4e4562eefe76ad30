use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::analysis::{
    Bottleneck, ConformanceAnalysis, ConformanceSummary, PatternAnalysis, ProcessMetrics,
    detect_bottlenecks,
};
use crate::core::constants::server;
use crate::core::error::EpmError;
use crate::discovery::dfg::DirectlyFollowsGraph;
use crate::reporting::logging;
use crate::server::pages;
use crate::server::state::{LoadedLog, SharedState};

/// Error returned by API handlers.
#[derive(Debug)]
pub struct AppError(EpmError);

impl From<EpmError> for AppError {
    fn from(err: EpmError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            EpmError::LogFormat(_) | EpmError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub variant: &'static str,
    pub port: u16,
    pub source: String,
    pub events: usize,
    pub cases: usize,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub events: usize,
    pub cases: usize,
    pub activities: usize,
}

/// Routes of a dashboard. The enhanced-only routes are absent from the
/// minimal router, so they answer 404 there.
pub fn router(state: SharedState) -> Router {
    let mut router = Router::new()
        .route("/", get(index_handler))
        .route("/api/summary", get(summary_handler))
        .route("/api/health", get(health_handler));

    if state.variant.is_enhanced() {
        router = router
            .route("/api/bottlenecks", get(bottlenecks_handler))
            .route("/api/patterns", get(patterns_handler))
            .route("/api/conformance", get(conformance_handler))
            .route("/process-map", get(process_map_handler))
            .route(
                "/api/upload",
                post(upload_handler).layer(DefaultBodyLimit::max(server::MAX_UPLOAD_BYTES)),
            );
    }

    router.with_state(state)
}

/// Run a blocking task and surface a panic or cancellation as a server error.
async fn blocking<T, F>(what: &str, task: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| EpmError::Server(format!("{what} task failed: {e}")).into())
}

/// Compute over a snapshot of the served log without holding its lock.
async fn on_snapshot<T, F>(state: &SharedState, what: &str, compute: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&LoadedLog) -> T + Send + 'static,
{
    let data = state.snapshot().await;
    blocking(what, move || compute(&data)).await
}

async fn index_handler(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    logging::log_request(state.variant.name(), "/");
    let (variant, port) = (state.variant, state.port);
    let page = on_snapshot(&state, "page", move |data| {
        pages::render_page(variant, port, data)
    })
    .await?;
    Ok(Html(page))
}

async fn summary_handler(
    State(state): State<SharedState>,
) -> Result<Json<ProcessMetrics>, AppError> {
    logging::log_request(state.variant.name(), "/api/summary");
    let metrics = on_snapshot(&state, "summary", |data| ProcessMetrics::compute(&data.log)).await?;
    Ok(Json(metrics))
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let data = state.data().await;
    Json(HealthResponse {
        status: "ok",
        variant: state.variant.name(),
        port: state.port,
        source: data.source.clone(),
        events: data.log.len(),
        cases: data.log.case_count(),
        error: data.error.clone(),
    })
}

async fn bottlenecks_handler(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Bottleneck>>, AppError> {
    logging::log_request(state.variant.name(), "/api/bottlenecks");
    let bottlenecks = on_snapshot(&state, "bottleneck", |data| detect_bottlenecks(&data.log)).await?;
    Ok(Json(bottlenecks))
}

async fn patterns_handler(
    State(state): State<SharedState>,
) -> Result<Json<PatternAnalysis>, AppError> {
    logging::log_request(state.variant.name(), "/api/patterns");
    let patterns = on_snapshot(&state, "pattern", |data| PatternAnalysis::compute(&data.log)).await?;
    Ok(Json(patterns))
}

async fn conformance_handler(
    State(state): State<SharedState>,
) -> Result<Json<ConformanceSummary>, AppError> {
    logging::log_request(state.variant.name(), "/api/conformance");
    let summary = on_snapshot(&state, "conformance", |data| {
        ConformanceAnalysis::run(&data.log).summary()
    })
    .await?;
    Ok(Json(summary))
}

async fn process_map_handler(State(state): State<SharedState>) -> Result<Response, AppError> {
    logging::log_request(state.variant.name(), "/process-map");
    let graph = on_snapshot(&state, "discovery", |data| {
        DirectlyFollowsGraph::discover(&data.log).to_digraph()
    })
    .await?;

    // `dot` is a blocking child process
    let renderer = state.renderer.clone();
    let svg_graph = graph.clone();
    let rendered = blocking("render", move || renderer.render_svg(&svg_graph)).await?;

    match rendered {
        Ok(svg) => Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()),
        Err(e) => {
            logging::log_render_fallback("process map", &e);
            Ok(Html(pages::text_graph_page(&graph.to_text(), &e.to_string())).into_response())
        }
    }
}

async fn upload_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<UploadResponse>, AppError> {
    logging::log_request(state.variant.name(), "/api/upload");
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let loaded = blocking("upload", move || {
        LoadedLog::from_upload(&body, content_type.as_deref())
    })
    .await??;
    if loaded.is_empty() {
        return Err(EpmError::InvalidArgument(
            "uploaded log contains no events with a readable timestamp".to_string(),
        )
        .into());
    }
    let response = UploadResponse {
        events: loaded.log.len(),
        cases: loaded.log.case_count(),
        activities: loaded.log.activities().len(),
    };
    state.replace(loaded).await;
    Ok(Json(response))
}
