use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::infer::{DateSource, PlatformSource};
use crate::ingest::{self, samples, Table};
use crate::pipeline::{self, Dataset, DatasetPipeline};
use crate::platform::{normalize_platform, UNKNOWN_PLATFORM};
use crate::sentiment::{Components, SentimentCategory};
use crate::summary::Summary;

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<DatasetPipeline>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            pipeline: Arc::new(DatasetPipeline::from_config(&config)),
            config: Arc::new(config),
        }
    }
}

/// Router with a fresh state built from `config`.
pub fn router(config: AppConfig) -> Router {
    create_router(AppState::new(config))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .route("/batch", post(analyze_batch))
        .route("/dataset", post(analyze_dataset))
        .route("/samples/{platform}", get(sample_dataset))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ---------- errors ----------

#[derive(Debug)]
pub enum ApiError {
    Pipeline(PipelineError),
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        ApiError::Pipeline(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Pipeline(e) => {
                let status = match e {
                    PipelineError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    PipelineError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, e.kind(), e.to_string())
            }
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "bad_request", m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", m),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

// ---------- single post / batch ----------

#[derive(Deserialize)]
struct AnalyzeReq {
    text: String,
    #[serde(default)]
    platform: Option<String>,
}

#[derive(Deserialize)]
struct BatchItem {
    text: String,
}

#[derive(Serialize)]
struct AnalyzeResp {
    sentiment: SentimentCategory,
    emoji: &'static str,
    sentiment_score: f64,
    sentiment_components: Components,
    #[serde(skip_serializing_if = "Option::is_none")]
    platform: Option<String>,
}

fn analyze_one(state: &AppState, text: &str, platform: Option<&str>) -> AnalyzeResp {
    let r = state.pipeline.scorer().analyze(text);
    AnalyzeResp {
        sentiment: r.category,
        emoji: r.emoji(),
        sentiment_score: r.compound,
        sentiment_components: r.components,
        platform: platform.map(normalize_platform),
    }
}

async fn analyze(State(state): State<AppState>, Json(body): Json<AnalyzeReq>) -> Json<AnalyzeResp> {
    Json(analyze_one(&state, &body.text, body.platform.as_deref()))
}

async fn analyze_batch(
    State(state): State<AppState>,
    Json(items): Json<Vec<BatchItem>>,
) -> Json<Vec<AnalyzeResp>> {
    Json(
        items
            .iter()
            .map(|it| analyze_one(&state, &it.text, None))
            .collect(),
    )
}

// ---------- datasets ----------

/// Comma-separated view filters shared by the dataset endpoints.
#[derive(Debug, Default, Deserialize)]
struct FilterQuery {
    #[serde(default)]
    platforms: Option<String>,
    #[serde(default)]
    sentiments: Option<String>,
}

impl FilterQuery {
    fn platforms(&self) -> Vec<String> {
        split_list(self.platforms.as_deref())
            .map(|p| {
                if p.eq_ignore_ascii_case(UNKNOWN_PLATFORM) {
                    UNKNOWN_PLATFORM.to_string()
                } else {
                    normalize_platform(p)
                }
            })
            .collect()
    }

    fn sentiments(&self) -> Result<Vec<SentimentCategory>, ApiError> {
        split_list(self.sentiments.as_deref())
            .map(|s| s.parse().map_err(ApiError::BadRequest))
            .collect()
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Deserialize)]
struct DatasetQuery {
    file_name: String,
    #[serde(flatten)]
    filter: FilterQuery,
}

#[derive(Serialize)]
struct DatasetResp {
    text_column: String,
    platform_source: PlatformSource,
    date_source: DateSource,
    rows: Vec<Map<String, Value>>,
    summary: Summary,
}

fn respond(
    state: &AppState,
    table: &Table,
    platforms: &[String],
    sentiments: &[SentimentCategory],
) -> Result<DatasetResp, ApiError> {
    let ds: Dataset = state.pipeline.process(table)?;
    let view = ds.view().filter(platforms, sentiments);

    Ok(DatasetResp {
        text_column: ds.text_column.clone(),
        platform_source: ds.platform_source.clone(),
        date_source: ds.date_source.clone(),
        rows: view.posts().iter().map(|p| p.to_record()).collect(),
        summary: view.summarize(state.config.top_words),
    })
}

/// Loader failures are counted with the pipeline's own.
fn load_failed(e: PipelineError) -> ApiError {
    pipeline::record_failure(&e);
    ApiError::Pipeline(e)
}

/// Parsing, scoring and the rayon fan-out stay off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
}

async fn analyze_dataset(
    State(state): State<AppState>,
    Query(q): Query<DatasetQuery>,
    body: Bytes,
) -> Result<Json<DatasetResp>, ApiError> {
    let sentiments = q.filter.sentiments()?;
    let platforms = q.filter.platforms();
    let file_name = q.file_name;

    run_blocking(move || {
        let table = ingest::load_bytes(&file_name, &body).map_err(load_failed)?;
        info!(target: "api", file = %file_name, rows = table.len(), "dataset upload");
        respond(&state, &table, &platforms, &sentiments)
    })
    .await
    .map(Json)
}

async fn sample_dataset(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    Query(filter): Query<FilterQuery>,
) -> Result<Json<DatasetResp>, ApiError> {
    let sentiments = filter.sentiments()?;
    let platforms = filter.platforms();

    run_blocking(move || {
        let table = samples::load_sample(&state.config.sample_data_dir, &platform)
            .map_err(load_failed)?
            .ok_or_else(|| ApiError::NotFound(format!("no sample dataset for '{platform}'")))?;
        respond(&state, &table, &platforms, &sentiments)
    })
    .await
    .map(Json)
}
