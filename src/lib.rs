pub mod aggregate;
pub mod columns;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod filters;
pub mod graph;
pub mod models;
pub mod redaction;
pub mod sample;

use crate::config::AppConfig;
use crate::core::DashboardCore;
use crate::db::Database;
use crate::errors::AppError;
use crate::graph::client::GraphClient;
use crate::graph::InsightsApi;
use crate::models::{
    BooleanResponse, CampaignQuery, CampaignRow, ColumnConfig, DashboardState, FilterSelections,
    RefreshQuery, RefreshResponse, ResizeColumnPayload, SavedView, SaveViewPayload, SummaryTotals,
    ToggleColumnPayload,
};
use axum::extract::{Path as UrlPath, Query, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

#[derive(Clone)]
pub struct AppState {
    core: Arc<DashboardCore>,
}

async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<CampaignQuery>,
) -> Result<Json<Vec<CampaignRow>>, AppError> {
    Ok(Json(state.core.list_campaigns(&query).await?))
}

async fn refresh_campaigns(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<RefreshResponse>, AppError> {
    Ok(Json(state.core.refresh(query.timeframe).await?))
}

async fn campaign_summary(
    State(state): State<AppState>,
    Query(query): Query<CampaignQuery>,
) -> Result<Json<SummaryTotals>, AppError> {
    Ok(Json(state.core.summary(&query).await?))
}

async fn dashboard_state(State(state): State<AppState>) -> Json<DashboardState> {
    Json(state.core.state().await)
}

async fn set_filters(
    State(state): State<AppState>,
    Json(selections): Json<FilterSelections>,
) -> Result<Json<DashboardState>, AppError> {
    Ok(Json(state.core.set_filters(selections).await?))
}

async fn get_columns(State(state): State<AppState>) -> Json<Vec<ColumnConfig>> {
    Json(state.core.columns().await)
}

async fn put_columns(
    State(state): State<AppState>,
    Json(layout): Json<Vec<ColumnConfig>>,
) -> Result<Json<Vec<ColumnConfig>>, AppError> {
    Ok(Json(state.core.replace_columns(layout).await?))
}

async fn toggle_column(
    State(state): State<AppState>,
    Json(payload): Json<ToggleColumnPayload>,
) -> Result<Json<Vec<ColumnConfig>>, AppError> {
    Ok(Json(state.core.toggle_column(payload).await?))
}

async fn reset_columns(State(state): State<AppState>) -> Result<Json<Vec<ColumnConfig>>, AppError> {
    Ok(Json(state.core.reset_columns().await?))
}

async fn resize_column(
    State(state): State<AppState>,
    Json(payload): Json<ResizeColumnPayload>,
) -> Result<Json<Vec<ColumnConfig>>, AppError> {
    Ok(Json(state.core.resize_column(payload).await?))
}

async fn list_views(State(state): State<AppState>) -> Result<Json<Vec<SavedView>>, AppError> {
    Ok(Json(state.core.list_views().await?))
}

async fn save_view(
    State(state): State<AppState>,
    Json(payload): Json<SaveViewPayload>,
) -> Result<Json<SavedView>, AppError> {
    Ok(Json(state.core.save_view(payload).await?))
}

async fn activate_view(
    State(state): State<AppState>,
    UrlPath(view_id): UrlPath<String>,
) -> Result<Json<SavedView>, AppError> {
    Ok(Json(state.core.activate_view(&view_id).await?))
}

async fn update_current_view(State(state): State<AppState>) -> Result<Json<SavedView>, AppError> {
    Ok(Json(state.core.update_current_view().await?))
}

async fn delete_view(
    State(state): State<AppState>,
    UrlPath(view_id): UrlPath<String>,
) -> Result<Json<BooleanResponse>, AppError> {
    Ok(Json(state.core.delete_view(&view_id).await?))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn version() -> Json<serde_json::Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn router(core: Arc<DashboardCore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/api/campaigns", get(list_campaigns))
        .route("/api/campaigns/refresh", post(refresh_campaigns))
        .route("/api/campaigns/summary", get(campaign_summary))
        .route("/api/state", get(dashboard_state))
        .route("/api/filters", put(set_filters))
        .route("/api/columns", get(get_columns).put(put_columns))
        .route("/api/columns/toggle", post(toggle_column))
        .route("/api/columns/reset", post(reset_columns))
        .route("/api/columns/resize", post(resize_column))
        .route("/api/views", get(list_views).post(save_view))
        .route("/api/views/current", put(update_current_view))
        .route("/api/views/{view_id}/activate", post(activate_view))
        .route("/api/views/{view_id}", delete(delete_view))
        .with_state(AppState { core })
}

pub async fn run() -> anyhow::Result<()> {
    let app_config = AppConfig::from_env()?;
    std::fs::create_dir_all(&app_config.data_dir)?;
    init_tracing(&app_config.data_dir).map_err(|error| anyhow::anyhow!(error))?;

    let db = Arc::new(Database::new(&app_config.db_path())?);
    let insights: Option<Arc<dyn InsightsApi>> = app_config.access_token.as_ref().map(|token| {
        Arc::new(GraphClient::new(app_config.graph_base_url.clone(), token.clone()))
            as Arc<dyn InsightsApi>
    });
    if insights.is_none() {
        tracing::warn!("FACEBOOK_ACCESS_TOKEN not configured, dashboard will serve sample data");
    }
    let core = Arc::new(DashboardCore::new(db, insights)?);

    // Keep the row cache warm with the most recently used preset.
    tokio::spawn({
        let core = core.clone();
        let period = Duration::from_secs(app_config.refresh_interval_secs.max(30));
        async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(error) = core.refresh(None).await {
                    tracing::warn!(error = %error, "background campaign refresh failed");
                }
            }
        }
    });

    let app = router(core);
    let listener = tokio::net::TcpListener::bind(&app_config.listen).await?;
    tracing::info!(listen = %app_config.listen, "campaign console listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(data_dir: &Path) -> Result<(), String> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "console.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
