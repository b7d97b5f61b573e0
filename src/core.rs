use crate::aggregate;
use crate::columns::{self, ResizeGesture};
use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::filters;
use crate::graph::InsightsApi;
use crate::models::{
    BooleanResponse, CampaignQuery, CampaignRow, ColumnConfig, DashboardState, DataSource,
    DatePreset, FilterSelections, RefreshResponse, ResizeColumnPayload, ResizePhase, SavedView,
    SaveViewPayload, SummaryTotals, ToggleColumnPayload,
};
use crate::sample;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

struct DashboardInner {
    rows: Vec<CampaignRow>,
    source: Option<DataSource>,
    fetched_preset: Option<DatePreset>,
    last_updated: Option<DateTime<Utc>>,
    filters: FilterSelections,
    columns: Vec<ColumnConfig>,
    current_view_id: Option<String>,
    resize: Option<ResizeGesture>,
}

/// Owns the dashboard: the cached campaign rows, the current filter and
/// column state, and the saved-view lifecycle. Every mutation persists
/// through [`Database`] except width updates inside an active resize
/// gesture, which only land on gesture end.
pub struct DashboardCore {
    db: Arc<Database>,
    insights: Option<Arc<dyn InsightsApi>>,
    inner: RwLock<DashboardInner>,
}

impl DashboardCore {
    /// Restores the last active view when one is recorded, otherwise
    /// overlays the persisted column layout on the defaults.
    pub fn new(db: Arc<Database>, insights: Option<Arc<dyn InsightsApi>>) -> AppResult<Self> {
        let mut layout = columns::default_columns();
        let mut selections = FilterSelections::default();
        let mut current_view_id = None;

        let last_view = match db.last_view_id()? {
            Some(view_id) => db.get_view(&view_id)?,
            None => None,
        };
        match last_view {
            Some(view) => {
                selections = view.filters;
                layout = columns::merge_saved(&view.columns);
                current_view_id = Some(view.id);
            }
            None => {
                if let Some(saved) = db.load_columns()? {
                    layout = columns::merge_saved(&saved);
                }
            }
        }

        Ok(Self {
            db,
            insights,
            inner: RwLock::new(DashboardInner {
                rows: Vec::new(),
                source: None,
                fetched_preset: None,
                last_updated: None,
                filters: selections,
                columns: layout,
                current_view_id,
                resize: None,
            }),
        })
    }

    // ─── Campaign data ──────────────────────────────────────────────

    pub async fn refresh(&self, preset: Option<DatePreset>) -> AppResult<RefreshResponse> {
        let preset = match preset {
            Some(preset) => preset,
            None => self.inner.read().await.filters.time_frame,
        };
        self.do_refresh(preset).await
    }

    pub async fn list_campaigns(&self, query: &CampaignQuery) -> AppResult<Vec<CampaignRow>> {
        let effective = self.effective_filters(query).await;
        self.ensure_fetched(effective.time_frame).await?;
        let inner = self.inner.read().await;
        Ok(filters::apply_filters(&inner.rows, &effective))
    }

    pub async fn summary(&self, query: &CampaignQuery) -> AppResult<SummaryTotals> {
        let rows = self.list_campaigns(query).await?;
        Ok(filters::totals(&rows))
    }

    pub async fn state(&self) -> DashboardState {
        let inner = self.inner.read().await;
        DashboardState {
            filters: inner.filters.clone(),
            current_view_id: inner.current_view_id.clone(),
            last_updated: inner.last_updated,
            row_count: inner.rows.len(),
            source: inner.source,
            statuses: filters::distinct(inner.rows.iter().map(|row| row.status.as_str())),
            objectives: filters::distinct(inner.rows.iter().map(|row| row.objective.as_str())),
        }
    }

    pub async fn set_filters(&self, selections: FilterSelections) -> AppResult<DashboardState> {
        let preset = selections.time_frame;
        {
            let mut inner = self.inner.write().await;
            inner.filters = selections;
        }
        self.ensure_fetched(preset).await?;
        Ok(self.state().await)
    }

    async fn effective_filters(&self, query: &CampaignQuery) -> FilterSelections {
        let inner = self.inner.read().await;
        let mut effective = inner.filters.clone();
        if let Some(timeframe) = query.timeframe {
            effective.time_frame = timeframe;
        }
        if let Some(status) = &query.status {
            effective.status_filter = status.clone();
        }
        if let Some(objective) = &query.objective {
            effective.objective_filter = objective.clone();
        }
        if let Some(search) = &query.search {
            effective.search_term = search.clone();
        }
        effective
    }

    async fn ensure_fetched(&self, preset: DatePreset) -> AppResult<()> {
        let stale = {
            let inner = self.inner.read().await;
            inner.fetched_preset != Some(preset)
        };
        if stale {
            self.do_refresh(preset).await?;
        }
        Ok(())
    }

    async fn do_refresh(&self, preset: DatePreset) -> AppResult<RefreshResponse> {
        let (rows, source) = self.fetch_rows(preset).await;
        let now = Utc::now();

        let mut inner = self.inner.write().await;
        inner.rows = rows;
        inner.source = Some(source);
        inner.fetched_preset = Some(preset);
        inner.last_updated = Some(now);
        inner.filters.time_frame = preset;

        Ok(RefreshResponse {
            row_count: inner.rows.len(),
            last_updated: now,
            source,
        })
    }

    /// Runs the aggregation pipeline and applies the degradation ladder:
    /// no accounts at all stays empty, an empty harvest gets the notice
    /// row plus the sample dataset, and upstream failure (or a missing
    /// token) serves the sample dataset outright.
    async fn fetch_rows(&self, preset: DatePreset) -> (Vec<CampaignRow>, DataSource) {
        let Some(api) = &self.insights else {
            tracing::info!("Graph API not configured, serving sample data");
            return (sample::sample_rows(), DataSource::Sample);
        };

        match aggregate::collect_rows(api.as_ref(), preset).await {
            Ok(harvest) if harvest.accounts_scanned == 0 => {
                tracing::info!("no ad accounts found");
                (Vec::new(), DataSource::Live)
            }
            Ok(harvest) if harvest.rows.is_empty() => {
                tracing::info!("no campaigns with data found, serving sample data");
                let mut rows = vec![sample::no_campaigns_notice()];
                rows.extend(sample::sample_rows());
                (rows, DataSource::Sample)
            }
            Ok(harvest) => {
                tracing::info!(rows = harvest.rows.len(), "campaign refresh complete");
                (harvest.rows, DataSource::Live)
            }
            Err(error) => {
                tracing::warn!(error = %error, "campaign refresh failed, serving sample data");
                (sample::sample_rows(), DataSource::Sample)
            }
        }
    }

    // ─── Column layout ──────────────────────────────────────────────

    pub async fn columns(&self) -> Vec<ColumnConfig> {
        self.inner.read().await.columns.clone()
    }

    pub async fn replace_columns(&self, layout: Vec<ColumnConfig>) -> AppResult<Vec<ColumnConfig>> {
        let mut merged = columns::merge_saved(&layout);
        columns::clamp_widths(&mut merged);

        let mut inner = self.inner.write().await;
        inner.columns = merged;
        self.persist_columns(&inner)?;
        Ok(inner.columns.clone())
    }

    pub async fn toggle_column(&self, payload: ToggleColumnPayload) -> AppResult<Vec<ColumnConfig>> {
        let mut inner = self.inner.write().await;
        if !columns::toggle_visibility(&mut inner.columns, payload.key) {
            return Err(AppError::NotFound(format!(
                "No column named {}",
                payload.key.as_str()
            )));
        }
        self.persist_columns(&inner)?;
        Ok(inner.columns.clone())
    }

    pub async fn reset_columns(&self) -> AppResult<Vec<ColumnConfig>> {
        let mut inner = self.inner.write().await;
        inner.columns = columns::default_columns();
        self.persist_columns(&inner)?;
        Ok(inner.columns.clone())
    }

    /// One step of a drag-resize. Start records the gesture, move applies
    /// the width optimistically in memory, end persists the final layout.
    /// Move and end without an active gesture are ignored.
    pub async fn resize_column(&self, payload: ResizeColumnPayload) -> AppResult<Vec<ColumnConfig>> {
        let mut inner = self.inner.write().await;
        match payload.phase {
            ResizePhase::Start => {
                let key = payload
                    .key
                    .ok_or_else(|| AppError::BadRequest("resize start requires a column key".to_string()))?;
                let pointer_x = payload
                    .pointer_x
                    .ok_or_else(|| AppError::BadRequest("resize start requires pointerX".to_string()))?;
                let gesture = ResizeGesture::begin(&inner.columns, key, pointer_x);
                if gesture.is_none() {
                    return Err(AppError::NotFound(format!("No column named {}", key.as_str())));
                }
                inner.resize = gesture;
            }
            ResizePhase::Move => {
                if let Some(gesture) = inner.resize.clone() {
                    let pointer_x = payload
                        .pointer_x
                        .ok_or_else(|| AppError::BadRequest("resize move requires pointerX".to_string()))?;
                    if let Some(col) = inner.columns.iter_mut().find(|col| col.key == gesture.key) {
                        col.width = gesture.width_at(pointer_x, col.min_width);
                    }
                }
            }
            ResizePhase::End => {
                if inner.resize.take().is_some() {
                    self.persist_columns(&inner)?;
                }
            }
        }
        Ok(inner.columns.clone())
    }

    fn persist_columns(&self, inner: &DashboardInner) -> AppResult<()> {
        self.db.save_columns(&inner.columns)?;
        if let Some(view_id) = &inner.current_view_id {
            self.db.update_view_columns(view_id, &inner.columns)?;
        }
        Ok(())
    }

    // ─── Saved views ────────────────────────────────────────────────

    pub async fn list_views(&self) -> AppResult<Vec<SavedView>> {
        self.db.list_views()
    }

    pub async fn save_view(&self, payload: SaveViewPayload) -> AppResult<SavedView> {
        let name = payload.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("View name cannot be empty".to_string()));
        }

        let mut inner = self.inner.write().await;
        let view = SavedView {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            filters: inner.filters.clone(),
            columns: inner.columns.clone(),
        };
        self.db.insert_view(&view)?;
        self.db.set_last_view_id(Some(&view.id))?;
        inner.current_view_id = Some(view.id.clone());
        Ok(view)
    }

    pub async fn activate_view(&self, view_id: &str) -> AppResult<SavedView> {
        let view = self
            .db
            .get_view(view_id)?
            .ok_or_else(|| AppError::NotFound(format!("No saved view {view_id}")))?;

        {
            let mut inner = self.inner.write().await;
            inner.filters = view.filters.clone();
            inner.columns = columns::merge_saved(&view.columns);
            inner.current_view_id = Some(view.id.clone());
            inner.resize = None;
        }
        self.db.set_last_view_id(Some(&view.id))?;
        Ok(view)
    }

    /// Re-snapshots the active view from the current filters and columns.
    pub async fn update_current_view(&self) -> AppResult<SavedView> {
        let inner = self.inner.read().await;
        let view_id = inner
            .current_view_id
            .clone()
            .ok_or_else(|| AppError::NotFound("No active view to update".to_string()))?;

        let mut view = self
            .db
            .get_view(&view_id)?
            .ok_or_else(|| AppError::NotFound(format!("No saved view {view_id}")))?;
        view.filters = inner.filters.clone();
        view.columns = inner.columns.clone();
        self.db.update_view(&view)?;
        Ok(view)
    }

    pub async fn delete_view(&self, view_id: &str) -> AppResult<BooleanResponse> {
        let deleted = self.db.delete_view(view_id)?;

        let mut inner = self.inner.write().await;
        if inner.current_view_id.as_deref() == Some(view_id) {
            inner.current_view_id = None;
            self.db.set_last_view_id(None)?;
        }
        Ok(BooleanResponse { success: deleted })
    }
}
