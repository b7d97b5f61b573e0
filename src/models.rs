use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Graph API `date_preset` values accepted by the insights queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DatePreset {
    #[default]
    Maximum,
    Today,
    Yesterday,
    #[serde(rename = "last_7d")]
    Last7d,
    #[serde(rename = "last_30d")]
    Last30d,
    ThisMonth,
    LastMonth,
}

impl DatePreset {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Maximum => "maximum",
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::Last7d => "last_7d",
            Self::Last30d => "last_30d",
            Self::ThisMonth => "this_month",
            Self::LastMonth => "last_month",
        }
    }
}

/// One campaign with its insight metrics flattened. Rebuilt on every
/// refresh; `cpl` is always derived from `spend` and `conversions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRow {
    pub id: String,
    pub name: String,
    pub status: String,
    pub objective: String,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub cpl: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    Name,
    Status,
    Objective,
    Spend,
    Impressions,
    Clicks,
    Conversions,
    Cpl,
    Ctr,
    Cpc,
    Cpm,
}

impl ColumnKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Status => "status",
            Self::Objective => "objective",
            Self::Spend => "spend",
            Self::Impressions => "impressions",
            Self::Clicks => "clicks",
            Self::Conversions => "conversions",
            Self::Cpl => "cpl",
            Self::Ctr => "ctr",
            Self::Cpc => "cpc",
            Self::Cpm => "cpm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub key: ColumnKey,
    pub label: String,
    pub visible: bool,
    pub width: u32,
    pub min_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelections {
    pub status_filter: String,
    pub objective_filter: String,
    pub time_frame: DatePreset,
    pub search_term: String,
}

impl Default for FilterSelections {
    fn default() -> Self {
        Self {
            status_filter: "all".to_string(),
            objective_filter: "all".to_string(),
            time_frame: DatePreset::Maximum,
            search_term: String::new(),
        }
    }
}

/// A named snapshot of the dashboard: filter selections plus the full
/// column layout at the time it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedView {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub filters: FilterSelections,
    pub columns: Vec<ColumnConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataSource {
    Live,
    Sample,
}

impl DataSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Sample => "sample",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CampaignQuery {
    pub timeframe: Option<DatePreset>,
    pub status: Option<String>,
    pub objective: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RefreshQuery {
    pub timeframe: Option<DatePreset>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveViewPayload {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleColumnPayload {
    pub key: ColumnKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizePhase {
    Start,
    Move,
    End,
}

/// One step of a drag-resize gesture. `key` and `pointer_x` are required
/// for the start phase, `pointer_x` for move, neither for end.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeColumnPayload {
    pub phase: ResizePhase,
    pub key: Option<ColumnKey>,
    pub pointer_x: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub row_count: usize,
    pub last_updated: DateTime<Utc>,
    pub source: DataSource,
}

/// Totals for the summary cards, computed over a filtered row set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTotals {
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub filters: FilterSelections,
    pub current_view_id: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub row_count: usize,
    pub source: Option<DataSource>,
    pub statuses: Vec<String>,
    pub objectives: Vec<String>,
}
