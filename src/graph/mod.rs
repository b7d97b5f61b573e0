pub mod client;

use crate::errors::AppResult;
use crate::models::DatePreset;
use async_trait::async_trait;
use serde::Deserialize;

/// List envelope used by every Graph collection response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paged<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdAccount {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub account_status: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionEntry {
    pub action_type: String,
    pub value: String,
}

/// One insights entry. The Graph API serializes every metric as a
/// string; absent metrics are simply missing keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightEntry {
    pub spend: Option<String>,
    pub impressions: Option<String>,
    pub clicks: Option<String>,
    pub ctr: Option<String>,
    pub cpc: Option<String>,
    pub cpm: Option<String>,
    pub actions: Option<Vec<ActionEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Insights {
    #[serde(default)]
    pub data: Vec<InsightEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphCampaign {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub objective: String,
    pub insights: Option<Insights>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CampaignRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub objective: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphAdSet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    pub campaign: Option<CampaignRef>,
    pub insights: Option<Insights>,
}

/// Upstream ads-insights queries the aggregation pipeline runs. The
/// production implementation is [`client::GraphClient`]; tests swap in
/// an in-process double.
#[async_trait]
pub trait InsightsApi: Send + Sync {
    async fn list_ad_accounts(&self) -> AppResult<Vec<AdAccount>>;

    async fn campaign_insights(
        &self,
        account_id: &str,
        preset: DatePreset,
    ) -> AppResult<Vec<GraphCampaign>>;

    async fn adset_insights(
        &self,
        account_id: &str,
        preset: DatePreset,
    ) -> AppResult<Vec<GraphAdSet>>;
}
