use crate::errors::{AppError, AppResult};
use crate::graph::{AdAccount, GraphAdSet, GraphCampaign, InsightsApi, Paged};
use crate::models::DatePreset;
use crate::redaction;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com/v18.0";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_LIMIT: u32 = 100;

const INSIGHT_METRICS: &str = "spend,impressions,clicks,ctr,cpc,cpm,actions";

/// Reqwest-backed [`InsightsApi`] against the Facebook Graph API.
#[derive(Clone)]
pub struct GraphClient {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl GraphClient {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            client,
        }
    }

    fn url(&self, path: &str, fields: &str) -> String {
        format!(
            "{}/{}?fields={}&access_token={}",
            self.base_url.trim_end_matches('/'),
            path,
            fields,
            self.access_token,
        )
    }

    fn insights_clause(preset: DatePreset) -> String {
        format!("insights.date_preset({}){{{}}}", preset.as_str(), INSIGHT_METRICS)
    }

    async fn get_paged<T: DeserializeOwned>(&self, url: String) -> AppResult<Vec<T>> {
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "graph request failed ({}): {}",
                status,
                redaction::scrub(&body),
            )));
        }
        let page = response.json::<Paged<T>>().await?;
        Ok(page.data)
    }
}

#[async_trait]
impl InsightsApi for GraphClient {
    async fn list_ad_accounts(&self) -> AppResult<Vec<AdAccount>> {
        let url = self.url("me/adaccounts", "id,name,account_status");
        self.get_paged(url).await
    }

    async fn campaign_insights(
        &self,
        account_id: &str,
        preset: DatePreset,
    ) -> AppResult<Vec<GraphCampaign>> {
        let fields = format!(
            "id,name,status,objective,daily_budget,lifetime_budget,created_time,updated_time,{}",
            Self::insights_clause(preset),
        );
        let url = format!(
            "{}&limit={}",
            self.url(&format!("{account_id}/campaigns"), &fields),
            PAGE_LIMIT,
        );
        self.get_paged(url).await
    }

    async fn adset_insights(
        &self,
        account_id: &str,
        preset: DatePreset,
    ) -> AppResult<Vec<GraphAdSet>> {
        let fields = format!(
            "id,name,status,campaign{{id,name,objective}},{}",
            Self::insights_clause(preset),
        );
        let url = format!(
            "{}&limit={}",
            self.url(&format!("{account_id}/adsets"), &fields),
            PAGE_LIMIT,
        );
        self.get_paged(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insights_clause_carries_preset() {
        let clause = GraphClient::insights_clause(DatePreset::Last7d);
        assert_eq!(
            clause,
            "insights.date_preset(last_7d){spend,impressions,clicks,ctr,cpc,cpm,actions}"
        );
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = GraphClient::new("https://example.test/v18.0/", "token");
        let url = client.url("me/adaccounts", "id,name");
        assert!(url.starts_with("https://example.test/v18.0/me/adaccounts?fields=id,name"));
        assert!(url.ends_with("access_token=token"));
    }
}
