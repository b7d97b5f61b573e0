use crate::errors::AppResult;
use crate::graph::{ActionEntry, GraphAdSet, GraphCampaign, InsightEntry, Insights, InsightsApi};
use crate::models::{CampaignRow, DatePreset};
use std::collections::BTreeMap;

/// Action types that count as a lead, most specific first. The first
/// type present in a campaign's action list wins.
const ACTION_PREFERENCE: [&str; 4] = [
    "lead",
    "purchase",
    "complete_registration",
    "offsite_conversion.fb_pixel_lead",
];

const UNNAMED_CAMPAIGN: &str = "Unnamed Campaign";
const UNKNOWN: &str = "UNKNOWN";

/// Result of one sweep across every ad account.
#[derive(Debug, Clone)]
pub struct Harvest {
    pub accounts_scanned: usize,
    pub rows: Vec<CampaignRow>,
}

/// Queries every ad account for campaign-level insights, falling back to
/// ad-set-level grouping when a campaign query comes back empty, and
/// flattens the result into one row per campaign sorted by status.
///
/// Accounts that fail upstream are logged and skipped; only failures
/// before the account loop (the account listing itself) propagate.
pub async fn collect_rows(api: &dyn InsightsApi, preset: DatePreset) -> AppResult<Harvest> {
    let accounts = api.list_ad_accounts().await?;
    tracing::info!(accounts = accounts.len(), preset = preset.as_str(), "listing ad accounts");

    let mut campaigns: Vec<GraphCampaign> = Vec::new();
    for account in &accounts {
        tracing::debug!(
            account = %account.id,
            name = %account.name,
            status = ?account.account_status,
            "checking ad account",
        );
        match collect_account(api, &account.id, preset).await {
            Ok(mut found) => campaigns.append(&mut found),
            Err(error) => {
                tracing::warn!(account = %account.id, error = %error, "skipping ad account after upstream failure");
            }
        }
    }

    let mut rows: Vec<CampaignRow> = campaigns.iter().map(row_from_campaign).collect();
    rows.sort_by(|a, b| a.status.cmp(&b.status));

    Ok(Harvest {
        accounts_scanned: accounts.len(),
        rows,
    })
}

async fn collect_account(
    api: &dyn InsightsApi,
    account_id: &str,
    preset: DatePreset,
) -> AppResult<Vec<GraphCampaign>> {
    let campaigns = api.campaign_insights(account_id, preset).await?;
    if !campaigns.is_empty() {
        return Ok(campaigns);
    }

    tracing::debug!(account = %account_id, "no campaigns, querying ad sets instead");
    let adsets = api.adset_insights(account_id, preset).await?;
    Ok(group_adsets(adsets))
}

/// Groups ad sets by their parent campaign, summing spend, impressions
/// and clicks, and concatenating action lists. Rate metrics keep the
/// newest non-empty value. Ad sets without a parent campaign are dropped.
pub fn group_adsets(adsets: Vec<GraphAdSet>) -> Vec<GraphCampaign> {
    let mut grouped: BTreeMap<String, GraphCampaign> = BTreeMap::new();

    for adset in adsets {
        let Some(parent) = adset.campaign else { continue };
        let entry = grouped.entry(parent.id.clone()).or_insert_with(|| GraphCampaign {
            id: parent.id.clone(),
            name: or_default(&parent.name, UNNAMED_CAMPAIGN),
            status: adset.status.clone(),
            objective: or_default(&parent.objective, UNKNOWN),
            insights: Some(Insights::default()),
        });

        let Some(incoming) = adset.insights.as_ref().and_then(|insights| insights.data.first()) else {
            continue;
        };
        let insights = entry.insights.get_or_insert_with(Insights::default);
        match insights.data.first_mut() {
            Some(existing) => merge_insights(existing, incoming),
            None => insights.data.push(incoming.clone()),
        }
    }

    grouped.into_values().collect()
}

fn merge_insights(existing: &mut InsightEntry, incoming: &InsightEntry) {
    existing.spend = Some((parse_f64(&existing.spend) + parse_f64(&incoming.spend)).to_string());
    existing.impressions =
        Some((parse_u64(&existing.impressions) + parse_u64(&incoming.impressions)).to_string());
    existing.clicks = Some((parse_u64(&existing.clicks) + parse_u64(&incoming.clicks)).to_string());

    if let Some(ctr) = non_empty(&incoming.ctr) {
        existing.ctr = Some(ctr);
    }
    if let Some(cpc) = non_empty(&incoming.cpc) {
        existing.cpc = Some(cpc);
    }
    if let Some(cpm) = non_empty(&incoming.cpm) {
        existing.cpm = Some(cpm);
    }

    if let Some(actions) = &incoming.actions {
        existing
            .actions
            .get_or_insert_with(Vec::new)
            .extend(actions.iter().cloned());
    }
}

/// Flattens one campaign into a row. `cpl` is derived here and nowhere
/// else: spend over conversions when conversions are non-zero.
pub fn row_from_campaign(campaign: &GraphCampaign) -> CampaignRow {
    let insights = campaign.insights.as_ref().and_then(|insights| insights.data.first());

    let conversions = insights
        .and_then(|entry| leading_conversion(entry.actions.as_deref()))
        .unwrap_or(0);
    let spend = insights.map(|entry| parse_f64(&entry.spend)).unwrap_or(0.0);
    let cpl = if conversions > 0 {
        spend / conversions as f64
    } else {
        0.0
    };

    CampaignRow {
        id: campaign.id.clone(),
        name: or_default(&campaign.name, UNNAMED_CAMPAIGN),
        status: or_default(&campaign.status, UNKNOWN),
        objective: or_default(&campaign.objective, UNKNOWN),
        spend,
        impressions: insights.map(|entry| parse_u64(&entry.impressions)).unwrap_or(0),
        clicks: insights.map(|entry| parse_u64(&entry.clicks)).unwrap_or(0),
        conversions,
        ctr: insights.map(|entry| parse_f64(&entry.ctr)).unwrap_or(0.0),
        cpc: insights.map(|entry| parse_f64(&entry.cpc)).unwrap_or(0.0),
        cpm: insights.map(|entry| parse_f64(&entry.cpm)).unwrap_or(0.0),
        cpl,
    }
}

fn leading_conversion(actions: Option<&[ActionEntry]>) -> Option<u64> {
    let actions = actions?;
    ACTION_PREFERENCE.iter().find_map(|preferred| {
        actions
            .iter()
            .find(|action| action.action_type == *preferred)
            .map(|action| action.value.parse::<u64>().unwrap_or(0))
    })
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|raw| !raw.is_empty()).map(ToString::to_string)
}

fn parse_f64(raw: &Option<String>) -> f64 {
    raw.as_deref().and_then(|value| value.parse().ok()).unwrap_or(0.0)
}

fn parse_u64(raw: &Option<String>) -> u64 {
    raw.as_deref().and_then(|value| value.parse().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::graph::{AdAccount, CampaignRef};
    use async_trait::async_trait;
    use std::collections::HashMap;

    fn entry(spend: &str, impressions: &str, clicks: &str, actions: Vec<(&str, &str)>) -> InsightEntry {
        InsightEntry {
            spend: Some(spend.to_string()),
            impressions: Some(impressions.to_string()),
            clicks: Some(clicks.to_string()),
            ctr: Some("0.5".to_string()),
            cpc: Some("1.2".to_string()),
            cpm: Some("9.9".to_string()),
            actions: Some(
                actions
                    .into_iter()
                    .map(|(action_type, value)| ActionEntry {
                        action_type: action_type.to_string(),
                        value: value.to_string(),
                    })
                    .collect(),
            ),
        }
    }

    fn adset(campaign_id: &str, status: &str, insight: InsightEntry) -> GraphAdSet {
        GraphAdSet {
            id: format!("{campaign_id}-adset"),
            name: String::new(),
            status: status.to_string(),
            campaign: Some(CampaignRef {
                id: campaign_id.to_string(),
                name: format!("Campaign {campaign_id}"),
                objective: "LEAD_GENERATION".to_string(),
            }),
            insights: Some(Insights { data: vec![insight] }),
        }
    }

    #[test]
    fn grouping_sums_counters_and_concatenates_actions() {
        let grouped = group_adsets(vec![
            adset("c1", "ACTIVE", entry("10.5", "100", "7", vec![("lead", "2")])),
            adset("c1", "ACTIVE", entry("4.5", "50", "3", vec![("lead", "1")])),
        ]);

        assert_eq!(grouped.len(), 1);
        let insight = grouped[0].insights.as_ref().unwrap().data.first().unwrap();
        assert_eq!(insight.spend.as_deref(), Some("15"));
        assert_eq!(insight.impressions.as_deref(), Some("150"));
        assert_eq!(insight.clicks.as_deref(), Some("10"));
        assert_eq!(insight.actions.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn grouping_drops_orphan_adsets() {
        let mut orphan = adset("c1", "ACTIVE", entry("1", "1", "1", vec![]));
        orphan.campaign = None;
        assert!(group_adsets(vec![orphan]).is_empty());
    }

    #[test]
    fn conversion_prefers_lead_over_purchase() {
        let campaign = GraphCampaign {
            id: "c1".to_string(),
            name: "Campaign".to_string(),
            status: "ACTIVE".to_string(),
            objective: "CONVERSIONS".to_string(),
            insights: Some(Insights {
                data: vec![entry("100", "10", "5", vec![("purchase", "9"), ("lead", "4")])],
            }),
        };

        let row = row_from_campaign(&campaign);
        assert_eq!(row.conversions, 4);
        assert_eq!(row.cpl, 25.0);
    }

    #[test]
    fn cpl_is_zero_without_conversions() {
        let campaign = GraphCampaign {
            id: "c1".to_string(),
            name: "Campaign".to_string(),
            status: "ACTIVE".to_string(),
            objective: "CONVERSIONS".to_string(),
            insights: Some(Insights {
                data: vec![entry("100", "10", "5", vec![("link_click", "12")])],
            }),
        };

        let row = row_from_campaign(&campaign);
        assert_eq!(row.conversions, 0);
        assert_eq!(row.cpl, 0.0);
    }

    #[test]
    fn blank_fields_get_placeholders() {
        let campaign = GraphCampaign {
            id: "c1".to_string(),
            name: String::new(),
            status: String::new(),
            objective: String::new(),
            insights: None,
        };

        let row = row_from_campaign(&campaign);
        assert_eq!(row.name, "Unnamed Campaign");
        assert_eq!(row.status, "UNKNOWN");
        assert_eq!(row.objective, "UNKNOWN");
        assert_eq!(row.spend, 0.0);
    }

    struct StubApi {
        accounts: Vec<AdAccount>,
        campaigns: HashMap<String, Vec<GraphCampaign>>,
        adsets: HashMap<String, Vec<GraphAdSet>>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl InsightsApi for StubApi {
        async fn list_ad_accounts(&self) -> crate::errors::AppResult<Vec<AdAccount>> {
            Ok(self.accounts.clone())
        }

        async fn campaign_insights(
            &self,
            account_id: &str,
            _preset: DatePreset,
        ) -> crate::errors::AppResult<Vec<GraphCampaign>> {
            if self.failing.iter().any(|id| id == account_id) {
                return Err(AppError::Upstream("boom".to_string()));
            }
            Ok(self.campaigns.get(account_id).cloned().unwrap_or_default())
        }

        async fn adset_insights(
            &self,
            account_id: &str,
            _preset: DatePreset,
        ) -> crate::errors::AppResult<Vec<GraphAdSet>> {
            Ok(self.adsets.get(account_id).cloned().unwrap_or_default())
        }
    }

    fn account(id: &str) -> AdAccount {
        AdAccount {
            id: id.to_string(),
            name: id.to_string(),
            account_status: Some(1),
        }
    }

    #[tokio::test]
    async fn failing_account_is_skipped_not_fatal() {
        let api = StubApi {
            accounts: vec![account("act_bad"), account("act_good")],
            campaigns: HashMap::from([(
                "act_good".to_string(),
                vec![GraphCampaign {
                    id: "c1".to_string(),
                    name: "Campaign".to_string(),
                    status: "ACTIVE".to_string(),
                    objective: "CONVERSIONS".to_string(),
                    insights: None,
                }],
            )]),
            adsets: HashMap::new(),
            failing: vec!["act_bad".to_string()],
        };

        let harvest = collect_rows(&api, DatePreset::Maximum).await.unwrap();
        assert_eq!(harvest.accounts_scanned, 2);
        assert_eq!(harvest.rows.len(), 1);
        assert_eq!(harvest.rows[0].id, "c1");
    }

    #[tokio::test]
    async fn empty_campaigns_fall_back_to_adset_grouping() {
        let api = StubApi {
            accounts: vec![account("act_1")],
            campaigns: HashMap::new(),
            adsets: HashMap::from([(
                "act_1".to_string(),
                vec![
                    adset("c1", "PAUSED", entry("5", "10", "2", vec![("lead", "1")])),
                    adset("c1", "PAUSED", entry("5", "10", "2", vec![("lead", "2")])),
                ],
            )]),
            failing: Vec::new(),
        };

        let harvest = collect_rows(&api, DatePreset::Last30d).await.unwrap();
        assert_eq!(harvest.rows.len(), 1);
        let row = &harvest.rows[0];
        assert_eq!(row.spend, 10.0);
        assert_eq!(row.impressions, 20);
        assert_eq!(row.conversions, 1);
        assert_eq!(row.status, "PAUSED");
    }

    #[tokio::test]
    async fn rows_sort_by_status_lexicographically() {
        let make = |id: &str, status: &str| GraphCampaign {
            id: id.to_string(),
            name: id.to_string(),
            status: status.to_string(),
            objective: "CONVERSIONS".to_string(),
            insights: None,
        };
        let api = StubApi {
            accounts: vec![account("act_1")],
            campaigns: HashMap::from([(
                "act_1".to_string(),
                vec![make("c1", "PAUSED"), make("c2", "ACTIVE"), make("c3", "DELETED")],
            )]),
            adsets: HashMap::new(),
            failing: Vec::new(),
        };

        let harvest = collect_rows(&api, DatePreset::Maximum).await.unwrap();
        let statuses: Vec<&str> = harvest.rows.iter().map(|row| row.status.as_str()).collect();
        assert_eq!(statuses, vec!["ACTIVE", "DELETED", "PAUSED"]);
    }
}
