use crate::models::CampaignRow;

/// Fixed dataset served when the Graph API is unconfigured or failing.
pub fn sample_rows() -> Vec<CampaignRow> {
    vec![
        CampaignRow {
            id: "1".to_string(),
            name: "Personal Injury - California".to_string(),
            status: "ACTIVE".to_string(),
            objective: "LEAD_GENERATION".to_string(),
            spend: 15234.50,
            impressions: 523_456,
            clicks: 2341,
            conversions: 87,
            ctr: 0.45,
            cpc: 6.51,
            cpm: 29.11,
            cpl: 175.11,
        },
        CampaignRow {
            id: "2".to_string(),
            name: "Estate Planning - Los Angeles".to_string(),
            status: "ACTIVE".to_string(),
            objective: "CONVERSIONS".to_string(),
            spend: 8956.23,
            impressions: 341_234,
            clicks: 1523,
            conversions: 45,
            ctr: 0.45,
            cpc: 5.88,
            cpm: 26.24,
            cpl: 199.03,
        },
    ]
}

/// Marker row prepended when accounts exist but no campaign carried data.
pub fn no_campaigns_notice() -> CampaignRow {
    CampaignRow {
        id: "info".to_string(),
        name: "No Active Campaigns Found".to_string(),
        status: "INFO".to_string(),
        objective: "Check your Facebook Ads Manager".to_string(),
        spend: 0.0,
        impressions: 0,
        clicks: 0,
        conversions: 0,
        ctr: 0.0,
        cpc: 0.0,
        cpm: 0.0,
        cpl: 0.0,
    }
}
