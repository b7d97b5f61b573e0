use crate::models::{CampaignRow, FilterSelections, SummaryTotals};

pub const ALL: &str = "all";

/// Intersection of the three row predicates: status equality, objective
/// equality, and case-insensitive substring match on the campaign name.
/// The "all" sentinel disables a predicate; `time_frame` is a fetch
/// parameter and never filters rows.
pub fn apply_filters(rows: &[CampaignRow], filters: &FilterSelections) -> Vec<CampaignRow> {
    let needle = filters.search_term.to_lowercase();
    rows.iter()
        .filter(|row| filters.status_filter == ALL || row.status == filters.status_filter)
        .filter(|row| filters.objective_filter == ALL || row.objective == filters.objective_filter)
        .filter(|row| needle.is_empty() || row.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub fn totals(rows: &[CampaignRow]) -> SummaryTotals {
    rows.iter().fold(SummaryTotals::default(), |mut acc, row| {
        acc.spend += row.spend;
        acc.impressions += row.impressions;
        acc.clicks += row.clicks;
        acc.conversions += row.conversions;
        acc
    })
}

/// Distinct values in first-seen order, for the filter dropdowns.
pub fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|known| known == value) {
            seen.push(value.to_string());
        }
    }
    seen
}
