use crate::models::{ColumnConfig, ColumnKey};

fn column(key: ColumnKey, label: &str, width: u32, min_width: u32) -> ColumnConfig {
    ColumnConfig {
        key,
        label: label.to_string(),
        visible: true,
        width,
        min_width,
    }
}

/// The built-in table layout. Every configurable column exists here;
/// persisted layouts are always merged over this list.
pub fn default_columns() -> Vec<ColumnConfig> {
    vec![
        column(ColumnKey::Name, "Campaign Name", 250, 150),
        column(ColumnKey::Status, "Status", 100, 80),
        column(ColumnKey::Objective, "Objective", 150, 100),
        column(ColumnKey::Spend, "Spend", 120, 80),
        column(ColumnKey::Impressions, "Impressions", 130, 90),
        column(ColumnKey::Clicks, "Clicks", 100, 70),
        column(ColumnKey::Conversions, "Leads", 90, 60),
        column(ColumnKey::Cpl, "$/Lead", 100, 70),
        column(ColumnKey::Ctr, "CTR", 80, 60),
        column(ColumnKey::Cpc, "CPC", 90, 60),
        column(ColumnKey::Cpm, "CPM", 90, 60),
    ]
}

/// Overlays a persisted layout on the defaults. Saved entries win on
/// everything except `min_width`, which always comes from the defaults;
/// keys unknown to the defaults are dropped.
pub fn merge_saved(saved: &[ColumnConfig]) -> Vec<ColumnConfig> {
    default_columns()
        .into_iter()
        .map(|default| match saved.iter().find(|stored| stored.key == default.key) {
            Some(stored) => ColumnConfig {
                min_width: default.min_width,
                ..stored.clone()
            },
            None => default,
        })
        .collect()
}

pub fn clamp_widths(columns: &mut [ColumnConfig]) {
    for col in columns.iter_mut() {
        col.width = col.width.max(col.min_width);
    }
}

pub fn toggle_visibility(columns: &mut [ColumnConfig], key: ColumnKey) -> bool {
    match columns.iter_mut().find(|col| col.key == key) {
        Some(col) => {
            col.visible = !col.visible;
            true
        }
        None => false,
    }
}

pub fn visible_columns(columns: &[ColumnConfig]) -> Vec<ColumnConfig> {
    columns.iter().filter(|col| col.visible).cloned().collect()
}

/// An in-flight drag on one column's edge. Width updates during the
/// gesture stay in memory; the caller persists when the gesture ends.
#[derive(Debug, Clone)]
pub struct ResizeGesture {
    pub key: ColumnKey,
    start_x: f64,
    start_width: u32,
}

impl ResizeGesture {
    pub fn begin(columns: &[ColumnConfig], key: ColumnKey, pointer_x: f64) -> Option<Self> {
        columns.iter().find(|col| col.key == key).map(|col| Self {
            key,
            start_x: pointer_x,
            start_width: col.width,
        })
    }

    /// Width of the tracked column with the pointer at `pointer_x`,
    /// clamped to `min_width`.
    pub fn width_at(&self, pointer_x: f64, min_width: u32) -> u32 {
        let next = self.start_width as f64 + (pointer_x - self.start_x);
        next.round().max(f64::from(min_width)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_min_width_from_defaults() {
        let mut stored = default_columns();
        stored[0].width = 400;
        stored[0].min_width = 1; // stale persisted value
        stored[1].visible = false;

        let merged = merge_saved(&stored);
        assert_eq!(merged[0].width, 400);
        assert_eq!(merged[0].min_width, 150);
        assert!(!merged[1].visible);
    }

    #[test]
    fn merge_fills_in_missing_columns() {
        let stored = vec![default_columns().remove(3)];
        let merged = merge_saved(&stored);
        assert_eq!(merged.len(), default_columns().len());
    }

    #[test]
    fn visible_columns_are_a_subset() {
        let mut columns = default_columns();
        toggle_visibility(&mut columns, ColumnKey::Cpm);
        toggle_visibility(&mut columns, ColumnKey::Ctr);

        let visible = visible_columns(&columns);
        assert_eq!(visible.len(), columns.len() - 2);
        assert!(visible.iter().all(|col| columns.iter().any(|c| c.key == col.key)));
    }

    #[test]
    fn toggle_unknown_key_reports_false() {
        let mut columns = vec![default_columns().remove(0)];
        assert!(!toggle_visibility(&mut columns, ColumnKey::Cpm));
    }

    #[test]
    fn resize_tracks_pointer_delta() {
        let columns = default_columns();
        let gesture = ResizeGesture::begin(&columns, ColumnKey::Status, 500.0).unwrap();
        assert_eq!(gesture.width_at(540.0, 80), 140);
        assert_eq!(gesture.width_at(460.0, 80), 80);
    }

    #[test]
    fn resize_clamps_to_min_width() {
        let columns = default_columns();
        let gesture = ResizeGesture::begin(&columns, ColumnKey::Clicks, 0.0).unwrap();
        assert_eq!(gesture.width_at(-1000.0, 70), 70);
    }

    #[test]
    fn clamp_widths_enforces_floor() {
        let mut columns = default_columns();
        columns[2].width = 10;
        clamp_widths(&mut columns);
        assert_eq!(columns[2].width, columns[2].min_width);
    }
}
