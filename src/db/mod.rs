use crate::errors::{AppError, AppResult};
use crate::models::{ColumnConfig, FilterSelections, SavedView};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

const COLUMNS_KEY: &str = "campaign_columns";
const LAST_VIEW_KEY: &str = "last_view_id";

/// Local store for the dashboard layout: the column configuration, the
/// saved views, and the marker for the last active view.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Persisted column layout, or `None` when nothing is stored yet or
    /// the stored JSON no longer parses (defaults stay in place).
    pub fn load_columns(&self) -> AppResult<Option<Vec<ColumnConfig>>> {
        let raw = self.get_setting(COLUMNS_KEY)?;
        Ok(raw.and_then(|raw| serde_json::from_str::<Vec<ColumnConfig>>(&raw).ok()))
    }

    pub fn save_columns(&self, columns: &[ColumnConfig]) -> AppResult<()> {
        self.set_setting(COLUMNS_KEY, &serde_json::to_string(columns)?)
    }

    pub fn last_view_id(&self) -> AppResult<Option<String>> {
        self.get_setting(LAST_VIEW_KEY)
    }

    pub fn set_last_view_id(&self, view_id: Option<&str>) -> AppResult<()> {
        match view_id {
            Some(view_id) => self.set_setting(LAST_VIEW_KEY, view_id),
            None => self.delete_setting(LAST_VIEW_KEY),
        }
    }

    pub fn insert_view(&self, view: &SavedView) -> AppResult<()> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO saved_views (id, name, created_at, filters_json, columns_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                view.id,
                view.name,
                view.created_at.to_rfc3339(),
                serde_json::to_string(&view.filters)?,
                serde_json::to_string(&view.columns)?,
            ],
        )?;
        Ok(())
    }

    pub fn update_view(&self, view: &SavedView) -> AppResult<bool> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let changed = conn.execute(
            "UPDATE saved_views SET name = ?1, filters_json = ?2, columns_json = ?3 WHERE id = ?4",
            params![
                view.name,
                serde_json::to_string(&view.filters)?,
                serde_json::to_string(&view.columns)?,
                view.id,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn update_view_columns(&self, view_id: &str, columns: &[ColumnConfig]) -> AppResult<bool> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let changed = conn.execute(
            "UPDATE saved_views SET columns_json = ?1 WHERE id = ?2",
            params![serde_json::to_string(columns)?, view_id],
        )?;
        Ok(changed > 0)
    }

    pub fn get_view(&self, view_id: &str) -> AppResult<Option<SavedView>> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let view = conn
            .query_row(
                "SELECT id, name, created_at, filters_json, columns_json
                 FROM saved_views WHERE id = ?1",
                [view_id],
                parse_view_row,
            )
            .optional()?;
        Ok(view)
    }

    pub fn list_views(&self) -> AppResult<Vec<SavedView>> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let mut statement = conn.prepare(
            "SELECT id, name, created_at, filters_json, columns_json
             FROM saved_views ORDER BY created_at ASC",
        )?;

        let views = statement
            .query_map([], parse_view_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(views)
    }

    pub fn delete_view(&self, view_id: &str) -> AppResult<bool> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let deleted = conn.execute("DELETE FROM saved_views WHERE id = ?1", [view_id])?;
        Ok(deleted > 0)
    }

    fn get_setting(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let raw = conn
            .query_row(
                "SELECT value_json FROM settings WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(raw)
    }

    fn set_setting(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO settings (key, value_json) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete_setting(&self, key: &str) -> AppResult<()> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(())
    }
}

fn parse_view_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SavedView> {
    Ok(SavedView {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_time(&row.get::<_, String>(2)?)?,
        filters: serde_json::from_str::<FilterSelections>(&row.get::<_, String>(3)?)
            .unwrap_or_default(),
        columns: serde_json::from_str::<Vec<ColumnConfig>>(&row.get::<_, String>(4)?)
            .unwrap_or_default(),
    })
}

fn parse_time(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, error.to_string())),
            )
        })
}
