use crate::errors::{AppError, AppResult};
use crate::graph::client::DEFAULT_GRAPH_BASE_URL;
use std::env;
use std::path::PathBuf;

const DEFAULT_LISTEN: &str = "127.0.0.1:8787";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

// Scaffolding envs ship with a "your-facebook-access-token" placeholder;
// treat it the same as no token at all.
const TOKEN_PLACEHOLDER_MARKER: &str = "your-facebook";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen: String,
    pub data_dir: PathBuf,
    pub graph_base_url: String,
    pub access_token: Option<String>,
    pub refresh_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        let refresh_interval_secs = match env::var("CAMPAIGN_CONSOLE_REFRESH_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| AppError::Config(format!("CAMPAIGN_CONSOLE_REFRESH_SECS is not a number: {raw}")))?,
            Err(_) => DEFAULT_REFRESH_INTERVAL_SECS,
        };

        Ok(Self {
            listen: env::var("CAMPAIGN_CONSOLE_LISTEN").unwrap_or_else(|_| DEFAULT_LISTEN.to_string()),
            data_dir: env::var("CAMPAIGN_CONSOLE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
            graph_base_url: env::var("FACEBOOK_GRAPH_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPH_BASE_URL.to_string()),
            access_token: resolve_token(env::var("FACEBOOK_ACCESS_TOKEN").ok()),
            refresh_interval_secs,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("console.db")
    }
}

fn resolve_token(raw: Option<String>) -> Option<String> {
    raw.filter(|token| !token.is_empty() && !token.contains(TOKEN_PLACEHOLDER_MARKER))
}

#[cfg(test)]
mod tests {
    use super::resolve_token;

    #[test]
    fn placeholder_token_counts_as_unconfigured() {
        assert!(resolve_token(Some("your-facebook-access-token".to_string())).is_none());
        assert!(resolve_token(Some(String::new())).is_none());
        assert!(resolve_token(None).is_none());
    }

    #[test]
    fn real_token_passes_through() {
        assert_eq!(
            resolve_token(Some("EAAGreal".to_string())).as_deref(),
            Some("EAAGreal")
        );
    }
}
