use crate::error::{LyricsError, Result};
use crate::fetch::encoding::DEFAULT_LEGACY_HOSTS;
use crate::fetch::DEFAULT_FETCH_TIMEOUT;
use crate::search::{SearchSettings, DEFAULT_QUERY_SUFFIX, DEFAULT_SEARCH_ENDPOINT, PREFERRED_DOMAINS};
use std::path::PathBuf;
use std::time::Duration;

/// Settings loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub search: SearchSettings,
    pub fetch_timeout: Duration,
    pub legacy_hosts: Vec<String>,
    /// Song database location; the XDG data directory when unset
    pub db_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchSettings::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            legacy_hosts: DEFAULT_LEGACY_HOSTS.iter().map(|h| h.to_string()).collect(),
            db_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let fetch_timeout = match get("LYRICS_FETCH_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    LyricsError::Configuration(format!(
                        "LYRICS_FETCH_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                })?;
                if secs == 0 {
                    return Err(LyricsError::Configuration(
                        "LYRICS_FETCH_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_FETCH_TIMEOUT,
        };

        let config = Self {
            search: SearchSettings {
                endpoint: get("LYRICS_SEARCH_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
                api_key: get("LYRICS_SEARCH_API_KEY"),
                engine_id: get("LYRICS_SEARCH_ENGINE_ID"),
                query_suffix: get("LYRICS_SEARCH_SUFFIX")
                    .unwrap_or_else(|| DEFAULT_QUERY_SUFFIX.to_string()),
                preferred_domains: PREFERRED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            },
            fetch_timeout,
            legacy_hosts: get("LYRICS_LEGACY_HOSTS")
                .map(|raw| split_list(&raw))
                .unwrap_or_else(|| DEFAULT_LEGACY_HOSTS.iter().map(|h| h.to_string()).collect()),
            db_path: get("LYRICS_DB_PATH").map(PathBuf::from),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview(val: Option<&str>) -> String {
            match val {
                Some(val) => {
                    let n = val.chars().count().min(4);
                    format!("{}...", val.chars().take(n).collect::<String>())
                }
                None => "(unset)".to_string(),
            }
        }

        tracing::debug!(
            "Search endpoint {} key {} engine {}; fetch timeout {:?}; legacy hosts {:?}",
            self.search.endpoint,
            preview(self.search.api_key.as_deref()),
            preview(self.search.engine_id.as_deref()),
            self.fetch_timeout,
            self.legacy_hosts
        );
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
