//! Runtime settings assembled from defaults, an optional YAML file, the
//! environment, and command-line flags.
//!
//! Precedence, lowest to highest:
//! 1. Built-in defaults
//! 2. `config.yaml` (path from `--config` or `NEWSAPI_EXPLORER_CONFIG`)
//! 3. Environment (`.env` is loaded first), surfaced through clap's `env` support
//! 4. Command-line flags
//!
//! # Example file
//!
//! ```yaml
//! api_key: "0123456789abcdef"
//! base_url: "https://newsapi.org/v2"
//! timeout_secs: 20
//! defaults:
//!   query: "rust"
//!   language: en
//!   sort_by: publishedAt
//!   page_size: 50
//!   lookback_days: 30
//! ```

use crate::api::DEFAULT_BASE_URL;
use crate::cli::Cli;
use crate::error::{NewsError, NewsResult};
use crate::models::{
    DEFAULT_LOOKBACK_DAYS, DEFAULT_PAGE_SIZE, DEFAULT_QUERY, Language, SearchRequest, SortBy,
};
use crate::params::clamp_page_size;
use chrono::{Days, NaiveDate};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, instrument};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Upper bound for `defaults.lookback_days` (roughly a century).
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// Shape of the optional YAML config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub defaults: FormDefaults,
}

/// Pre-filled form values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormDefaults {
    pub query: String,
    pub language: Option<Language>,
    pub sort_by: SortBy,
    pub page_size: u32,
    pub lookback_days: i64,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            language: None,
            sort_by: SortBy::default(),
            page_size: DEFAULT_PAGE_SIZE,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

/// Effective settings for one process.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub defaults: FormDefaults,
}

impl Settings {
    /// Read the config file named on the command line (if any) and layer the
    /// CLI/environment values on top.
    #[instrument(level = "info", skip_all)]
    pub async fn load(cli: &Cli) -> NewsResult<Self> {
        let file = match &cli.config {
            Some(path) => load_file(path).await?,
            None => FileConfig::default(),
        };
        Settings::from_parts(file, cli.api_key.clone(), cli.base_url.clone())
    }

    pub fn from_parts(
        file: FileConfig,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> NewsResult<Self> {
        if !(0..=MAX_LOOKBACK_DAYS).contains(&file.defaults.lookback_days) {
            return Err(NewsError::Config(format!(
                "defaults.lookback_days must be between 0 and {MAX_LOOKBACK_DAYS} (got {})",
                file.defaults.lookback_days
            )));
        }

        let base_url = base_url
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url)
            .map_err(|e| NewsError::Config(format!("invalid base URL {base_url:?}: {e}")))?;

        let api_key = api_key
            .or(file.api_key)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let settings = Settings {
            api_key,
            base_url,
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            user_agent: file.user_agent.unwrap_or_else(|| {
                format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            }),
            defaults: file.defaults,
        };
        debug!(
            base_url = %settings.base_url,
            has_api_key = settings.api_key.is_some(),
            timeout_secs = settings.timeout.as_secs(),
            "Settings resolved"
        );
        Ok(settings)
    }

    /// A fresh request holding the configured defaults relative to `today`.
    pub fn request_defaults(&self, today: NaiveDate) -> SearchRequest {
        let mut request = SearchRequest::with_defaults(today);
        request.query = self.defaults.query.clone();
        request.language = self.defaults.language;
        request.sort_by = self.defaults.sort_by;
        request.page_size = clamp_page_size(self.defaults.page_size);
        request.from_date = u64::try_from(self.defaults.lookback_days)
            .ok()
            .and_then(|days| today.checked_sub_days(Days::new(days)))
            .unwrap_or(NaiveDate::MIN);
        request
    }
}

async fn load_file(path: &Path) -> NewsResult<FileConfig> {
    let raw = fs::read_to_string(path).await.map_err(|e| {
        NewsError::Config(format!("cannot read config file {}: {e}", path.display()))
    })?;
    let config: FileConfig = serde_yaml::from_str(&raw)?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}
