use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateLimits {
    /// Minimum gap between two requests to PFR. Zero disables limiting.
    pub request_delay_secs: u64,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            request_delay_secs: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapingConfig {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.pro-football-reference.com".to_string(),
            user_agent: "Mozilla/5.0 (compatible; pfr_projector/0.1)".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    pub dir: PathBuf,
    /// Read pages from the cache before going to the network.
    pub use_cache: bool,
    /// Write freshly fetched pages to the cache.
    pub save_results: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("html_cache"),
            use_cache: true,
            save_results: true,
        }
    }
}

/// League-wide scoring weights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringSettings {
    pub pass_td: f64,
    pub pass_yard: f64,
    pub rush_rec_td: f64,
    pub rush_rec_yard: f64,
    pub interception: f64,
    pub reception: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            pass_td: 6.0,
            pass_yard: 0.04,
            rush_rec_td: 6.0,
            rush_rec_yard: 0.1,
            interception: -2.0,
            reception: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectorConfig {
    pub rate_limits: RateLimits,
    pub scraping: ScrapingConfig,
    pub cache: CacheConfig,
    pub scoring: ScoringSettings,
}

impl ProjectorConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(base_url) = env::var("PFR_BASE_URL") {
            config.scraping.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Ok(user_agent) = env::var("SCRAPER_USER_AGENT") {
            config.scraping.user_agent = user_agent;
        }
        if let Some(timeout) = parse_var::<u64>("SCRAPER_TIMEOUT_SECS")? {
            config.scraping.request_timeout_secs = timeout;
        }
        if let Some(delay) = parse_var::<u64>("REQUEST_DELAY_SECS")? {
            config.rate_limits.request_delay_secs = delay;
        }
        if let Ok(dir) = env::var("PFR_CACHE_DIR") {
            config.cache.dir = PathBuf::from(dir);
        }
        if let Ok(path) = env::var("FF_SCORING_FILE") {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read scoring file {}", path))?;
            config.scoring = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid scoring file {}", path))?;
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: {}", name, raw)),
        Err(_) => Ok(None),
    }
}
