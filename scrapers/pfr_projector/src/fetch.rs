use anyhow::{Context, Result};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{thread, time::Duration};
use tracing::info;

use crate::{
    cache::{CacheKey, HtmlCache},
    config::ProjectorConfig,
    error::ScrapeError,
};

/// Fetch-or-cache access to PFR pages.
pub struct PageFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
    cache: HtmlCache,
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    use_cache: bool,
    save_results: bool,
}

impl PageFetcher {
    pub fn new(config: &ProjectorConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(&config.scraping.user_agent)
            .timeout(Duration::from_secs(config.scraping.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let rate_limiter = Quota::with_period(Duration::from_secs(
            config.rate_limits.request_delay_secs,
        ))
        .map(RateLimiter::direct);

        Ok(Self {
            client,
            base_url: config.scraping.base_url.trim_end_matches('/').to_string(),
            cache: HtmlCache::new(&config.cache.dir),
            rate_limiter,
            use_cache: config.cache.use_cache,
            save_results: config.cache.save_results,
        })
    }

    pub fn cache(&self) -> &HtmlCache {
        &self.cache
    }

    /// Returns the page at `path` (relative to the base url), from the cache
    /// when allowed, otherwise from the network.
    pub fn page(&self, key: &CacheKey, path: &str, what: &str) -> Result<String, ScrapeError> {
        if self.use_cache {
            if let Some(html) = self.cache.load(key)? {
                info!("Using cache for {}...", what);
                return Ok(html);
            }
        }

        info!("Fetching {}...", what);
        let html = self.get(path)?;

        if self.save_results {
            info!("Caching {}...", what);
            self.cache.store(key, &html)?;
        }
        Ok(html)
    }

    fn get(&self, path: &str) -> Result<String, ScrapeError> {
        if let Some(limiter) = &self.rate_limiter {
            while limiter.check().is_err() {
                thread::sleep(Duration::from_millis(100));
            }
        }

        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        };
        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(ScrapeError::Status {
                url,
                status: response.status().as_u16(),
            });
        }
        Ok(response.text()?)
    }
}
