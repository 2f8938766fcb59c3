//! Configuration management for the dashboard

use crate::error::{Result, TrackerError};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_PROXY_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_CHART_SCRIPT_URL: &str = "https://s3.tradingview.com/tv.js";

/// Where coin quotes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// Public price API, called directly
    Direct,
    /// Same-origin `/api/coingecko` proxy
    Proxy,
}

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (`/balance`, `/transactions`, ...)
    pub api_base_url: String,

    /// Public price API base URL
    pub price_api_url: String,
    pub price_source: PriceSource,
    /// Base URL of the quote proxy when `price_source` is `Proxy`
    pub proxy_base_url: String,

    /// JSON-RPC endpoint of the wallet provider; absent means no wallet
    pub wallet_rpc_url: Option<String>,

    /// File backing the settings key-value store
    pub settings_path: String,

    /// Chart widget script
    pub chart_script_url: String,

    /// Server
    pub bind_addr: String,
    pub allowed_origins: Vec<String>,

    /// Log level
    pub log_level: String,

    /// Table page sizes
    pub dashboard_page_size: usize,
    pub transactions_page_size: usize,
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let price_source = match var("PRICE_SOURCE").map(|v| v.to_lowercase()).as_deref() {
            Some("proxy") => PriceSource::Proxy,
            Some("direct") | None => PriceSource::Direct,
            Some(other) => {
                log::warn!("Unknown PRICE_SOURCE '{other}', using direct");
                PriceSource::Direct
            }
        };

        Self {
            api_base_url: var("API_BASE_URL")
                .or_else(|| var("NEXT_PUBLIC_API_BASE_URL"))
                .map_or_else(|| DEFAULT_API_BASE_URL.to_string(), |v| trim_slash(&v)),

            price_api_url: var("PRICE_API_URL")
                .map_or_else(|| DEFAULT_PRICE_API_URL.to_string(), |v| trim_slash(&v)),

            price_source,

            proxy_base_url: var("PROXY_BASE_URL")
                .map_or_else(|| DEFAULT_PROXY_BASE_URL.to_string(), |v| trim_slash(&v)),

            wallet_rpc_url: var("WALLET_RPC_URL"),

            settings_path: var("SETTINGS_PATH").unwrap_or_else(|| "./settings.json".to_string()),

            chart_script_url: var("CHART_SCRIPT_URL")
                .unwrap_or_else(|| DEFAULT_CHART_SCRIPT_URL.to_string()),

            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string()),

            allowed_origins: var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),

            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            dashboard_page_size: var("DASHBOARD_PAGE_SIZE")
                .map(|v| v.parse().unwrap_or(5))
                .unwrap_or(5),

            transactions_page_size: var("TRANSACTIONS_PAGE_SIZE")
                .map(|v| v.parse().unwrap_or(10))
                .unwrap_or(10),
        }
    }

    /// Base URL quotes are requested from
    pub fn quote_base_url(&self) -> &str {
        match self.price_source {
            PriceSource::Direct => &self.price_api_url,
            PriceSource::Proxy => &self.proxy_base_url,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("API_BASE_URL", &self.api_base_url),
            ("PRICE_API_URL", &self.price_api_url),
            ("PROXY_BASE_URL", &self.proxy_base_url),
            ("CHART_SCRIPT_URL", &self.chart_script_url),
        ] {
            if !is_http_url(url) {
                return Err(TrackerError::Config(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if let Some(rpc) = &self.wallet_rpc_url {
            if !is_http_url(rpc) {
                return Err(TrackerError::Config(format!(
                    "WALLET_RPC_URL must be an http(s) URL, got '{rpc}'"
                )));
            }
        }
        if self.dashboard_page_size == 0 || self.transactions_page_size == 0 {
            return Err(TrackerError::Config("page sizes must be positive".into()));
        }
        if self.settings_path.trim().is_empty() {
            return Err(TrackerError::Config("SETTINGS_PATH must not be empty".into()));
        }
        Ok(())
    }
}

fn trim_slash(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    matches!(rest, Some(host) if !host.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = config_with(&[]);
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.price_source, PriceSource::Direct);
        assert_eq!(config.quote_base_url(), "https://api.coingecko.com/api/v3");
        assert!(config.wallet_rpc_url.is_none());
        assert!(config.allowed_origins.is_empty());
        assert_eq!(config.dashboard_page_size, 5);
        assert_eq!(config.transactions_page_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_overrides() {
        let config = config_with(&[
            ("NEXT_PUBLIC_API_BASE_URL", "http://127.0.0.1:8000/"),
            ("PRICE_SOURCE", "PROXY"),
            ("PROXY_BASE_URL", "http://localhost:3000"),
            ("WALLET_RPC_URL", "http://localhost:8545"),
            ("ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
            ("TRANSACTIONS_PAGE_SIZE", "25"),
        ]);
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.quote_base_url(), "http://localhost:3000");
        assert_eq!(config.wallet_rpc_url.as_deref(), Some("http://localhost:8545"));
        assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.transactions_page_size, 25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = config_with(&[("API_BASE_URL", "localhost:8000")]);
        assert!(matches!(config.validate(), Err(TrackerError::Config(_))));

        let config = config_with(&[("DASHBOARD_PAGE_SIZE", "0")]);
        assert!(matches!(config.validate(), Err(TrackerError::Config(_))));

        let config = config_with(&[("WALLET_RPC_URL", "ws://node")]);
        assert!(config.validate().is_err());
    }
}
