use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cycle::RunConfig;
use crate::error::{ConfigError, Result};
use crate::utils::constants::{
    DEFAULT_ACCOUNT_DELAY_SECS, DEFAULT_CYCLE_INTERVAL_SECS, DEFAULT_IP_LOOKUP_URL,
    HTTP_TIMEOUT, INITIAL_BACKOFF, MAX_RETRIES, TASK_DELAY,
};

pub struct Config {
    pub api_base: String,
    pub ip_lookup_url: String,
    pub keys_file: PathBuf,
    pub proxies_file: PathBuf,
    /// `None` means the startup prompt decides.
    pub use_proxy: Option<bool>,
    pub account_delay_secs: u64,
    pub cycle_interval_secs: u64,
}

fn validate_http_url(name: &str, raw: &str) -> Result<()> {
    let parsed = raw.parse::<reqwest::Url>().map_err(|e| {
        ConfigError::InvalidConfig(format!("{name} must be a valid URL, got `{raw}`: {e}"))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidConfig(format!(
            "{name} must use http(s) scheme, got `{other}`"
        ))
        .into()),
    }
}

fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let api_base = env::var("HARVESTER_API_BASE").map_err(|_| {
            ConfigError::MissingConfig("HARVESTER_API_BASE must be set".to_string())
        })?;
        validate_http_url("HARVESTER_API_BASE", &api_base)?;

        let ip_lookup_url = env::var("HARVESTER_IP_LOOKUP_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_IP_LOOKUP_URL.to_string());
        validate_http_url("HARVESTER_IP_LOOKUP_URL", &ip_lookup_url)?;

        let keys_file = env::var("HARVESTER_KEYS_FILE")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/private_keys.txt"));

        let proxies_file = env::var("HARVESTER_PROXIES_FILE")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/proxies.txt"));

        let use_proxy = env::var("HARVESTER_USE_PROXY")
            .ok()
            .and_then(|raw| parse_bool_flag(&raw));

        let account_delay_secs = env::var("HARVESTER_ACCOUNT_DELAY_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_ACCOUNT_DELAY_SECS);

        let cycle_interval_secs = env::var("HARVESTER_CYCLE_INTERVAL_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_CYCLE_INTERVAL_SECS);

        Ok(Self {
            api_base,
            ip_lookup_url,
            keys_file,
            proxies_file,
            use_proxy,
            account_delay_secs,
            cycle_interval_secs,
        })
    }

    /// Freeze the loaded configuration plus the resolved proxy answer into the
    /// immutable value handed to the cycle runner.
    pub fn into_run_config(self, use_proxy: bool) -> RunConfig {
        RunConfig {
            api_base: self.api_base,
            ip_lookup_url: self.ip_lookup_url,
            http_timeout: HTTP_TIMEOUT,
            retries: MAX_RETRIES,
            initial_backoff: INITIAL_BACKOFF,
            task_delay: TASK_DELAY,
            account_delay: Duration::from_secs(self.account_delay_secs),
            cycle_interval: Duration::from_secs(self.cycle_interval_secs),
            use_proxy,
        }
    }
}
