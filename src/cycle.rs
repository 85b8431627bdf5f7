//! Cycle runner: one sequential pass over all accounts, repeated forever.

use std::time::Duration;

use crate::account::{process_account, AccountSummary};
use crate::http::Sleeper;

/// Immutable run configuration, constructed once at startup and passed down
/// by parameter.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub api_base: String,
    pub ip_lookup_url: String,
    pub http_timeout: Duration,
    pub retries: u32,
    pub initial_backoff: Duration,
    pub task_delay: Duration,
    pub account_delay: Duration,
    pub cycle_interval: Duration,
    pub use_proxy: bool,
}

fn proxy_for_index<'a>(cfg: &RunConfig, proxies: &'a [String], index: usize) -> Option<&'a str> {
    if !cfg.use_proxy || proxies.is_empty() {
        return None;
    }
    Some(proxies[index % proxies.len()].as_str())
}

/// One deterministic pass over all accounts with round-robin proxy
/// assignment and a fixed delay between accounts.
pub async fn run_cycle(
    cfg: &RunConfig,
    keys: &[String],
    proxies: &[String],
    sleeper: &dyn Sleeper,
) -> Vec<AccountSummary> {
    let total = keys.len();
    let mut summaries = Vec::with_capacity(total);
    for (index, key) in keys.iter().enumerate() {
        let proxy = proxy_for_index(cfg, proxies, index);
        summaries.push(process_account(cfg, index, total, key, proxy, sleeper).await);
        if index + 1 < total {
            sleeper.sleep(cfg.account_delay).await;
        }
    }
    summaries
}

/// Repeat `run_cycle` with the fixed inter-cycle wait, indefinitely.
pub async fn run_forever(cfg: &RunConfig, keys: &[String], proxies: &[String], sleeper: &dyn Sleeper) {
    let mut cycle = 1u64;
    loop {
        tracing::info!(
            "[CYCLE] Starting cycle #{cycle} over {} account(s).",
            keys.len()
        );
        let summaries = run_cycle(cfg, keys, proxies, sleeper).await;
        let completed: usize = summaries.iter().map(|s| s.tasks_completed).sum();
        let total: usize = summaries.iter().map(|s| s.tasks_total).sum();
        tracing::info!(
            "[CYCLE] Cycle #{cycle} complete: {completed}/{total} tasks across {} account(s). Next cycle in {}s.",
            summaries.len(),
            cfg.cycle_interval.as_secs()
        );
        sleeper.sleep(cfg.cycle_interval).await;
        cycle += 1;
    }
}
