//! Per-account orchestration: login, task flow, point-total report.
//!
//! Infallible at its boundary: every stage failure is logged with account
//! context and short-circuits the remaining stages for that account only, so
//! the cycle always continues to the next account.

use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::Value;

use crate::auth;
use crate::cycle::RunConfig;
use crate::error::{NetError, Result};
use crate::http::{build_client, build_headers, HeaderProfile, HttpContext, Sleeper};
use crate::session::Session;
use crate::tasks::{self, TaskOutcome, TaskStatus};
use crate::utils::constants::USER_INFO_PATH;

#[derive(Debug, Deserialize)]
struct UserInfo {
    address: String,
    point: i64,
}

#[derive(Debug, Default)]
pub struct AccountSummary {
    pub index: usize,
    pub address: Option<String>,
    pub tasks_total: usize,
    pub tasks_completed: usize,
    pub points: Option<i64>,
}

/// Display-only lookup; failure never aborts the account.
async fn fetch_public_ip(http: &HttpContext<'_>, lookup_url: &str) -> Option<String> {
    match http.request("GET", lookup_url, None, HeaderMap::new()).await {
        Ok(response) => response
            .body
            .get("ip")
            .and_then(Value::as_str)
            .map(str::to_string),
        Err(err) => {
            tracing::debug!("[ACCOUNT] IP lookup failed: {err}");
            None
        }
    }
}

async fn fetch_user_info(http: &HttpContext<'_>, session: &mut Session) -> Result<UserInfo> {
    let headers = build_headers(HeaderProfile::Global, http.api_base, Some(session), None);
    let response = http
        .request("GET", &http.url(USER_INFO_PATH), None, headers)
        .await?;
    session.absorb(&response.headers);
    let envelope = response.envelope::<UserInfo>().map_err(|e| {
        NetError::Transport(format!("malformed user info response: {e}"))
    })?;
    envelope
        .data
        .ok_or_else(|| NetError::Transport("user info response has no data".to_string()).into())
}

pub async fn process_account(
    cfg: &RunConfig,
    index: usize,
    total: usize,
    private_key: &str,
    proxy: Option<&str>,
    sleeper: &dyn Sleeper,
) -> AccountSummary {
    let tag = index + 1;
    let mut summary = AccountSummary {
        index,
        ..Default::default()
    };

    let client = match build_client(proxy, cfg.http_timeout) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!("[ACCOUNT {tag}/{total}] Failed to build HTTP client: {err}");
            return summary;
        }
    };
    let http = HttpContext {
        client: &client,
        api_base: &cfg.api_base,
        retries: cfg.retries,
        initial_backoff: cfg.initial_backoff,
        sleeper,
    };

    let auth_result = match auth::login(&http, private_key).await {
        Ok(result) => result,
        Err(err) => {
            tracing::error!("[ACCOUNT {tag}/{total}] Login failed: {err}");
            return summary;
        }
    };
    summary.address = Some(auth_result.address.clone());
    let mut session = auth_result.session;
    tracing::info!(
        "[ACCOUNT {tag}/{total}] Logged in as {}",
        auth_result.address
    );

    let ip = fetch_public_ip(&http, &cfg.ip_lookup_url)
        .await
        .unwrap_or_else(|| "unknown".to_string());
    tracing::info!("[ACCOUNT {tag}/{total}] Public IP: {ip}");

    let mut task_list = match tasks::fetch_tasks(&http, &mut session).await {
        Ok(list) => list,
        Err(err) => {
            tracing::error!("[ACCOUNT {tag}/{total}] Task listing failed: {err}");
            return summary;
        }
    };
    summary.tasks_total = task_list.len();
    tracing::info!(
        "[ACCOUNT {tag}/{total}] {} task(s) available.",
        task_list.len()
    );

    for task in task_list.iter_mut() {
        let outcome = tasks::complete_task(&http, &mut session, task).await;
        match &outcome {
            TaskOutcome::Completed => tracing::info!(
                "[TASK] {} ({}) completed, +{} points.",
                task.title,
                task.code,
                task.points
            ),
            TaskOutcome::AlreadyDone => {
                tracing::info!("[TASK] {} ({}) was already done.", task.title, task.code)
            }
            TaskOutcome::Rejected(message) => tracing::warn!(
                "[TASK] {} ({}) rejected: {message}",
                task.title,
                task.code
            ),
            TaskOutcome::TransportFailed(message) => tracing::warn!(
                "[TASK] {} ({}) failed: {message}",
                task.title,
                task.code
            ),
        }
        if outcome.is_success() {
            task.status = TaskStatus::Completed;
            summary.tasks_completed += 1;
        }
        sleeper.sleep(cfg.task_delay).await;
    }
    tracing::info!(
        "[ACCOUNT {tag}/{total}] Processed {} tasks: {} completed",
        summary.tasks_total,
        summary.tasks_completed
    );

    match fetch_user_info(&http, &mut session).await {
        Ok(info) => {
            tracing::info!(
                "[ACCOUNT {tag}/{total}] {} holds {} point(s).",
                info.address,
                info.point
            );
            summary.points = Some(info.point);
        }
        Err(err) => tracing::warn!("[ACCOUNT {tag}/{total}] Stats fetch failed: {err}"),
    }

    summary
}
