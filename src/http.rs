//! HTTP plumbing: bounded-retry request wrapper, header profiles, and
//! proxy-aware client construction.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE,
    COOKIE, ORIGIN, REFERER, USER_AGENT,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::NetError;
use crate::session::Session;
use crate::utils::constants::USER_AGENT_VALUE;

const BACKOFF_MULTIPLIER: f64 = 1.5;
const XSRF_HEADER: HeaderName = HeaderName::from_static("x-xsrf-token");

// ---------------------------------------------------------------------------
// Sleep seam: lets tests observe pacing and run without real waits
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ---------------------------------------------------------------------------
// Methods and retry core
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Run `op` up to `retries` total attempts. Between attempts, sleep the
/// current backoff and grow it by 1.5x. The last error propagates unchanged.
pub async fn retry_with_backoff<T, E, F, Fut>(
    retries: u32,
    initial_backoff: Duration,
    sleeper: &dyn Sleeper,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut backoff = initial_backoff;
    let mut last_err = match op().await {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    for _attempt in 1..retries.max(1) {
        sleeper.sleep(backoff).await;
        backoff = backoff.mul_f64(BACKOFF_MULTIPLIER);
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => last_err = err,
        }
    }
    Err(last_err)
}

// ---------------------------------------------------------------------------
// Response and wire envelope
// ---------------------------------------------------------------------------

/// A completed round trip: status, response headers (for `set-cookie`
/// absorption), and the parsed JSON body (`Null` when the body was empty).
pub struct ApiResponse {
    pub status: reqwest::StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl ApiResponse {
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<ApiEnvelope<T>, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }
}

/// The platform's uniform response envelope. `code` and `message` are an
/// opaque contract with the service; zero means success.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

// ---------------------------------------------------------------------------
// Request wrapper
// ---------------------------------------------------------------------------

/// Issue one GET/POST with bounded retries. Method names outside GET/POST
/// fail immediately without entering the retry loop. Transport failures and
/// non-2xx statuses both count as retryable attempts.
#[allow(clippy::too_many_arguments)]
pub async fn request(
    client: &reqwest::Client,
    method: &str,
    url: &str,
    payload: Option<&Value>,
    headers: HeaderMap,
    retries: u32,
    initial_backoff: Duration,
    sleeper: &dyn Sleeper,
) -> Result<ApiResponse, NetError> {
    let method = HttpMethod::parse(method)
        .ok_or_else(|| NetError::UnsupportedMethod(method.to_string()))?;
    let body_bytes = match payload {
        Some(value) => {
            Some(serde_json::to_vec(value).map_err(|e| NetError::Transport(e.to_string()))?)
        }
        None => None,
    };

    retry_with_backoff(retries, initial_backoff, sleeper, || {
        let client = client.clone();
        let headers = headers.clone();
        let body_bytes = body_bytes.clone();
        let url = url.to_string();
        async move {
            let mut builder = match method {
                HttpMethod::Get => client.get(&url),
                HttpMethod::Post => client.post(&url),
            };
            builder = builder.headers(headers);
            if let Some(bytes) = body_bytes {
                builder = builder.body(bytes);
            }
            let response = builder
                .send()
                .await
                .map_err(|e| NetError::Transport(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(NetError::Status {
                    status: status.as_u16(),
                    body: response.text().await.unwrap_or_default(),
                });
            }
            let response_headers = response.headers().clone();
            let text = response
                .text()
                .await
                .map_err(|e| NetError::Transport(e.to_string()))?;
            let body = if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).map_err(|e| NetError::Transport(e.to_string()))?
            };
            Ok(ApiResponse {
                status,
                headers: response_headers,
                body,
            })
        }
    })
    .await
}

// ---------------------------------------------------------------------------
// Header profiles: one builder for every call site
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderProfile {
    /// Browser-shaped defaults plus whatever the session currently holds.
    Global,
    /// Global plus an explicit `Content-Length` for the login POST.
    Login,
}

pub fn build_headers(
    profile: HeaderProfile,
    api_base: &str,
    session: Option<&Session>,
    body_len: Option<usize>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    let origin = api_base.trim_end_matches('/');
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(ORIGIN, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{origin}/")) {
        headers.insert(REFERER, value);
    }

    if let Some(session) = session {
        if !session.cookie.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&session.cookie) {
                headers.insert(COOKIE, value);
            }
        }
        if !session.xsrf_token.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&session.xsrf_token) {
                headers.insert(XSRF_HEADER, value);
            }
        }
        if !session.access_token.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", session.access_token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
    }

    if profile == HeaderProfile::Login {
        if let Some(len) = body_len {
            if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
                headers.insert(CONTENT_LENGTH, value);
            }
        }
    }

    headers
}

// ---------------------------------------------------------------------------
// Client construction and the proxy scheme contract
// ---------------------------------------------------------------------------

/// Build the per-account client. Supported proxy schemes produce an agent;
/// anything else silently disables proxying for that account.
pub fn build_client(proxy: Option<&str>, timeout: Duration) -> Result<reqwest::Client, NetError> {
    let mut builder = reqwest::Client::builder().timeout(timeout);
    if let Some(raw) = proxy {
        if let Some(agent) = proxy_agent(raw) {
            builder = builder.proxy(agent);
        }
    }
    builder
        .build()
        .map_err(|e| NetError::Transport(e.to_string()))
}

fn proxy_agent(raw: &str) -> Option<reqwest::Proxy> {
    let trimmed = raw.trim();
    let scheme = trimmed.split("://").next().unwrap_or_default();
    match scheme.to_ascii_lowercase().as_str() {
        "http" | "https" | "socks4" | "socks5" => reqwest::Proxy::all(trimmed).ok(),
        other => {
            tracing::debug!("[PROXY] Unsupported proxy scheme `{other}`; continuing without agent.");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Shared per-account call context
// ---------------------------------------------------------------------------

pub struct HttpContext<'a> {
    pub client: &'a reqwest::Client,
    pub api_base: &'a str,
    pub retries: u32,
    pub initial_backoff: Duration,
    pub sleeper: &'a dyn Sleeper,
}

impl HttpContext<'_> {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }

    pub async fn request(
        &self,
        method: &str,
        url: &str,
        payload: Option<&Value>,
        headers: HeaderMap,
    ) -> Result<ApiResponse, NetError> {
        request(
            self.client,
            method,
            url,
            payload,
            headers,
            self.retries,
            self.initial_backoff,
            self.sleeper,
        )
        .await
    }
}
