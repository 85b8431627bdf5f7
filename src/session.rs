//! Session state threaded through the platform's call sequence.
//!
//! The platform issues a Laravel-style `XSRF-TOKEN` cookie and rotates session
//! cookies on arbitrary responses. Every call site absorbs fresh `set-cookie`
//! headers; a response without them leaves the prior values untouched.

use reqwest::header::{HeaderMap, SET_COOKIE};

const XSRF_COOKIE_PREFIX: &str = "XSRF-TOKEN=";

/// Reduce `set-cookie` header values to a request `Cookie` string: the first
/// `;`-delimited segment (name=value) of each entry, joined with `"; "`.
/// Attributes like `Path` and `Secure` are dropped. Empty input yields an
/// empty string.
pub fn extract_session_cookie(set_cookie_values: &[String]) -> String {
    set_cookie_values
        .iter()
        .filter_map(|entry| entry.split(';').next())
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Locate the `XSRF-TOKEN=<value>` assignment in a cookie string and
/// URL-decode its value. Returns `None` when no assignment is present.
pub fn extract_xsrf_token(cookie: &str) -> Option<String> {
    let start = cookie.find(XSRF_COOKIE_PREFIX)? + XSRF_COOKIE_PREFIX.len();
    let rest = &cookie[start..];
    let raw = match rest.find(';') {
        Some(end) => &rest[..end],
        None => rest,
    };
    match urlencoding::decode(raw) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(raw.to_string()),
    }
}

/// Mutable triple carried across the calls of one account's processing.
/// Never persisted; discarded when the account is done.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub access_token: String,
    pub cookie: String,
    pub xsrf_token: String,
}

impl Session {
    /// Apply the carry-forward rule: when the response carries `set-cookie`
    /// headers, recompute the cookie string and refresh the XSRF token from
    /// it; when it does not, keep the existing values. A refreshed cookie
    /// that omits `XSRF-TOKEN=` keeps the previously issued token.
    pub fn absorb(&mut self, headers: &HeaderMap) {
        let values: Vec<String> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok().map(str::to_string))
            .collect();
        if values.is_empty() {
            return;
        }
        self.cookie = extract_session_cookie(&values);
        if let Some(token) = extract_xsrf_token(&self.cookie) {
            self.xsrf_token = token;
        }
    }
}
