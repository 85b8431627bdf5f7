//! Signed-message login flow.
//!
//! Strictly sequential: derive the wallet address, sign the fixed login
//! message, pick up the CSRF cookie, then exchange the signature for an
//! access token. Any step failing aborts the whole flow for that account.

use std::str::FromStr;

use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AuthError, Result};
use crate::http::{build_headers, HeaderProfile, HttpContext};
use crate::session::{extract_session_cookie, extract_xsrf_token, Session};
use crate::utils::constants::{CSRF_COOKIE_PATH, LOGIN_PATH, SIGN_IN_MESSAGE};

#[derive(Debug, Deserialize)]
struct LoginData {
    access_token: String,
}

pub struct AuthResult {
    pub session: Session,
    pub address: String,
}

pub async fn login(http: &HttpContext<'_>, private_key: &str) -> Result<AuthResult> {
    let signer = PrivateKeySigner::from_str(private_key)
        .map_err(|e| AuthError::Signer(e.to_string()))?;
    let address = signer.address().to_checksum(None);
    let signature = signer
        .sign_message(SIGN_IN_MESSAGE.as_bytes())
        .await
        .map_err(|e| AuthError::Signer(e.to_string()))?;
    let sign = format!("0x{}", hex::encode(signature.as_bytes()));

    // CSRF cookie round trip. The platform must hand back an XSRF-TOKEN
    // assignment before it will accept the login POST.
    let csrf_headers = build_headers(HeaderProfile::Global, http.api_base, None, None);
    let csrf_response = http
        .request("GET", &http.url(CSRF_COOKIE_PATH), None, csrf_headers)
        .await?;
    let set_cookie_values: Vec<String> = csrf_response
        .headers
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok().map(str::to_string))
        .collect();
    if set_cookie_values.is_empty() {
        return Err(AuthError::MissingCsrfCookie.into());
    }
    let mut session = Session {
        access_token: String::new(),
        cookie: extract_session_cookie(&set_cookie_values),
        xsrf_token: String::new(),
    };
    session.xsrf_token =
        extract_xsrf_token(&session.cookie).ok_or(AuthError::MissingXsrfToken)?;

    let body = json!({
        "address": address,
        "referral_code": null,
        "sign": sign,
    });
    let body_len = serde_json::to_vec(&body)
        .map_err(|e| AuthError::MalformedResponse(e.to_string()))?
        .len();
    let login_headers = build_headers(
        HeaderProfile::Login,
        http.api_base,
        Some(&session),
        Some(body_len),
    );
    let login_response = http
        .request("POST", &http.url(LOGIN_PATH), Some(&body), login_headers)
        .await?;

    let envelope = login_response
        .envelope::<LoginData>()
        .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
    if envelope.code != 0 {
        return Err(AuthError::LoginRejected(envelope.message).into());
    }
    session.absorb(&login_response.headers);
    let data = envelope.data.ok_or_else(|| {
        AuthError::MalformedResponse("login succeeded but data field is empty".to_string())
    })?;
    session.access_token = data.access_token;

    Ok(AuthResult { session, address })
}
