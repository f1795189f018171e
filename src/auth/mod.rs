//! OAuth2 authorization-code grant against the Fitbit identity provider.
//!
//! The flow mirrors the provider's documented browser consent dance:
//!
//! 1. Bind a one-shot callback listener on the registered loopback redirect.
//! 2. Open the authorization URL in the user's default browser.
//! 3. Block until the provider redirects back with `code=` or `error=`.
//! 4. Exchange the code for an access/refresh token pair.
//!
//! Terminal outcomes: authorized (a [`TokenSet`]), denied, or timed out —
//! each redirect is handled at most once and the listener never serves a
//! second one.
//!
//! Tokens are not persisted. The `vitals auth` subcommand prints them as
//! `key = value` lines on stdout, and the fetcher (its parent process)
//! extracts them from that output.

mod callback;
mod token;

use std::time::Duration;

use thiserror::Error;

pub use callback::{CallbackServer, RedirectOutcome, parse_redirect};
pub use token::{TokenSet, exchange_code, exchange_code_at};

/// Provider authorization endpoint (browser consent page).
pub const AUTHORIZE_URL: &str = "https://www.fitbit.com/oauth2/authorize";

/// Provider token endpoint (code exchange).
pub const TOKEN_URL: &str = "https://api.fitbit.com/oauth2/token";

/// Loopback address the redirect URI points at, registered with the
/// provider out of band.
pub const REDIRECT_ADDR: &str = "127.0.0.1:8080";

/// Full redirect URI as registered.
pub const REDIRECT_URI: &str = "http://127.0.0.1:8080/";

/// Scopes requested for body-metric access.
pub const SCOPES: &[&str] = &["weight"];

/// Bounded wait for the redirect before giving up.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by the authorization flow.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization denied by provider: {0}")]
    Denied(String),
    #[error("timed out waiting for the authorization redirect")]
    Timeout,
    #[error("failed to listen on {addr}: {reason}")]
    Listener { addr: String, reason: String },
    #[error("token exchange failed: {0}")]
    Exchange(String),
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

/// Run the full authorization flow and return the minted tokens.
///
/// Binds the callback listener before opening the browser so the redirect
/// can never race the listener. Exactly one token-exchange call is made,
/// and only when the redirect carried an authorization code.
pub fn authorize(client_id: &str, client_secret: &str) -> Result<TokenSet, AuthError> {
    let server = CallbackServer::bind(REDIRECT_ADDR)?;

    let url = build_authorize_url(client_id);
    if !crate::utils::browser::open(&url) {
        eprintln!("Visit this URL to authorize:\n  {url}");
    }

    let code = server.wait_for_redirect(CALLBACK_TIMEOUT)?;

    exchange_code(client_id, client_secret, &code, REDIRECT_URI)
}

/// Build the provider authorization URL for the consent page.
pub fn build_authorize_url(client_id: &str) -> String {
    let params = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", REDIRECT_URI)
        .append_pair("scope", &SCOPES.join(" "))
        .finish();

    format!("{AUTHORIZE_URL}?{params}")
}

/// Format the stdout handoff lines consumed by the fetcher.
pub fn handoff_lines(token: &TokenSet) -> String {
    format!(
        "access_token = {}\nrefresh_token = {}\nexpires_at = {}\n",
        token.access_token,
        token.refresh_token,
        token.expiry.to_rfc3339(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn authorize_url_contains_encoded_params() {
        let url = build_authorize_url("23ABCD");
        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=23ABCD"));
        assert!(url.contains("scope=weight"));
        // Redirect URI must be percent-encoded
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8080%2F"));
    }

    #[test]
    fn handoff_lines_are_one_key_per_line() {
        let token = TokenSet {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expiry: Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap(),
        };

        let out = handoff_lines(&token);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "access_token = at");
        assert!(lines[1].starts_with("refresh_token = rt"));
        assert!(lines[2].starts_with("expires_at = 2025-07-01T12:00:00"));
    }
}
