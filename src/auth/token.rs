//! Token exchange: authorization code → access/refresh token pair.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{AuthError, TOKEN_URL};

const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Access/refresh token pair minted by the authorization flow.
///
/// Lives only in process memory and the stdout handoff — each fetch run
/// re-authorizes from scratch.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub expiry: DateTime<Utc>,
}

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

/// Exchange an authorization code for a [`TokenSet`].
///
/// The provider authenticates the call with HTTP Basic
/// `client_id:client_secret` and a form-encoded authorization-code grant.
pub fn exchange_code(
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenSet, AuthError> {
    exchange_code_at(TOKEN_URL, client_id, client_secret, code, redirect_uri)
}

/// Exchange against an explicit token endpoint (tests point this at a
/// local stub).
pub fn exchange_code_at(
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenSet, AuthError> {
    let basic = BASE64.encode(format!("{client_id}:{client_secret}"));

    let result = ureq::post(token_url)
        .set("Authorization", &format!("Basic {basic}"))
        .timeout(EXCHANGE_TIMEOUT)
        .send_form(&[
            ("client_id", client_id),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
            ("code", code),
        ]);

    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_default();
            return Err(AuthError::Exchange(format!("status {status}: {body}")));
        }
        Err(e) => return Err(AuthError::Exchange(e.to_string())),
    };

    let parsed: TokenResponse = response
        .into_json()
        .map_err(|e| AuthError::Exchange(format!("unreadable token response: {e}")))?;

    Ok(TokenSet {
        access_token: parsed.access_token,
        refresh_token: parsed.refresh_token,
        expiry: Utc::now() + chrono::Duration::seconds(parsed.expires_in),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_credential_encoding() {
        // Matches `echo -n "id:secret" | base64`
        assert_eq!(BASE64.encode("id:secret"), "aWQ6c2VjcmV0");
    }

    #[test]
    fn token_response_parses() {
        let json = r#"{
            "access_token": "eyJhbGci",
            "refresh_token": "5b4ef6",
            "expires_in": 28800,
            "scope": "weight",
            "token_type": "Bearer",
            "user_id": "ABC123"
        }"#;
        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "eyJhbGci");
        assert_eq!(parsed.refresh_token, "5b4ef6");
        assert_eq!(parsed.expires_in, 28800);
    }
}
