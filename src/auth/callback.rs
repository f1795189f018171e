//! One-shot callback listener for the authorization redirect.
//!
//! A `tiny_http` server bound to the registered loopback port. It acts as a
//! one-time completion gate: the bounded receive loop completes on the
//! first request whose query string carries `code=` or `error=`, answers
//! it with a small HTML page, and is then dropped. Stray requests the
//! browser fires at the port (`/favicon.ico` and friends) get a 404 and do
//! not consume the gate.

use std::time::{Duration, Instant};

use tiny_http::{Header, Response, Server, StatusCode};

use super::AuthError;

/// What a redirect request carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// Authorization granted; the decoded `code` parameter.
    Code(String),
    /// Authorization denied or failed; the decoded `error` parameter.
    Error(String),
}

/// Parse a request URL (path + query) into a redirect outcome.
///
/// Returns `None` for requests carrying neither parameter, which the wait
/// loop answers with 404 and ignores.
pub fn parse_redirect(request_url: &str) -> Option<RedirectOutcome> {
    let query = request_url.split_once('?').map(|(_, q)| q)?;

    let mut code = None;
    let mut error = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "code" if !value.is_empty() => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    // An error parameter wins even if a code is also present.
    if let Some(e) = error {
        return Some(RedirectOutcome::Error(e));
    }
    code.map(RedirectOutcome::Code)
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// The single-request redirect listener.
pub struct CallbackServer {
    server: Server,
    addr: String,
}

impl CallbackServer {
    /// Bind the listener. Fails if the port is taken (usually a previous
    /// authorization still waiting).
    pub fn bind(addr: &str) -> Result<Self, AuthError> {
        let server = Server::http(addr).map_err(|e| AuthError::Listener {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            server,
            addr: addr.to_string(),
        })
    }

    /// The port actually bound (useful when bound to port 0).
    pub fn port(&self) -> u16 {
        self.server
            .server_addr()
            .to_ip()
            .map(|a| a.port())
            .unwrap_or(0)
    }

    /// Block until the redirect arrives or the deadline passes.
    ///
    /// Returns the authorization code on success. The listener answers
    /// exactly one redirect request; terminal outcomes map to the flow
    /// states AUTHORIZED (`Ok`), AUTH_DENIED (`Denied`), and TIMEOUT.
    pub fn wait_for_redirect(&self, timeout: Duration) -> Result<String, AuthError> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(AuthError::Timeout);
            }

            let request = match self.server.recv_timeout(remaining) {
                Ok(Some(request)) => request,
                Ok(None) => return Err(AuthError::Timeout),
                Err(e) => {
                    return Err(AuthError::Listener {
                        addr: self.addr.clone(),
                        reason: e.to_string(),
                    });
                }
            };

            match parse_redirect(request.url()) {
                Some(RedirectOutcome::Code(code)) => {
                    let _ = request.respond(page(
                        200,
                        "Authorization complete",
                        "You can close this tab and return to the terminal.",
                    ));
                    return Ok(code);
                }
                Some(RedirectOutcome::Error(error)) => {
                    let _ = request.respond(page(
                        200,
                        "Authorization denied",
                        "You can close this tab.",
                    ));
                    return Err(AuthError::Denied(error));
                }
                None => {
                    let _ = request.respond(page(404, "Not found", ""));
                }
            }
        }
    }
}

/// Minimal HTML response shown in the user's browser.
fn page(status: u16, title: &str, detail: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    let body = format!(
        "<html><body style=\"font-family: system-ui; text-align: center; padding: 40px;\">\
         <h2>{title}</h2><p>{detail}</p></body></html>"
    );
    Response::from_data(body.into_bytes())
        .with_header(Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap())
        .with_status_code(StatusCode(status))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
