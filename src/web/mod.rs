//! Local web dashboard.
//!
//! A sequential `tiny_http` server carrying the embedded single-page
//! frontend and a small JSON API (metrics, refresh orchestration, health).
//! Sequential handling is enough for a single-user dashboard, and it is
//! what serializes everything except the refresh action, which carries its
//! own in-flight guard.
//!
//! Launched via `vitals web` (default: `http://127.0.0.1:9462`).

pub mod api;
mod frontend;

use std::io::Cursor;

use anyhow::Result;
use colored::Colorize;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

/// Default dashboard address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:9462";

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on the given address. Blocks until killed.
pub fn serve(addr: &str) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let url = format!("http://{addr}");
    println!("{} {url}", "Dashboard running:".bold().cyan());
    println!("Press Ctrl+C to stop.\n");

    if !crate::utils::browser::open(&url) {
        println!("Open {url} in your browser to view it.");
    }

    for request in server.incoming_requests() {
        handle(request);
    }

    Ok(())
}

/// Log, route, and answer one request. Handler errors become a JSON 500
/// instead of taking the server down.
fn handle(request: Request) {
    let method = request.method().clone();
    let url = request.url().to_string();

    println!(
        "{} {} {}",
        chrono::Local::now()
            .format("%H:%M:%S")
            .to_string()
            .dimmed(),
        method,
        url.split('?').next().unwrap_or(&url),
    );

    let response = route(&method, &url).unwrap_or_else(|e| {
        json_body(500, serde_json::json!({ "error": e.to_string() }).to_string())
    });
    let _ = request.respond(response);
}

/// Route a request to its handler.
fn route(method: &Method, url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    // Query string only matters to the handlers
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => {
            Ok(html_body(frontend::INDEX_HTML))
        }
        (&Method::Get, "/api/metrics") => api::get_metrics(url),
        (&Method::Post, "/api/refresh") => Ok(api::post_refresh()),
        (&Method::Get, "/api/health") => api::get_health(),
        _ => Ok(json_body(404, r#"{"error": "not found"}"#.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Response builders
// ---------------------------------------------------------------------------

/// A JSON response with the given status.
pub(crate) fn json_body(status: u16, body: String) -> Response<Cursor<Vec<u8>>> {
    Response::from_data(body.into_bytes())
        .with_header(header("Content-Type", "application/json; charset=utf-8"))
        .with_status_code(StatusCode(status))
}

/// A 200 HTML response (the embedded frontend).
fn html_body(html: &str) -> Response<Cursor<Vec<u8>>> {
    Response::from_data(html.as_bytes().to_vec())
        .with_header(header("Content-Type", "text/html; charset=utf-8"))
        .with_status_code(StatusCode(200))
}

fn header(field: &str, value: &str) -> Header {
    Header::from_bytes(field, value).unwrap()
}
