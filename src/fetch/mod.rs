//! Data fetcher: mints a token set, pulls body-log entries from the remote
//! API, and appends them to the raw CSV.
//!
//! Token handoff follows the original subprocess contract: the fetcher
//! spawns `vitals auth <id> <secret>`, and extracts the `key = value`
//! lines from its captured stdout. Tokens never touch disk.
//!
//! The provider caps a body-log request at 31 days, so the requested range
//! is walked in 30-day windows and the pages are concatenated. The raw
//! file is only written after every window succeeded — a failed fetch
//! leaves it untouched.

mod client;

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, Utc};
use regex::Regex;
use thiserror::Error;

use crate::auth::TokenSet;
use crate::config::ClientConfig;
use crate::table::{self, RawRecord};
use crate::utils::process;

pub use client::ApiClient;

/// Start of history when no raw file exists yet.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 7, 1).unwrap()
}

/// Window size per API call; the provider rejects ranges over 31 days.
const WINDOW_DAYS: i64 = 30;

/// Pause between windows, to stay clear of the provider's rate budget.
const WINDOW_PAUSE: Duration = Duration::from_secs(1);

/// Access tokens default to an eight-hour lifetime when the handoff does
/// not carry an expiry.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 28_800;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while fetching remote data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("authorization subprocess failed: {0}")]
    Auth(String),
    #[error("authorization output missing {0}")]
    TokenHandoff(&'static str),
    #[error("unknown metric category: {0}")]
    UnknownCategory(String),
    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("rate limited again after waiting, giving up")]
    RateLimited,
    #[error("API request failed: {0}")]
    Http(String),
}

// ---------------------------------------------------------------------------
// Metric categories
// ---------------------------------------------------------------------------

/// A remote body-log category.
///
/// `Weight` entries carry weight and BMI (and body fat when the scale
/// reports it); `Fat` entries carry body fat alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricCategory {
    Weight,
    Fat,
}

impl MetricCategory {
    /// Path segment and response key in the body-log API.
    pub fn resource(self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Fat => "fat",
        }
    }

    pub fn from_name(s: &str) -> Result<Self, FetchError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weight" => Ok(Self::Weight),
            "fat" => Ok(Self::Fat),
            other => Err(FetchError::UnknownCategory(other.to_string())),
        }
    }
}

impl std::fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.resource())
    }
}

/// Parse the CLI category list.
pub fn parse_categories(names: &[String]) -> Result<Vec<MetricCategory>, FetchError> {
    names.iter().map(|n| MetricCategory::from_name(n)).collect()
}

// ---------------------------------------------------------------------------
// Token handoff
// ---------------------------------------------------------------------------

/// Spawn `vitals auth` and extract the token set from its stdout.
pub fn mint_token_set(config: &ClientConfig) -> Result<TokenSet, FetchError> {
    let output = process::run_self(&["auth", &config.client_id, &config.client_secret])
        .map_err(|e| FetchError::Auth(e.to_string()))?;

    if !output.success {
        return Err(FetchError::Auth(output.failure_summary()));
    }

    extract_tokens(&output.stdout)
}

/// Extract `access_token = …` / `refresh_token = …` / `expires_at = …`
/// lines from the auth subprocess output.
///
/// Access and refresh tokens are required; a missing or unparseable expiry
/// falls back to the provider's default eight-hour lifetime.
pub fn extract_tokens(stdout: &str) -> Result<TokenSet, FetchError> {
    let access = capture(stdout, r"access_token\s*=\s*(\S+)")
        .ok_or(FetchError::TokenHandoff("access_token"))?;
    let refresh = capture(stdout, r"refresh_token\s*=\s*(\S+)")
        .ok_or(FetchError::TokenHandoff("refresh_token"))?;

    let expiry = capture(stdout, r"expires_at\s*=\s*(\S+)")
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc::now() + chrono::Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS));

    Ok(TokenSet {
        access_token: access,
        refresh_token: refresh,
        expiry,
    })
}

fn capture(haystack: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).expect("static pattern");
    re.captures(haystack)
        .map(|c| c.get(1).unwrap().as_str().to_string())
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Start date for the next fetch: the day after the newest raw row, or
/// [`default_start_date`] when the file is absent or empty.
pub fn start_date_from_raw(path: &Path) -> NaiveDate {
    if !path.exists() {
        return default_start_date();
    }

    table::read_raw(path)
        .ok()
        .and_then(|rows| rows.iter().map(|r| r.date).max())
        .and_then(|max| max.succ_opt())
        .unwrap_or_else(default_start_date)
}

/// Fetch every category over `[start, end]`, walking 30-day windows and
/// concatenating the pages. Nothing is written here; the caller appends
/// the combined rows only after the whole fetch succeeded.
pub fn fetch_all(
    client: &ApiClient,
    categories: &[MetricCategory],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<RawRecord>, FetchError> {
    let mut rows = Vec::new();

    for &category in categories {
        let mut current = start;
        while current <= end {
            let window_end = std::cmp::min(current + chrono::Duration::days(WINDOW_DAYS), end);
            rows.extend(client.body_log(category, current, window_end)?);

            current = match window_end.succ_opt() {
                Some(next) => next,
                None => break,
            };
            if current <= end {
                thread::sleep(WINDOW_PAUSE);
            }
        }
    }

    Ok(rows)
}

/// Full fetch run: load config, mint tokens via the auth subprocess, fetch
/// everything newer than the raw file, append. Returns the appended row
/// count.
pub fn run(categories: &[MetricCategory]) -> Result<usize> {
    let config = crate::config::load_default()?;
    let token = mint_token_set(&config)?;

    let raw_path = Path::new(table::RAW_DATA_FILE);
    let start = start_date_from_raw(raw_path);
    let end = Local::now().date_naive();

    if start > end {
        return Ok(0);
    }

    let client = ApiClient::new(&token);
    let rows = fetch_all(&client, categories, start, end)?;

    table::append_raw(raw_path, &rows)?;
    Ok(rows.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
