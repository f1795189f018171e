//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content.

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tiny_http::Response;

use crate::runlog;
use crate::table::{self, CleanRecord};
use crate::utils::process;

use super::json_body;

/// Moving-average window, in rows (one row per date).
const MA_WINDOW: usize = 7;

/// One refresh at a time; concurrent requests are rejected with 409.
static REFRESH_IN_FLIGHT: AtomicBool = AtomicBool::new(false);

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Metrics API response.
#[derive(Serialize)]
struct MetricsResponse {
    rows: Vec<MetricRow>,
}

/// One dashboard row: a date, its metrics, and their 7-day moving
/// averages (null until the window fills).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub date: String,
    pub bmi: Option<f64>,
    pub fat: Option<f64>,
    pub weight: Option<f64>,
    pub bmi_ma: Option<f64>,
    pub fat_ma: Option<f64>,
    pub weight_ma: Option<f64>,
}

/// Health API response.
#[derive(Serialize)]
struct HealthResponse {
    config_exists: bool,
    raw_exists: bool,
    clean_exists: bool,
    last_run: Option<runlog::RunEntry>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a 200 JSON response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(json_body(200, body))
}

/// Parse a `?key=YYYY-MM-DD` query parameter. Unparseable values count as
/// absent.
fn parse_date_param(url: &str, key: &str) -> Option<NaiveDate> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == key {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok()
        } else {
            None
        }
    })
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// `GET /api/metrics?start=YYYY-MM-DD&end=YYYY-MM-DD` — clean rows in the
/// inclusive date range, with moving averages.
pub fn get_metrics(url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let start = parse_date_param(url, "start");
    let end = parse_date_param(url, "end");

    let clean_path = Path::new(table::CLEAN_DATA_FILE);
    let records = if clean_path.exists() {
        table::read_clean(clean_path)?
    } else {
        Vec::new()
    };

    let rows = build_rows(&records, start, end);
    json_response(&MetricsResponse { rows })
}

/// Compute moving averages over the full series, then cut the requested
/// range. Both bounds are inclusive; an empty intersection is an empty
/// row list, not an error.
pub fn build_rows(
    records: &[CleanRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<MetricRow> {
    let bmi_ma = moving_average(records.iter().map(|r| r.bmi), MA_WINDOW);
    let fat_ma = moving_average(records.iter().map(|r| r.fat), MA_WINDOW);
    let weight_ma = moving_average(records.iter().map(|r| r.weight), MA_WINDOW);

    records
        .iter()
        .enumerate()
        .filter(|(_, r)| start.is_none_or(|s| r.date >= s) && end.is_none_or(|e| r.date <= e))
        .map(|(i, r)| MetricRow {
            date: r.date.format("%Y-%m-%d").to_string(),
            bmi: r.bmi,
            fat: r.fat,
            weight: r.weight,
            bmi_ma: bmi_ma[i],
            fat_ma: fat_ma[i],
            weight_ma: weight_ma[i],
        })
        .collect()
}

/// Trailing moving average: position `i` averages the `window` values
/// ending at `i`, and is null until the window is full or when any value
/// in it is missing.
pub fn moving_average(
    values: impl Iterator<Item = Option<f64>>,
    window: usize,
) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = values.collect();

    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let mut sum = 0.0;
            for v in slice {
                sum += (*v)?;
            }
            Some(sum / window as f64)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Refresh
// ---------------------------------------------------------------------------

/// `POST /api/refresh` — run fetch then clean as captured subprocesses.
///
/// Exactly one refresh runs at a time; overlapping requests get 409. On a
/// step failure the response is 500 with the step's last stderr line, and
/// the data files keep whatever the last successful run wrote.
pub fn post_refresh() -> Response<Cursor<Vec<u8>>> {
    let (status, body) = refresh_response();
    json_body(status, body.to_string())
}

/// Status and body of a refresh attempt. Split from [`post_refresh`] so the
/// guard behavior is testable without a running server.
fn refresh_response() -> (u16, serde_json::Value) {
    if REFRESH_IN_FLIGHT.swap(true, Ordering::SeqCst) {
        return (
            409,
            serde_json::json!({ "error": "a refresh is already running" }),
        );
    }

    let started = Instant::now();
    let result = run_refresh_steps();
    let duration_ms = started.elapsed().as_millis() as u64;

    REFRESH_IN_FLIGHT.store(false, Ordering::SeqCst);

    match result {
        Ok(()) => {
            runlog::log_success("refresh", 0, duration_ms);
            (200, serde_json::json!({ "status": "ok" }))
        }
        Err((step, message)) => {
            runlog::log_failure("refresh", duration_ms, &format!("{step}: {message}"));
            (
                500,
                serde_json::json!({ "error": format!("{step} failed: {message}") }),
            )
        }
    }
}

/// Run `vitals fetch` then `vitals clean`, stopping at the first failure.
fn run_refresh_steps() -> Result<(), (&'static str, String)> {
    for step in ["fetch", "clean"] {
        let output = process::run_self(&[step]).map_err(|e| (step, e.to_string()))?;
        if !output.success {
            return Err((step, output.failure_summary()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// `GET /api/health` — file presence and the last recorded run.
pub fn get_health() -> Result<Response<Cursor<Vec<u8>>>> {
    let resp = HealthResponse {
        config_exists: Path::new(crate::config::CONFIG_FILE).exists(),
        raw_exists: Path::new(table::RAW_DATA_FILE).exists(),
        clean_exists: Path::new(table::CLEAN_DATA_FILE).exists(),
        last_run: runlog::last_entry(),
    };
    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // One test owns the static guard; splitting this up would let the
    // parallel test runner race on it.
    #[test]
    fn refresh_is_rejected_with_409_while_another_holds_the_guard() {
        // Take the guard the way an in-flight refresh would
        assert!(!REFRESH_IN_FLIGHT.swap(true, Ordering::SeqCst));

        let (status, body) = refresh_response();

        assert_eq!(status, 409);
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .contains("already running")
        );

        // The 409 path must not release the original holder's guard
        assert!(REFRESH_IN_FLIGHT.load(Ordering::SeqCst));
        REFRESH_IN_FLIGHT.store(false, Ordering::SeqCst);
    }
}
