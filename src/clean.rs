//! Data cleaner: normalizes the raw body-log table into one row per date.
//!
//! Transform order: coerce the three metrics to floats with zero treated
//! as missing, drop rows with no metrics at all, sort ascending by date,
//! de-duplicate by date with the last written row winning, then forward-
//! fill remaining per-column gaps from the previous date. The whole
//! pipeline is deterministic — the same raw input always produces
//! byte-identical clean output.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::table::{self, CleanRecord, RawRecord};

/// Errors raised while cleaning the raw table.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("raw table not found at {0}")]
    MissingInput(PathBuf),
    #[error("no parseable rows in {0}")]
    Empty(PathBuf),
    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

/// Clean `raw_path` into `out_path`. Returns the clean row count.
pub fn run(raw_path: &Path, out_path: &Path) -> Result<usize, CleanError> {
    if !raw_path.exists() {
        return Err(CleanError::MissingInput(raw_path.to_path_buf()));
    }

    let raw = table::read_raw(raw_path)?;
    if raw.is_empty() {
        return Err(CleanError::Empty(raw_path.to_path_buf()));
    }

    let clean = transform(raw);
    table::write_clean(out_path, &clean)?;

    Ok(clean.len())
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// The raw → clean transform, independent of any file I/O.
pub fn transform(raw: Vec<RawRecord>) -> Vec<CleanRecord> {
    let mut rows: Vec<CleanRecord> = raw
        .into_iter()
        .map(|r| CleanRecord {
            date: r.date,
            bmi: zero_as_missing(r.bmi),
            fat: zero_as_missing(r.fat),
            weight: zero_as_missing(r.weight),
        })
        .filter(|r| r.bmi.is_some() || r.fat.is_some() || r.weight.is_some())
        .collect();

    // Stable sort keeps file order within a date, so the last written row
    // for a date is the one the dedup below keeps.
    rows.sort_by_key(|r| r.date);
    dedupe_last_wins(&mut rows);
    forward_fill(&mut rows);

    rows
}

/// Scales report 0 for metrics they could not measure.
fn zero_as_missing(v: Option<f64>) -> Option<f64> {
    v.filter(|&f| f != 0.0)
}

/// Collapse equal dates, keeping the last occurrence of each.
fn dedupe_last_wins(rows: &mut Vec<CleanRecord>) {
    let mut i = 0;
    while i + 1 < rows.len() {
        if rows[i].date == rows[i + 1].date {
            rows.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Fill each metric's gaps from the previous date's value. Leading gaps
/// stay empty.
fn forward_fill(rows: &mut [CleanRecord]) {
    let mut last_bmi = None;
    let mut last_fat = None;
    let mut last_weight = None;

    for row in rows {
        match row.bmi {
            Some(v) => last_bmi = Some(v),
            None => row.bmi = last_bmi,
        }
        match row.fat {
            Some(v) => last_fat = Some(v),
            None => row.fat = last_fat,
        }
        match row.weight {
            Some(v) => last_weight = Some(v),
            None => row.weight = last_weight,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
