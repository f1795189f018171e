//! CSV table I/O for the raw and clean body-metric files.
//!
//! Both files are plain comma-separated UTF-8 with a header row. Fields
//! never contain commas (numeric values, ISO dates, and short source names
//! like `Aria` or `API`), so no quoting layer is needed.
//!
//! - Raw table (`body_data.csv`): one row per body-log entry, verbatim
//!   API fields in the order `bmi,date,logId,source,time,weight,fat`.
//! - Clean table (`clean_body_data.csv`): one row per date,
//!   `date,bmi,fat,weight`.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

/// Default raw table path, relative to the working directory.
pub const RAW_DATA_FILE: &str = "body_data.csv";

/// Default clean table path, relative to the working directory.
pub const CLEAN_DATA_FILE: &str = "clean_body_data.csv";

const RAW_HEADER: &str = "bmi,date,logId,source,time,weight,fat";
const CLEAN_HEADER: &str = "date,bmi,fat,weight";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One raw body-log entry, as returned by the API.
///
/// Deserializes directly from the provider's JSON (`logId` casing) and maps
/// 1:1 onto a raw CSV row. Weight-log entries carry `bmi`/`weight` (and
/// `fat` when the scale reports it); fat-log entries carry only `fat`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub bmi: Option<f64>,
    pub date: NaiveDate,
    #[serde(rename = "logId", default)]
    pub log_id: Option<i64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
}

/// One clean row: a date and its three metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub date: NaiveDate,
    pub bmi: Option<f64>,
    pub fat: Option<f64>,
    pub weight: Option<f64>,
}

// ---------------------------------------------------------------------------
// Raw table
// ---------------------------------------------------------------------------

/// Read all raw records from `path`.
///
/// Rows whose date field does not parse are skipped; numeric fields that do
/// not parse become null. Returns an empty vec for a file with only a
/// header. Errors only on I/O.
pub fn read_raw(path: &Path) -> Result<Vec<RawRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let records = content
        .lines()
        .skip(1)
        .filter_map(parse_raw_line)
        .collect();

    Ok(records)
}

/// Append raw records to `path`, writing the header first if the file does
/// not exist yet. Column order matches [`RAW_HEADER`].
pub fn append_raw(path: &Path, records: &[RawRecord]) -> Result<()> {
    let mut out = String::new();
    if !path.exists() {
        out.push_str(RAW_HEADER);
        out.push('\n');
    }
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            fmt_f64(r.bmi),
            r.date.format("%Y-%m-%d"),
            r.log_id.map(|v| v.to_string()).unwrap_or_default(),
            r.source.as_deref().unwrap_or(""),
            r.time.as_deref().unwrap_or(""),
            fmt_f64(r.weight),
            fmt_f64(r.fat),
        ));
    }

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(out.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

fn parse_raw_line(line: &str) -> Option<RawRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 7 {
        return None;
    }

    let date = NaiveDate::parse_from_str(fields[1].trim(), "%Y-%m-%d").ok()?;

    Some(RawRecord {
        bmi: parse_f64(fields[0]),
        date,
        log_id: fields[2].trim().parse().ok(),
        source: non_empty(fields[3]),
        time: non_empty(fields[4]),
        weight: parse_f64(fields[5]),
        fat: parse_f64(fields[6]),
    })
}

// ---------------------------------------------------------------------------
// Clean table
// ---------------------------------------------------------------------------

/// Read all clean records from `path`, skipping unparseable rows.
pub fn read_clean(path: &Path) -> Result<Vec<CleanRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let records = content
        .lines()
        .skip(1)
        .filter_map(parse_clean_line)
        .collect();

    Ok(records)
}

/// Write clean records to `path`, replacing any existing file.
pub fn write_clean(path: &Path, records: &[CleanRecord]) -> Result<()> {
    let mut out = String::with_capacity(records.len() * 32);
    out.push_str(CLEAN_HEADER);
    out.push('\n');
    for r in records {
        out.push_str(&format!(
            "{},{},{},{}\n",
            r.date.format("%Y-%m-%d"),
            fmt_f64(r.bmi),
            fmt_f64(r.fat),
            fmt_f64(r.weight),
        ));
    }

    fs::write(path, out).with_context(|| format!("failed to write {}", path.display()))
}

fn parse_clean_line(line: &str) -> Option<CleanRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 4 {
        return None;
    }

    let date = NaiveDate::parse_from_str(fields[0].trim(), "%Y-%m-%d").ok()?;

    Some(CleanRecord {
        date,
        bmi: parse_f64(fields[1]),
        fat: parse_f64(fields[2]),
        weight: parse_f64(fields[3]),
    })
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Format an optional float; null becomes an empty field.
///
/// Uses `Display` for `f64`, which prints the shortest representation that
/// round-trips — the same input always formats identically, which keeps the
/// clean table byte-stable across runs.
fn fmt_f64(v: Option<f64>) -> String {
    v.map(|f| f.to_string()).unwrap_or_default()
}

fn parse_f64(field: &str) -> Option<f64> {
    field.trim().parse().ok()
}

fn non_empty(field: &str) -> Option<String> {
    let t = field.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn raw_line_roundtrip() {
        let line = "25.91,2023-07-03,1688428799000,Aria,23:59:59,80.5,22.5";
        let rec = parse_raw_line(line).unwrap();
        assert_eq!(rec.date, d("2023-07-03"));
        assert_eq!(rec.bmi, Some(25.91));
        assert_eq!(rec.log_id, Some(1688428799000));
        assert_eq!(rec.source.as_deref(), Some("Aria"));
        assert_eq!(rec.weight, Some(80.5));
        assert_eq!(rec.fat, Some(22.5));
    }

    #[test]
    fn raw_line_with_missing_fields() {
        let rec = parse_raw_line(",2023-07-03,,,,,22.5").unwrap();
        assert_eq!(rec.bmi, None);
        assert_eq!(rec.weight, None);
        assert_eq!(rec.fat, Some(22.5));
        assert_eq!(rec.source, None);
    }

    #[test]
    fn raw_line_bad_date_is_skipped() {
        assert!(parse_raw_line("25.91,not-a-date,1,Aria,23:59:59,80.5,").is_none());
        assert!(parse_raw_line("garbage").is_none());
    }

    #[test]
    fn raw_record_from_api_json() {
        let json = r#"{"bmi":25.91,"date":"2023-07-03","fat":22.5,
            "logId":1688428799000,"source":"Aria","time":"23:59:59","weight":80.5}"#;
        let rec: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.log_id, Some(1688428799000));
        assert_eq!(rec.weight, Some(80.5));
    }

    #[test]
    fn fat_log_json_lacks_weight() {
        let json = r#"{"date":"2023-07-04","fat":21.0,"logId":9,"source":"API","time":"08:00:00"}"#;
        let rec: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.weight, None);
        assert_eq!(rec.bmi, None);
        assert_eq!(rec.fat, Some(21.0));
    }

    #[test]
    fn append_creates_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");

        let rec = RawRecord {
            bmi: Some(25.0),
            date: d("2023-07-03"),
            log_id: Some(1),
            source: Some("Aria".into()),
            time: Some("23:59:59".into()),
            weight: Some(80.0),
            fat: None,
        };

        append_raw(&path, std::slice::from_ref(&rec)).unwrap();
        append_raw(&path, &[rec]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], RAW_HEADER);
        assert_eq!(lines[1], lines[2]);
    }

    #[test]
    fn clean_roundtrip_preserves_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.csv");

        let recs = vec![
            CleanRecord {
                date: d("2023-07-03"),
                bmi: Some(25.91),
                fat: None,
                weight: Some(80.5),
            },
            CleanRecord {
                date: d("2023-07-04"),
                bmi: None,
                fat: Some(22.5),
                weight: None,
            },
        ];

        write_clean(&path, &recs).unwrap();
        let back = read_clean(&path).unwrap();
        assert_eq!(back, recs);
    }
}
