//! Run history log — records the outcome of every fetch/clean/refresh run.
//!
//! One JSON line per run in `~/.vitals/history.jsonl`. Best-effort: logging
//! failures are silently ignored so a full disk or missing home directory
//! never breaks a data run. The dashboard reads the log back for its
//! health endpoint.

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Run entry
// ---------------------------------------------------------------------------

/// A single entry in the run history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEntry {
    pub timestamp: String,
    /// Which step ran: `"fetch"`, `"clean"`, or `"refresh"`.
    pub action: String,
    pub success: bool,
    /// Rows written by the run (fetched or cleaned), when known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rows: Option<usize>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Record a successful run in the default log.
pub fn log_success(action: &str, rows: usize, duration_ms: u64) {
    append_default(&RunEntry {
        timestamp: Utc::now().to_rfc3339(),
        action: action.to_string(),
        success: true,
        rows: Some(rows),
        duration_ms,
        error: None,
    });
}

/// Record a failed run with its error text in the default log.
pub fn log_failure(action: &str, duration_ms: u64, error: &str) {
    append_default(&RunEntry {
        timestamp: Utc::now().to_rfc3339(),
        action: action.to_string(),
        success: false,
        rows: None,
        duration_ms,
        error: Some(error.to_string()),
    });
}

fn append_default(entry: &RunEntry) {
    if let Some(path) = history_log_path() {
        let _ = append_to(&path, entry);
    }
}

/// Append one entry to the log at `path`, creating parent directories and
/// the file as needed.
pub fn append_to(path: &Path, entry: &RunEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Reading back
// ---------------------------------------------------------------------------

/// Read all entries from the default log, oldest first.
pub fn read_all_entries() -> Vec<RunEntry> {
    match history_log_path() {
        Some(path) => read_entries_from(&path),
        None => Vec::new(),
    }
}

/// Read all entries from the log at `path`, oldest first.
///
/// Silently skips malformed lines. Returns an empty vec if the log does not
/// exist or cannot be read.
pub fn read_entries_from(path: &Path) -> Vec<RunEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    let reader = BufReader::new(file);
    reader
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<RunEntry>(&line).ok())
        .collect()
}

/// The most recent run entry in the default log, if any.
pub fn last_entry() -> Option<RunEntry> {
    read_all_entries().into_iter().next_back()
}

/// Return the path to the default run history log.
pub fn history_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".vitals").join("history.jsonl"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: &str, success: bool) -> RunEntry {
        RunEntry {
            timestamp: Utc::now().to_rfc3339(),
            action: action.to_string(),
            success,
            rows: success.then_some(42),
            duration_ms: 1850,
            error: (!success).then(|| "no parseable rows".to_string()),
        }
    }

    #[test]
    fn append_then_read_back_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");

        append_to(&path, &entry("fetch", true)).unwrap();
        append_to(&path, &entry("clean", false)).unwrap();

        let back = read_entries_from(&path);
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].action, "fetch");
        assert_eq!(back[1].action, "clean");
        assert_eq!(back[1].error.as_deref(), Some("no parseable rows"));
    }

    #[test]
    fn malformed_lines_are_skipped_on_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");

        append_to(&path, &entry("fetch", true)).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json at all").unwrap();
        writeln!(file, "{{\"half\": ").unwrap();
        drop(file);
        append_to(&path, &entry("clean", true)).unwrap();

        let back = read_entries_from(&path);
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].action, "fetch");
        assert_eq!(back[1].action, "clean");
    }

    #[test]
    fn missing_log_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_entries_from(&dir.path().join("absent.jsonl")).is_empty());
    }

    #[test]
    fn append_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".vitals").join("history.jsonl");

        append_to(&path, &entry("refresh", true)).unwrap();
        assert_eq!(read_entries_from(&path).len(), 1);
    }

    #[test]
    fn error_field_is_omitted_from_success_entries() {
        let json = serde_json::to_string(&entry("fetch", true)).unwrap();
        assert!(!json.contains("error"));

        let back: RunEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rows, Some(42));
    }
}
