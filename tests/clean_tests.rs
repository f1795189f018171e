use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use vitals::clean::{self, CleanError};

const RAW_HEADER: &str = "bmi,date,logId,source,time,weight,fat";

fn write_raw(rows: &[&str]) -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("body_data.csv");
    let out = dir.path().join("clean_body_data.csv");

    let mut content = String::from(RAW_HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(&raw, content).unwrap();

    (dir, raw, out)
}

// ---------------------------------------------------------------------------
// Idempotency
// ---------------------------------------------------------------------------

#[test]
fn cleaning_twice_produces_byte_identical_output() {
    let (_dir, raw, out) = write_raw(&[
        "25.91,2023-07-03,1,Aria,23:59:59,80.5,22.5",
        "25.8,2023-07-05,2,Aria,08:10:00,80.2,0",
        "25.85,2023-07-04,3,API,12:00:00,80.35,",
    ]);

    clean::run(&raw, &out).unwrap();
    let first = fs::read(&out).unwrap();

    clean::run(&raw, &out).unwrap();
    let second = fs::read(&out).unwrap();

    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Shape invariants
// ---------------------------------------------------------------------------

#[test]
fn one_row_per_distinct_date_sorted_ascending() {
    let (_dir, raw, out) = write_raw(&[
        "25.9,2023-07-05,1,Aria,23:59:59,80.5,",
        "25.8,2023-07-03,2,Aria,23:59:59,80.2,",
        "25.7,2023-07-05,3,Aria,23:59:59,79.9,",
        "25.6,2023-07-04,4,Aria,23:59:59,79.6,",
    ]);

    let rows = clean::run(&raw, &out).unwrap();
    assert_eq!(rows, 3);

    let content = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "date,bmi,fat,weight");

    let dates: Vec<&str> = lines[1..]
        .iter()
        .map(|l| l.split(',').next().unwrap())
        .collect();
    assert_eq!(dates, vec!["2023-07-03", "2023-07-04", "2023-07-05"]);
}

#[test]
fn duplicate_date_keeps_the_last_written_row() {
    let (_dir, raw, out) = write_raw(&[
        "25.9,2023-07-05,1,Aria,23:59:59,80.5,",
        "25.7,2023-07-05,2,API,08:00:00,79.9,",
    ]);

    clean::run(&raw, &out).unwrap();

    let content = fs::read_to_string(&out).unwrap();
    assert_eq!(content.lines().nth(1).unwrap(), "2023-07-05,25.7,,79.9");
}

#[test]
fn zeros_and_gaps_forward_fill_from_previous_date() {
    let (_dir, raw, out) = write_raw(&[
        "25.9,2023-07-03,1,Aria,23:59:59,80.5,22.5",
        "0,2023-07-04,2,Aria,23:59:59,80.2,0",
    ]);

    clean::run(&raw, &out).unwrap();

    let content = fs::read_to_string(&out).unwrap();
    // bmi and fat were zero on the 4th, filled from the 3rd
    assert_eq!(content.lines().nth(2).unwrap(), "2023-07-04,25.9,22.5,80.2");
}

#[test]
fn unparseable_rows_are_skipped() {
    let (_dir, raw, out) = write_raw(&[
        "garbage line",
        "25.9,2023-07-03,1,Aria,23:59:59,80.5,",
        "25.9,not-a-date,2,Aria,23:59:59,80.5,",
    ]);

    let rows = clean::run(&raw, &out).unwrap();
    assert_eq!(rows, 1);
}

// ---------------------------------------------------------------------------
// Error cases
// ---------------------------------------------------------------------------

#[test]
fn missing_raw_table_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = clean::run(
        &dir.path().join("nope.csv"),
        &dir.path().join("out.csv"),
    )
    .unwrap_err();
    assert!(matches!(err, CleanError::MissingInput(_)));
}

#[test]
fn zero_parseable_rows_is_an_error_and_leaves_no_output() {
    let (_dir, raw, out) = write_raw(&["garbage", "more garbage"]);

    let err = clean::run(&raw, &out).unwrap_err();
    assert!(matches!(err, CleanError::Empty(_)));
    assert!(!out.exists());
}

#[test]
fn failed_clean_leaves_prior_output_untouched() {
    let (_dir, raw, out) = write_raw(&["25.9,2023-07-03,1,Aria,23:59:59,80.5,"]);
    clean::run(&raw, &out).unwrap();
    let before = fs::read(&out).unwrap();

    // Truncate the raw table to nothing parseable and clean again
    fs::write(&raw, format!("{RAW_HEADER}\n")).unwrap();
    let err = clean::run(&raw, &out).unwrap_err();
    assert!(matches!(err, CleanError::Empty(_)));

    assert_eq!(fs::read(&out).unwrap(), before);
}
