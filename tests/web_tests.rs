//! Dashboard API tests: inclusive date-range filtering and the 7-day
//! moving average.

use chrono::NaiveDate;
use vitals::table::CleanRecord;
use vitals::web::api::{build_rows, moving_average};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn series(days: u32) -> Vec<CleanRecord> {
    (1..=days)
        .map(|day| CleanRecord {
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            bmi: Some(25.0),
            fat: Some(22.0),
            weight: Some(80.0 + day as f64),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Date-range filter
// ---------------------------------------------------------------------------

#[test]
fn range_filter_is_inclusive_on_both_bounds() {
    let records = series(31);
    let rows = build_rows(&records, Some(d("2023-01-10")), Some(d("2023-01-20")));

    assert_eq!(rows.len(), 11);
    assert_eq!(rows.first().unwrap().date, "2023-01-10");
    assert_eq!(rows.last().unwrap().date, "2023-01-20");
}

#[test]
fn missing_bounds_return_everything() {
    let records = series(5);
    assert_eq!(build_rows(&records, None, None).len(), 5);
    assert_eq!(build_rows(&records, Some(d("2023-01-03")), None).len(), 3);
    assert_eq!(build_rows(&records, None, Some(d("2023-01-03"))).len(), 3);
}

#[test]
fn empty_intersection_yields_empty_rows_not_an_error() {
    let records = series(31);
    let rows = build_rows(&records, Some(d("2024-06-01")), Some(d("2024-06-30")));
    assert!(rows.is_empty());
}

#[test]
fn single_day_range_returns_that_day() {
    let records = series(31);
    let rows = build_rows(&records, Some(d("2023-01-15")), Some(d("2023-01-15")));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, "2023-01-15");
}

// ---------------------------------------------------------------------------
// Moving average
// ---------------------------------------------------------------------------

#[test]
fn moving_average_is_null_until_the_window_fills() {
    let values = (1..=9).map(|v| Some(v as f64));
    let ma = moving_average(values, 7);

    assert!(ma[..6].iter().all(Option::is_none));
    // mean of 1..=7
    assert_eq!(ma[6], Some(4.0));
    assert_eq!(ma[7], Some(5.0));
    assert_eq!(ma[8], Some(6.0));
}

#[test]
fn gaps_in_the_window_suppress_the_average() {
    let mut values: Vec<Option<f64>> = (1..=10).map(|v| Some(v as f64)).collect();
    values[4] = None;

    let ma = moving_average(values.into_iter(), 7);
    // Every full window in a 10-value series contains the gap at index 4
    assert_eq!(ma.len(), 10);
    assert!(ma[..6].iter().all(Option::is_none));
    assert!(ma[6..].iter().all(Option::is_none));
}

#[test]
fn averages_are_computed_before_the_range_filter() {
    let records = series(20);
    let rows = build_rows(&records, Some(d("2023-01-10")), Some(d("2023-01-12")));

    // Day 10 is past the 7-day warmup of the full series, so its average
    // exists even though the filtered view starts there.
    assert!(rows[0].weight_ma.is_some());
    let expected = (84.0 + 85.0 + 86.0 + 87.0 + 88.0 + 89.0 + 90.0) / 7.0;
    assert_eq!(rows[0].weight_ma, Some(expected));
}
