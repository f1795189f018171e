//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `vitals auth` — run the browser authorization flow, print the handoff
//! - `vitals fetch` — pull new body-log entries into the raw table
//! - `vitals clean` — normalize the raw table into the clean table
//! - `vitals web` — serve the dashboard
//!
//! Human-facing status goes to stderr in `auth` (stdout is the token
//! handoff channel) and to stdout elsewhere. Each data run is recorded in
//! the run history log.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use colored::Colorize;

use crate::auth;
use crate::clean;
use crate::fetch;
use crate::runlog;
use crate::table;
use crate::web;

// ---------------------------------------------------------------------------
// vitals auth
// ---------------------------------------------------------------------------

/// Run the authorization flow and print the token handoff lines on stdout.
///
/// Everything human-facing goes to stderr so the parent process can parse
/// stdout without filtering.
pub fn run_auth(client_id: &str, client_secret: &str) -> Result<()> {
    eprintln!("{}", "Opening browser for authorization...".cyan());

    let token = auth::authorize(client_id, client_secret)?;

    eprintln!("{}", "Authorized.".green());
    print!("{}", auth::handoff_lines(&token));

    Ok(())
}

// ---------------------------------------------------------------------------
// vitals fetch
// ---------------------------------------------------------------------------

/// Fetch new entries for the named categories and append them to the raw
/// table.
pub fn run_fetch(category_names: &[String]) -> Result<()> {
    let categories = fetch::parse_categories(category_names)?;

    let started = Instant::now();
    match fetch::run(&categories) {
        Ok(rows) => {
            runlog::log_success("fetch", rows, elapsed_ms(started));
            if rows == 0 {
                println!("{}", "Already up to date — no new entries.".yellow());
            } else {
                println!(
                    "{} {} rows appended to {}",
                    "Fetch complete:".bold().green(),
                    rows,
                    table::RAW_DATA_FILE
                );
            }
            Ok(())
        }
        Err(e) => {
            runlog::log_failure("fetch", elapsed_ms(started), &e.to_string());
            Err(e)
        }
    }
}

// ---------------------------------------------------------------------------
// vitals clean
// ---------------------------------------------------------------------------

/// Normalize the raw table into the clean table.
pub fn run_clean() -> Result<()> {
    let started = Instant::now();
    let result = clean::run(
        Path::new(table::RAW_DATA_FILE),
        Path::new(table::CLEAN_DATA_FILE),
    );

    match result {
        Ok(rows) => {
            runlog::log_success("clean", rows, elapsed_ms(started));
            println!(
                "{} {} rows written to {}",
                "Clean complete:".bold().green(),
                rows,
                table::CLEAN_DATA_FILE
            );
            Ok(())
        }
        Err(e) => {
            runlog::log_failure("clean", elapsed_ms(started), &e.to_string());
            Err(e.into())
        }
    }
}

// ---------------------------------------------------------------------------
// vitals web
// ---------------------------------------------------------------------------

/// Serve the dashboard. Blocks until killed.
pub fn run_web(addr: &str) -> Result<()> {
    web::serve(addr)
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
